//! Data access for the catalog. Handlers call into these functions and never
//! build queries themselves.

pub mod tag_service;
pub mod video_service;

pub use tag_service::*;
pub use video_service::*;
