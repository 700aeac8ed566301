//! Client side of the catalog: list state for the gallery, a staleness-aware
//! result cache and an HTTP implementation of the API.

pub mod api;
pub mod cache;
pub mod form;
pub mod gallery;
pub mod state;

pub use api::{ClientError, HttpVideoApi, VideoApi};
pub use gallery::{Completion, GalleryController, PendingRequest, RefreshOutcome};
pub use state::{DateRange, GalleryState, QueryKey, ScrollMetrics, VideoFilters};
