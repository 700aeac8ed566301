//! SeaORM entities for the catalog tables.
//!
//! `videos` and `tags` are independent; `video_tags` is the many-to-many link
//! between them and carries no identity of its own.

pub mod tag;
pub mod video;
pub mod video_tag;
