pub mod tag_routes;
pub mod video_routes;
