use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use axum_extra::extract::{Query, WithRejection};
use std::sync::Arc;
use tracing::debug;

use crate::db::services;
use crate::models::{CreateVideoRequest, CreatedVideo, ListVideosParams, VideoItem};
use crate::web::{AppError, AppState};

// --- Route Handlers ---

/// `tagIds` may repeat in the query string, one value per tag. Unparseable
/// parameters are answered like any other invalid input.
async fn list_videos_handler(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Query(params), _): WithRejection<Query<ListVideosParams>, AppError>,
) -> Result<Json<Vec<VideoItem>>, AppError> {
    debug!(?params, "listVideos");
    let videos =
        services::list_videos(&app_state.db_pool, &params, app_state.config.max_list_limit).await?;
    Ok(Json(videos))
}

/// Responds `200 null` for an unknown id; a missing video is not an error.
async fn get_video_handler(
    State(app_state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> Result<Json<Option<VideoItem>>, AppError> {
    let video = services::get_video(&app_state.db_pool, &video_id).await?;
    Ok(Json(video))
}

async fn get_video_count_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<u64>, AppError> {
    let count = services::get_video_count(&app_state.db_pool).await?;
    Ok(Json(count))
}

async fn create_video_handler(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateVideoRequest>, AppError>,
) -> Result<(StatusCode, Json<CreatedVideo>), AppError> {
    let created = services::create_video(
        &app_state.db_pool,
        &payload,
        &app_state.config.thumbnail_base_url,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// --- Router ---

pub fn create_videos_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_videos_handler).post(create_video_handler))
        .route("/count", get(get_video_count_handler))
        .route("/{video_id}", get(get_video_handler))
}
