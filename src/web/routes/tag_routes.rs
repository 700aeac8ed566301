use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

use crate::db::services;
use crate::models::Tag;
use crate::web::{AppError, AppState};

async fn list_tags_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<Tag>>, AppError> {
    let tags = services::list_tags(&app_state.db_pool).await?;
    Ok(Json(tags))
}

// --- Router ---

pub fn create_tags_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_tags_handler))
}
