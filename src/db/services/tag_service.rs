use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set};
use tracing::info;
use uuid::Uuid;

use crate::db::entities::tag;
use crate::db::error::ServiceError;
use crate::models::Tag;

// --- Tag Service Functions ---

/// Retrieves every tag, ordered alphabetically by name.
pub async fn list_tags(db: &DatabaseConnection) -> Result<Vec<Tag>, DbErr> {
    let tags = tag::Entity::find()
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await?;
    Ok(tags.into_iter().map(Tag::from).collect())
}

/// Creates a tag. A fresh id is generated when `id` is `None`.
pub async fn create_tag(
    db: &DatabaseConnection,
    id: Option<&str>,
    name: &str,
    color: &str,
) -> Result<Tag, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::Validation("Tag name is required".to_string()));
    }
    if !is_hex_color(color) {
        return Err(ServiceError::Validation(format!(
            "Tag color must be a hex color like #3B82F6, got '{color}'"
        )));
    }

    let tag_id = id.map(str::to_owned).unwrap_or_else(|| Uuid::new_v4().to_string());
    let model = tag::ActiveModel {
        id: Set(tag_id),
        name: Set(name.to_owned()),
        color: Set(color.to_owned()),
    }
    .insert(db)
    .await
    .map_err(|e| ServiceError::from_insert_err(e, "A tag with this name already exists."))?;

    info!(tag_id = %model.id, name = %model.name, "Tag created.");
    Ok(model.into())
}

fn is_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}
