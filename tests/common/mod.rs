#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};

use vidto::db;
use vidto::db::entities::{video, video_tag};
use vidto::db::services;
use vidto::models::Tag;

pub const THUMBNAIL_BASE: &str = "https://picsum.photos";
pub const MAX_LIMIT: u64 = 500;

/// Fresh in-memory SQLite database with the schema applied.
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    db::connect("sqlite::memory:", 1).await
}

pub async fn seed_test_tags(db: &DatabaseConnection) -> Vec<Tag> {
    let mut tags = Vec::new();
    for (id, name, color) in [
        ("tag1", "Education", "#3B82F6"),
        ("tag2", "Entertainment", "#EF4444"),
        ("tag3", "Technology", "#10B981"),
    ] {
        tags.push(services::create_tag(db, Some(id), name, color).await.unwrap());
    }
    tags
}

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

/// Inserts a video row directly so tests control `created_at`.
pub async fn insert_video_at(
    db: &DatabaseConnection,
    id: &str,
    title: &str,
    views: i64,
    created_at: DateTime<Utc>,
    tag_ids: &[&str],
) -> video::Model {
    let model = video::ActiveModel {
        id: Set(id.to_string()),
        title: Set(title.to_string()),
        thumbnail_url: Set(format!("{THUMBNAIL_BASE}/seed/{id}/300/200")),
        duration: Set(120),
        views: Set(views),
        created_at: Set(created_at),
        updated_at: Set(None),
    }
    .insert(db)
    .await
    .unwrap();

    if !tag_ids.is_empty() {
        let links: Vec<video_tag::ActiveModel> = tag_ids
            .iter()
            .map(|tag_id| video_tag::ActiveModel {
                video_id: Set(id.to_string()),
                tag_id: Set(tag_id.to_string()),
            })
            .collect();
        video_tag::Entity::insert_many(links)
            .exec_without_returning(db)
            .await
            .unwrap();
    }
    model
}

/// The three-video catalog used by most list tests: views [500, 5000, 100]
/// created a day apart in that order.
pub async fn seed_three_videos(db: &DatabaseConnection) {
    seed_test_tags(db).await;
    insert_video_at(db, "v1", "First Video", 500, at(2025, 1, 10, 9), &["tag1"]).await;
    insert_video_at(db, "v2", "Second Video", 5000, at(2025, 1, 11, 9), &["tag2"]).await;
    insert_video_at(db, "v3", "Third Video", 100, at(2025, 1, 12, 9), &["tag1", "tag3"]).await;
}
