//! Wire types shared by the HTTP API and the gallery client.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::db::entities::{tag, video};

/// Number of videos returned when a list request does not name a limit.
pub const DEFAULT_LIST_LIMIT: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl From<tag::Model> for Tag {
    fn from(model: tag::Model) -> Self {
        Tag {
            id: model.id,
            name: model.name,
            color: model.color,
        }
    }
}

/// A video with its tags embedded, as handed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub duration: i32,
    pub views: i64,
    /// ISO-8601 with millisecond precision, e.g. `2025-06-01T12:00:00.000Z`.
    pub created_at: String,
    pub tags: Vec<Tag>,
}

impl VideoItem {
    pub fn from_model(model: video::Model, tags: Vec<Tag>) -> Self {
        VideoItem {
            id: model.id,
            title: model.title,
            thumbnail_url: model.thumbnail_url,
            duration: model.duration,
            views: model.views,
            created_at: format_timestamp(&model.created_at),
            tags,
        }
    }
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Order in which a video listing is returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    MostViews,
    LeastViews,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::MostViews => "mostViews",
            SortKey::LeastViews => "leastViews",
        }
    }
}

/// Parameters of a `listVideos` call.
///
/// `tag_ids` uses OR semantics: a video qualifies when it carries any of them.
/// `date_to` covers the whole day it falls on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListVideosParams {
    pub limit: Option<u64>,
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

impl ListVideosParams {
    pub fn effective_limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_LIST_LIMIT)
    }

    /// Flattens the parameters into query-string pairs, repeating `tagIds`
    /// once per id.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("sort", self.sort.as_str().to_string())];
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        for tag_id in &self.tag_ids {
            pairs.push(("tagIds", tag_id.clone()));
        }
        if let Some(from) = &self.date_from {
            pairs.push(("dateFrom", format_timestamp(from)));
        }
        if let Some(to) = &self.date_to {
            pairs.push(("dateTo", format_timestamp(to)));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideoRequest {
    pub title: String,
    pub duration: i64,
    pub views: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedVideo {
    pub id: String,
}

/// Seed URL on the external image host for the `sequence`-th video.
pub fn thumbnail_url(base_url: &str, sequence: u64) -> String {
    format!(
        "{}/seed/video{}/300/200",
        base_url.trim_end_matches('/'),
        sequence
    )
}
