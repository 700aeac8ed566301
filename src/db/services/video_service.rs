use std::collections::{HashMap, HashSet};

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionError, TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::entities::{tag, video, video_tag};
use crate::db::error::ServiceError;
use crate::models::{
    thumbnail_url, CreateVideoRequest, CreatedVideo, ListVideosParams, SortKey, Tag, VideoItem,
};

// --- Query construction ---

/// Column and direction backing each sort key.
fn sort_order(sort: SortKey) -> (video::Column, Order) {
    match sort {
        SortKey::Newest => (video::Column::CreatedAt, Order::Desc),
        SortKey::Oldest => (video::Column::CreatedAt, Order::Asc),
        SortKey::MostViews => (video::Column::Views, Order::Desc),
        SortKey::LeastViews => (video::Column::Views, Order::Asc),
    }
}

/// Applies the sort key, then the id as tie-break so equal timestamps or view
/// counts keep a stable order between refetches.
fn apply_sort<Q: QueryOrder>(query: Q, sort: SortKey) -> Q {
    let (column, order) = sort_order(sort);
    query
        .order_by(column, order)
        .order_by(video::Column::Id, Order::Asc)
}

/// `date_to` is pushed to the start of the following day so the whole end day
/// is included.
fn apply_date_range<Q: QueryFilter>(mut query: Q, params: &ListVideosParams) -> Q {
    if let Some(from) = params.date_from {
        query = query.filter(video::Column::CreatedAt.gte(from));
    }
    if let Some(to) = params.date_to {
        query = query.filter(video::Column::CreatedAt.lt(to + Duration::days(1)));
    }
    query
}

fn dedup_preserving_order(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

fn validate_list_params(params: &ListVideosParams, max_limit: u64) -> Result<u64, ServiceError> {
    let limit = params.effective_limit();
    if limit == 0 {
        return Err(ServiceError::Validation("limit must be a positive integer".to_string()));
    }
    if limit > max_limit {
        return Err(ServiceError::Validation(format!(
            "limit must not exceed {max_limit}"
        )));
    }
    if let (Some(from), Some(to)) = (params.date_from, params.date_to) {
        if from > to {
            return Err(ServiceError::Validation(
                "dateFrom must not be after dateTo".to_string(),
            ));
        }
    }
    Ok(limit)
}

/// Loads the tags of every listed video in one query.
///
/// Links whose tag row no longer exists are dropped rather than surfaced.
async fn load_tags_for<C: ConnectionTrait>(
    db: &C,
    video_ids: &[String],
) -> Result<HashMap<String, Vec<Tag>>, sea_orm::DbErr> {
    let mut by_video: HashMap<String, Vec<Tag>> = HashMap::new();
    if video_ids.is_empty() {
        return Ok(by_video);
    }

    let links = video_tag::Entity::find()
        .filter(video_tag::Column::VideoId.is_in(video_ids.iter().cloned()))
        .find_also_related(tag::Entity)
        .all(db)
        .await?;

    for (link, tag_model) in links {
        match tag_model {
            Some(tag_model) => by_video
                .entry(link.video_id)
                .or_default()
                .push(Tag::from(tag_model)),
            None => debug!(
                video_id = %link.video_id,
                tag_id = %link.tag_id,
                "Skipping link to missing tag."
            ),
        }
    }
    for tags in by_video.values_mut() {
        tags.sort_by(|a, b| a.name.cmp(&b.name));
    }
    Ok(by_video)
}

/// Attaches tags to already-ordered video rows.
async fn hydrate<C: ConnectionTrait>(
    db: &C,
    videos: Vec<video::Model>,
) -> Result<Vec<VideoItem>, sea_orm::DbErr> {
    let ids: Vec<String> = videos.iter().map(|v| v.id.clone()).collect();
    let mut tags_by_video = load_tags_for(db, &ids).await?;
    Ok(videos
        .into_iter()
        .map(|v| {
            let tags = tags_by_video.remove(&v.id).unwrap_or_default();
            VideoItem::from_model(v, tags)
        })
        .collect())
}

// --- Video Service Functions ---

/// Lists videos for the gallery.
///
/// With a tag filter this runs in two passes. The first joins `video_tags`,
/// groups by video and applies sort and limit, yielding only ids. The second
/// fetches those videos with their complete tag lists and restores the order
/// from the first pass. Selecting full rows straight from the join would
/// repeat a video once per matching tag and would only carry the matching tags.
pub async fn list_videos(
    db: &DatabaseConnection,
    params: &ListVideosParams,
    max_limit: u64,
) -> Result<Vec<VideoItem>, ServiceError> {
    let limit = validate_list_params(params, max_limit)?;
    let tag_ids = dedup_preserving_order(&params.tag_ids);

    if tag_ids.is_empty() {
        let query = apply_date_range(video::Entity::find(), params);
        let videos = apply_sort(query, params.sort).limit(limit).all(db).await?;
        debug!(
            count = videos.len(),
            sort = params.sort.as_str(),
            "Listed videos without tag filter."
        );
        return Ok(hydrate(db, videos).await?);
    }

    // Pass 1: distinct matching ids in final order.
    let (sort_column, _) = sort_order(params.sort);
    let id_query = video::Entity::find()
        .select_only()
        .column(video::Column::Id)
        .join(JoinType::InnerJoin, video::Relation::VideoTag.def())
        .filter(video_tag::Column::TagId.is_in(tag_ids.iter().cloned()))
        .group_by(video::Column::Id)
        .group_by(sort_column);
    let id_query = apply_date_range(id_query, params);
    let ordered_ids: Vec<String> = apply_sort(id_query, params.sort)
        .limit(limit)
        .into_tuple()
        .all(db)
        .await?;

    if ordered_ids.is_empty() {
        return Ok(Vec::new());
    }

    // Pass 2: full rows for exactly those ids.
    let mut rows: HashMap<String, video::Model> = video::Entity::find()
        .filter(video::Column::Id.is_in(ordered_ids.iter().cloned()))
        .all(db)
        .await?
        .into_iter()
        .map(|v| (v.id.clone(), v))
        .collect();
    let videos: Vec<video::Model> = ordered_ids
        .iter()
        .filter_map(|id| rows.remove(id))
        .collect();

    debug!(
        count = videos.len(),
        tag_filter_size = tag_ids.len(),
        sort = params.sort.as_str(),
        "Listed videos with tag filter."
    );
    Ok(hydrate(db, videos).await?)
}

/// Retrieves a single video with its tags. Absence is `Ok(None)`.
pub async fn get_video(
    db: &DatabaseConnection,
    video_id: &str,
) -> Result<Option<VideoItem>, ServiceError> {
    let Some(model) = video::Entity::find_by_id(video_id.to_owned()).one(db).await? else {
        return Ok(None);
    };
    let mut items = hydrate(db, vec![model]).await?;
    Ok(items.pop())
}

/// Total number of videos in the catalog.
pub async fn get_video_count(db: &DatabaseConnection) -> Result<u64, ServiceError> {
    Ok(video::Entity::find().count(db).await?)
}

fn validate_create_request(request: &CreateVideoRequest) -> Result<(), ServiceError> {
    if request.title.is_empty() {
        return Err(ServiceError::Validation("Title is required".to_string()));
    }
    if request.duration < 1 {
        return Err(ServiceError::Validation(
            "duration must be at least 1 second".to_string(),
        ));
    }
    if request.duration > i32::MAX as i64 {
        return Err(ServiceError::Validation("duration is too large".to_string()));
    }
    if request.views < 0 {
        return Err(ServiceError::Validation("views must not be negative".to_string()));
    }
    Ok(())
}

/// Creates a video and links the supplied tags.
///
/// The count read that seeds the thumbnail, the video insert and the link
/// inserts share one transaction, so a failure leaves nothing behind. Every
/// tag id must name an existing tag.
pub async fn create_video(
    db: &DatabaseConnection,
    request: &CreateVideoRequest,
    thumbnail_base_url: &str,
) -> Result<CreatedVideo, ServiceError> {
    validate_create_request(request)?;

    let video_id = Uuid::new_v4().to_string();
    let title = request.title.clone();
    let duration = request.duration as i32;
    let views = request.views;
    let tag_ids = dedup_preserving_order(request.tag_ids.as_deref().unwrap_or_default());
    let thumbnail_base_url = thumbnail_base_url.to_owned();

    let txn_video_id = video_id.clone();
    let result = db
        .transaction::<_, usize, ServiceError>(|txn| {
            Box::pin(async move {
                if !tag_ids.is_empty() {
                    let existing: HashSet<String> = tag::Entity::find()
                        .select_only()
                        .column(tag::Column::Id)
                        .filter(tag::Column::Id.is_in(tag_ids.iter().cloned()))
                        .into_tuple::<String>()
                        .all(txn)
                        .await?
                        .into_iter()
                        .collect();
                    let missing: Vec<&str> = tag_ids
                        .iter()
                        .filter(|id| !existing.contains(*id))
                        .map(String::as_str)
                        .collect();
                    if !missing.is_empty() {
                        return Err(ServiceError::Validation(format!(
                            "Unknown tag ids: {}",
                            missing.join(", ")
                        )));
                    }
                }

                let current_count = video::Entity::find().count(txn).await?;

                video::ActiveModel {
                    id: Set(txn_video_id.clone()),
                    title: Set(title),
                    thumbnail_url: Set(thumbnail_url(&thumbnail_base_url, current_count + 1)),
                    duration: Set(duration),
                    views: Set(views),
                    created_at: Set(Utc::now()),
                    updated_at: Set(None),
                }
                .insert(txn)
                .await
                .map_err(|e| {
                    ServiceError::from_insert_err(e, "A video with this id already exists.")
                })?;

                if !tag_ids.is_empty() {
                    let links: Vec<video_tag::ActiveModel> = tag_ids
                        .iter()
                        .map(|tag_id| video_tag::ActiveModel {
                            video_id: Set(txn_video_id.clone()),
                            tag_id: Set(tag_id.clone()),
                        })
                        .collect();
                    video_tag::Entity::insert_many(links)
                        .exec_without_returning(txn)
                        .await?;
                }

                Ok(tag_ids.len())
            })
        })
        .await;

    match result {
        Ok(tag_count) => {
            info!(video_id = %video_id, tag_count, "Video created.");
            Ok(CreatedVideo { id: video_id })
        }
        Err(TransactionError::Connection(e)) => Err(ServiceError::Database(e)),
        Err(TransactionError::Transaction(e)) => Err(e),
    }
}
