use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use vidto::client::api::{ClientError, VideoApi};
use vidto::client::cache::QueryCache;
use vidto::client::form::NewVideoForm;
use vidto::client::gallery::{Completion, GalleryController, RefreshOutcome};
use vidto::client::state::{ScrollMetrics, VideoFilters};
use vidto::models::{CreateVideoRequest, CreatedVideo, ListVideosParams, SortKey, Tag, VideoItem};

/// In-memory catalog that records every call made against it.
#[derive(Default)]
struct FakeApi {
    videos: Vec<VideoItem>,
    list_calls: Mutex<Vec<ListVideosParams>>,
    created: Mutex<Vec<CreateVideoRequest>>,
}

impl FakeApi {
    fn with_videos(count: usize) -> Self {
        let videos = (0..count)
            .map(|i| VideoItem {
                id: format!("v{i}"),
                title: format!("Video {i}"),
                thumbnail_url: format!("https://picsum.photos/seed/video{}/300/200", i + 1),
                duration: 60,
                views: i as i64,
                created_at: "2025-01-01T00:00:00.000Z".to_string(),
                tags: Vec::new(),
            })
            .collect();
        FakeApi {
            videos,
            ..Default::default()
        }
    }

    fn list_call_count(&self) -> usize {
        self.list_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl VideoApi for FakeApi {
    async fn list_videos(&self, params: &ListVideosParams) -> Result<Vec<VideoItem>, ClientError> {
        self.list_calls.lock().unwrap().push(params.clone());
        let limit = params.effective_limit() as usize;
        Ok(self.videos.iter().take(limit).cloned().collect())
    }

    async fn get_video(&self, id: &str) -> Result<Option<VideoItem>, ClientError> {
        Ok(self.videos.iter().find(|v| v.id == id).cloned())
    }

    async fn get_video_count(&self) -> Result<u64, ClientError> {
        Ok(self.videos.len() as u64 + self.created.lock().unwrap().len() as u64)
    }

    async fn create_video(
        &self,
        request: &CreateVideoRequest,
    ) -> Result<CreatedVideo, ClientError> {
        let mut created = self.created.lock().unwrap();
        created.push(request.clone());
        Ok(CreatedVideo {
            id: format!("new-{}", created.len()),
        })
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, ClientError> {
        Ok(Vec::new())
    }
}

fn valid_form() -> NewVideoForm {
    NewVideoForm {
        title: "Borrow Checker Deep Dive".to_string(),
        duration_input: "1:02:03".to_string(),
        views: 0,
        tag_ids: vec!["tag1".to_string()],
    }
}

#[tokio::test]
async fn test_first_refresh_fetches_first_page() {
    let mut gallery = GalleryController::new(FakeApi::with_videos(25));
    assert!(gallery.is_loading());

    let outcome = gallery.refresh().await.unwrap();
    assert_eq!(outcome, RefreshOutcome::Fetched);
    assert_eq!(gallery.visible().len(), 10);
    assert!(!gallery.is_loading());

    let calls = gallery.api().list_calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].limit, Some(10));
    assert_eq!(calls[0].sort, SortKey::Newest);
}

#[tokio::test]
async fn test_repeat_refresh_hits_cache() {
    let mut gallery = GalleryController::new(FakeApi::with_videos(25));
    gallery.refresh().await.unwrap();

    let outcome = gallery.refresh().await.unwrap();
    assert_eq!(outcome, RefreshOutcome::CacheHit);
    assert_eq!(gallery.api().list_call_count(), 1);
}

#[tokio::test]
async fn test_returning_to_earlier_sort_shows_cached_rows() {
    let mut gallery = GalleryController::new(FakeApi::with_videos(25));
    gallery.refresh().await.unwrap();

    gallery.set_sort(SortKey::Oldest);
    assert!(gallery.cached_rows().is_none());
    gallery.refresh().await.unwrap();

    gallery.set_sort(SortKey::Newest);
    assert_eq!(gallery.cached_rows().map(|rows| rows.len()), Some(10));
    assert_eq!(gallery.refresh().await.unwrap(), RefreshOutcome::CacheHit);
    assert_eq!(gallery.api().list_call_count(), 2);
}

#[tokio::test]
async fn test_expired_cache_entry_is_refetched() {
    let cache = QueryCache::new(Duration::from_millis(10), Duration::from_millis(40));
    let mut gallery = GalleryController::with_cache(FakeApi::with_videos(25), cache);
    gallery.refresh().await.unwrap();
    assert!(gallery.cached_rows().is_some());

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(gallery.cached_rows().is_none());
    assert_eq!(gallery.refresh().await.unwrap(), RefreshOutcome::Fetched);
    assert_eq!(gallery.api().list_call_count(), 2);
}

#[tokio::test]
async fn test_scroll_grows_limit_and_refetches() {
    let mut gallery = GalleryController::new(FakeApi::with_videos(25));
    gallery.refresh().await.unwrap();

    let near_bottom = ScrollMetrics {
        viewport_height: 900.0,
        scroll_top: 1050.0,
        content_height: 2000.0,
    };
    assert!(gallery.on_scroll(near_bottom));
    assert!(gallery.is_loading());

    gallery.refresh().await.unwrap();
    assert_eq!(gallery.visible().len(), 20);
    assert_eq!(gallery.api().list_calls.lock().unwrap()[1].limit, Some(20));
}

#[tokio::test]
async fn test_short_page_stops_load_more() {
    let mut gallery = GalleryController::new(FakeApi::with_videos(4));
    gallery.refresh().await.unwrap();

    assert!(gallery.state().is_exhausted());
    assert!(!gallery.load_more());
    assert_eq!(gallery.state().limit(), 10);
}

#[tokio::test]
async fn test_filter_change_resets_limit_and_refetches() {
    let mut gallery = GalleryController::new(FakeApi::with_videos(25));
    gallery.refresh().await.unwrap();
    gallery.load_more();
    gallery.refresh().await.unwrap();
    assert_eq!(gallery.state().limit(), 20);

    let filters =
        VideoFilters::default().with_tag_ids(vec!["tag2".to_string(), "tag1".to_string()]);
    assert!(gallery.set_filters(filters));
    assert_eq!(gallery.state().limit(), 10);

    let outcome = gallery.refresh().await.unwrap();
    assert_eq!(outcome, RefreshOutcome::Fetched);
    let calls = gallery.api().list_calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[2].limit, Some(10));
    assert_eq!(calls[2].tag_ids, vec!["tag1".to_string(), "tag2".to_string()]);
}

#[tokio::test]
async fn test_superseded_response_is_discarded() {
    let mut gallery = GalleryController::new(FakeApi::with_videos(25));

    let stale = gallery.begin_request();
    let stale_rows = gallery.execute(&stale).await;

    gallery.set_sort(SortKey::MostViews);
    let current = gallery.begin_request();
    let current_rows = gallery.execute(&current).await;

    // The newer request finishes first, then the older one straggles in.
    let applied = gallery.complete(current, current_rows, Instant::now()).unwrap();
    assert_eq!(applied, Completion::Applied);
    let shown: Vec<String> = gallery.visible().iter().map(|v| v.id.clone()).collect();

    let dropped = gallery.complete(stale, stale_rows, Instant::now()).unwrap();
    assert_eq!(dropped, Completion::Superseded);
    let still_shown: Vec<String> = gallery.visible().iter().map(|v| v.id.clone()).collect();
    assert_eq!(shown, still_shown);
    assert_eq!(gallery.state().sort(), SortKey::MostViews);
    assert!(!gallery.is_loading());
}

#[tokio::test]
async fn test_create_video_invalidates_cache() {
    let mut gallery = GalleryController::new(FakeApi::with_videos(3));
    gallery.refresh().await.unwrap();

    let created = gallery.create_video(&valid_form()).await.unwrap();
    assert_eq!(created.id, "new-1");
    {
        let sent = gallery.api().created.lock().unwrap();
        assert_eq!(sent[0].duration, 3723);
        assert_eq!(sent[0].tag_ids, Some(vec!["tag1".to_string()]));
    }

    let outcome = gallery.refresh().await.unwrap();
    assert_eq!(outcome, RefreshOutcome::Fetched);
    assert_eq!(gallery.api().list_call_count(), 2);
}

#[tokio::test]
async fn test_invalid_form_never_reaches_api() {
    let mut gallery = GalleryController::new(FakeApi::default());
    let form = NewVideoForm {
        duration_input: "61:99".to_string(),
        ..valid_form()
    };

    let result = gallery.create_video(&form).await;
    assert!(matches!(result, Err(ClientError::Validation(_))));
    assert!(gallery.api().created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_thumbnail_preview_uses_next_sequence() {
    let gallery = GalleryController::new(FakeApi::with_videos(7));
    let preview = gallery.next_thumbnail_preview("https://picsum.photos").await.unwrap();
    assert_eq!(preview, "https://picsum.photos/seed/video8/300/200");
}
