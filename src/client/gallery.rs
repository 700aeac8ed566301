use std::time::Instant;

use tracing::{debug, info};

use crate::client::api::{ClientError, VideoApi};
use crate::client::cache::QueryCache;
use crate::client::form::NewVideoForm;
use crate::client::state::{GalleryState, QueryKey, ScrollMetrics, VideoFilters};
use crate::models::{thumbnail_url, CreatedVideo, SortKey, VideoItem};

/// A list request that has been issued but not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub generation: u64,
    pub key: QueryKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The response belonged to the latest request and is now on screen.
    Applied,
    /// A newer request was issued meanwhile; the response was dropped.
    Superseded,
}

/// What `refresh` did to bring the visible list up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    CacheHit,
    Fetched,
    Superseded,
}

/// Drives the gallery: owns the list state, the result cache and the rows
/// currently shown.
///
/// Every list request gets a generation number. Only a response carrying the
/// latest generation may replace the visible rows, so a slow response to an
/// older sort or filter can never overwrite a newer one.
pub struct GalleryController<A: VideoApi> {
    api: A,
    state: GalleryState,
    cache: QueryCache<QueryKey, Vec<VideoItem>>,
    latest_generation: u64,
    visible: Vec<VideoItem>,
    visible_key: Option<QueryKey>,
}

impl<A: VideoApi> GalleryController<A> {
    pub fn new(api: A) -> Self {
        Self::with_cache(api, QueryCache::default())
    }

    pub fn with_cache(api: A, cache: QueryCache<QueryKey, Vec<VideoItem>>) -> Self {
        GalleryController {
            api,
            state: GalleryState::new(),
            cache,
            latest_generation: 0,
            visible: Vec::new(),
            visible_key: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &GalleryState {
        &self.state
    }

    pub fn visible(&self) -> &[VideoItem] {
        &self.visible
    }

    /// Rows cached for the current query, fresh or not, to render while a
    /// refetch is in flight.
    pub fn cached_rows(&self) -> Option<Vec<VideoItem>> {
        self.cache.get_any(&self.state.query_key())
    }

    /// True while the rows on screen do not belong to the current query.
    pub fn is_loading(&self) -> bool {
        self.visible_key.as_ref() != Some(&self.state.query_key())
    }

    pub fn set_sort(&mut self, sort: SortKey) -> bool {
        self.state.set_sort(sort)
    }

    pub fn set_filters(&mut self, filters: VideoFilters) -> bool {
        self.state.set_filters(filters)
    }

    pub fn clear_filters(&mut self) -> bool {
        self.state.clear_filters()
    }

    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> bool {
        self.state.on_scroll(metrics)
    }

    pub fn load_more(&mut self) -> bool {
        self.state.load_more()
    }

    /// Issues a request for the current query key.
    pub fn begin_request(&mut self) -> PendingRequest {
        self.latest_generation += 1;
        PendingRequest {
            generation: self.latest_generation,
            key: self.state.query_key(),
        }
    }

    /// Runs the request against the API. Does not touch controller state.
    pub async fn execute(&self, request: &PendingRequest) -> Result<Vec<VideoItem>, ClientError> {
        self.api.list_videos(&request.key.to_params()).await
    }

    /// Applies a response, unless a newer request has been issued since.
    pub fn complete(
        &mut self,
        request: PendingRequest,
        result: Result<Vec<VideoItem>, ClientError>,
        now: Instant,
    ) -> Result<Completion, ClientError> {
        if request.generation != self.latest_generation {
            debug!(
                generation = request.generation,
                latest = self.latest_generation,
                "Discarding superseded list response."
            );
            return Ok(Completion::Superseded);
        }
        let videos = result?;
        self.show(request.key.clone(), videos.clone());
        self.cache.insert(request.key, videos, now);
        Ok(Completion::Applied)
    }

    fn show(&mut self, key: QueryKey, videos: Vec<VideoItem>) {
        if key == self.state.query_key() {
            self.state.record_result_len(videos.len());
        }
        self.visible = videos;
        self.visible_key = Some(key);
    }

    /// Brings the visible rows up to date with the current state, using the
    /// cache when the entry is still fresh.
    pub async fn refresh(&mut self) -> Result<RefreshOutcome, ClientError> {
        let now = Instant::now();
        let key = self.state.query_key();
        if let Some(cached) = self.cache.get_fresh(&key, now) {
            // A cache hit still counts as the latest answer.
            self.latest_generation += 1;
            self.show(key, cached);
            return Ok(RefreshOutcome::CacheHit);
        }

        let request = self.begin_request();
        let result = self.execute(&request).await;
        match self.complete(request, result, Instant::now())? {
            Completion::Applied => Ok(RefreshOutcome::Fetched),
            Completion::Superseded => Ok(RefreshOutcome::Superseded),
        }
    }

    /// Validates and submits the form, then drops cached pages so the new
    /// video shows up on the next refresh.
    pub async fn create_video(&mut self, form: &NewVideoForm) -> Result<CreatedVideo, ClientError> {
        let request = form
            .validate()
            .map_err(|e| ClientError::Validation(e.to_string()))?;
        let created = self.api.create_video(&request).await?;
        self.cache.invalidate_all();
        info!(video_id = %created.id, "Video submitted.");
        Ok(created)
    }

    /// Thumbnail the next created video will get, for previewing in the form.
    pub async fn next_thumbnail_preview(&self, base_url: &str) -> Result<String, ClientError> {
        let count = self.api.get_video_count().await?;
        Ok(thumbnail_url(base_url, count + 1))
    }
}
