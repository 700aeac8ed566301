//! Gallery list state: sort, filters and the growing page size.

use chrono::{DateTime, Utc};

use crate::models::{ListVideosParams, SortKey};

/// Rows requested on first load and added by each "load more".
pub const PAGE_SIZE: u64 = 10;

/// Distance from the end of the content, in pixels, at which scrolling asks
/// for the next page.
pub const SCROLL_THRESHOLD_PX: f64 = 100.0;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoFilters {
    pub tag_ids: Vec<String>,
    pub date_range: DateRange,
}

impl VideoFilters {
    /// Selected tags count one each; a date range counts once.
    pub fn active_count(&self) -> usize {
        self.tag_ids.len() + usize::from(self.date_range.from.is_some())
    }

    pub fn has_active_filters(&self) -> bool {
        !self.tag_ids.is_empty()
            || self.date_range.from.is_some()
            || self.date_range.to.is_some()
    }

    pub fn with_tag_ids(&self, tag_ids: Vec<String>) -> Self {
        VideoFilters {
            tag_ids,
            date_range: self.date_range.clone(),
        }
    }

    pub fn with_date_range(&self, date_range: DateRange) -> Self {
        VideoFilters {
            tag_ids: self.tag_ids.clone(),
            date_range,
        }
    }

    pub fn without_tag(&self, tag_id: &str) -> Self {
        self.with_tag_ids(self.tag_ids.iter().filter(|id| *id != tag_id).cloned().collect())
    }
}

/// Everything that determines the rows of a list request.
///
/// Tag ids are kept sorted and unique: the filter is a set, so two selections
/// in a different order share one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub limit: u64,
    pub sort: SortKey,
    pub tag_ids: Vec<String>,
    pub date_range: DateRange,
}

impl QueryKey {
    pub fn new(limit: u64, sort: SortKey, filters: &VideoFilters) -> Self {
        let mut tag_ids = filters.tag_ids.clone();
        tag_ids.sort();
        tag_ids.dedup();
        QueryKey {
            limit,
            sort,
            tag_ids,
            date_range: filters.date_range.clone(),
        }
    }

    pub fn to_params(&self) -> ListVideosParams {
        ListVideosParams {
            limit: Some(self.limit),
            sort: self.sort,
            tag_ids: self.tag_ids.clone(),
            date_from: self.date_range.from,
            date_to: self.date_range.to,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub viewport_height: f64,
    pub scroll_top: f64,
    pub content_height: f64,
}

impl ScrollMetrics {
    pub fn near_bottom(&self) -> bool {
        self.viewport_height + self.scroll_top >= self.content_height - SCROLL_THRESHOLD_PX
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryState {
    limit: u64,
    sort: SortKey,
    filters: VideoFilters,
    exhausted: bool,
}

impl Default for GalleryState {
    fn default() -> Self {
        Self::new()
    }
}

impl GalleryState {
    pub fn new() -> Self {
        GalleryState {
            limit: PAGE_SIZE,
            sort: SortKey::Newest,
            filters: VideoFilters::default(),
            exhausted: false,
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn filters(&self) -> &VideoFilters {
        &self.filters
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn query_key(&self) -> QueryKey {
        QueryKey::new(self.limit, self.sort, &self.filters)
    }

    fn reset_paging(&mut self) {
        self.limit = PAGE_SIZE;
        self.exhausted = false;
    }

    /// Returns whether anything changed. A new sort order starts over from the
    /// first page.
    pub fn set_sort(&mut self, sort: SortKey) -> bool {
        if self.sort == sort {
            return false;
        }
        self.sort = sort;
        self.reset_paging();
        true
    }

    /// Returns whether anything changed. New filters start over from the
    /// first page.
    pub fn set_filters(&mut self, filters: VideoFilters) -> bool {
        if self.filters == filters {
            return false;
        }
        self.filters = filters;
        self.reset_paging();
        true
    }

    pub fn clear_filters(&mut self) -> bool {
        self.set_filters(VideoFilters::default())
    }

    /// Grows the limit by one page unless the catalog is already exhausted.
    pub fn load_more(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        self.limit += PAGE_SIZE;
        true
    }

    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> bool {
        metrics.near_bottom() && self.load_more()
    }

    /// Records how many rows came back for the current key. Fewer rows than
    /// requested means there is nothing more to load.
    pub fn record_result_len(&mut self, len: usize) {
        self.exhausted = (len as u64) < self.limit;
    }
}
