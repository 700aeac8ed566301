use std::hash::Hash;
use std::time::{Duration, Instant};

use moka::sync::Cache;

/// Age after which a cached page is refetched on next use.
pub const STALE_AFTER: Duration = Duration::from_secs(5 * 60);

/// Age after which an entry is evicted altogether.
pub const GC_AFTER: Duration = Duration::from_secs(10 * 60);

/// Query results keyed by the full query tuple.
///
/// Eviction after `gc_after` is left to moka's time-to-live. Staleness is
/// judged against the fetch time stored with each value, with `now` supplied
/// by the caller.
pub struct QueryCache<K, V> {
    entries: Cache<K, (Instant, V)>,
    stale_after: Duration,
}

impl<K, V> Default for QueryCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(STALE_AFTER, GC_AFTER)
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(stale_after: Duration, gc_after: Duration) -> Self {
        let entries = Cache::builder().time_to_live(gc_after).build();
        QueryCache {
            entries,
            stale_after,
        }
    }

    /// The cached value if it is still inside the staleness window.
    pub fn get_fresh(&self, key: &K, now: Instant) -> Option<V> {
        self.entries
            .get(key)
            .filter(|(fetched_at, _)| now.saturating_duration_since(*fetched_at) < self.stale_after)
            .map(|(_, value)| value)
    }

    /// The cached value regardless of age, for showing something while a
    /// refetch is in flight.
    pub fn get_any(&self, key: &K) -> Option<V> {
        self.entries.get(key).map(|(_, value)| value)
    }

    pub fn insert(&self, key: K, value: V, now: Instant) {
        self.entries.insert(key, (now, value));
    }

    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_within_window() {
        let start = Instant::now();
        let cache: QueryCache<&str, u32> = QueryCache::default();
        cache.insert("k", 1, start);

        assert_eq!(cache.get_fresh(&"k", start + Duration::from_secs(60)), Some(1));
        assert_eq!(cache.get_fresh(&"k", start + STALE_AFTER), None);
        assert_eq!(cache.get_any(&"k"), Some(1));
    }

    #[test]
    fn test_insert_refreshes_timestamp() {
        let start = Instant::now();
        let cache: QueryCache<&str, u32> = QueryCache::default();
        cache.insert("k", 1, start);
        cache.insert("k", 2, start + STALE_AFTER);

        assert_eq!(cache.get_fresh(&"k", start + STALE_AFTER + Duration::from_secs(1)), Some(2));
    }

    #[test]
    fn test_entries_expire_after_gc_window() {
        let cache: QueryCache<&str, u32> =
            QueryCache::new(Duration::from_millis(10), Duration::from_millis(50));
        cache.insert("old", 1, Instant::now());
        assert_eq!(cache.get_any(&"old"), Some(1));

        std::thread::sleep(Duration::from_millis(150));
        assert!(cache.get_any(&"old").is_none());
    }

    #[test]
    fn test_invalidate_all() {
        let cache: QueryCache<u8, u8> = QueryCache::default();
        cache.insert(1, 1, Instant::now());
        cache.invalidate_all();
        assert!(cache.get_any(&1).is_none());
    }
}
