//! In-process TTL cache for metrics API responses, backed by DashMap.
//! Repeated dashboard loads within the TTL reuse the previous fetch.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Concurrent cache of fetch results keyed by request identity.
pub struct FetchCache<V> {
    store: Arc<DashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    max_entries: usize,
}

impl<V: Clone> FetchCache<V> {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            ttl,
            max_entries,
        }
    }

    /// Caching is off when the TTL is zero.
    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Cached value, or None if missing or expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let entry = self.store.get(key)?;
        if entry.inserted_at.elapsed() > self.ttl {
            drop(entry);
            self.store.remove(key);
            metrics::counter!("fetch_cache.expired").increment(1);
            return None;
        }
        metrics::counter!("fetch_cache.hits").increment(1);
        Some(entry.value.clone())
    }

    pub fn put(&self, key: String, value: V) {
        if !self.is_enabled() {
            return;
        }
        // Full: skip the insert and let the periodic purge make room.
        if self.store.len() >= self.max_entries && !self.store.contains_key(&key) {
            return;
        }
        self.store.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Remove expired entries. Called periodically by the server.
    pub fn purge_expired(&self) -> usize {
        let mut removed = 0;
        self.store.retain(|_, entry| {
            let fresh = entry.inserted_at.elapsed() <= self.ttl;
            if !fresh {
                removed += 1;
            }
            fresh
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let cache = FetchCache::new(Duration::from_secs(60), 10);
        cache.put("a".to_string(), vec![1, 2, 3]);
        assert_eq!(cache.get("a"), Some(vec![1, 2, 3]));
        assert_eq!(cache.get("b"), None);
    }

    #[test]
    fn test_zero_ttl_disables() {
        let cache = FetchCache::new(Duration::ZERO, 10);
        cache.put("a".to_string(), 1u64);
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_expired_entries_evicted() {
        let cache = FetchCache::new(Duration::from_millis(5), 10);
        cache.put("a".to_string(), 1u64);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get("a"), None);
        assert!(cache.is_empty());

        cache.put("b".to_string(), 2u64);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.purge_expired(), 1);
    }

    #[test]
    fn test_capacity_limit() {
        let cache = FetchCache::new(Duration::from_secs(60), 1);
        cache.put("a".to_string(), 1u64);
        cache.put("b".to_string(), 2u64);
        assert_eq!(cache.len(), 1);
        cache.put("a".to_string(), 3u64);
        assert_eq!(cache.get("a"), Some(3));
    }

    #[test]
    fn test_purge_counts_only_removed_entries() {
        let cache = FetchCache::new(Duration::from_millis(200), 100);
        for i in 0..3 {
            cache.put(format!("stale-{i}"), i);
        }
        std::thread::sleep(Duration::from_millis(300));
        for i in 0..5 {
            cache.put(format!("fresh-{i}"), i);
        }
        assert_eq!(cache.purge_expired(), 3);
        assert_eq!(cache.len(), 5);
        assert_eq!(cache.purge_expired(), 0);
    }
}
