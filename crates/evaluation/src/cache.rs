//! Tree-wide LRU cache of network evaluations, keyed by canonical
//! transposition key.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use lru::LruCache;

use crate::config::CoordinatorConfig;
use crate::types::Evaluation;

/// Shared evaluation cache.
///
/// One instance serves all caching-enabled lanes, so a hit populated by one
/// lane is visible to the other. Concurrent misses for the same key are not
/// deduplicated: two workers racing on an uncached position may both invoke
/// the backend and both insert. Any equivalent value wins; the later insert
/// simply overwrites.
pub struct EvalCache {
    entries: Mutex<LruCache<u64, Evaluation>>,
    hits: AtomicU32,
    misses: AtomicU32,
}

impl EvalCache {
    /// Create a cache holding up to `capacity` evaluations.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).expect("cache capacity must be > 0"),
            )),
            hits: AtomicU32::new(0),
            misses: AtomicU32::new(0),
        }
    }

    /// Create a cache sized from `config.cache_capacity`. A zero capacity
    /// is clamped to one entry, as `CoordinatorConfig::validate` warns.
    pub fn from_config(config: &CoordinatorConfig) -> Self {
        Self::new(config.cache_capacity.max(1))
    }

    /// Look up an evaluation by canonical key, counting the hit or miss.
    pub fn get(&self, key: u64) -> Option<Evaluation> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(&key) {
            Some(eval) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(eval.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert an evaluation under its canonical key.
    pub fn put(&self, key: u64, eval: Evaluation) {
        self.entries.lock().unwrap().put(key, eval);
    }

    /// Number of cached evaluations.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return (hits, misses) counters since last reset.
    pub fn counters(&self) -> (u32, u32) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }

    /// Reset hit/miss counters to zero.
    pub fn reset_counters(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::make_eval;

    #[test]
    fn test_miss_then_hit() {
        let cache = EvalCache::new(10);
        assert!(cache.get(1).is_none());
        cache.put(1, make_eval(0.5, &[(3, 1.0)]));
        let hit = cache.get(1).expect("inserted key");
        assert!((hit.value - 0.5).abs() < 1e-6);
        assert_eq!(cache.counters(), (1, 1));
    }

    #[test]
    fn test_lru_eviction() {
        let cache = EvalCache::new(2);
        cache.put(1, make_eval(0.1, &[]));
        cache.put(2, make_eval(0.2, &[]));
        cache.put(3, make_eval(0.3, &[]));
        // Oldest entry evicted
        assert!(cache.get(1).is_none());
        assert!(cache.get(2).is_some());
        assert!(cache.get(3).is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_from_config_bounds_capacity() {
        let config = CoordinatorConfig {
            cache_capacity: 2,
            ..Default::default()
        };
        let cache = EvalCache::from_config(&config);
        cache.put(1, make_eval(0.1, &[]));
        cache.put(2, make_eval(0.2, &[]));
        cache.put(3, make_eval(0.3, &[]));
        assert_eq!(cache.len(), 2);
        assert!(cache.get(1).is_none());
    }

    #[test]
    fn test_from_config_clamps_zero_capacity() {
        let config = CoordinatorConfig {
            cache_capacity: 0,
            ..Default::default()
        };
        let cache = EvalCache::from_config(&config);
        cache.put(1, make_eval(0.1, &[]));
        assert_eq!(cache.len(), 1);
        assert!(cache.get(1).is_some());
    }

    #[test]
    fn test_racing_insert_last_write_wins() {
        let cache = EvalCache::new(10);
        cache.put(7, make_eval(0.4, &[]));
        cache.put(7, make_eval(0.4, &[]));
        assert_eq!(cache.len(), 1);
        assert!((cache.get(7).unwrap().value - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_reset_counters() {
        let cache = EvalCache::new(10);
        cache.get(1);
        cache.put(1, make_eval(0.0, &[]));
        cache.get(1);
        assert_eq!(cache.counters(), (1, 1));
        cache.reset_counters();
        assert_eq!(cache.counters(), (0, 0));
    }

    #[test]
    fn test_concurrent_reads_and_inserts() {
        use std::sync::Arc;

        let cache = Arc::new(EvalCache::new(1024));
        std::thread::scope(|scope| {
            for t in 0..4u64 {
                let cache = Arc::clone(&cache);
                scope.spawn(move || {
                    for i in 0..100u64 {
                        let key = i % 32;
                        if cache.get(key).is_none() {
                            cache.put(key, make_eval((t as f32) / 4.0, &[]));
                        }
                    }
                });
            }
        });
        // All 32 distinct keys present; racing inserts collapsed
        assert_eq!(cache.len(), 32);
    }
}
