//! In-memory response cache with a fixed time-to-live
//!
//! Used by the API client to avoid repeated round-trips for idempotent reads:
//! - Entries expire `max_age` after insertion (lazily on read, and eagerly
//!   through a per-entry tokio timer when a runtime is available)
//! - The cache holds at most `max_entries`; inserting into a full cache evicts
//!   the single oldest-inserted entry (insertion order, not access order)
//! - `clear()` drops every entry and cancels every pending expiry timer
//!
//! # Example
//!
//! ```rust
//! use vitaltrack_core::cache::{CacheConfig, ResponseCache};
//!
//! let cache = ResponseCache::new(CacheConfig::default());
//! cache.set("https://api.example.com/meals?date=2024-01-01", 42u32);
//! assert_eq!(cache.get("https://api.example.com/meals?date=2024-01-01"), Some(42));
//! ```

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// Default time-to-live for cached responses
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(5 * 60);

/// Default maximum number of cached responses
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Cache configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long an entry stays valid after insertion
    pub max_age: Duration,
    /// Maximum number of entries (0 disables caching)
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age: DEFAULT_MAX_AGE,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Entries currently held (fresh or not yet swept)
    pub entries: usize,
    /// Reads answered from the cache
    pub hits: u64,
    /// Reads that found nothing usable
    pub misses: u64,
    /// Entries dropped to make room for newer ones
    pub evictions: u64,
    /// Entries dropped because they outlived `max_age`
    pub expirations: u64,
}

struct CacheEntry<V> {
    payload: V,
    stored_at: Instant,
    generation: u64,
    expiry: Option<JoinHandle<()>>,
}

struct CacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    // generation -> key, oldest insertion first
    order: BTreeMap<u64, String>,
    next_generation: u64,
    stats: CacheStats,
}

impl<V> CacheState<V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: BTreeMap::new(),
            next_generation: 0,
            stats: CacheStats::default(),
        }
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.order.remove(&entry.generation);
        if let Some(handle) = &entry.expiry {
            handle.abort();
        }
        Some(entry)
    }

    fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        if let Some(entry) = self.entries.remove(&key) {
            if let Some(handle) = entry.expiry {
                handle.abort();
            }
        }
        self.stats.evictions += 1;
        Some(key)
    }

    /// Called from an entry's own timer; must not abort itself.
    fn expire(&mut self, key: &str, generation: u64) {
        let current = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.generation == generation);

        if current {
            self.entries.remove(key);
            self.order.remove(&generation);
            self.stats.expirations += 1;
        }
    }

    fn clear(&mut self) {
        for entry in self.entries.values() {
            if let Some(handle) = &entry.expiry {
                handle.abort();
            }
        }
        self.entries.clear();
        self.order.clear();
    }
}

fn lock<V>(state: &Mutex<CacheState<V>>) -> MutexGuard<'_, CacheState<V>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Time-boxed, size-bounded response cache
///
/// Cloning yields another handle onto the same entries.
pub struct ResponseCache<V> {
    config: CacheConfig,
    state: Arc<Mutex<CacheState<V>>>,
}

impl<V> Clone for ResponseCache<V> {
    fn clone(&self) -> Self {
        Self {
            config: self.config,
            state: Arc::clone(&self.state),
        }
    }
}

impl<V> std::fmt::Debug for ResponseCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("config", &self.config)
            .field("entries", &lock(&self.state).entries.len())
            .finish()
    }
}

impl<V: Clone + Send + 'static> ResponseCache<V> {
    /// Create a new, empty cache
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(CacheState::new())),
        }
    }

    /// Get the cache configuration
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get a fresh cached payload, dropping the entry if it has gone stale
    pub fn get(&self, key: &str) -> Option<V> {
        let mut state = lock(&self.state);
        let now = Instant::now();

        let fresh = state
            .entries
            .get(key)
            .map(|entry| now.saturating_duration_since(entry.stored_at) <= self.config.max_age);

        match fresh {
            Some(true) => {
                state.stats.hits += 1;
                state.entries.get(key).map(|entry| entry.payload.clone())
            }
            Some(false) => {
                state.remove_entry(key);
                state.stats.expirations += 1;
                state.stats.misses += 1;
                debug!(key = %key, "Dropped stale cache entry");
                None
            }
            None => {
                state.stats.misses += 1;
                None
            }
        }
    }

    /// Insert or overwrite an entry
    ///
    /// An overwritten key becomes the newest entry. Inserting a new key into
    /// a full cache first evicts the oldest-inserted entry.
    pub fn set(&self, key: impl Into<String>, payload: V) {
        if self.config.max_entries == 0 {
            return;
        }

        let key = key.into();
        let mut state = lock(&self.state);

        state.remove_entry(&key);
        if state.entries.len() >= self.config.max_entries {
            if let Some(evicted) = state.evict_oldest() {
                debug!(key = %evicted, "Evicted oldest cache entry");
            }
        }

        let generation = state.next_generation;
        state.next_generation += 1;

        let expiry = self.schedule_expiry(&key, generation);
        state.order.insert(generation, key.clone());
        state.entries.insert(
            key,
            CacheEntry {
                payload,
                stored_at: Instant::now(),
                generation,
                expiry,
            },
        );
    }

    /// Remove a single entry, returning whether it existed
    pub fn remove(&self, key: &str) -> bool {
        lock(&self.state).remove_entry(key).is_some()
    }

    /// Remove every entry and cancel all pending expiry timers
    pub fn clear(&self) {
        let mut state = lock(&self.state);
        let dropped = state.entries.len();
        state.clear();
        if dropped > 0 {
            debug!(entries = dropped, "Cleared response cache");
        }
    }

    /// Number of entries currently held
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.state).entries.len()
    }

    /// Whether the cache holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let state = lock(&self.state);
        CacheStats {
            entries: state.entries.len(),
            ..state.stats
        }
    }

    fn schedule_expiry(&self, key: &str, generation: u64) -> Option<JoinHandle<()>> {
        let handle = Handle::try_current().ok()?;
        let state = Arc::downgrade(&self.state);
        let key = key.to_string();
        let max_age = self.config.max_age;

        Some(handle.spawn(async move {
            tokio::time::sleep(max_age).await;
            if let Some(state) = state.upgrade() {
                lock(&state).expire(&key, generation);
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn small_cache(max_entries: usize) -> ResponseCache<String> {
        ResponseCache::new(CacheConfig {
            max_age: Duration::from_secs(60),
            max_entries,
        })
    }

    #[test]
    fn test_set_and_get() {
        let cache = small_cache(10);

        cache.set("meals", "payload".to_string());
        assert_eq!(cache.get("meals"), Some("payload".to_string()));
    }

    #[test]
    fn test_get_missing() {
        let cache = small_cache(10);
        assert!(cache.get("nonexistent").is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_is_stale_after_max_age() {
        let cache = small_cache(10);
        cache.set("meals", "v".to_string());

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get("meals"), Some("v".to_string()));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get("meals").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_timer_removes_entry() {
        let cache = small_cache(10);
        cache.set("meals", "v".to_string());

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(cache.is_empty());
        assert_eq!(cache.stats().expirations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cancels_timers() {
        let cache = small_cache(10);
        cache.set("goals", "old".to_string());
        cache.clear();
        assert!(cache.is_empty());

        tokio::time::sleep(Duration::from_secs(30)).await;
        cache.set("goals", "new".to_string());

        // The first timer would have fired at t=60s
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(cache.get("goals"), Some("new".to_string()));
    }

    #[test]
    fn test_evicts_exactly_the_oldest_entry() {
        let cache = small_cache(3);
        cache.set("a", "1".to_string());
        cache.set("b", "2".to_string());
        cache.set("c", "3".to_string());
        cache.set("d", "4".to_string());

        assert_eq!(cache.len(), 3);
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
        assert!(cache.get("d").is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_reads_do_not_affect_eviction_order() {
        let cache = small_cache(2);
        cache.set("a", "1".to_string());
        cache.set("b", "2".to_string());
        assert!(cache.get("a").is_some());

        cache.set("c", "3".to_string());
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
    }

    #[test]
    fn test_overwrite_reinserts_as_newest() {
        let cache = small_cache(3);
        cache.set("a", "1".to_string());
        cache.set("b", "2".to_string());
        cache.set("c", "3".to_string());
        cache.set("a", "1b".to_string());

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.stats().evictions, 0);

        cache.set("d", "4".to_string());
        assert!(cache.get("b").is_none());
        assert_eq!(cache.get("a"), Some("1b".to_string()));
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let cache = small_cache(0);
        cache.set("a", "1".to_string());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove() {
        let cache = small_cache(10);
        cache.set("a", "1".to_string());
        assert!(cache.remove("a"));
        assert!(!cache.remove("a"));
    }

    proptest! {
        #[test]
        fn prop_keeps_only_newest_insertions(max in 1usize..10, count in 1usize..40) {
            let cache = small_cache(max);
            for i in 0..count {
                cache.set(format!("k{i}"), i.to_string());
            }

            let kept = count.min(max);
            prop_assert_eq!(cache.len(), kept);
            for i in 0..count {
                let present = cache.get(&format!("k{i}")).is_some();
                prop_assert_eq!(present, i >= count - kept);
            }
        }
    }
}
