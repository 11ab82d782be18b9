//! In-memory cache backend.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::error::CacheError;

use super::CacheBackend;

/// A stored cache entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub stored_at: DateTime<Utc>,
    pub hits: u64,
}

/// Mutex-guarded map of digests, optionally bounded.
///
/// A bounded cache rejects writes of new keys once full; it never evicts.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    capacity: Option<usize>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: Some(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn entry(&self, key: &str) -> Option<CacheEntry> {
        self.entries.lock().get(key).cloned()
    }

    /// Seconds since `key` was first stored.
    pub fn entry_age_secs(&self, key: &str) -> Option<i64> {
        self.entries
            .lock()
            .get(key)
            .map(|e| (Utc::now() - e.stored_at).num_seconds())
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
        log::info!("ORDER_CACHE_CLEARED");
    }
}

impl CacheBackend for InMemoryCache {
    fn contains(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.lock().contains_key(key))
    }

    fn store(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.lock();

        if let Some(entry) = entries.get_mut(key) {
            entry.hits += 1;
            return Ok(());
        }

        if let Some(capacity) = self.capacity {
            if entries.len() >= capacity {
                return Err(CacheError::WriteRejected {
                    key: key.to_string(),
                    reason: format!("capacity {} reached", capacity),
                });
            }
        }

        entries.insert(
            key.to_string(),
            CacheEntry {
                stored_at: Utc::now(),
                hits: 0,
            },
        );
        log::debug!("ORDER_CACHE_STORED key={} size={}", key, entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_contains() {
        let cache = InMemoryCache::new();
        assert!(!cache.contains("abc").unwrap());

        cache.store("abc").unwrap();
        assert!(cache.contains("abc").unwrap());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.entry("abc").unwrap().hits, 0);
    }

    #[test]
    fn test_restore_counts_hit() {
        let cache = InMemoryCache::new();
        cache.store("abc").unwrap();
        cache.store("abc").unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.entry("abc").unwrap().hits, 1);
        assert!(cache.entry_age_secs("abc").unwrap() >= 0);
    }

    #[test]
    fn test_capacity_limit_rejects_new_keys() {
        let cache = InMemoryCache::with_capacity_limit(1);
        cache.store("a").unwrap();

        let err = cache.store("b").unwrap_err();
        assert!(matches!(err, CacheError::WriteRejected { ref key, .. } if key == "b"));

        // Existing keys are still accepted when full.
        assert!(cache.store("a").is_ok());
    }

    #[test]
    fn test_clear() {
        let cache = InMemoryCache::new();
        cache.store("a").unwrap();
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.entry_age_secs("a").is_none());
    }
}
