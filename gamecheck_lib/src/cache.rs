//! In-memory TTL cache backed by `DashMap` for concurrent access.

use dashmap::DashMap;
use std::time::{Duration, Instant};

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Thread-safe lookup cache with time-to-live expiration.
///
/// Keys are `source:query` strings, see [`cache_key`]. Expired entries
/// are lazily evicted on the next `get` for that key.
pub struct LookupCache<V> {
    store: DashMap<String, CacheEntry<V>>,
    ttl: Duration,
}

/// Cache key for a lookup of `query` against `source`. The query is
/// compared case-insensitively.
pub fn cache_key(source: &str, query: &str) -> String {
    format!("{}:{}", source, query.trim().to_lowercase())
}

impl<V: Clone> LookupCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: DashMap::new(),
            ttl,
        }
    }

    /// Returns the cached value for `key`, or `None` if missing or expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let entry = self.store.get(key)?;
        if Instant::now() > entry.expires_at {
            drop(entry);
            self.store.remove(key);
            return None;
        }
        Some(entry.value.clone())
    }

    pub fn set(&self, key: String, value: V) {
        if self.ttl.is_zero() {
            return;
        }
        self.store.insert(
            key,
            CacheEntry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Number of entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn clear(&self) {
        self.store.clear();
    }
}
