//! Bounded identity cache used while decoding.
//!
//! Maps a renderer name plus cache key to the value reconstructed for it, so
//! a second reference to the same object within one decode session resolves
//! to the same instance. Least recently used entries are evicted at capacity;
//! eviction only affects future lookups, never values already handed out.

use std::fmt;
use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::debug;

use crate::value::Value;

/// Identity of a reconstructed object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    renderer: String,
    key: String,
}

impl CacheKey {
    /// Creates a key scoped to one renderer.
    #[must_use]
    pub fn new(renderer: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            renderer: renderer.into(),
            key: key.into(),
        }
    }

    /// Renderer that produced the cached value.
    #[must_use]
    pub const fn renderer(&self) -> &str {
        self.renderer.as_str()
    }

    /// Renderer-specific key, usually the encoded `"id"` field.
    #[must_use]
    pub const fn key(&self) -> &str {
        self.key.as_str()
    }
}

/// Outcome of a cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    /// A previously reconstructed value.
    Found(Value),
    /// Nothing cached under the key.
    Missing,
}

/// LRU store of reconstructed objects.
pub struct IdentityCache {
    entries: LruCache<CacheKey, Value>,
}

impl IdentityCache {
    /// Creates a cache holding at most `capacity` objects.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Looks `key` up and marks it as recently used.
    pub fn lookup(&mut self, key: &CacheKey) -> CacheLookup {
        self.entries
            .get(key)
            .cloned()
            .map_or(CacheLookup::Missing, CacheLookup::Found)
    }

    /// Stores `value` under `key`, evicting the least recently used entry
    /// when full.
    pub fn insert(&mut self, key: CacheKey, value: Value) {
        if let Some((evicted, _)) = self.entries.push(key.clone(), value)
            && evicted != key
        {
            debug!(
                renderer = evicted.renderer(),
                key = evicted.key(),
                "evicted object from identity cache"
            );
        }
    }

    /// Returns the number of cached objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of cached objects.
    #[must_use]
    pub fn capacity(&self) -> NonZeroUsize {
        self.entries.cap()
    }

    /// Drops every cached object.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl fmt::Debug for IdentityCache {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("IdentityCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
