//! Memoization caches for repeated tokens.
//!
//! The tokenizer keeps two caches keyed by symbol string: merged BPE
//! representations and final id sequences. Both share this type, whose
//! eviction behaviour is chosen by a [`CachePolicy`].

use ahash::{AHashMap, RandomState};
use compact_str::CompactString;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Eviction policy for a [`MemoCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CachePolicy {
    /// Grow without bound, never evict.
    #[default]
    Unbounded,
    /// Keep at most `capacity` entries, evicting the least recently used.
    Lru { capacity: usize },
}

enum Store<V> {
    Unbounded(AHashMap<CompactString, V>),
    Lru(LruCache<CompactString, V, RandomState>),
}

/// Cache from symbol strings to memoized values.
pub struct MemoCache<V> {
    store: Store<V>,
    policy: CachePolicy,
    hits: u64,
    misses: u64,
}

impl<V> MemoCache<V> {
    /// Create an empty cache with the given policy.
    ///
    /// An LRU capacity of zero is treated as one.
    pub fn new(policy: CachePolicy) -> Self {
        let store = match policy {
            CachePolicy::Unbounded => Store::Unbounded(AHashMap::new()),
            CachePolicy::Lru { capacity } => {
                let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
                Store::Lru(LruCache::with_hasher(capacity, RandomState::new()))
            }
        };

        Self {
            store,
            policy,
            hits: 0,
            misses: 0,
        }
    }

    /// Look up a key, recording a hit or a miss.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let found = match &mut self.store {
            Store::Unbounded(map) => map.get(key),
            Store::Lru(lru) => lru.get(key),
        };

        match found {
            Some(value) => {
                self.hits += 1;
                Some(value)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Check for a key without touching recency or statistics.
    pub fn contains(&self, key: &str) -> bool {
        match &self.store {
            Store::Unbounded(map) => map.contains_key(key),
            Store::Lru(lru) => lru.contains(key),
        }
    }

    /// Insert a value, evicting if the policy requires it.
    pub fn insert(&mut self, key: &str, value: V) {
        let key = CompactString::new(key);
        match &mut self.store {
            Store::Unbounded(map) => {
                map.insert(key, value);
            }
            Store::Lru(lru) => {
                lru.put(key, value);
            }
        }
    }

    /// Clear all entries; statistics are kept.
    pub fn clear(&mut self) {
        match &mut self.store {
            Store::Unbounded(map) => map.clear(),
            Store::Lru(lru) => lru.clear(),
        }
    }

    /// Get the number of entries in the cache.
    pub fn len(&self) -> usize {
        match &self.store {
            Store::Unbounded(map) => map.len(),
            Store::Lru(lru) => lru.len(),
        }
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The policy this cache was built with.
    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            capacity: match self.policy {
                CachePolicy::Unbounded => None,
                CachePolicy::Lru { capacity } => Some(capacity.max(1)),
            },
            hits: self.hits,
            misses: self.misses,
        }
    }
}

impl<V> Default for MemoCache<V> {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Current number of entries
    pub entries: usize,
    /// Maximum capacity (None if unbounded)
    pub capacity: Option<usize>,
    /// Lookups that found an entry
    pub hits: u64,
    /// Lookups that did not
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups that hit, if any lookup happened.
    pub fn hit_rate(&self) -> Option<f64> {
        let total = self.hits + self.misses;
        (total > 0).then(|| self.hits as f64 / total as f64)
    }
}
