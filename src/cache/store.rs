//! Response cache storage.
//!
//! A read-through memo of rendered output. Entries are tagged with the
//! generation token they were computed under and are replaced, never evicted,
//! when that token moves on.

use std::convert::Infallible;

use dashmap::DashMap;
use metrics::counter;
use tracing::debug;

use super::config::CacheConfig;
use super::keys::{GenerationToken, ResponseKey};

#[derive(Debug, Clone)]
struct CachedEntry<T> {
    token: GenerationToken,
    value: T,
}

/// Rendered output keyed by request identity.
///
/// Writers may race; the last one wins. Computing the same value twice under
/// a race is wasted work only.
pub struct ResponseCache<T> {
    config: CacheConfig,
    entries: DashMap<ResponseKey, CachedEntry<T>>,
}

impl<T: Clone> ResponseCache<T> {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            config: *config,
            entries: DashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Return the stored value for `key` if it was computed under `token`,
    /// otherwise run `compute`, store its result and return it.
    pub fn get_or_compute<F>(&self, key: &ResponseKey, token: GenerationToken, compute: F) -> T
    where
        F: FnOnce() -> T,
    {
        let result = self.try_get_or_compute(key, token, || Ok::<T, Infallible>(compute()));
        match result {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Fallible variant of [`ResponseCache::get_or_compute`]. Errors are
    /// handed back and nothing is stored.
    pub fn try_get_or_compute<F, E>(
        &self,
        key: &ResponseKey,
        token: GenerationToken,
        compute: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if !self.config.enabled {
            counter!("quire_response_cache_bypass_total").increment(1);
            return compute();
        }

        if let Some(value) = self.lookup(key, token) {
            counter!("quire_response_cache_hit_total").increment(1);
            debug!(cache = "response", outcome = "hit", path = %key.path, %token);
            return Ok(value);
        }

        counter!("quire_response_cache_miss_total").increment(1);
        debug!(cache = "response", outcome = "miss", path = %key.path, %token);

        let value = compute()?;
        self.entries.insert(
            key.clone(),
            CachedEntry {
                token,
                value: value.clone(),
            },
        );
        Ok(value)
    }

    /// The stored value for `key`, if it is current for `token`.
    pub fn get(&self, key: &ResponseKey, token: GenerationToken) -> Option<T> {
        if !self.config.enabled {
            return None;
        }
        self.lookup(key, token)
    }

    fn lookup(&self, key: &ResponseKey, token: GenerationToken) -> Option<T> {
        // The shard guard is dropped before any insert on the same key.
        let entry = self.entries.get(key)?;
        (entry.token == token).then(|| entry.value.clone())
    }

    pub fn invalidate(&self, key: &ResponseKey) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Get the number of cached responses.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
