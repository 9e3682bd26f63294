//! Cache configuration.
//!
//! Controls the response cache and conditional-GET handling via `quire.toml`:
//!
//! ```toml
//! [cache]
//! enabled = true
//! http_cache = true
//! ```

use serde::Deserialize;

/// Cache switches, passed by value to the components that need them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Reuse rendered output while the generation token is unchanged.
    pub enabled: bool,
    /// Answer conditional GETs from the latest modification time.
    pub http_cache: bool,
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            http_cache: settings.http_cache,
        }
    }
}

impl CacheConfig {
    pub fn fully_enabled() -> Self {
        Self {
            enabled: true,
            http_cache: true,
        }
    }
}
