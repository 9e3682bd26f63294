//! The handle a routing layer holds: repository, freshness and response
//! cache wired together.

use std::sync::Arc;

use tracing::warn;

use crate::{
    cache::{CacheConfig, GenerationToken, ResponseCache, ResponseKey},
    config::{Settings, SiteSettings},
};

use super::{
    error::ScanError,
    freshness::{Freshness, FreshnessOracle, evaluate_at},
    generation::Generation,
    repository::ContentRepository,
    views::Views,
};

/// Rendered output as stored in the response cache.
pub type Rendered = Arc<str>;

pub struct Site {
    site: SiteSettings,
    http_cache: bool,
    oracle: FreshnessOracle,
    repository: ContentRepository,
    cache: ResponseCache<Rendered>,
}

impl Site {
    /// Scan the content tree once. A fatal scan error aborts startup.
    pub fn open(settings: &Settings) -> Result<Self, ScanError> {
        let oracle = FreshnessOracle::from_settings(&settings.content);
        let repository = ContentRepository::open(settings.content.clone(), oracle.current())?;

        Ok(Self {
            site: settings.site.clone(),
            http_cache: settings.cache.http_cache,
            oracle,
            repository,
            cache: ResponseCache::new(&CacheConfig::from(&settings.cache)),
        })
    }

    pub fn repository(&self) -> &ContentRepository {
        &self.repository
    }

    pub fn oracle(&self) -> &FreshnessOracle {
        &self.oracle
    }

    pub fn cache(&self) -> &ResponseCache<Rendered> {
        &self.cache
    }

    pub fn settings(&self) -> &SiteSettings {
        &self.site
    }

    /// Bring the repository up to date with the tree on disk.
    ///
    /// A failed rescan is logged and the previous generation keeps serving.
    pub fn refresh(&self) -> GenerationToken {
        let token = self.oracle.current();
        if let Err(error) = self.repository.refresh(token) {
            warn!(generation = %token, error = %error, "Keeping previous content generation");
        }
        token
    }

    /// Answer `key` from the response cache, rendering with `render` when the
    /// tree has changed since the stored entry was made.
    pub fn render<F, E>(&self, key: &ResponseKey, render: F) -> Result<Rendered, E>
    where
        F: FnOnce(&Generation, Views<'_>) -> Result<String, E>,
    {
        let token = self.refresh();
        self.cache.try_get_or_compute(key, token, || {
            let generation = self.repository.snapshot();
            let views = Views::new(&self.site, &generation);
            render(&generation, views).map(Rendered::from)
        })
    }

    /// Conditional GET over content and templates. Always `Modified`, with no
    /// timestamp, when HTTP caching is turned off.
    pub fn freshness(&self, if_modified_since: Option<&str>) -> Freshness {
        if !self.http_cache {
            return Freshness::Modified {
                last_modified: None,
            };
        }
        evaluate_at(self.oracle.current(), if_modified_since)
    }
}
