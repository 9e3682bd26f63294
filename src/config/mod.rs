//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{num::NonZeroUsize, path::PathBuf, str::FromStr};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

pub use cli::{
    CheckArgs, CliArgs, Command, GlobalOverrides, ListArgs, ListKind, ShowArgs, ShowKind,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "quire";
const ENV_PREFIX: &str = "QUIRE";
const DEFAULT_CONTENT_ROOT: &str = "content";
const DEFAULT_TEMPLATES_DIR: &str = "views";
const DEFAULT_EXTENSION: &str = "mdown";
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_ARTICLE_PREFIX: &str = "/articles";
const DEFAULT_HOME_LIMIT: usize = 8;
const DEFAULT_FEED_LIMIT: usize = 10;

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub content: ContentSettings,
    pub cache: CacheSettings,
    pub site: SiteSettings,
    pub logging: LoggingSettings,
}

/// Where content lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSettings {
    pub root: PathBuf,
    pub articles: PathBuf,
    pub categories: PathBuf,
    pub comments: PathBuf,
    pub attachments: PathBuf,
    pub templates: PathBuf,
    /// File extension of content files, without the dot.
    pub extension: String,
}

impl ContentSettings {
    /// Lay out the conventional sub-directories under `root`.
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            articles: root.join("articles"),
            categories: root.join("categories"),
            comments: root.join("comments"),
            attachments: root.join("attachments"),
            templates: PathBuf::from(DEFAULT_TEMPLATES_DIR),
            extension: DEFAULT_EXTENSION.to_string(),
            root,
        }
    }

    /// Roots whose modification times decide freshness.
    ///
    /// Kind directories configured outside `root` are watched on their own.
    pub fn watched_roots(&self) -> Vec<PathBuf> {
        let mut roots = vec![self.root.clone()];
        for dir in [&self.articles, &self.categories, &self.comments] {
            if !dir.starts_with(&self.root) && !roots.contains(dir) {
                roots.push(dir.clone());
            }
        }
        roots.push(self.templates.clone());
        roots
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheSettings {
    pub enabled: bool,
    pub http_cache: bool,
}

/// Site-wide values the views fall back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSettings {
    pub title: String,
    pub subtitle: String,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub author: Option<AuthorSettings>,
    pub google_analytics_code: Option<String>,
    pub host: String,
    pub article_prefix: String,
    pub category_prefix: String,
    pub home_limit: NonZeroUsize,
    pub feed_limit: NonZeroUsize,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            description: None,
            keywords: None,
            author: None,
            google_analytics_code: None,
            host: DEFAULT_HOST.to_string(),
            article_prefix: DEFAULT_ARTICLE_PREFIX.to_string(),
            category_prefix: String::new(),
            home_limit: NonZeroUsize::new(DEFAULT_HOME_LIMIT).unwrap_or(NonZeroUsize::MIN),
            feed_limit: NonZeroUsize::new(DEFAULT_FEED_LIMIT).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorSettings {
    pub name: String,
    pub email: Option<String>,
    pub uri: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    content: RawContentSettings,
    cache: RawCacheSettings,
    site: RawSiteSettings,
    logging: RawLoggingSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &GlobalOverrides) {
        if let Some(root) = overrides.content_root.as_ref() {
            self.content.root = Some(root.clone());
        }
        if let Some(templates) = overrides.templates.as_ref() {
            self.content.templates = Some(templates.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(enabled) = overrides.cache_enabled {
            self.cache.enabled = Some(enabled);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            content,
            cache,
            site,
            logging,
        } = raw;

        Ok(Self {
            content: build_content_settings(content)?,
            cache: build_cache_settings(cache),
            site: build_site_settings(site)?,
            logging: build_logging_settings(logging)?,
        })
    }
}

fn build_content_settings(content: RawContentSettings) -> Result<ContentSettings, LoadError> {
    let root = content
        .root
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_ROOT));
    if root.as_os_str().is_empty() {
        return Err(LoadError::invalid("content.root", "path must not be empty"));
    }

    let defaults = ContentSettings::under(&root);

    let extension = content
        .extension
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    let extension = extension.trim().trim_start_matches('.').to_string();
    if extension.is_empty() {
        return Err(LoadError::invalid(
            "content.extension",
            "extension must not be empty",
        ));
    }

    Ok(ContentSettings {
        articles: non_empty_path(content.articles, defaults.articles, "content.articles")?,
        categories: non_empty_path(content.categories, defaults.categories, "content.categories")?,
        comments: non_empty_path(content.comments, defaults.comments, "content.comments")?,
        attachments: non_empty_path(
            content.attachments,
            defaults.attachments,
            "content.attachments",
        )?,
        templates: non_empty_path(content.templates, defaults.templates, "content.templates")?,
        extension,
        root,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> CacheSettings {
    CacheSettings {
        enabled: cache.enabled.unwrap_or(false),
        http_cache: cache.http_cache.unwrap_or(false),
    }
}

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let defaults = SiteSettings::default();

    let host = site.host.unwrap_or(defaults.host);
    if host.trim().is_empty() {
        return Err(LoadError::invalid("site.host", "host must not be empty"));
    }

    let article_prefix = normalize_prefix(
        site.article_prefix.unwrap_or(defaults.article_prefix),
        "site.article_prefix",
    )?;
    if article_prefix.is_empty() {
        return Err(LoadError::invalid(
            "site.article_prefix",
            "articles need a path prefix",
        ));
    }
    let category_prefix = normalize_prefix(
        site.category_prefix.unwrap_or(defaults.category_prefix),
        "site.category_prefix",
    )?;

    let home_limit = non_zero_usize(site.home_limit, defaults.home_limit, "site.home_limit")?;
    let feed_limit = non_zero_usize(site.feed_limit, defaults.feed_limit, "site.feed_limit")?;

    let author = non_blank(site.author_name).map(|name| AuthorSettings {
        name,
        email: non_blank(site.author_email),
        uri: non_blank(site.author_uri),
    });

    Ok(SiteSettings {
        title: site.title.unwrap_or_default(),
        subtitle: site.subtitle.unwrap_or_default(),
        description: non_blank(site.description),
        keywords: non_blank(site.keywords),
        author,
        google_analytics_code: non_blank(site.google_analytics_code),
        host,
        article_prefix,
        category_prefix,
        home_limit,
        feed_limit,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSettings {
    root: Option<PathBuf>,
    articles: Option<PathBuf>,
    categories: Option<PathBuf>,
    comments: Option<PathBuf>,
    attachments: Option<PathBuf>,
    templates: Option<PathBuf>,
    extension: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    http_cache: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    title: Option<String>,
    subtitle: Option<String>,
    description: Option<String>,
    keywords: Option<String>,
    author_name: Option<String>,
    author_email: Option<String>,
    author_uri: Option<String>,
    google_analytics_code: Option<String>,
    host: Option<String>,
    article_prefix: Option<String>,
    category_prefix: Option<String>,
    home_limit: Option<usize>,
    feed_limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

fn non_empty_path(
    value: Option<PathBuf>,
    default: PathBuf,
    key: &'static str,
) -> Result<PathBuf, LoadError> {
    let path = value.unwrap_or(default);
    if path.as_os_str().is_empty() {
        return Err(LoadError::invalid(key, "path must not be empty"));
    }
    Ok(path)
}

fn non_zero_usize(
    value: Option<usize>,
    default: NonZeroUsize,
    key: &'static str,
) -> Result<NonZeroUsize, LoadError> {
    match value {
        Some(value) => {
            NonZeroUsize::new(value).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
        }
        None => Ok(default),
    }
}

/// Prefixes are either empty or start with `/` and have no trailing `/`.
fn normalize_prefix(value: String, key: &'static str) -> Result<String, LoadError> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if !trimmed.starts_with('/') {
        return Err(LoadError::invalid(key, "prefix must start with `/`"));
    }
    Ok(trimmed.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

#[cfg(test)]
mod tests;
