//! Cache key definitions and the generation token entries are validated against.

use std::fmt;

use serde::Serialize;
use time::OffsetDateTime;

/// Output format of a cached rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Html,
    Atom,
    Sitemap,
    Css,
}

impl OutputFormat {
    /// Guess the format from a request path.
    pub fn from_path(path: &str) -> Self {
        if path.ends_with("/sitemap.xml") {
            OutputFormat::Sitemap
        } else if path.ends_with(".xml") {
            OutputFormat::Atom
        } else if path.ends_with(".css") {
            OutputFormat::Css
        } else {
            OutputFormat::Html
        }
    }
}

/// Identity of the request that produced a cached rendering.
///
/// The path and the query both take part, so two routes, or one route with
/// different output-affecting parameters, never share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseKey {
    pub format: OutputFormat,
    pub path: String,
    pub query: String,
}

impl ResponseKey {
    pub fn new(path: impl Into<String>, query: &str) -> Self {
        let path = path.into();
        Self {
            format: OutputFormat::from_path(&path),
            query: normalize_query(query),
            path,
        }
    }

    pub fn with_format(format: OutputFormat, path: impl Into<String>, query: &str) -> Self {
        Self {
            format,
            path: path.into(),
            query: normalize_query(query),
        }
    }
}

/// Freshness of a generation or of a cached artifact: the newest modification
/// time seen across the watched roots.
///
/// [`GenerationToken::EMPTY`] stands for "nothing found" and orders before
/// every real timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenerationToken(Option<OffsetDateTime>);

impl GenerationToken {
    pub const EMPTY: Self = Self(None);

    pub fn at(stamp: OffsetDateTime) -> Self {
        Self(Some(stamp))
    }

    pub fn timestamp(self) -> Option<OffsetDateTime> {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0.is_none()
    }

    /// Keep the newer of two tokens.
    pub fn advance(self, stamp: OffsetDateTime) -> Self {
        self.max(Self::at(stamp))
    }
}

impl fmt::Display for GenerationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(stamp) => write!(f, "{}", stamp.unix_timestamp_nanos()),
            None => f.write_str("empty"),
        }
    }
}

/// The query as it takes part in a key: without a leading `?`.
pub fn normalize_query(query: &str) -> String {
    query.strip_prefix('?').unwrap_or(query).to_string()
}
