//! Newest modification time across content and templates, and the
//! conditional-GET decision built on it.

use std::{
    io,
    path::{Path, PathBuf},
};

use time::OffsetDateTime;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::{
    cache::GenerationToken,
    config::ContentSettings,
    domain::dates::{http_date, parse_http_date},
};

/// Outcome of comparing a client's `If-Modified-Since` with the current tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    NotModified,
    Modified { last_modified: Option<OffsetDateTime> },
}

impl Freshness {
    /// Value for a `Last-Modified` header, when there is one to send.
    pub fn last_modified_header(&self) -> Option<String> {
        match self {
            Freshness::Modified {
                last_modified: Some(stamp),
            } => Some(http_date(*stamp)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FreshnessOracle {
    roots: Vec<PathBuf>,
}

impl FreshnessOracle {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Watch the content root and the template directory.
    pub fn from_settings(content: &ContentSettings) -> Self {
        Self::new(content.watched_roots())
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Token for the watched roots as they are right now.
    pub fn current(&self) -> GenerationToken {
        Self::latest_modification(&self.roots)
    }

    /// Newest mtime of any file or directory under `roots`.
    ///
    /// Missing roots and unreadable entries are skipped.
    pub fn latest_modification<P: AsRef<Path>>(roots: &[P]) -> GenerationToken {
        let mut token = GenerationToken::EMPTY;
        for root in roots {
            let root = root.as_ref();
            if !root.exists() {
                debug!(path = %root.display(), "Freshness root absent");
                continue;
            }

            for entry in WalkDir::new(root) {
                let modified = entry
                    .map_err(io::Error::from)
                    .and_then(|entry| entry.metadata().map_err(io::Error::from))
                    .and_then(|metadata| metadata.modified());
                match modified {
                    Ok(modified) => token = token.advance(OffsetDateTime::from(modified)),
                    Err(error) => {
                        warn!(path = %root.display(), error = %error, "Skipping unreadable entry");
                    }
                }
            }
        }
        token
    }

    /// Conditional GET against the current token.
    pub fn evaluate(&self, if_modified_since: Option<&str>) -> Freshness {
        evaluate_at(self.current(), if_modified_since)
    }
}

/// Conditional GET at HTTP-date precision: sub-second parts of the
/// modification time are ignored.
pub fn evaluate_at(token: GenerationToken, if_modified_since: Option<&str>) -> Freshness {
    let Some(last_modified) = token.timestamp() else {
        return Freshness::Modified {
            last_modified: None,
        };
    };
    let last_modified = truncate_to_seconds(last_modified);

    let since = if_modified_since.and_then(parse_http_date);
    match since {
        Some(since) if last_modified <= since => Freshness::NotModified,
        _ => Freshness::Modified {
            last_modified: Some(last_modified),
        },
    }
}

fn truncate_to_seconds(stamp: OffsetDateTime) -> OffsetDateTime {
    stamp.replace_nanosecond(0).unwrap_or(stamp)
}
