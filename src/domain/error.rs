use thiserror::Error;

use super::page::PageKind;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{kind} `{permalink}` not found")]
    NotFound { kind: PageKind, permalink: String },
}

impl DomainError {
    pub fn not_found(kind: PageKind, permalink: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            permalink: permalink.into(),
        }
    }
}

/// Reasons a single content file cannot become an entity.
///
/// These are isolated to the offending file: the scan records them and keeps
/// going.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("content is not valid UTF-8")]
    InvalidEncoding,
    #[error("content contains binary data")]
    BinaryContent,
    #[error("file name does not yield a permalink")]
    MissingPermalink,
    #[error("metadata `{key}` has unrecognised value `{value}`")]
    InvalidValue { key: &'static str, value: String },
}

impl ContentError {
    pub fn invalid_value(key: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            value: value.into(),
        }
    }
}
