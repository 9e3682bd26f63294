use std::{error::Error as StdError, io, path::PathBuf};

use thiserror::Error;

use crate::{
    config::LoadError,
    domain::{
        PageKind,
        error::{ContentError, DomainError},
    },
    infra::error::InfraError,
};

/// An error flattened into its chain of messages, outermost first.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }

    pub fn from_message(source: &'static str, message: impl Into<String>) -> Self {
        Self {
            source,
            messages: vec![message.into()],
        }
    }

    /// All messages joined with `: `.
    pub fn joined(&self) -> String {
        self.messages.join(": ")
    }
}

/// A single content file that was left out of a generation.
#[derive(Debug, Error)]
#[error("{}: {kind}", .path.display())]
pub struct FileError {
    pub path: PathBuf,
    pub kind: FileErrorKind,
}

#[derive(Debug, Error)]
pub enum FileErrorKind {
    #[error("could not read file: {0}")]
    Read(#[from] io::Error),
    #[error(transparent)]
    Content(#[from] ContentError),
}

impl FileError {
    pub fn new(path: impl Into<PathBuf>, kind: impl Into<FileErrorKind>) -> Self {
        Self {
            path: path.into(),
            kind: kind.into(),
        }
    }
}

/// Failures that abort a whole scan. The previously published generation
/// stays in service.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("content root `{}` does not exist", .path.display())]
    MissingRoot { path: PathBuf },
    #[error("failed to read `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to walk content tree")]
    Walk(#[from] walkdir::Error),
    #[error(
        "duplicate {kind} permalink `{permalink}` in `{}` and `{}`",
        .first.display(),
        .second.display()
    )]
    DuplicatePermalink {
        kind: PageKind,
        permalink: String,
        first: PathBuf,
        second: PathBuf,
    },
}

impl ScanError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn duplicate(
        kind: PageKind,
        permalink: impl Into<String>,
        first: impl Into<PathBuf>,
        second: impl Into<PathBuf>,
    ) -> Self {
        Self::DuplicatePermalink {
            kind,
            permalink: permalink.into(),
            first: first.into(),
            second: second.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to load configuration")]
    Config(#[from] LoadError),
    #[error("content scan failed")]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport::from_error("application::error::AppError", self)
    }
}
