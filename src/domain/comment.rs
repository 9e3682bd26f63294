use std::path::PathBuf;

use serde::Serialize;
use time::OffsetDateTime;

use super::{
    dates,
    error::ContentError,
    metadata::{Metadata, ParsedDocument},
    slug::comment_basename,
};

/// A reader comment on an article.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    basename: String,
    article: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    date: Option<OffsetDateTime>,
    body: String,
    metadata: Metadata,
    #[serde(with = "time::serde::rfc3339")]
    last_modified: OffsetDateTime,
    source: PathBuf,
}

impl Comment {
    /// Build a comment from a parsed file. `basename` is the file stem, which
    /// for files written by [`Comment::file_name`] equals [`Comment::identity`].
    pub fn new(
        basename: String,
        document: ParsedDocument,
        last_modified: OffsetDateTime,
        source: PathBuf,
    ) -> Result<Self, ContentError> {
        if basename.is_empty() {
            return Err(ContentError::MissingPermalink);
        }
        let ParsedDocument {
            metadata,
            heading,
            body,
        } = document;

        let date = metadata
            .get("date")
            .map(|value| {
                dates::parse_timestamp(value)
                    .ok_or_else(|| ContentError::invalid_value("date", value))
            })
            .transpose()?;

        // Comments have no headings; a leading `# ` line belongs to the text.
        let body = match heading {
            Some(heading) if body.is_empty() => format!("# {heading}"),
            Some(heading) => format!("# {heading}\n\n{body}"),
            None => body,
        };

        Ok(Self {
            basename,
            article: metadata.get("article").map(str::to_string),
            date,
            body,
            metadata,
            last_modified,
            source,
        })
    }

    /// File name a comment written at `date` by `author` is stored under.
    pub fn file_name(date: OffsetDateTime, author: Option<&str>, extension: &str) -> String {
        format!("{}.{extension}", comment_basename(date, author))
    }

    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// The `(date, author)` identity, when the comment carries a date.
    pub fn identity(&self) -> Option<String> {
        self.date.map(|date| comment_basename(date, self.author()))
    }

    /// Permalink of the article this comment belongs to.
    pub fn article(&self) -> Option<&str> {
        self.article.as_deref()
    }

    pub fn date(&self) -> Option<OffsetDateTime> {
        self.date
    }

    pub fn author(&self) -> Option<&str> {
        self.metadata.get("author")
    }

    pub fn author_email(&self) -> Option<&str> {
        self.metadata.get("author email")
    }

    pub fn author_url(&self) -> Option<&str> {
        self.metadata.get("author url")
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn last_modified(&self) -> OffsetDateTime {
        self.last_modified
    }

    pub fn source(&self) -> &PathBuf {
        &self.source
    }
}
