//! The shared shape of articles and categories.

use std::{fmt, path::PathBuf};

use serde::Serialize;
use time::OffsetDateTime;

use super::{
    error::ContentError,
    metadata::{Metadata, ParsedDocument},
    slug::humanize,
};

/// Which sub-tree of the content directory an entity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Article,
    Category,
    Comment,
}

impl PageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PageKind::Article => "article",
            PageKind::Category => "category",
            PageKind::Comment => "comment",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed content file with its identity and place in the category tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    permalink: String,
    heading: Option<String>,
    body: String,
    metadata: Metadata,
    comments_enabled: Option<bool>,
    parent: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    last_modified: OffsetDateTime,
    source: PathBuf,
}

impl Page {
    /// Build a page from a parsed document.
    ///
    /// Fails when a typed metadata value is present but cannot be interpreted.
    pub fn new(
        permalink: String,
        document: ParsedDocument,
        parent: Option<String>,
        last_modified: OffsetDateTime,
        source: PathBuf,
    ) -> Result<Self, ContentError> {
        if permalink.is_empty() {
            return Err(ContentError::MissingPermalink);
        }

        let ParsedDocument {
            metadata,
            heading,
            body,
        } = document;

        let comments_enabled = metadata
            .get("comments")
            .map(|value| parse_flag("comments", value))
            .transpose()?;

        Ok(Self {
            permalink,
            heading,
            body,
            metadata,
            comments_enabled,
            parent,
            last_modified,
            source,
        })
    }

    pub(crate) fn with_parent(mut self, parent: Option<String>) -> Self {
        self.parent = parent;
        self
    }

    pub fn permalink(&self) -> &str {
        &self.permalink
    }

    /// The explicit `# Heading`, or the humanised permalink when there is none.
    pub fn heading(&self) -> String {
        self.heading
            .clone()
            .unwrap_or_else(|| humanize(&self.permalink))
    }

    pub fn explicit_heading(&self) -> Option<&str> {
        self.heading.as_deref()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn description(&self) -> Option<&str> {
        self.metadata.get("description")
    }

    pub fn keywords(&self) -> Option<&str> {
        self.metadata.get("keywords")
    }

    /// `None` when the file does not say; callers pick the site default.
    pub fn comments_enabled(&self) -> Option<bool> {
        self.comments_enabled
    }

    /// Permalink of the enclosing category, if any.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn last_modified(&self) -> OffsetDateTime {
        self.last_modified
    }

    pub fn source(&self) -> &PathBuf {
        &self.source
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ContentError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "yes" | "true" | "enabled" => Ok(true),
        "off" | "no" | "false" | "disabled" => Ok(false),
        _ => Err(ContentError::invalid_value(key, value)),
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::domain::metadata::parse_document;

    fn page(text: &str) -> Result<Page, ContentError> {
        Page::new(
            "my-article".to_string(),
            parse_document(text),
            None,
            datetime!(2020-01-01 0:00 UTC),
            PathBuf::from("articles/my-article.mdown"),
        )
    }

    #[test]
    fn heading_falls_back_to_permalink() {
        let page = page("description: stuff\n\nJust a body").expect("page");
        assert_eq!(page.heading(), "My article");
        assert_eq!(page.explicit_heading(), None);
        assert_eq!(page.description(), Some("stuff"));
        assert_eq!(page.keywords(), None);
    }

    #[test]
    fn comments_flag_is_typed() {
        assert_eq!(page("comments: on\n\nx").expect("page").comments_enabled(), Some(true));
        assert_eq!(page("comments: No\n\nx").expect("page").comments_enabled(), Some(false));
        assert_eq!(page("x").expect("page").comments_enabled(), None);
    }

    #[test]
    fn unrecognised_comments_flag_is_rejected() {
        assert_eq!(
            page("comments: maybe\n\nx"),
            Err(ContentError::invalid_value("comments", "maybe"))
        );
    }
}
