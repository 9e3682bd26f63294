use serde::Serialize;
use time::Date;

use super::{dates, error::ContentError, page::Page};

/// Marker an author can put in a body to end the summary early.
pub const MORE_MARKER: &str = "<!-- more -->";
pub const DEFAULT_READ_MORE: &str = "Continue reading";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    #[serde(flatten)]
    page: Page,
    #[serde(with = "dates::iso_date_format::option")]
    date: Option<Date>,
}

impl Article {
    /// Wrap a page as an article, interpreting its `date` metadata.
    ///
    /// A `date` that is present but unreadable is an error rather than "no
    /// date": undated articles are left out of chronological listings, so the
    /// two must not be confused.
    pub fn new(page: Page) -> Result<Self, ContentError> {
        let date = page
            .metadata()
            .get("date")
            .map(|value| {
                dates::parse_date(value).ok_or_else(|| ContentError::invalid_value("date", value))
            })
            .transpose()?;
        Ok(Self { page, date })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn permalink(&self) -> &str {
        self.page.permalink()
    }

    pub fn heading(&self) -> String {
        self.page.heading()
    }

    pub fn date(&self) -> Option<Date> {
        self.date
    }

    /// The summary shown in listings.
    ///
    /// An explicit `summary` value wins; otherwise the body up to the
    /// [`MORE_MARKER`], otherwise the first paragraph of the body.
    pub fn summary(&self) -> &str {
        if let Some(summary) = self.page.metadata().get("summary") {
            return summary;
        }
        let body = self.page.body();
        match body.find(MORE_MARKER) {
            Some(index) => body[..index].trim_end(),
            None => first_paragraph(body),
        }
    }

    /// Whether the summary leaves out part of the body.
    pub fn is_summarized(&self) -> bool {
        self.summary().trim() != self.page.body().trim()
    }

    /// Link text for the "read more" link under a summary.
    pub fn read_more(&self) -> &str {
        self.page
            .metadata()
            .get("read more")
            .unwrap_or(DEFAULT_READ_MORE)
    }

    /// Atom entry id: the `atom id` metadata value, or a tag URI built from the
    /// host, the article's date and its path. Undated articles without an
    /// override have no id.
    pub fn atom_id(&self, host: &str, article_prefix: &str) -> Option<String> {
        if let Some(explicit) = self.page.metadata().get("atom id") {
            return Some(explicit.to_string());
        }
        self.date.map(|date| {
            format!(
                "tag:{host},{}:{article_prefix}/{}",
                dates::iso_date(date),
                self.permalink()
            )
        })
    }
}

fn first_paragraph(body: &str) -> &str {
    let body = body.trim_start_matches('\n');
    let mut end = body.len();
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if line.trim().is_empty() {
            end = offset;
            break;
        }
        offset += line.len();
    }
    body[..end].trim_end()
}
