//! Permalinks: derivation from file names, humanised headings and comment basenames.
//!
//! Permalinks are taken verbatim from file stems, so authors control them by
//! naming files. The `slug` crate is only used where a permalink has to be
//! synthesised from free text (comment authors).

use std::path::Path;

use ::slug::slugify;
use time::OffsetDateTime;

use super::dates::compact_stamp;
use super::error::ContentError;

const ANONYMOUS_AUTHOR: &str = "anonymous";

/// Derive a permalink from a content file path: the file name without its extension.
pub fn permalink_from_path(path: &Path) -> Result<String, ContentError> {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::trim)
        .ok_or(ContentError::MissingPermalink)?;

    if stem.is_empty() || stem.starts_with('.') {
        return Err(ContentError::MissingPermalink);
    }

    Ok(stem.to_string())
}

/// Turn a permalink into a heading: `my-first-post` becomes `My first post`.
pub fn humanize(permalink: &str) -> String {
    let spaced = permalink.replace(['-', '_'], " ");
    let mut chars = spaced.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Identity of a comment, derived from when and by whom it was written.
///
/// Two comments sharing `(date, author)` get the same basename. That is
/// intended: the later file replaces the earlier one on disk.
pub fn comment_basename(date: OffsetDateTime, author: Option<&str>) -> String {
    let author = author
        .map(slugify)
        .filter(|slug| !slug.is_empty())
        .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string());
    format!("{}-{author}", compact_stamp(date))
}
