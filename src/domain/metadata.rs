//! Parsing of content files into a metadata block, an optional heading and a body.
//!
//! A content file looks like this:
//!
//! ```text
//! description: A test post
//! date: 01 January 2020
//!
//! # Hello World
//!
//! Body text here.
//! ```
//!
//! Parsing is pure: callers read the file and hand over its text.

use serde::Serialize;

use super::error::ContentError;

/// Ordered `key: value` pairs from the top of a content file.
///
/// Keys are case-sensitive and kept in the order they were written. Values are
/// opaque strings; nothing is unescaped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a key. Absent keys stay absent; there are no defaults here.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Append a key, or replace the value of an existing one in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(candidate, _)| *candidate == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize back into header lines, one `key: value` per line, in order.
    pub fn to_header(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
        out
    }
}

/// The three parts of a content file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    pub metadata: Metadata,
    pub heading: Option<String>,
    pub body: String,
}

/// Turn raw file bytes into text, rejecting content that is clearly not a text file.
pub fn decode_content(bytes: Vec<u8>) -> Result<String, ContentError> {
    if bytes.contains(&0) {
        return Err(ContentError::BinaryContent);
    }
    String::from_utf8(bytes).map_err(|_| ContentError::InvalidEncoding)
}

/// Split content text into metadata, heading and body.
pub fn parse_document(text: &str) -> ParsedDocument {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<&str> = text.lines().collect();

    let mut metadata = Metadata::new();
    let mut index = 0;
    while let Some(line) = lines.get(index) {
        match metadata_line(line) {
            Some((key, value)) => {
                metadata.insert(key, value);
                index += 1;
            }
            None => break,
        }
    }

    while lines.get(index).is_some_and(|line| line.trim().is_empty()) {
        index += 1;
    }

    let mut heading = None;
    if let Some(line) = lines.get(index) {
        if let Some(rest) = line.strip_prefix("# ") {
            heading = Some(rest.trim().to_string());
            index += 1;
            while lines.get(index).is_some_and(|line| line.trim().is_empty()) {
                index += 1;
            }
        }
    }

    // Trailing blank lines go; trailing spaces on the last line are markup.
    let mut end = lines.len();
    while end > index && lines[end - 1].trim().is_empty() {
        end -= 1;
    }
    let body = lines.get(index..end).map(|rest| rest.join("\n")).unwrap_or_default();

    ParsedDocument {
        metadata,
        heading,
        body,
    }
}

fn metadata_line(line: &str) -> Option<(&str, &str)> {
    if line.trim().is_empty() || line.starts_with('#') {
        return None;
    }
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}
