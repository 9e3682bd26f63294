use serde::Serialize;

use super::page::Page;

/// A node of the category tree.
///
/// The node owns the permalinks of its children; the entities themselves live
/// in the repository's generation and are resolved through it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    #[serde(flatten)]
    page: Page,
    child_categories: Vec<String>,
    articles: Vec<String>,
}

impl Category {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            child_categories: Vec::new(),
            articles: Vec::new(),
        }
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

    pub fn child_categories(&self) -> &[String] {
        &self.child_categories
    }

    pub fn articles(&self) -> &[String] {
        &self.articles
    }

    pub(crate) fn push_child_category(&mut self, permalink: impl Into<String>) {
        self.child_categories.push(permalink.into());
    }

    pub(crate) fn push_article(&mut self, permalink: impl Into<String>) {
        self.articles.push(permalink.into());
    }
}
