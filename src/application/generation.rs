//! One complete, immutable snapshot of the content tree.

use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::Arc,
};

use time::OffsetDateTime;

use crate::{
    cache::GenerationToken,
    domain::{Article, Category, Comment, Entity, Page, PageKind},
};

use super::error::FileError;

/// Files a scan looked at and the ones it had to leave out.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub files_seen: usize,
    pub errors: Vec<FileError>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn loaded(&self) -> usize {
        self.files_seen.saturating_sub(self.errors.len())
    }
}

/// Entities of one scan, already in listing order and indexed by permalink.
#[derive(Debug, Default)]
pub struct Generation {
    token: GenerationToken,
    articles: Vec<Arc<Article>>,
    categories: Vec<Arc<Category>>,
    comments: Vec<Arc<Comment>>,
    article_index: HashMap<String, usize>,
    category_index: HashMap<String, usize>,
    comment_index: HashMap<String, usize>,
    comments_by_article: HashMap<String, Vec<usize>>,
    report: LoadReport,
}

impl Generation {
    /// Build a generation from entities in scan order.
    ///
    /// Parents must already be resolved to permalinks of `categories`.
    pub(crate) fn assemble(
        token: GenerationToken,
        mut articles: Vec<Article>,
        mut categories: Vec<Category>,
        mut comments: Vec<Comment>,
        report: LoadReport,
    ) -> Self {
        articles.sort_by(|a, b| newest_first(a.date(), b.date()));
        comments.sort_by(|a, b| oldest_first(a.date(), b.date()));

        let positions = index_by(categories.iter().map(Category::permalink));
        for article in &articles {
            if let Some(&slot) = article.page().parent().and_then(|p| positions.get(p)) {
                categories[slot].push_article(article.permalink());
            }
        }
        let children: Vec<(usize, String)> = categories
            .iter()
            .filter_map(|category| {
                let slot = *category.page().parent().and_then(|p| positions.get(p))?;
                Some((slot, category.permalink().to_string()))
            })
            .collect();
        for (slot, child) in children {
            categories[slot].push_child_category(child);
        }
        let categories = tree_order(categories, &positions);

        let mut comments_by_article: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, comment) in comments.iter().enumerate() {
            if let Some(article) = comment.article() {
                comments_by_article
                    .entry(article.to_string())
                    .or_default()
                    .push(position);
            }
        }

        Self {
            token,
            article_index: index_by(articles.iter().map(Article::permalink)),
            category_index: index_by(categories.iter().map(Category::permalink)),
            comment_index: index_by(comments.iter().map(Comment::basename)),
            articles: articles.into_iter().map(Arc::new).collect(),
            categories: categories.into_iter().map(Arc::new).collect(),
            comments: comments.into_iter().map(Arc::new).collect(),
            comments_by_article,
            report,
        }
    }

    pub fn token(&self) -> GenerationToken {
        self.token
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Articles newest first; undated ones last, in scan order.
    pub fn articles(&self) -> &[Arc<Article>] {
        &self.articles
    }

    /// Categories parents first, siblings in file-name order.
    pub fn categories(&self) -> &[Arc<Category>] {
        &self.categories
    }

    /// Comments oldest first.
    pub fn comments(&self) -> &[Arc<Comment>] {
        &self.comments
    }

    pub fn article(&self, permalink: &str) -> Option<&Arc<Article>> {
        self.article_index
            .get(permalink)
            .map(|&slot| &self.articles[slot])
    }

    pub fn category(&self, permalink: &str) -> Option<&Arc<Category>> {
        self.category_index
            .get(permalink)
            .map(|&slot| &self.categories[slot])
    }

    pub fn comment(&self, basename: &str) -> Option<&Arc<Comment>> {
        self.comment_index
            .get(basename)
            .map(|&slot| &self.comments[slot])
    }

    pub fn find(&self, kind: PageKind, permalink: &str) -> Option<Entity> {
        match kind {
            PageKind::Article => self.article(permalink).cloned().map(Entity::Article),
            PageKind::Category => self.category(permalink).cloned().map(Entity::Category),
            PageKind::Comment => self.comment(permalink).cloned().map(Entity::Comment),
        }
    }

    pub fn all(&self, kind: PageKind) -> Vec<Entity> {
        match kind {
            PageKind::Article => self.articles.iter().cloned().map(Entity::Article).collect(),
            PageKind::Category => self
                .categories
                .iter()
                .cloned()
                .map(Entity::Category)
                .collect(),
            PageKind::Comment => self.comments.iter().cloned().map(Entity::Comment).collect(),
        }
    }

    /// Articles that carry a date, newest first.
    pub fn dated_articles(&self) -> impl Iterator<Item = &Arc<Article>> {
        self.articles
            .iter()
            .filter(|article| article.date().is_some())
    }

    pub fn comments_for(&self, article: &str) -> Vec<Arc<Comment>> {
        self.comments_by_article
            .get(article)
            .map(|slots| {
                slots
                    .iter()
                    .map(|&slot| Arc::clone(&self.comments[slot]))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn children_of(&self, category: &Category) -> Vec<Arc<Category>> {
        category
            .child_categories()
            .iter()
            .filter_map(|permalink| self.category(permalink).cloned())
            .collect()
    }

    pub fn articles_in(&self, category: &Category) -> Vec<Arc<Article>> {
        category
            .articles()
            .iter()
            .filter_map(|permalink| self.article(permalink).cloned())
            .collect()
    }

    pub fn parent_of(&self, page: &Page) -> Option<Arc<Category>> {
        page.parent()
            .and_then(|permalink| self.category(permalink))
            .cloned()
    }

    /// Newest `last_modified` across articles and categories.
    pub fn latest_page_modification(&self) -> Option<OffsetDateTime> {
        let articles = self.articles.iter().map(|a| a.page().last_modified());
        let categories = self.categories.iter().map(|c| c.page().last_modified());
        articles.chain(categories).max()
    }

    pub fn len(&self) -> usize {
        self.articles.len() + self.categories.len() + self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn index_by<'a>(permalinks: impl Iterator<Item = &'a str>) -> HashMap<String, usize> {
    permalinks
        .enumerate()
        .map(|(slot, permalink)| (permalink.to_string(), slot))
        .collect()
}

fn newest_first<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn oldest_first<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Depth-first, parents before children. Roots and siblings keep scan order.
fn tree_order(categories: Vec<Category>, positions: &HashMap<String, usize>) -> Vec<Category> {
    let mut stack: Vec<usize> = categories
        .iter()
        .enumerate()
        .filter(|(_, category)| {
            category
                .page()
                .parent()
                .is_none_or(|parent| !positions.contains_key(parent))
        })
        .map(|(slot, _)| slot)
        .rev()
        .collect();

    let mut order = Vec::with_capacity(categories.len());
    while let Some(slot) = stack.pop() {
        order.push(slot);
        for child in categories[slot].child_categories().iter().rev() {
            if let Some(&child_slot) = positions.get(child) {
                stack.push(child_slot);
            }
        }
    }

    let mut slots: Vec<Option<Category>> = categories.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|slot| slots[slot].take())
        .collect()
}
