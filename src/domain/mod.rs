//! Domain layer: content files and the entities built from them.

pub mod article;
pub mod category;
pub mod comment;
pub mod dates;
pub mod error;
pub mod metadata;
pub mod page;
pub mod slug;

use std::sync::Arc;

use serde::Serialize;

pub use article::Article;
pub use category::Category;
pub use comment::Comment;
pub use page::{Page, PageKind};

/// An entity handed out by the repository.
///
/// Entities are shared, immutable views into one generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Article(Arc<Article>),
    Category(Arc<Category>),
    Comment(Arc<Comment>),
}

impl Entity {
    pub fn kind(&self) -> PageKind {
        match self {
            Entity::Article(_) => PageKind::Article,
            Entity::Category(_) => PageKind::Category,
            Entity::Comment(_) => PageKind::Comment,
        }
    }

    /// The permalink for pages, the basename for comments.
    pub fn permalink(&self) -> &str {
        match self {
            Entity::Article(article) => article.permalink(),
            Entity::Category(category) => category.permalink(),
            Entity::Comment(comment) => comment.basename(),
        }
    }

    /// The shared page view, for articles and categories.
    pub fn page(&self) -> Option<&Page> {
        match self {
            Entity::Article(article) => Some(article.page()),
            Entity::Category(category) => Some(category.page()),
            Entity::Comment(_) => None,
        }
    }

    pub fn as_article(&self) -> Option<&Arc<Article>> {
        match self {
            Entity::Article(article) => Some(article),
            _ => None,
        }
    }

    pub fn as_category(&self) -> Option<&Arc<Category>> {
        match self {
            Entity::Category(category) => Some(category),
            _ => None,
        }
    }

    pub fn as_comment(&self) -> Option<&Arc<Comment>> {
        match self {
            Entity::Comment(comment) => Some(comment),
            _ => None,
        }
    }
}
