//! Data handed to the templating layer. Nothing here renders markup.

use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{
    config::SiteSettings,
    domain::{
        Article, Category, Comment, PageKind, dates::iso_date, error::DomainError,
    },
};

use super::generation::Generation;

#[derive(Debug, Clone, Serialize)]
pub struct PageMetaView {
    pub title: String,
    pub description: Option<String>,
    pub keywords: Option<String>,
}

/// Parts shared by every HTML page.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutChrome {
    pub site_title: String,
    pub google_analytics_code: Option<String>,
    pub categories: Vec<CategoryLink>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutContext<T> {
    pub chrome: LayoutChrome,
    pub meta: PageMetaView,
    pub content: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryLink {
    pub permalink: String,
    pub heading: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleSummary {
    pub permalink: String,
    pub heading: String,
    pub path: String,
    pub date: Option<String>,
    pub summary: String,
    pub is_summarized: bool,
    pub read_more: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub basename: String,
    pub author: Option<String>,
    pub author_url: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HomeView {
    pub heading: String,
    pub subtitle: String,
    pub articles: Vec<ArticleSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleView {
    pub heading: String,
    pub path: String,
    pub date: Option<String>,
    pub body: String,
    pub parent: Option<CategoryLink>,
    pub comments_enabled: Option<bool>,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub heading: String,
    pub path: String,
    pub body: String,
    pub parent: Option<CategoryLink>,
    pub categories: Vec<CategoryLink>,
    pub articles: Vec<ArticleSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorView {
    pub name: String,
    pub email: Option<String>,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedView {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub link: String,
    pub self_link: String,
    pub updated: Option<String>,
    pub author: Option<AuthorView>,
    pub entries: Vec<FeedEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedEntry {
    pub id: String,
    pub title: String,
    pub link: String,
    pub published: String,
    pub summary: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SitemapView {
    #[serde(with = "time::serde::rfc3339::option")]
    pub latest: Option<OffsetDateTime>,
    pub urls: Vec<SitemapUrl>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SitemapUrl {
    pub location: String,
    #[serde(with = "time::serde::rfc3339")]
    pub last_modified: OffsetDateTime,
}

/// Builds view models from one generation.
#[derive(Clone, Copy)]
pub struct Views<'a> {
    site: &'a SiteSettings,
    generation: &'a Generation,
}

impl<'a> Views<'a> {
    pub fn new(site: &'a SiteSettings, generation: &'a Generation) -> Self {
        Self { site, generation }
    }

    pub fn article_path(&self, article: &Article) -> String {
        format!("{}/{}", self.site.article_prefix, article.permalink())
    }

    pub fn category_path(&self, category: &Category) -> String {
        format!("{}/{}", self.site.category_prefix, category.permalink())
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.site.host)
    }

    pub fn chrome(&self) -> LayoutChrome {
        LayoutChrome {
            site_title: self.site.title.clone(),
            google_analytics_code: self.site.google_analytics_code.clone(),
            categories: self
                .generation
                .categories()
                .iter()
                .map(|category| self.category_link(category))
                .collect(),
        }
    }

    pub fn home(&self) -> LayoutContext<HomeView> {
        let title = if self.site.subtitle.is_empty() {
            self.site.title.clone()
        } else {
            format!("{} - {}", self.site.title, self.site.subtitle)
        };

        LayoutContext {
            chrome: self.chrome(),
            meta: PageMetaView {
                title,
                description: self.site.description.clone(),
                keywords: self.site.keywords.clone(),
            },
            content: HomeView {
                heading: self.site.title.clone(),
                subtitle: self.site.subtitle.clone(),
                articles: self
                    .generation
                    .articles()
                    .iter()
                    .take(self.site.home_limit.get())
                    .map(|article| self.article_summary(article))
                    .collect(),
            },
        }
    }

    pub fn article(&self, permalink: &str) -> Result<LayoutContext<ArticleView>, DomainError> {
        let article = self
            .generation
            .article(permalink)
            .ok_or_else(|| DomainError::not_found(PageKind::Article, permalink))?;
        let page = article.page();
        let parent = self.generation.parent_of(page);

        Ok(LayoutContext {
            chrome: self.chrome(),
            meta: PageMetaView {
                title: self.title(&page.heading(), parent.as_deref()),
                description: page
                    .description()
                    .map(str::to_string)
                    .or_else(|| self.site.description.clone()),
                keywords: page
                    .keywords()
                    .map(str::to_string)
                    .or_else(|| self.site.keywords.clone()),
            },
            content: ArticleView {
                heading: page.heading(),
                path: self.article_path(article),
                date: article.date().map(iso_date),
                body: page.body().to_string(),
                parent: parent.as_deref().map(|parent| self.category_link(parent)),
                comments_enabled: page.comments_enabled(),
                comments: self
                    .generation
                    .comments_for(article.permalink())
                    .iter()
                    .map(|comment| comment_view(comment))
                    .collect(),
            },
        })
    }

    pub fn category(&self, permalink: &str) -> Result<LayoutContext<CategoryView>, DomainError> {
        let category = self
            .generation
            .category(permalink)
            .ok_or_else(|| DomainError::not_found(PageKind::Category, permalink))?;
        let page = category.page();
        let parent = self.generation.parent_of(page);

        Ok(LayoutContext {
            chrome: self.chrome(),
            meta: PageMetaView {
                title: self.title(&page.heading(), parent.as_deref()),
                description: page
                    .description()
                    .map(str::to_string)
                    .or_else(|| self.site.description.clone()),
                keywords: page
                    .keywords()
                    .map(str::to_string)
                    .or_else(|| self.site.keywords.clone()),
            },
            content: CategoryView {
                heading: page.heading(),
                path: self.category_path(category),
                body: page.body().to_string(),
                parent: parent.as_deref().map(|parent| self.category_link(parent)),
                categories: self
                    .generation
                    .children_of(category)
                    .iter()
                    .map(|child| self.category_link(child))
                    .collect(),
                articles: self
                    .generation
                    .articles_in(category)
                    .iter()
                    .map(|article| self.article_summary(article))
                    .collect(),
            },
        })
    }

    /// Atom feed of the newest dated articles.
    pub fn feed(&self) -> FeedView {
        let articles: Vec<_> = self
            .generation
            .dated_articles()
            .take(self.site.feed_limit.get())
            .collect();
        let base_url = self.base_url();

        let entries = articles
            .iter()
            .filter_map(|article| {
                let date = article.date()?;
                let id = article.atom_id(&self.site.host, &self.site.article_prefix)?;
                Some(FeedEntry {
                    id,
                    title: article.heading(),
                    link: format!("{base_url}{}", self.article_path(article)),
                    published: iso_date(date),
                    summary: article
                        .is_summarized()
                        .then(|| article.summary().to_string()),
                    body: article.page().body().to_string(),
                })
            })
            .collect();

        FeedView {
            id: self.feed_id(),
            title: self.site.title.clone(),
            subtitle: self.site.subtitle.clone(),
            link: format!("{base_url}/"),
            self_link: format!("{base_url}{}.xml", self.site.article_prefix),
            updated: articles.first().and_then(|article| article.date()).map(iso_date),
            author: self.site.author.as_ref().map(|author| AuthorView {
                name: author.name.clone(),
                email: author.email.clone(),
                uri: author.uri.clone(),
            }),
            entries,
        }
    }

    /// `tag:` URI for the feed, dated by the oldest dated article so it stays
    /// stable as new articles arrive.
    pub fn feed_id(&self) -> String {
        let year = self
            .generation
            .dated_articles()
            .filter_map(|article| article.date())
            .min()
            .map(Date::year)
            .unwrap_or_else(|| OffsetDateTime::now_utc().year());
        format!(
            "tag:{},{year}:{}",
            self.site.host, self.site.article_prefix
        )
    }

    /// Every category and article with its modification time.
    pub fn sitemap(&self) -> SitemapView {
        let base_url = self.base_url();
        let categories = self.generation.categories().iter().map(|category| SitemapUrl {
            location: format!("{base_url}{}", self.category_path(category)),
            last_modified: category.page().last_modified(),
        });
        let articles = self.generation.articles().iter().map(|article| SitemapUrl {
            location: format!("{base_url}{}", self.article_path(article)),
            last_modified: article.page().last_modified(),
        });

        SitemapView {
            latest: self.generation.latest_page_modification(),
            urls: categories.chain(articles).collect(),
        }
    }

    fn title(&self, heading: &str, parent: Option<&Category>) -> String {
        match parent {
            Some(parent) => format!("{heading} - {}", parent.heading()),
            None => format!("{heading} - {}", self.site.title),
        }
    }

    fn category_link(&self, category: &Category) -> CategoryLink {
        CategoryLink {
            permalink: category.permalink().to_string(),
            heading: category.heading(),
            path: self.category_path(category),
        }
    }

    fn article_summary(&self, article: &Article) -> ArticleSummary {
        ArticleSummary {
            permalink: article.permalink().to_string(),
            heading: article.heading(),
            path: self.article_path(article),
            date: article.date().map(iso_date),
            summary: article.summary().to_string(),
            is_summarized: article.is_summarized(),
            read_more: article.read_more().to_string(),
        }
    }
}

fn comment_view(comment: &Comment) -> CommentView {
    CommentView {
        basename: comment.basename().to_string(),
        author: comment.author().map(str::to_string),
        author_url: comment.author_url().map(str::to_string),
        date: comment.date(),
        body: comment.body().to_string(),
    }
}
