//! Publishes scanned generations and answers lookups against the current one.

use std::sync::{Arc, Mutex, RwLock};

use tracing::{debug, info};

use crate::{
    cache::GenerationToken,
    config::ContentSettings,
    domain::{Article, Category, Comment, Entity, Page, PageKind, error::DomainError},
};

use super::{
    error::ScanError,
    generation::Generation,
    lock::{mutex_lock, rw_read, rw_write},
    scan::Scanner,
};

const LOCK_TARGET: &str = "application::repository";

/// Permalink-addressed access to the content tree.
///
/// Readers clone the current `Arc<Generation>` and never wait on a scan. A
/// refresh builds the next generation off to the side and swaps it in with a
/// single write.
pub struct ContentRepository {
    scanner: Scanner,
    current: RwLock<Arc<Generation>>,
    /// Serializes refreshes; holds the last token whose scan failed.
    refresh_lock: Mutex<Option<GenerationToken>>,
}

impl ContentRepository {
    /// Scan once and publish the result. Fatal scan errors are returned.
    pub fn open(layout: ContentSettings, token: GenerationToken) -> Result<Self, ScanError> {
        let scanner = Scanner::new(layout);
        let generation = scanner.scan(token)?;
        Ok(Self::with_generation(scanner, generation))
    }

    pub fn with_generation(scanner: Scanner, generation: Generation) -> Self {
        Self {
            scanner,
            current: RwLock::new(Arc::new(generation)),
            refresh_lock: Mutex::new(None),
        }
    }

    /// The published generation.
    pub fn snapshot(&self) -> Arc<Generation> {
        Arc::clone(&rw_read(&self.current, LOCK_TARGET, "snapshot"))
    }

    pub fn token(&self) -> GenerationToken {
        rw_read(&self.current, LOCK_TARGET, "token").token()
    }

    pub fn layout(&self) -> &ContentSettings {
        self.scanner.layout()
    }

    pub fn find_by_permalink(&self, kind: PageKind, permalink: &str) -> Option<Entity> {
        self.snapshot().find(kind, permalink)
    }

    pub fn require(&self, kind: PageKind, permalink: &str) -> Result<Entity, DomainError> {
        self.find_by_permalink(kind, permalink)
            .ok_or_else(|| DomainError::not_found(kind, permalink))
    }

    pub fn find_all(&self, kind: PageKind) -> Vec<Entity> {
        self.snapshot().all(kind)
    }

    pub fn find_article(&self, permalink: &str) -> Option<Arc<Article>> {
        self.snapshot().article(permalink).cloned()
    }

    pub fn find_category(&self, permalink: &str) -> Option<Arc<Category>> {
        self.snapshot().category(permalink).cloned()
    }

    pub fn dated_articles(&self) -> Vec<Arc<Article>> {
        self.snapshot().dated_articles().cloned().collect()
    }

    pub fn comments_for(&self, article: &Article) -> Vec<Arc<Comment>> {
        self.snapshot().comments_for(article.permalink())
    }

    pub fn children_of(&self, category: &Category) -> Vec<Arc<Category>> {
        self.snapshot().children_of(category)
    }

    pub fn articles_in(&self, category: &Category) -> Vec<Arc<Article>> {
        self.snapshot().articles_in(category)
    }

    pub fn parent_of(&self, page: &Page) -> Option<Arc<Category>> {
        self.snapshot().parent_of(page)
    }

    /// Rescan when `token` differs from the published generation's.
    ///
    /// Returns whether a new generation was published. On error the previous
    /// generation stays in place, and the same token is not scanned again.
    pub fn refresh(&self, token: GenerationToken) -> Result<bool, ScanError> {
        if self.token() == token {
            return Ok(false);
        }

        let mut failed = mutex_lock(&self.refresh_lock, LOCK_TARGET, "refresh");
        let published = self.token();
        if published == token {
            debug!(generation = %token, "Generation already published by another caller");
            return Ok(false);
        }
        if *failed == Some(token) {
            debug!(generation = %token, "Tree unchanged since the last failed scan");
            return Ok(false);
        }

        let generation = match self.scanner.scan(token) {
            Ok(generation) => generation,
            Err(error) => {
                *failed = Some(token);
                return Err(error);
            }
        };
        *failed = None;
        *rw_write(&self.current, LOCK_TARGET, "publish") = Arc::new(generation);
        info!(previous = %published, generation = %token, "Published content generation");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::thread;

    use tempfile::TempDir;
    use time::macros::datetime;

    use super::*;

    fn token(day: u8) -> GenerationToken {
        let base = datetime!(2009-01-01 0:00 UTC);
        GenerationToken::at(base.replace_day(day).expect("valid day"))
    }

    #[test]
    fn same_token_does_not_rescan() {
        let dir = TempDir::new().expect("tempdir");
        let repository =
            ContentRepository::open(ContentSettings::under(dir.path()), token(1)).expect("open");

        fs::create_dir_all(dir.path().join("articles")).expect("mkdir");
        fs::write(dir.path().join("articles/hello.mdown"), "Hello").expect("write");

        assert!(!repository.refresh(token(1)).expect("refresh"));
        assert!(repository.find_article("hello").is_none());

        assert!(repository.refresh(token(2)).expect("refresh"));
        assert!(repository.find_article("hello").is_some());
        assert_eq!(repository.token(), token(2));
    }

    #[test]
    fn snapshots_survive_a_refresh() {
        let dir = TempDir::new().expect("tempdir");
        fs::create_dir_all(dir.path().join("articles")).expect("mkdir");
        fs::write(dir.path().join("articles/hello.mdown"), "Hello").expect("write");
        let repository =
            ContentRepository::open(ContentSettings::under(dir.path()), token(1)).expect("open");

        let before = repository.snapshot();
        fs::remove_file(dir.path().join("articles/hello.mdown")).expect("remove");
        repository.refresh(token(2)).expect("refresh");

        assert!(before.article("hello").is_some());
        assert!(repository.find_article("hello").is_none());
    }

    #[test]
    fn concurrent_refreshes_publish_once() {
        let dir = TempDir::new().expect("tempdir");
        let repository = Arc::new(
            ContentRepository::open(ContentSettings::under(dir.path()), token(1)).expect("open"),
        );

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let repository = Arc::clone(&repository);
                thread::spawn(move || repository.refresh(token(2)).expect("refresh"))
            })
            .collect();
        let published = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread"))
            .filter(|published| *published)
            .count();

        assert_eq!(published, 1);
        assert_eq!(repository.token(), token(2));
    }

    #[test]
    fn failed_token_is_not_rescanned() {
        let dir = TempDir::new().expect("tempdir");
        let articles = dir.path().join("articles");
        fs::create_dir_all(articles.join("nested")).expect("mkdir");
        fs::write(articles.join("hello.mdown"), "Hello").expect("write");
        let repository =
            ContentRepository::open(ContentSettings::under(dir.path()), token(1)).expect("open");

        fs::write(articles.join("nested/hello.mdown"), "Clash").expect("write");
        assert!(matches!(
            repository.refresh(token(2)),
            Err(ScanError::DuplicatePermalink { .. })
        ));

        // Same token: the broken tree is not walked again.
        fs::remove_file(articles.join("nested/hello.mdown")).expect("remove");
        fs::write(articles.join("bye.mdown"), "Bye").expect("write");
        assert!(!repository.refresh(token(2)).expect("skipped"));
        assert!(repository.find_article("bye").is_none());
        assert_eq!(repository.token(), token(1));

        assert!(repository.refresh(token(3)).expect("refresh"));
        assert!(repository.find_article("bye").is_some());
    }

    #[test]
    fn require_reports_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let repository =
            ContentRepository::open(ContentSettings::under(dir.path()), token(1)).expect("open");

        let err = repository
            .require(PageKind::Article, "missing")
            .expect_err("not found");
        assert!(matches!(
            err,
            DomainError::NotFound { kind: PageKind::Article, ref permalink } if permalink == "missing"
        ));
    }
}
