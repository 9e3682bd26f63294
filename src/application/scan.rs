//! Walks the content directories and builds a [`Generation`].

use std::{
    collections::{HashMap, HashSet},
    ffi::OsStr,
    fs, io,
    path::{Path, PathBuf},
    time::Instant,
};

use metrics::{counter, histogram};
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};
use walkdir::{DirEntry, WalkDir};

use crate::{
    cache::GenerationToken,
    config::ContentSettings,
    domain::{
        Article, Category, Comment, Page, PageKind,
        metadata::{ParsedDocument, decode_content, parse_document},
        slug::permalink_from_path,
    },
};

use super::{
    error::{FileError, ScanError},
    generation::{Generation, LoadReport},
};

const METRIC_SCAN_TOTAL: &str = "quire_scan_total";
const METRIC_SCAN_FAILURES_TOTAL: &str = "quire_scan_failures_total";
const METRIC_FILE_ERRORS_TOTAL: &str = "quire_content_file_errors_total";
const METRIC_SCAN_MS: &str = "quire_scan_ms";

#[derive(Debug, Clone)]
struct DiscoveredFile {
    path: PathBuf,
    permalink: String,
}

/// Builds complete generations from the directories in [`ContentSettings`].
#[derive(Debug, Clone)]
pub struct Scanner {
    layout: ContentSettings,
}

impl Scanner {
    pub fn new(layout: ContentSettings) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ContentSettings {
        &self.layout
    }

    /// Scan the whole tree. Broken files are left out and reported; an
    /// unreadable tree or a permalink collision fails the scan.
    #[instrument(skip_all, fields(root = %self.layout.root.display(), generation = %token))]
    pub fn scan(&self, token: GenerationToken) -> Result<Generation, ScanError> {
        let started_at = Instant::now();
        counter!(METRIC_SCAN_TOTAL).increment(1);

        let result = self.scan_tree(token);
        histogram!(METRIC_SCAN_MS).record(started_at.elapsed().as_secs_f64() * 1000.0);

        match &result {
            Ok(generation) => info!(
                articles = generation.articles().len(),
                categories = generation.categories().len(),
                comments = generation.comments().len(),
                skipped = generation.report().errors.len(),
                "Content scan complete"
            ),
            Err(error) => {
                counter!(METRIC_SCAN_FAILURES_TOTAL).increment(1);
                warn!(error = %error, "Content scan failed");
            }
        }

        result
    }

    fn scan_tree(&self, token: GenerationToken) -> Result<Generation, ScanError> {
        ensure_root(&self.layout.root)?;

        let mut report = LoadReport::default();
        let category_files =
            self.discover(PageKind::Category, &self.layout.categories, &mut report)?;
        let article_files = self.discover(PageKind::Article, &self.layout.articles, &mut report)?;
        let comment_files = self.discover(PageKind::Comment, &self.layout.comments, &mut report)?;

        let mut category_pages = Vec::with_capacity(category_files.len());
        for file in &category_files {
            match load_page(file) {
                Ok(page) => category_pages.push((file, page)),
                Err(error) => record(&mut report, error),
            }
        }
        let known: HashSet<String> = category_pages
            .iter()
            .map(|(_, page)| page.permalink().to_string())
            .collect();

        let categories: Vec<Category> = category_pages
            .into_iter()
            .map(|(file, page)| {
                let parent = resolve_parent(&file.path, &self.layout.categories, &known, &file.permalink);
                Category::new(page.with_parent(parent))
            })
            .collect();

        let mut articles = Vec::with_capacity(article_files.len());
        for file in &article_files {
            let loaded = load_page(file).and_then(|page| {
                let parent = resolve_parent(&file.path, &self.layout.articles, &known, "");
                Article::new(page.with_parent(parent))
                    .map_err(|error| FileError::new(&file.path, error))
            });
            match loaded {
                Ok(article) => articles.push(article),
                Err(error) => record(&mut report, error),
            }
        }

        let mut comments = Vec::with_capacity(comment_files.len());
        for file in &comment_files {
            match load_comment(file) {
                Ok(comment) => comments.push(comment),
                Err(error) => record(&mut report, error),
            }
        }

        Ok(Generation::assemble(
            token, articles, categories, comments, report,
        ))
    }

    /// Content files under `dir` in file-name order. A missing sub-tree is
    /// treated as empty.
    fn discover(
        &self,
        kind: PageKind,
        dir: &Path,
        report: &mut LoadReport,
    ) -> Result<Vec<DiscoveredFile>, ScanError> {
        match fs::metadata(dir) {
            Ok(_) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(kind = %kind, path = %dir.display(), "Content directory absent");
                return Ok(Vec::new());
            }
            Err(error) => return Err(ScanError::io(dir, error)),
        }

        let mut files = Vec::new();
        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        let walker = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() || !self.has_extension(entry.path()) {
                continue;
            }
            report.files_seen += 1;

            let path = entry.into_path();
            let permalink = match permalink_from_path(&path) {
                Ok(permalink) => permalink,
                Err(error) => {
                    record(report, FileError::new(path, error));
                    continue;
                }
            };

            if let Some(first) = seen.get(&permalink) {
                return Err(ScanError::duplicate(kind, permalink, first.clone(), path));
            }
            seen.insert(permalink.clone(), path.clone());
            files.push(DiscoveredFile { path, permalink });
        }

        Ok(files)
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension().and_then(OsStr::to_str) == Some(self.layout.extension.as_str())
    }
}

fn ensure_root(root: &Path) -> Result<(), ScanError> {
    match fs::metadata(root) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(ScanError::io(root, io::Error::other("not a directory"))),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Err(ScanError::MissingRoot {
            path: root.to_path_buf(),
        }),
        Err(error) => Err(ScanError::io(root, error)),
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

fn record(report: &mut LoadReport, error: FileError) {
    warn!(path = %error.path.display(), error = %error.kind, "Skipping content file");
    counter!(METRIC_FILE_ERRORS_TOTAL).increment(1);
    report.errors.push(error);
}

fn read_document(path: &Path) -> Result<(ParsedDocument, OffsetDateTime), FileError> {
    let bytes = fs::read(path).map_err(|error| FileError::new(path, error))?;
    let modified = fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .map_err(|error| FileError::new(path, error))?;
    let text = decode_content(bytes).map_err(|error| FileError::new(path, error))?;
    Ok((parse_document(&text), OffsetDateTime::from(modified)))
}

fn load_page(file: &DiscoveredFile) -> Result<Page, FileError> {
    let (document, modified) = read_document(&file.path)?;
    Page::new(
        file.permalink.clone(),
        document,
        None,
        modified,
        file.path.clone(),
    )
    .map_err(|error| FileError::new(&file.path, error))
}

fn load_comment(file: &DiscoveredFile) -> Result<Comment, FileError> {
    let (document, modified) = read_document(&file.path)?;
    Comment::new(file.permalink.clone(), document, modified, file.path.clone())
        .map_err(|error| FileError::new(&file.path, error))
}

/// The nearest enclosing directory below `root` that names a known category,
/// other than `own`.
fn resolve_parent(
    path: &Path,
    root: &Path,
    known: &HashSet<String>,
    own: &str,
) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    relative
        .parent()?
        .ancestors()
        .filter_map(|dir| dir.file_name()?.to_str())
        .find(|name| *name != own && known.contains(*name))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;
    use crate::application::error::FileErrorKind;
    use crate::domain::error::ContentError;

    fn write(root: &Path, relative: &str, contents: &[u8]) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, contents).expect("write file");
    }

    fn scanner(root: &Path) -> Scanner {
        Scanner::new(ContentSettings::under(root))
    }

    #[test]
    fn missing_root_is_fatal() {
        let dir = TempDir::new().expect("tempdir");
        let root = dir.path().join("nowhere");
        let err = scanner(&root)
            .scan(GenerationToken::EMPTY)
            .expect_err("missing root");
        assert!(matches!(err, ScanError::MissingRoot { path } if path == root));
    }

    #[test]
    fn missing_sub_trees_are_empty() {
        let dir = TempDir::new().expect("tempdir");
        let generation = scanner(dir.path())
            .scan(GenerationToken::EMPTY)
            .expect("scan");
        assert!(generation.is_empty());
        assert!(generation.report().is_clean());
    }

    #[test]
    fn only_matching_extension_and_visible_files() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "articles/hello.mdown", b"Hello");
        write(dir.path(), "articles/notes.txt", b"ignored");
        write(dir.path(), "articles/.hello.mdown.swp", b"ignored");
        write(dir.path(), "articles/.drafts/secret.mdown", b"ignored");

        let generation = scanner(dir.path())
            .scan(GenerationToken::EMPTY)
            .expect("scan");
        let permalinks: Vec<_> = generation
            .articles()
            .iter()
            .map(|a| a.permalink())
            .collect();
        assert_eq!(permalinks, ["hello"]);
        assert_eq!(generation.report().files_seen, 1);
    }

    #[test]
    fn binary_file_is_reported_and_skipped() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "articles/good.mdown", b"Fine");
        write(dir.path(), "articles/bad.mdown", b"\x00\x01\x02");

        let generation = scanner(dir.path())
            .scan(GenerationToken::EMPTY)
            .expect("scan");
        assert_eq!(generation.articles().len(), 1);

        let errors = &generation.report().errors;
        assert_eq!(errors.len(), 1);
        assert!(errors[0].path.ends_with("articles/bad.mdown"));
        assert!(matches!(
            errors[0].kind,
            FileErrorKind::Content(ContentError::BinaryContent)
        ));
    }

    #[test]
    fn parent_is_nearest_known_category_directory() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "categories/recipes.mdown", b"# Recipes");
        write(dir.path(), "categories/recipes/baking.mdown", b"# Baking");
        write(dir.path(), "articles/recipes/unknown/baking/cake.mdown", b"Cake");
        write(dir.path(), "articles/recipes/soup.mdown", b"Soup");
        write(dir.path(), "articles/misc/loose.mdown", b"Loose");

        let generation = scanner(dir.path())
            .scan(GenerationToken::EMPTY)
            .expect("scan");

        let parent = |permalink: &str| {
            generation
                .article(permalink)
                .and_then(|a| a.page().parent().map(str::to_string))
        };
        assert_eq!(parent("cake").as_deref(), Some("baking"));
        assert_eq!(parent("soup").as_deref(), Some("recipes"));
        assert_eq!(parent("loose"), None);

        let baking = generation.category("baking").expect("baking");
        assert_eq!(baking.page().parent(), Some("recipes"));
    }

    #[test]
    fn category_does_not_parent_itself() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "categories/recipes/recipes.mdown", b"# Recipes");

        let generation = scanner(dir.path())
            .scan(GenerationToken::EMPTY)
            .expect("scan");
        let recipes = generation.category("recipes").expect("recipes");
        assert_eq!(recipes.page().parent(), None);
    }

    #[test]
    fn configured_extension_is_used() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "articles/hello.md", b"Hello");
        write(dir.path(), "articles/old.mdown", b"Old");

        let mut layout = ContentSettings::under(dir.path());
        layout.extension = "md".to_string();
        let generation = Scanner::new(layout)
            .scan(GenerationToken::EMPTY)
            .expect("scan");
        assert!(generation.article("hello").is_some());
        assert!(generation.article("old").is_none());
    }
}
