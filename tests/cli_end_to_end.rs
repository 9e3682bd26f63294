use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

fn site() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    let write = |relative: &str, contents: &str| {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, contents).expect("write");
    };
    write("content/categories/recipes.mdown", "# Recipes\n\nFood.");
    write(
        "content/articles/recipes/hello.mdown",
        "description: A test post\ndate: 01 January 2020\n\n# Hello World\n\nBody text here.",
    );
    write("content/articles/draft.mdown", "Undated.");
    dir
}

fn quire(cwd: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("quire"));
    cmd.current_dir(cwd)
        .env_remove("QUIRE_CONFIG_FILE")
        .env_remove("RUST_LOG")
        .arg("--log-level")
        .arg("error");
    cmd
}

#[test]
fn check_reports_counts() {
    let dir = site();
    quire(dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(contains("2 articles, 1 categories, 0 comments; 3 of 3 files loaded"));
}

#[test]
fn strict_check_fails_on_broken_files() {
    let dir = site();
    fs::write(
        dir.path().join("content/articles/broken.mdown"),
        "date: someday\n\nBroken.",
    )
    .expect("write");

    quire(dir.path()).arg("check").assert().success().stdout(contains("broken.mdown"));
    quire(dir.path())
        .args(["check", "--strict"])
        .assert()
        .failure();
}

#[test]
fn list_articles_in_listing_order() {
    let dir = site();
    quire(dir.path())
        .args(["list", "articles"])
        .assert()
        .success()
        .stdout("2020-01-01\thello\tHello World\n-\tdraft\tDraft\n");
}

#[test]
fn show_article_as_json() {
    let dir = site();
    let assert = quire(dir.path())
        .args(["show", "article", "hello", "--json"])
        .assert()
        .success();

    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    let value: serde_json::Value = serde_json::from_str(&output).expect("valid json");
    assert_eq!(value["kind"], "article");
    assert_eq!(value["permalink"], "hello");
    assert_eq!(value["heading"], "Hello World");
    assert_eq!(value["parent"], "recipes");
    assert_eq!(value["date"], "2020-01-01");
    assert_eq!(value["metadata"][0], serde_json::json!(["description", "A test post"]));
}

#[test]
fn show_missing_category_fails() {
    let dir = site();
    quire(dir.path())
        .args(["show", "category", "nowhere"])
        .assert()
        .failure()
        .stderr(contains("category `nowhere` not found"));
}

#[test]
fn content_root_can_be_overridden() {
    let dir = site();
    let elsewhere = TempDir::new().expect("tempdir");
    quire(elsewhere.path())
        .arg("--content-root")
        .arg(dir.path().join("content"))
        .args(["list", "categories"])
        .assert()
        .success()
        .stdout(contains("recipes"));
}

#[test]
fn missing_content_root_fails() {
    let dir = TempDir::new().expect("tempdir");
    quire(dir.path()).arg("check").assert().failure();
}
