use std::collections::HashSet;
use std::fs;

use metrics_util::debugging::DebuggingRecorder;
use quire::{
    application::{error::ScanError, repository::ContentRepository},
    cache::{CacheConfig, GenerationToken, ResponseCache, ResponseKey},
    config::ContentSettings,
    infra::telemetry,
};
use tempfile::TempDir;
use time::macros::datetime;

#[test]
fn cache_and_scan_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");
    telemetry::describe_metrics();

    // Response cache miss, hit and bypass
    let token = GenerationToken::at(datetime!(2009-01-01 0:00 UTC));
    let key = ResponseKey::new("/", "");
    let cache = ResponseCache::new(&CacheConfig::fully_enabled());
    cache.get_or_compute(&key, token, || "home".to_string());
    cache.get_or_compute(&key, token, || "home".to_string());
    let disabled = ResponseCache::new(&CacheConfig::default());
    disabled.get_or_compute(&key, token, || "home".to_string());

    // A scan with one broken file, then one that fails outright
    let dir = TempDir::new().expect("tempdir");
    let articles = dir.path().join("articles");
    fs::create_dir_all(articles.join("nested")).expect("mkdir");
    fs::write(articles.join("hello.mdown"), "Hello").expect("write");
    fs::write(articles.join("broken.mdown"), "date: someday\n\nBroken").expect("write");
    let repository = ContentRepository::open(ContentSettings::under(dir.path()), token)
        .expect("scan with a broken file still succeeds");

    fs::write(articles.join("nested/hello.mdown"), "Clash").expect("write");
    let later = GenerationToken::at(datetime!(2009-01-02 0:00 UTC));
    assert!(matches!(
        repository.refresh(later),
        Err(ScanError::DuplicatePermalink { .. })
    ));

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "quire_response_cache_hit_total",
        "quire_response_cache_miss_total",
        "quire_response_cache_bypass_total",
        "quire_scan_total",
        "quire_scan_failures_total",
        "quire_content_file_errors_total",
        "quire_scan_ms",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
