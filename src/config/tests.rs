use std::path::Path;

use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.content.root = Some(PathBuf::from("from-file"));
    raw.logging.level = Some("info".to_string());

    let overrides = GlobalOverrides {
        content_root: Some(PathBuf::from("from-cli")),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.content.root, Path::new("from-cli"));
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_follow_conventional_layout() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.content, ContentSettings::under("content"));
    assert_eq!(settings.content.articles, Path::new("content/articles"));
    assert_eq!(settings.content.templates, Path::new("views"));
    assert_eq!(settings.content.extension, "mdown");
    assert_eq!(settings.cache, CacheSettings::default());
    assert_eq!(settings.site.home_limit.get(), 8);
    assert_eq!(settings.site.feed_limit.get(), 10);
    assert_eq!(settings.site.article_prefix, "/articles");
    assert_eq!(settings.site.category_prefix, "");
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn sub_directories_follow_overridden_root() {
    let mut raw = RawSettings::default();
    raw.content.comments = Some(PathBuf::from("elsewhere/comments"));
    raw.apply_overrides(&GlobalOverrides {
        content_root: Some(PathBuf::from("site")),
        ..Default::default()
    });

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.content.articles, Path::new("site/articles"));
    assert_eq!(settings.content.categories, Path::new("site/categories"));
    assert_eq!(settings.content.comments, Path::new("elsewhere/comments"));
}

#[test]
fn out_of_root_directories_are_watched() {
    let content = ContentSettings {
        comments: PathBuf::from("elsewhere/comments"),
        ..ContentSettings::under("site")
    };

    assert_eq!(
        content.watched_roots(),
        vec![
            PathBuf::from("site"),
            PathBuf::from("elsewhere/comments"),
            PathBuf::from("views"),
        ]
    );
}

#[test]
fn extension_loses_leading_dot() {
    let mut raw = RawSettings::default();
    raw.content.extension = Some(".md".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.content.extension, "md");
}

#[test]
fn empty_extension_is_rejected() {
    let mut raw = RawSettings::default();
    raw.content.extension = Some(" . ".to_string());
    let err = Settings::from_raw(raw).expect_err("empty extension");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "content.extension",
            ..
        }
    ));
}

#[test]
fn zero_limits_are_rejected() {
    let mut raw = RawSettings::default();
    raw.site.feed_limit = Some(0);
    let err = Settings::from_raw(raw).expect_err("zero feed limit");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "site.feed_limit",
            ..
        }
    ));
}

#[test]
fn prefixes_are_normalized() {
    let mut raw = RawSettings::default();
    raw.site.article_prefix = Some("/posts/".to_string());
    raw.site.category_prefix = Some("/".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.site.article_prefix, "/posts");
    assert_eq!(settings.site.category_prefix, "");

    let mut raw = RawSettings::default();
    raw.site.article_prefix = Some("posts".to_string());
    let err = Settings::from_raw(raw).expect_err("relative prefix");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "site.article_prefix",
            ..
        }
    ));
}

#[test]
fn author_requires_a_name() {
    let mut raw = RawSettings::default();
    raw.site.author_email = Some("me@example.com".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.site.author, None);

    let mut raw = RawSettings::default();
    raw.site.author_name = Some(" Ada ".to_string());
    raw.site.author_uri = Some("  ".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(
        settings.site.author,
        Some(AuthorSettings {
            name: "Ada".to_string(),
            email: None,
            uri: None,
        })
    );
}

#[test]
fn invalid_log_level_is_reported() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("chatty".to_string());
    let err = Settings::from_raw(raw).expect_err("bad level");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "logging.level",
            ..
        }
    ));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    raw.apply_overrides(&GlobalOverrides {
        log_json: Some(true),
        ..Default::default()
    });

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn cache_can_be_enabled_from_cli() {
    let mut raw = RawSettings::default();
    raw.cache.http_cache = Some(true);
    raw.apply_overrides(&GlobalOverrides {
        cache_enabled: Some(true),
        ..Default::default()
    });

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(
        settings.cache,
        CacheSettings {
            enabled: true,
            http_cache: true,
        }
    );
}

#[test]
fn no_subcommand_parses() {
    let args = CliArgs::parse_from(["quire"]);
    assert!(args.command.is_none());
    assert!(args.config_file.is_none());
}

#[test]
fn parse_list_arguments() {
    let args = CliArgs::parse_from(["quire", "list", "articles", "--json"]);
    match args.command.expect("list command") {
        Command::List(list) => {
            assert_eq!(list.kind, ListKind::Articles);
            assert!(list.json);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_show_arguments_with_global_override_after_subcommand() {
    let args = CliArgs::parse_from([
        "quire",
        "show",
        "category",
        "recipes",
        "--content-root",
        "/srv/site",
    ]);

    assert_eq!(
        args.overrides.content_root.as_deref(),
        Some(Path::new("/srv/site"))
    );
    match args.command.expect("show command") {
        Command::Show(show) => {
            assert_eq!(show.kind, ShowKind::Category);
            assert_eq!(show.permalink, "recipes");
            assert!(!show.json);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_check_strict() {
    let args = CliArgs::parse_from(["quire", "check", "--strict"]);
    assert!(matches!(
        args.command,
        Some(Command::Check(CheckArgs { strict: true }))
    ));
}
