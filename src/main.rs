use std::{
    io::{self, Write},
    process,
};

use quire::{
    application::{error::AppError, freshness::FreshnessOracle, repository::ContentRepository},
    config::{self, CheckArgs, ListArgs, ListKind, Settings, ShowArgs, ShowKind},
    domain::{Entity, PageKind, dates::http_date},
    infra::{error::InfraError, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

fn main() {
    if let Err(error) = run() {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let report = error.report();
    if dispatcher::has_been_set() {
        error!(error = %report.joined(), "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %report.joined(), "application error");
    });
}

fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Check(CheckArgs::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Check(args) => run_check(&settings, args),
        config::Command::List(args) => run_list(&settings, args),
        config::Command::Show(args) => run_show(&settings, args),
        config::Command::Freshness => run_freshness(&settings),
    }
}

fn open_repository(settings: &Settings) -> Result<ContentRepository, AppError> {
    let token = FreshnessOracle::from_settings(&settings.content).current();
    Ok(ContentRepository::open(settings.content.clone(), token)?)
}

fn run_check(settings: &Settings, args: CheckArgs) -> Result<(), AppError> {
    let repository = open_repository(settings)?;
    let generation = repository.snapshot();
    let report = generation.report();

    let mut out = io::stdout().lock();
    for error in &report.errors {
        writeln!(out, "{error}").map_err(InfraError::from)?;
    }
    writeln!(
        out,
        "{} articles, {} categories, {} comments; {} of {} files loaded",
        generation.articles().len(),
        generation.categories().len(),
        generation.comments().len(),
        report.loaded(),
        report.files_seen,
    )
    .map_err(InfraError::from)?;

    info!(
        generation = %generation.token(),
        skipped = report.errors.len(),
        "Content check complete"
    );

    if args.strict && !report.is_clean() {
        return Err(AppError::validation(format!(
            "{} content files could not be loaded",
            report.errors.len()
        )));
    }
    Ok(())
}

fn run_list(settings: &Settings, args: ListArgs) -> Result<(), AppError> {
    let repository = open_repository(settings)?;
    let kind = match args.kind {
        ListKind::Articles => PageKind::Article,
        ListKind::Categories => PageKind::Category,
        ListKind::Comments => PageKind::Comment,
    };
    let entities = repository.find_all(kind);

    let mut out = io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &entities).map_err(InfraError::from)?;
        writeln!(out).map_err(InfraError::from)?;
        return Ok(());
    }

    for entity in &entities {
        writeln!(out, "{}", summary_line(entity)).map_err(InfraError::from)?;
    }
    Ok(())
}

fn summary_line(entity: &Entity) -> String {
    match entity {
        Entity::Article(article) => {
            let date = article
                .date()
                .map(quire::domain::dates::iso_date)
                .unwrap_or_else(|| "-".to_string());
            format!("{date}\t{}\t{}", article.permalink(), article.heading())
        }
        Entity::Category(category) => format!(
            "{}\t{}\t{}",
            category.permalink(),
            category.page().parent().unwrap_or("-"),
            category.heading()
        ),
        Entity::Comment(comment) => format!(
            "{}\t{}\t{}",
            comment.basename(),
            comment.article().unwrap_or("-"),
            comment.author().unwrap_or("anonymous")
        ),
    }
}

fn run_show(settings: &Settings, args: ShowArgs) -> Result<(), AppError> {
    let repository = open_repository(settings)?;
    let kind = match args.kind {
        ShowKind::Article => PageKind::Article,
        ShowKind::Category => PageKind::Category,
        ShowKind::Comment => PageKind::Comment,
    };
    let entity = repository.require(kind, &args.permalink)?;

    let mut out = io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &entity).map_err(InfraError::from)?;
        writeln!(out).map_err(InfraError::from)?;
        return Ok(());
    }

    let (header, heading, body) = match &entity {
        Entity::Comment(comment) => (comment.metadata().to_header(), None, comment.body()),
        _ => match entity.page() {
            Some(page) => (
                page.metadata().to_header(),
                page.explicit_heading(),
                page.body(),
            ),
            None => return Err(AppError::unexpected("page entity without a page")),
        },
    };

    if !header.is_empty() {
        writeln!(out, "{}", header.trim_end()).map_err(InfraError::from)?;
        writeln!(out).map_err(InfraError::from)?;
    }
    if let Some(heading) = heading {
        writeln!(out, "# {heading}").map_err(InfraError::from)?;
        writeln!(out).map_err(InfraError::from)?;
    }
    writeln!(out, "{body}").map_err(InfraError::from)?;
    Ok(())
}

fn run_freshness(settings: &Settings) -> Result<(), AppError> {
    let token = FreshnessOracle::from_settings(&settings.content).current();
    let line = token
        .timestamp()
        .map(http_date)
        .unwrap_or_else(|| "never".to_string());
    writeln!(io::stdout().lock(), "{line}").map_err(InfraError::from)?;
    Ok(())
}
