use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, builder::BoolishValueParser};

/// Command-line arguments for the Quire binary.
#[derive(Debug, Parser)]
#[command(name = "quire", version, about = "Flat-file content engine")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "QUIRE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Scan the content tree and report files that could not be loaded.
    Check(CheckArgs),
    /// List entities of one kind in listing order.
    List(ListArgs),
    /// Show a single entity by permalink.
    Show(ShowArgs),
    /// Print the latest modification time across content and templates.
    Freshness,
}

#[derive(Debug, Args, Default, Clone)]
pub struct CheckArgs {
    /// Fail when any single file could not be loaded, not only on fatal errors.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub strict: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ListArgs {
    #[arg(value_enum)]
    pub kind: ListKind,

    /// Print JSON instead of one line per entity.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    #[arg(value_enum)]
    pub kind: ShowKind,

    /// Permalink of a page, or basename of a comment.
    #[arg(value_name = "PERMALINK")]
    pub permalink: String,

    /// Print JSON instead of the raw document.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListKind {
    Articles,
    Categories,
    Comments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShowKind {
    Article,
    Category,
    Comment,
}

/// Overrides that apply whatever the subcommand.
#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the content root directory.
    #[arg(long = "content-root", value_name = "PATH", global = true)]
    pub content_root: Option<PathBuf>,

    /// Override the template source directory watched for freshness.
    #[arg(long = "templates", value_name = "PATH", global = true)]
    pub templates: Option<PathBuf>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,

    /// Toggle the response cache.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub cache_enabled: Option<bool>,
}
