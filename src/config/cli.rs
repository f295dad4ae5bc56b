use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the newsdesk binary.
#[derive(Debug, Parser)]
#[command(
    name = "newsdesk",
    version,
    about = "Render article markup and browse the newsdesk content API"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "NEWSDESK_CONFIG_FILE", value_name = "PATH", global = true)]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the content API base URL.
    #[arg(long = "api-base-url", value_name = "URL", global = true)]
    pub api_base_url: Option<String>,

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

    /// Override the active theme.
    #[arg(long = "theme", value_name = "NAME", global = true)]
    pub theme: Option<String>,

    /// Bypass the request cache.
    #[arg(long = "no-cache", action = clap::ArgAction::SetTrue, global = true)]
    pub no_cache: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render a markup file to HTML.
    Render(InputArgs),
    /// Print a one-line teaser of a markup file.
    Preview(PreviewArgs),
    /// Strip tags and entities from an HTML file.
    Plain(InputArgs),
    /// Show a theme descriptor, or list the available themes.
    Theme(ThemeArgs),
    /// List published articles.
    Articles(ArticlesArgs),
    /// Show one article, rendered.
    Article(ArticleArgs),
    /// Show the public site settings.
    Settings,
    /// Sign in to the content API.
    Login(LoginArgs),
    /// Sign out and forget the stored session.
    Logout,
    /// Show the signed-in user.
    Whoami,
}

#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Input file; `-` reads standard input.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath, default_value = "-")]
    pub file: PathBuf,

    /// Print the parsed block tree as JSON instead of HTML.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct PreviewArgs {
    /// Input file; `-` reads standard input.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath, default_value = "-")]
    pub file: PathBuf,

    /// Maximum preview length in characters (defaults to `render.preview_length`).
    #[arg(long = "max-len", value_name = "CHARS")]
    pub max_len: Option<usize>,
}

#[derive(Debug, Args, Clone)]
pub struct ThemeArgs {
    /// Theme name; the configured theme when omitted.
    #[arg(value_name = "NAME")]
    pub name: Option<String>,

    /// List registered theme names.
    #[arg(long, action = clap::ArgAction::SetTrue, conflicts_with = "name")]
    pub list: bool,
}

#[derive(Debug, Args, Clone, Default)]
pub struct ArticlesArgs {
    #[arg(long, value_name = "N")]
    pub page: Option<u32>,

    #[arg(long = "page-size", value_name = "N")]
    pub page_size: Option<u32>,

    /// Full-text search term.
    #[arg(long, value_name = "TERM")]
    pub search: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ArticleArgs {
    #[arg(value_name = "SLUG")]
    pub slug: String,

    /// Also list the article's comments.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub comments: bool,
}

#[derive(Debug, Args, Clone)]
pub struct LoginArgs {
    #[arg(value_name = "USERNAME")]
    pub username: String,

    #[arg(
        long,
        env = "NEWSDESK_PASSWORD",
        hide_env_values = true,
        value_name = "PASSWORD"
    )]
    pub password: String,
}
