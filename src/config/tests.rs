use std::io::Write;

use clap::Parser;
use config::Map;

use super::*;

fn env_source(pairs: &[(&str, &str)]) -> Environment {
    let map: Map<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    environment().source(Some(map))
}

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp config file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn defaults_are_valid() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.api.base_url.as_str(), "http://127.0.0.1:8000/");
    assert_eq!(settings.api.timeout, Duration::from_secs(10));
    assert!(settings.cache.enabled);
    assert_eq!(settings.cache.default_ttl, Duration::from_secs(30));
    assert_eq!(settings.cache.sweep_interval, Duration::from_secs(60));
    assert_eq!(settings.theme.name, "modern");
    assert!(settings.theme.overrides.is_empty());
    assert_eq!(settings.render.preview_length.get(), 150);
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.api.base_url = Some("https://file.example/".to_string());
    raw.logging.level = Some("info".to_string());
    raw.cache.enabled = Some(true);

    let overrides = GlobalOverrides {
        api_base_url: Some("https://cli.example/".to_string()),
        log_level: Some("debug".to_string()),
        no_cache: true,
        ..Default::default()
    };

    raw.apply_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.api.base_url.as_str(), "https://cli.example/");
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert!(!settings.cache.enabled);
}

#[test]
fn file_then_env_then_cli() {
    let file = config_file(
        r#"
[api]
base_url = "https://file.example"
timeout_seconds = 3

[cache]
default_ttl_seconds = 5
sweep_interval_seconds = 9

[theme]
name = "classic"
"#,
    );

    let args = CliArgs::parse_from([
        "newsdesk",
        "--config-file",
        file.path().to_str().expect("utf-8 path"),
        "--theme",
        "dark",
        "settings",
    ]);
    let env = env_source(&[
        ("NEWSDESK__CACHE__DEFAULT_TTL_SECONDS", "12"),
        ("NEWSDESK__THEME__NAME", "minimal"),
    ]);

    let settings = load_with_environment(&args, env).expect("valid settings");

    assert_eq!(settings.api.base_url.as_str(), "https://file.example/");
    assert_eq!(settings.api.timeout, Duration::from_secs(3));
    assert_eq!(settings.cache.default_ttl, Duration::from_secs(12));
    assert_eq!(settings.cache.sweep_interval, Duration::from_secs(9));
    assert_eq!(settings.theme.name, "dark");
}

#[test]
fn theme_overrides_load_from_file() {
    let file = config_file(
        r##"
[theme]
name = "newspaper"

[theme.overrides.fonts]
heading = "Lora"
body = "Lora"

[theme.overrides.components]
card = "border"
"##,
    );

    let args = CliArgs::parse_from([
        "newsdesk",
        "--config-file",
        file.path().to_str().expect("utf-8 path"),
        "settings",
    ]);
    let settings = load_with_environment(&args, env_source(&[])).expect("valid settings");

    let fonts = settings.theme.overrides.fonts.expect("font override");
    assert_eq!(fonts.heading.as_deref(), Some("Lora"));
    assert!(settings.theme.overrides.colors.is_none());
    let components = settings.theme.overrides.components.expect("components");
    assert_eq!(components.get("card").map(String::as_str), Some("border"));
}

#[test]
fn partial_palette_override_loads() {
    let file = config_file(
        r##"
[theme.overrides.colors]
primary = "#ff0000"
"##,
    );

    let args = CliArgs::parse_from([
        "newsdesk",
        "--config-file",
        file.path().to_str().expect("utf-8 path"),
        "theme",
    ]);
    let settings = load_with_environment(&args, env_source(&[])).expect("valid settings");

    let colors = settings.theme.overrides.colors.expect("colour override");
    assert_eq!(colors.primary.as_deref(), Some("#ff0000"));
    assert!(colors.secondary.is_none());
    assert!(settings.theme.overrides.fonts.is_none());
}

#[test]
fn base_url_gains_trailing_slash() {
    let mut raw = RawSettings::default();
    raw.api.base_url = Some("https://news.example/backend".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.api.base_url.as_str(), "https://news.example/backend/");
    assert_eq!(
        settings.api.base_url.join("api/articles/").expect("join").as_str(),
        "https://news.example/backend/api/articles/"
    );
}

#[test]
fn rejects_non_http_base_url() {
    let mut raw = RawSettings::default();
    raw.api.base_url = Some("ftp://news.example/".to_string());
    let err = Settings::from_raw(raw).expect_err("ftp rejected");
    assert!(matches!(err, LoadError::Invalid { key: "api.base_url", .. }));
}

#[test]
fn rejects_zero_durations() {
    let mut raw = RawSettings::default();
    raw.cache.default_ttl_seconds = Some(0);
    let err = Settings::from_raw(raw).expect_err("zero ttl rejected");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.default_ttl_seconds",
            ..
        }
    ));

    let mut raw = RawSettings::default();
    raw.render.preview_length = Some(0);
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn rejects_unknown_log_level() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("chatty".to_string());
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "logging.level",
            ..
        })
    ));
}

#[test]
fn blank_theme_name_falls_back_to_default() {
    let mut raw = RawSettings::default();
    raw.theme.name = Some("   ".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.theme.name, "modern");
}

#[test]
fn cli_json_logging_enforces_format() {
    let args = CliArgs::parse_from(["newsdesk", "whoami", "--log-json", "true"]);
    let mut raw = RawSettings::default();
    raw.apply_overrides(&args.overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
    assert!(matches!(args.command, Command::Whoami));
}

#[test]
fn parse_preview_arguments() {
    let args = CliArgs::parse_from(["newsdesk", "preview", "body.md", "--max-len", "80"]);
    match args.command {
        Command::Preview(preview) => {
            assert_eq!(preview.file, std::path::Path::new("body.md"));
            assert_eq!(preview.max_len, Some(80));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn render_reads_stdin_by_default() {
    let args = CliArgs::parse_from(["newsdesk", "render"]);
    match args.command {
        Command::Render(input) => {
            assert_eq!(input.file, std::path::Path::new("-"));
            assert!(!input.json);
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_articles_arguments() {
    let args = CliArgs::parse_from([
        "newsdesk",
        "articles",
        "--page",
        "2",
        "--page-size",
        "5",
        "--search",
        "rust",
        "--no-cache",
    ]);

    assert!(args.overrides.no_cache);
    match args.command {
        Command::Articles(list) => {
            assert_eq!(list.page, Some(2));
            assert_eq!(list.page_size, Some(5));
            assert_eq!(list.search.as_deref(), Some("rust"));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_login_arguments() {
    let args = CliArgs::parse_from(["newsdesk", "login", "editor", "--password", "hunter2"]);
    match args.command {
        Command::Login(login) => {
            assert_eq!(login.username, "editor");
            assert_eq!(login.password, "hunter2");
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn theme_list_conflicts_with_name() {
    let result = CliArgs::try_parse_from(["newsdesk", "theme", "dark", "--list"]);
    assert!(result.is_err());
}
