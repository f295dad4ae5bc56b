use std::{io::Read, path::Path, process, sync::Arc};

use newsdesk::{
    application::{
        auth::{AuthSessionStore, LoginOutcome},
        error::AppError,
        markup::{
            estimate_reading_minutes, extract_plain_text, format_text_preview, render_blocks,
            render_blocks_html, render_markup,
        },
        theme::{builtin_registry, merge_overrides},
    },
    cache::{CacheConfig, RequestCache, SystemClock, spawn_sweeper},
    config::{
        self, ArticleArgs, ArticlesArgs, Command, InputArgs, PreviewArgs, Settings, ThemeArgs,
    },
    infra::{api::ApiClient, auth::HttpAuthService, storage::FileStorage, telemetry},
};
use newsdesk_api_types::ArticleQuery;
use serde::Serialize;
use serde_json::json;
use time::format_description::well_known::Rfc3339;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    telemetry::init(&settings.logging)?;

    match cli_args.command {
        Command::Render(args) => run_render(&args).await,
        Command::Preview(args) => run_preview(&settings, &args).await,
        Command::Plain(args) => run_plain(&args).await,
        Command::Theme(args) => run_theme(&settings, &args),
        Command::Articles(args) => {
            with_api(&settings, |api| run_articles(api, &settings, args)).await
        }
        Command::Article(args) => with_api(&settings, |api| run_article(api, args)).await,
        Command::Settings => with_api(&settings, run_settings).await,
        Command::Login(args) => {
            let store = session_store(&settings)?;
            match store.login(&args.username, &args.password).await? {
                LoginOutcome::Success(user) => print_json(&user),
                LoginOutcome::Failure(reason) => {
                    Err(AppError::validation(format!("login failed: {reason}")))
                }
            }
        }
        Command::Logout => {
            let store = session_store(&settings)?;
            store.logout().await;
            info!("Signed out");
            Ok(())
        }
        Command::Whoami => {
            let store = session_store(&settings)?;
            let state = store.initialize().await;
            print_json(&json!({
                "authenticated": state.authenticated,
                "user": state.user,
            }))
        }
    }
}

async fn run_render(args: &InputArgs) -> Result<(), AppError> {
    let text = read_input(&args.file).await?;
    if args.json {
        return print_json(&render_blocks(&text));
    }
    println!("{}", render_markup(&text));
    Ok(())
}

async fn run_preview(settings: &Settings, args: &PreviewArgs) -> Result<(), AppError> {
    let text = read_input(&args.file).await?;
    let max_len = args.max_len.unwrap_or(settings.render.preview_length.get());
    println!("{}", format_text_preview(&text, max_len));
    Ok(())
}

async fn run_plain(args: &InputArgs) -> Result<(), AppError> {
    let html = read_input(&args.file).await?;
    let text = extract_plain_text(&html);
    if args.json {
        return print_json(&json!({
            "text": text,
            "reading_minutes": estimate_reading_minutes(&text),
        }));
    }
    println!("{text}");
    Ok(())
}

fn run_theme(settings: &Settings, args: &ThemeArgs) -> Result<(), AppError> {
    let registry = builtin_registry();
    if args.list {
        return print_json(&registry.names());
    }

    match args.name.as_deref() {
        Some(name) => print_json(registry.resolve(Some(name))),
        None => {
            let base = registry.resolve(Some(&settings.theme.name));
            print_json(&merge_overrides(base, &settings.theme.overrides))
        }
    }
}

async fn run_articles(
    api: Arc<ApiClient>,
    settings: &Settings,
    args: ArticlesArgs,
) -> Result<(), AppError> {
    let query = ArticleQuery {
        page: args.page,
        page_size: args.page_size,
        search: args.search,
    };
    let page = api.list_articles(&query).await?;
    let preview_len = settings.render.preview_length.get();

    let results: Vec<_> = page
        .results
        .iter()
        .map(|article| {
            let source = article.excerpt.as_deref().unwrap_or(&article.content);
            json!({
                "id": article.id,
                "slug": article.slug,
                "title": article.title,
                "preview": format_text_preview(source, preview_len),
                "reading_minutes": estimate_reading_minutes(&article.content),
                "published_at": article
                    .published_at
                    .and_then(|at| at.format(&Rfc3339).ok()),
            })
        })
        .collect();

    print_json(&json!({
        "count": page.count,
        "has_next": page.has_next(),
        "has_previous": page.has_previous(),
        "results": results,
    }))
}

async fn run_article(api: Arc<ApiClient>, args: ArticleArgs) -> Result<(), AppError> {
    let article = match api.get_article(&args.slug).await {
        Ok(article) => article,
        Err(err) if err.is_not_found() => return Err(AppError::NotFound),
        Err(err) => return Err(err.into()),
    };

    let blocks = render_blocks(&article.content);
    let comments = if args.comments {
        Some(api.list_comments(article.id).await?)
    } else {
        None
    };

    print_json(&json!({
        "id": article.id,
        "slug": article.slug,
        "title": article.title,
        "author": article.author,
        "reading_minutes": estimate_reading_minutes(&article.content),
        "html": render_blocks_html(&blocks),
        "comments": comments,
    }))
}

async fn run_settings(api: Arc<ApiClient>) -> Result<(), AppError> {
    let settings = api.public_settings().await?;
    print_json(&settings)
}

/// Run `f` with an API client whose cache is swept in the background for
/// the duration of the call.
async fn with_api<F, Fut>(settings: &Settings, f: F) -> Result<(), AppError>
where
    F: FnOnce(Arc<ApiClient>) -> Fut,
    Fut: std::future::Future<Output = Result<(), AppError>>,
{
    let (api, cache) = build_api(settings)?;
    let sweeper = settings
        .cache
        .enabled
        .then(|| spawn_sweeper(cache, settings.cache.sweep_interval));
    let result = f(api).await;
    if let Some(handle) = sweeper {
        handle.shutdown().await;
    }
    result
}

fn build_api(settings: &Settings) -> Result<(Arc<ApiClient>, Arc<RequestCache>), AppError> {
    let cache_config = CacheConfig::from(&settings.cache);
    let cache = Arc::new(RequestCache::with_clock(
        Arc::new(SystemClock),
        cache_config.default_ttl,
    ));
    let api = ApiClient::new(
        settings.api.base_url.as_str(),
        settings.api.timeout,
        Arc::clone(&cache),
    )?
    .with_cache_enabled(cache_config.enabled);
    Ok((Arc::new(api), cache))
}

fn session_store(settings: &Settings) -> Result<AuthSessionStore, AppError> {
    let (api, _) = build_api(settings)?;
    let service = Arc::new(HttpAuthService::new(api));
    let storage = Arc::new(FileStorage::new(&settings.session.storage_path));
    Ok(AuthSessionStore::new(service, storage))
}

async fn read_input(path: &Path) -> Result<String, AppError> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    Ok(tokio::fs::read_to_string(path).await?)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| AppError::unexpected(format!("failed to serialize output: {err}")))?;
    println!("{rendered}");
    Ok(())
}
