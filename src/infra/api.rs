//! HTTP client for the content API.
//!
//! GET responses are stored in the shared [`RequestCache`] as JSON values and
//! served from it until they expire. Successful writes under
//! `api/articles/` drop every cached article read so counts, comments and
//! vote tallies are refetched.

use std::sync::Arc;
use std::time::Duration;

use newsdesk_api_types::{
    Ack, Article, ArticleQuery, Comment, ContactMessage, NewComment, Paginated, PublicSettings,
    VoteKind, VoteRequest, VoteStatus,
};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Method, Url};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::RequestCache;

const ARTICLES_PATH: &str = "api/articles/";
const CONTACT_PATH: &str = "api/contact/";
const PUBLIC_SETTINGS_PATH: &str = "api/settings/public/";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(err) => err.status().map(|status| status.as_u16()),
            ApiError::Url(_) | ApiError::Decode(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base: Url,
    cache: Arc<RequestCache>,
    cache_enabled: bool,
    cookies: Arc<Jar>,
}

impl ApiClient {
    /// `base_url` is joined with `/` so endpoint paths resolve beneath it.
    pub fn new(base_url: &str, timeout: Duration, cache: Arc<RequestCache>) -> Result<Self, ApiError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let cookies = Arc::new(Jar::default());
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .cookie_provider(Arc::clone(&cookies))
            .build()?;
        Ok(Self {
            client,
            base,
            cache,
            cache_enabled: true,
            cookies,
        })
    }

    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn user_agent() -> &'static str {
        concat!("newsdesk/", env!("CARGO_PKG_VERSION"))
    }

    pub fn cache(&self) -> &Arc<RequestCache> {
        &self.cache
    }

    /// Cookies the client currently sends to the API, as a `Cookie` header value.
    pub fn session_cookies(&self) -> Option<String> {
        let header = self.cookies.cookies(&self.base)?;
        header.to_str().ok().map(str::to_string)
    }

    /// Seed the jar from a value previously returned by [`Self::session_cookies`].
    pub fn restore_session_cookies(&self, header: &str) {
        for pair in header.split(';').map(str::trim).filter(|pair| !pair.is_empty()) {
            self.cookies.add_cookie_str(pair, &self.base);
        }
    }

    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base.join(path).map_err(ApiError::Url)
    }

    pub async fn list_articles(&self, query: &ArticleQuery) -> Result<Paginated<Article>, ApiError> {
        self.get_cached(ARTICLES_PATH, &query.to_pairs()).await
    }

    pub async fn search_articles(
        &self,
        term: &str,
        page: Option<u32>,
    ) -> Result<Paginated<Article>, ApiError> {
        let query = ArticleQuery {
            page,
            search: Some(term.to_string()),
            ..ArticleQuery::default()
        };
        self.list_articles(&query).await
    }

    pub async fn get_article(&self, slug: &str) -> Result<Article, ApiError> {
        self.get_cached(&format!("{ARTICLES_PATH}{slug}/"), &[]).await
    }

    pub async fn list_comments(&self, article_id: i64) -> Result<Vec<Comment>, ApiError> {
        self.get_cached(&format!("{ARTICLES_PATH}{article_id}/comments/"), &[])
            .await
    }

    pub async fn create_comment(
        &self,
        article_id: i64,
        comment: &NewComment,
    ) -> Result<Comment, ApiError> {
        let path = format!("{ARTICLES_PATH}{article_id}/comments/");
        let created = self.send(Method::POST, &path, Some(comment)).await?;
        self.invalidate_articles()?;
        Ok(created)
    }

    pub async fn vote_status(&self, article_id: i64) -> Result<VoteStatus, ApiError> {
        self.get_cached(&format!("{ARTICLES_PATH}{article_id}/vote-status/"), &[])
            .await
    }

    pub async fn vote(&self, article_id: i64, vote_type: VoteKind) -> Result<VoteStatus, ApiError> {
        let path = format!("{ARTICLES_PATH}{article_id}/vote/");
        let status = self
            .send(Method::POST, &path, Some(&VoteRequest { vote_type }))
            .await?;
        self.invalidate_articles()?;
        Ok(status)
    }

    pub async fn send_contact(&self, message: &ContactMessage) -> Result<Ack, ApiError> {
        self.send(Method::POST, CONTACT_PATH, Some(message)).await
    }

    pub async fn public_settings(&self) -> Result<PublicSettings, ApiError> {
        self.get_cached(PUBLIC_SETTINGS_PATH, &[]).await
    }

    /// Uncached request. A body of `None` sends no payload; an empty response
    /// body decodes as JSON `null`.
    pub async fn send<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let value = self.fetch(method, url, body).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// GET through the request cache. The cache key is the URL without its
    /// query string plus the query pairs as params.
    pub async fn get_cached<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        let params = query_params(query);

        if self.cache_enabled
            && let Some(value) = self.cache.get("GET", url.as_str(), params.as_ref())
        {
            return Ok(serde_json::from_value(value)?);
        }

        let mut request_url = url.clone();
        if !query.is_empty() {
            let mut pairs = request_url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        let value = self.fetch::<()>(Method::GET, request_url, None).await?;
        if self.cache_enabled {
            self.cache
                .set("GET", url.as_str(), params.as_ref(), value.clone());
        }
        Ok(serde_json::from_value(value)?)
    }

    fn invalidate_articles(&self) -> Result<(), ApiError> {
        let prefix = self.url(ARTICLES_PATH)?;
        let removed = self.cache.invalidate_prefix(prefix.as_str());
        debug!(prefix = %prefix, removed, "Invalidated cached article reads");
        Ok(())
    }

    async fn fetch<B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized,
    {
        debug!(method = %method, url = %url, "Content API request");
        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            warn!(method = %method, url = %url, status = status.as_u16(), "Content API error");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn query_params(query: &[(&str, String)]) -> Option<Value> {
    if query.is_empty() {
        return None;
    }
    let map: Map<String, Value> = query
        .iter()
        .map(|(key, value)| (key.to_string(), Value::String(value.clone())))
        .collect();
    Some(Value::Object(map))
}
