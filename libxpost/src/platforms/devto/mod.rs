//! Dev.to platform implementation
//!
//! Talks to the Forem REST API (`https://dev.to/api`) with the `api-key`
//! header. Create, update, get, delete and list all go through the client's
//! [`RetryPolicy`].

use async_trait::async_trait;
use reqwest::{Method, Response};

use crate::config::{DevToCredentials, HttpConfig};
use crate::error::Result;
use crate::platforms::http::{build_client, ensure_success, map_transport_error, read_json};
use crate::platforms::{ensure_valid, Platform, Transformer};
use crate::retry::RetryPolicy;
use crate::types::{ListOptions, PlatformPost, Post};

pub mod wire;

use self::wire::{ArticleEnvelope, DevToArticle, DevToTransformer};

pub const DEVTO_KEY: &str = "devto";
pub const DEVTO_NAME: &str = "Dev.to";

pub const MAX_TITLE_LENGTH: usize = 128;
pub const MAX_TAGS: usize = 4;
pub const MAX_TAG_LENGTH: usize = 30;

/// Dev.to caps `per_page` at 1000
const MAX_PER_PAGE: u32 = 1000;

pub struct DevToClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
    transformer: DevToTransformer,
}

impl DevToClient {
    /// Create a new Dev.to client
    ///
    /// # Arguments
    ///
    /// * `credentials` - API key and base URL (validated at config load)
    /// * `http` - Timeout and user agent for the owned HTTP client
    /// * `retry` - Retry policy applied to every article operation
    pub fn new(credentials: &DevToCredentials, http: &HttpConfig, retry: RetryPolicy) -> Result<Self> {
        Ok(Self {
            http: build_client(http)?,
            base_url: credentials.base_url.trim_end_matches('/').to_string(),
            api_key: credentials.api_key.clone(),
            retry,
            transformer: DevToTransformer,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// One HTTP exchange; non-success statuses come back as errors
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&ArticleEnvelope>,
        context: &str,
    ) -> Result<Response> {
        let mut request = self
            .http
            .request(method, self.url(path))
            .header("api-key", &self.api_key)
            .header("accept", "application/vnd.forem.api-v1+json");

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| map_transport_error(DEVTO_NAME, context, e))?;
        ensure_success(DEVTO_NAME, context, response).await
    }

    async fn fetch_article(
        &self,
        method: Method,
        path: &str,
        body: Option<&ArticleEnvelope>,
        context: &str,
    ) -> Result<PlatformPost> {
        let response = self
            .retry
            .execute(context, || self.send(method.clone(), path, &[], body, context))
            .await?;
        let article: DevToArticle = read_json(DEVTO_NAME, context, response).await?;
        Ok(self.transformer.from_wire(article))
    }
}

#[async_trait]
impl Platform for DevToClient {
    fn key(&self) -> &str {
        DEVTO_KEY
    }

    fn name(&self) -> &str {
        DEVTO_NAME
    }

    async fn authenticate(&self) -> Result<bool> {
        tracing::debug!("Verifying Dev.to API key");
        self.send(Method::GET, "/users/me", &[], None, "authenticate")
            .await?;
        Ok(true)
    }

    fn validate(&self, post: &Post) -> Vec<String> {
        self.transformer.validate(post)
    }

    async fn create_post(&self, post: &Post) -> Result<PlatformPost> {
        ensure_valid(DEVTO_NAME, self.validate(post))?;
        let body = self.transformer.to_wire(post, &());

        tracing::debug!("Creating Dev.to article: {}", body.article.title);
        let created = self
            .fetch_article(Method::POST, "/articles", Some(&body), "create article")
            .await?;
        tracing::debug!("Created Dev.to article {}", created.platform_id);
        Ok(created)
    }

    async fn update_post(&self, platform_id: &str, post: &Post) -> Result<PlatformPost> {
        ensure_valid(DEVTO_NAME, self.validate(post))?;
        let body = self.transformer.to_wire(post, &());
        let path = format!("/articles/{}", platform_id);

        self.fetch_article(Method::PUT, &path, Some(&body), "update article")
            .await
    }

    async fn delete_post(&self, platform_id: &str) -> Result<bool> {
        let path = format!("/articles/{}", platform_id);
        self.retry
            .execute("delete article", || {
                self.send(Method::DELETE, &path, &[], None, "delete article")
            })
            .await?;
        Ok(true)
    }

    async fn get_post(&self, platform_id: &str) -> Result<PlatformPost> {
        let path = format!("/articles/{}", platform_id);
        self.fetch_article(Method::GET, &path, None, "get article")
            .await
    }

    async fn list_posts(&self, options: &ListOptions) -> Result<Vec<PlatformPost>> {
        let query = [
            ("page", options.page.max(1).to_string()),
            ("per_page", options.per_page.clamp(1, MAX_PER_PAGE).to_string()),
        ];

        let response = self
            .retry
            .execute("list articles", || {
                self.send(Method::GET, "/articles/me/all", &query, None, "list articles")
            })
            .await?;
        let articles: Vec<DevToArticle> = read_json(DEVTO_NAME, "list articles", response).await?;

        Ok(articles
            .into_iter()
            .map(|a| self.transformer.from_wire(a))
            .collect())
    }
}
