//! Mock platform implementation for testing
//!
//! A configurable [`Platform`] that simulates successes, failures and
//! latency without credentials or network access. Call counters are shared
//! through `Arc`, so a test can keep a handle to them after the mock has been
//! moved into a registry.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{PlatformError, Result};
use crate::platforms::{common_violations, ensure_valid, Platform};
use crate::types::{ListOptions, PlatformPost, Post, PostStats};

/// Shared call counters for a mock platform
#[derive(Debug, Clone, Default)]
pub struct MockCounters {
    auth_calls: Arc<AtomicUsize>,
    remote_calls: Arc<AtomicUsize>,
    posted_titles: Arc<Mutex<Vec<String>>>,
}

impl MockCounters {
    /// Number of times authenticate was called
    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    /// Number of create/update/delete/get/list calls that passed validation
    pub fn remote_calls(&self) -> usize {
        self.remote_calls.load(Ordering::SeqCst)
    }

    /// Titles of posts that were created or updated
    pub fn posted_titles(&self) -> Vec<String> {
        self.posted_titles
            .lock()
            .map(|titles| titles.clone())
            .unwrap_or_default()
    }

    fn record_title(&self, title: &str) {
        if let Ok(mut titles) = self.posted_titles.lock() {
            titles.push(title.to_string());
        }
    }
}

/// Configuration for mock platform behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Registry key (e.g., "mock-devto")
    pub key: String,

    /// Display name; defaults to the key
    pub name: String,

    /// Error returned by authenticate
    pub auth_error: Option<PlatformError>,

    /// Error returned by every post operation
    pub operation_error: Option<PlatformError>,

    /// Delay before completing operations (simulates network latency)
    pub delay: Duration,

    /// Tag ceiling enforced by validate
    pub max_tags: Option<usize>,

    /// Id given to created posts; a fresh uuid when unset
    pub post_id: Option<String>,

    /// Report deletes as not performed (`Ok(false)`)
    pub unconfirmed_delete: bool,

    pub counters: MockCounters,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            key: "mock".to_string(),
            name: "mock".to_string(),
            auth_error: None,
            operation_error: None,
            delay: Duration::from_millis(0),
            max_tags: None,
            post_id: None,
            unconfirmed_delete: false,
            counters: MockCounters::default(),
        }
    }
}

/// Mock platform for testing
pub struct MockPlatform {
    config: MockConfig,
}

impl MockPlatform {
    /// Create a new mock platform with the given configuration
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// Create a mock platform that always succeeds
    pub fn success(key: &str) -> Self {
        Self::new(MockConfig {
            key: key.to_string(),
            name: key.to_string(),
            ..Default::default()
        })
    }

    /// Create a mock platform whose credentials are rejected
    pub fn auth_failure(key: &str, error: &str) -> Self {
        Self::new(MockConfig {
            auth_error: Some(PlatformError::Authentication(error.to_string())),
            ..Self::success(key).config
        })
    }

    /// Create a mock platform whose post operations fail with `error`
    pub fn failing(key: &str, error: PlatformError) -> Self {
        Self::new(MockConfig {
            operation_error: Some(error),
            ..Self::success(key).config
        })
    }

    /// Create a mock platform with a delay on every call
    pub fn with_delay(key: &str, delay: Duration) -> Self {
        Self::new(MockConfig {
            delay,
            ..Self::success(key).config
        })
    }

    /// Create a mock platform that rejects more than `max_tags` tags
    pub fn with_max_tags(key: &str, max_tags: usize) -> Self {
        Self::new(MockConfig {
            max_tags: Some(max_tags),
            ..Self::success(key).config
        })
    }

    /// Handle to this mock's call counters
    pub fn counters(&self) -> MockCounters {
        self.config.counters.clone()
    }

    async fn simulate(&self) -> Result<()> {
        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }
        self.config.counters.remote_calls.fetch_add(1, Ordering::SeqCst);

        match &self.config.operation_error {
            Some(err) => Err(err.clone().into()),
            None => Ok(()),
        }
    }

    fn remote_post(&self, platform_id: String, post: &Post) -> PlatformPost {
        PlatformPost {
            platform_url: Some(format!("https://{}.example.com/posts/{}", self.config.key, platform_id)),
            platform_id,
            platform: self.config.name.clone(),
            title: post.title.clone(),
            content: post.content.clone(),
            publish_status: post.publish_status,
            description: post.description.clone(),
            tags: post.tags.clone(),
            canonical_url: post.canonical_url.clone(),
            cover_image: post.cover_image.clone(),
            stats: PostStats::default(),
            published_at: post.published_at,
            updated_at: None,
        }
    }
}

#[async_trait]
impl Platform for MockPlatform {
    fn key(&self) -> &str {
        &self.config.key
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    async fn authenticate(&self) -> Result<bool> {
        self.config.counters.auth_calls.fetch_add(1, Ordering::SeqCst);

        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }

        match &self.config.auth_error {
            Some(err) => Err(err.clone().into()),
            None => Ok(true),
        }
    }

    fn validate(&self, post: &Post) -> Vec<String> {
        let mut violations = common_violations(&self.config.name, post, usize::MAX);
        if let Some(max) = self.config.max_tags {
            if post.tags.len() > max {
                violations.push(format!(
                    "{} allows at most {} tags (got {})",
                    self.config.name,
                    max,
                    post.tags.len()
                ));
            }
        }
        violations
    }

    async fn create_post(&self, post: &Post) -> Result<PlatformPost> {
        ensure_valid(&self.config.name, self.validate(post))?;
        self.simulate().await?;
        self.config.counters.record_title(&post.title);

        let id = self
            .config
            .post_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        Ok(self.remote_post(id, post))
    }

    async fn update_post(&self, platform_id: &str, post: &Post) -> Result<PlatformPost> {
        ensure_valid(&self.config.name, self.validate(post))?;
        self.simulate().await?;
        self.config.counters.record_title(&post.title);
        Ok(self.remote_post(platform_id.to_string(), post))
    }

    async fn delete_post(&self, _platform_id: &str) -> Result<bool> {
        self.simulate().await?;
        Ok(!self.config.unconfirmed_delete)
    }

    async fn get_post(&self, platform_id: &str) -> Result<PlatformPost> {
        self.simulate().await?;
        let post = Post::new(format!("Post {}", platform_id), "mock content");
        Ok(self.remote_post(platform_id.to_string(), &post))
    }

    async fn list_posts(&self, options: &ListOptions) -> Result<Vec<PlatformPost>> {
        self.simulate().await?;
        let start = (options.page.max(1) - 1).saturating_mul(options.per_page);
        Ok((start..start.saturating_add(options.per_page.min(3)))
            .map(|n| {
                let post = Post::new(format!("Post {}", n + 1), "mock content");
                self.remote_post((n + 1).to_string(), &post)
            })
            .collect())
    }
}
