//! Core types for xpost

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a post goes live or stays a draft on the remote platform
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    #[default]
    Draft,
    Published,
}

impl PublishStatus {
    pub fn is_published(&self) -> bool {
        matches!(self, PublishStatus::Published)
    }
}

impl std::fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishStatus::Draft => write!(f, "draft"),
            PublishStatus::Published => write!(f, "published"),
        }
    }
}

/// Canonical, platform-agnostic article
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub title: String,
    pub content: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub canonical_url: Option<String>,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub publish_status: PublishStatus,
    pub published_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            description: None,
            tags: Vec::new(),
            canonical_url: None,
            cover_image: None,
            publish_status: PublishStatus::Draft,
            published_at: None,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_canonical_url(mut self, url: impl Into<String>) -> Self {
        self.canonical_url = Some(url.into());
        self
    }

    pub fn with_cover_image(mut self, url: impl Into<String>) -> Self {
        self.cover_image = Some(url.into());
        self
    }

    pub fn published(mut self) -> Self {
        self.publish_status = PublishStatus::Published;
        self
    }
}

/// Engagement counters reported by a platform
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostStats {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}

/// A post as it exists on a remote platform after a successful call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlatformPost {
    pub platform_id: String,
    pub platform: String,
    pub title: String,
    pub content: String,
    pub publish_status: PublishStatus,
    pub platform_url: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub canonical_url: Option<String>,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub stats: PostStats,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Paging options for listing a user's posts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// 1-based page number
    pub page: u32,
    pub per_page: u32,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 30,
        }
    }
}

/// What happened on one platform during a dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Create or update succeeded
    Posted(PlatformPost),
    /// Delete succeeded
    Deleted { platform_id: String },
    /// Any failure, reduced to its message
    Failed(String),
}

/// Result of one platform attempt within a dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformResult {
    /// Registry key (e.g., "devto", "hashnode")
    pub platform: String,
    pub outcome: Outcome,
}

impl PlatformResult {
    pub fn posted(platform: impl Into<String>, post: PlatformPost) -> Self {
        Self {
            platform: platform.into(),
            outcome: Outcome::Posted(post),
        }
    }

    pub fn deleted(platform: impl Into<String>, platform_id: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            outcome: Outcome::Deleted {
                platform_id: platform_id.into(),
            },
        }
    }

    pub fn failed(platform: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            outcome: Outcome::Failed(error.into()),
        }
    }

    pub fn success(&self) -> bool {
        !matches!(self.outcome, Outcome::Failed(_))
    }

    pub fn platform_post(&self) -> Option<&PlatformPost> {
        match &self.outcome {
            Outcome::Posted(post) => Some(post),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Remote identifier touched by this result, if any
    pub fn platform_id(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Posted(post) => Some(&post.platform_id),
            Outcome::Deleted { platform_id } => Some(platform_id),
            Outcome::Failed(_) => None,
        }
    }
}

impl Serialize for PlatformResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Flat<'a> {
            platform: &'a str,
            success: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            platform_id: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            platform_post: Option<&'a PlatformPost>,
            #[serde(skip_serializing_if = "Option::is_none")]
            error: Option<&'a str>,
        }

        Flat {
            platform: &self.platform,
            success: self.success(),
            platform_id: self.platform_id(),
            platform_post: self.platform_post(),
            error: self.error(),
        }
        .serialize(serializer)
    }
}

/// Aggregate of a single cross-post operation
///
/// Counts are derived from `results`, so `total == successful + failed ==
/// results.len()` always holds.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DispatchReport {
    total: usize,
    successful: usize,
    failed: usize,
    results: Vec<PlatformResult>,
}

impl DispatchReport {
    pub fn from_results(results: Vec<PlatformResult>) -> Self {
        let successful = results.iter().filter(|r| r.success()).count();
        Self {
            total: results.len(),
            successful,
            failed: results.len() - successful,
            results,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn successful(&self) -> usize {
        self.successful
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn results(&self) -> &[PlatformResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<PlatformResult> {
        self.results
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    pub fn result_for(&self, platform: &str) -> Option<&PlatformResult> {
        self.results.iter().find(|r| r.platform == platform)
    }
}
