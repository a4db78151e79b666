//! Platform abstraction and implementations
//!
//! Each blogging platform is a [`Platform`] client: it authenticates, runs
//! create/update/delete/get/list against its API and reports every failure
//! through the shared error taxonomy. Mapping between the canonical
//! [`Post`] and a platform's request/response shapes lives in a
//! [`Transformer`], which is pure and never touches the network.
//!
//! # Examples
//!
//! ```no_run
//! use libxpost::config::{DevToCredentials, HttpConfig};
//! use libxpost::platforms::{devto::DevToClient, Platform};
//! use libxpost::retry::RetryPolicy;
//! use libxpost::types::Post;
//!
//! # async fn example() -> libxpost::error::Result<()> {
//! let credentials = DevToCredentials {
//!     api_key: "your-api-key".to_string(),
//!     base_url: "https://dev.to/api".to_string(),
//! };
//! let client = DevToClient::new(&credentials, &HttpConfig::default(), RetryPolicy::default())?;
//!
//! client.authenticate().await?;
//! let post = Post::new("Hello", "# Hello\n\nFirst post").with_tags(["rust"]);
//! let created = client.create_post(&post).await?;
//! println!("Created {} at {:?}", created.platform_id, created.platform_url);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use reqwest::Url;

use crate::error::{PlatformError, Result};
use crate::types::{ListOptions, PlatformPost, Post};

pub mod devto;
pub mod hashnode;
pub mod http;
pub mod tags;

// Public so integration tests can use it
pub mod mock;

/// Unified interface to one blogging platform
#[async_trait]
pub trait Platform: Send + Sync {
    /// Registry key (e.g., "devto", "hashnode")
    fn key(&self) -> &str;

    /// Human-readable platform name (e.g., "Dev.to")
    fn name(&self) -> &str;

    /// Verify the credentials with a lightweight call
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Authentication` when the platform rejects the
    /// credentials, or a remote error when it cannot be reached.
    async fn authenticate(&self) -> Result<bool>;

    /// Platform-specific constraint violations for `post` (empty when valid)
    fn validate(&self, post: &Post) -> Vec<String>;

    /// Create a new remote post
    ///
    /// Validation runs first; an invalid post never reaches the network.
    async fn create_post(&self, post: &Post) -> Result<PlatformPost>;

    /// Replace the remote post `platform_id` with `post`
    async fn update_post(&self, platform_id: &str, post: &Post) -> Result<PlatformPost>;

    /// Delete the remote post `platform_id`
    async fn delete_post(&self, platform_id: &str) -> Result<bool>;

    /// Fetch one remote post
    async fn get_post(&self, platform_id: &str) -> Result<PlatformPost>;

    /// List the authenticated user's posts
    ///
    /// Platforms without a listing endpoint keep this default, which fails
    /// instead of returning an empty list.
    async fn list_posts(&self, _options: &ListOptions) -> Result<Vec<PlatformPost>> {
        Err(PlatformError::NotImplemented(format!(
            "list posts is not implemented for {}",
            self.name()
        ))
        .into())
    }
}

/// Pure mapping between the canonical post and one platform's wire format
pub trait Transformer {
    /// Request payload sent to the platform
    type Request;
    /// Remote object returned by the platform
    type Remote;
    /// Extra platform data needed to build a request
    type Context;

    fn to_wire(&self, post: &Post, context: &Self::Context) -> Self::Request;

    /// Must tolerate missing optional fields
    fn from_wire(&self, remote: Self::Remote) -> PlatformPost;

    fn validate(&self, post: &Post) -> Vec<String>;
}

/// Rules every platform applies: non-empty title and body, title ceiling,
/// well-formed URLs
pub(crate) fn common_violations(platform: &str, post: &Post, max_title: usize) -> Vec<String> {
    let mut violations = Vec::new();

    let title_len = post.title.trim().chars().count();
    if title_len == 0 {
        violations.push("Title cannot be empty".to_string());
    } else if title_len > max_title {
        violations.push(format!(
            "Title exceeds {}'s {} character limit (current: {} characters)",
            platform, max_title, title_len
        ));
    }

    if post.content.trim().is_empty() {
        violations.push("Content cannot be empty".to_string());
    }

    for (field, value) in [
        ("canonical_url", &post.canonical_url),
        ("cover_image", &post.cover_image),
    ] {
        if let Some(value) = value {
            let valid = Url::parse(value)
                .map(|u| matches!(u.scheme(), "http" | "https"))
                .unwrap_or(false);
            if !valid {
                violations.push(format!("{} '{}' is not an http(s) URL", field, value));
            }
        }
    }

    violations
}

/// Collapse a violation list into a single validation error
pub(crate) fn ensure_valid(platform: &str, violations: Vec<String>) -> Result<()> {
    if violations.is_empty() {
        return Ok(());
    }
    Err(PlatformError::Validation(format!("{}: {}", platform, violations.join("; "))).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::XpostError;

    #[test]
    fn test_common_violations_empty_fields() {
        let post = Post::new("   ", "");
        let violations = common_violations("Dev.to", &post, 128);
        assert_eq!(
            violations,
            vec!["Title cannot be empty", "Content cannot be empty"]
        );
    }

    #[test]
    fn test_common_violations_title_length() {
        let post = Post::new("t".repeat(129), "body");
        let violations = common_violations("Dev.to", &post, 128);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("128 character limit"));
    }

    #[test]
    fn test_common_violations_urls() {
        let post = Post::new("T", "body")
            .with_canonical_url("not a url")
            .with_cover_image("ftp://example.com/x.png");
        let violations = common_violations("Dev.to", &post, 128);
        assert_eq!(violations.len(), 2);

        let post = Post::new("T", "body").with_canonical_url("https://blog.example.com/t");
        assert!(common_violations("Dev.to", &post, 128).is_empty());
    }

    #[test]
    fn test_ensure_valid_joins_violations() {
        assert!(ensure_valid("Dev.to", vec![]).is_ok());

        let err = ensure_valid("Dev.to", vec!["a".to_string(), "b".to_string()]).unwrap_err();
        match err {
            XpostError::Platform(PlatformError::Validation(msg)) => {
                assert_eq!(msg, "Dev.to: a; b");
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }
}
