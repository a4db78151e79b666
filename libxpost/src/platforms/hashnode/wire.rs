//! Hashnode GraphQL payloads and their mapping to the canonical model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{HASHNODE_NAME, MAX_TAGS, MAX_TAG_LENGTH, MAX_TITLE_LENGTH};
use crate::platforms::tags::{slugify, tag_violations};
use crate::platforms::{common_violations, Transformer};
use crate::types::{PlatformPost, Post, PostStats, PublishStatus};

/// Data the Hashnode transformer needs beyond the post itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashnodeContext {
    pub publication_id: String,
}

/// Input for `publishPost`, `createDraft` and (with `id`) `updatePost`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub content_markdown: String,
    pub publication_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub tags: Vec<TagInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image_options: Option<CoverImageInput>,
    #[serde(rename = "originalArticleURL", skip_serializing_if = "Option::is_none")]
    pub original_article_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagInput {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CoverImageInput {
    #[serde(rename = "coverImageURL")]
    pub cover_image_url: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Content {
    pub markdown: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CoverImage {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RemoteTag {
    pub name: Option<String>,
    pub slug: Option<String>,
}

/// Post or draft as returned by the Hashnode API
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HashnodePost {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub subtitle: Option<String>,
    pub brief: Option<String>,
    pub url: Option<String>,
    pub canonical_url: Option<String>,
    pub published_at: Option<String>,
    pub updated_at: Option<String>,
    pub views: Option<u64>,
    pub reaction_count: Option<u64>,
    pub response_count: Option<u64>,
    pub content: Option<Content>,
    pub tags: Option<Vec<RemoteTag>>,
    pub cover_image: Option<CoverImage>,
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HashnodeTransformer;

impl Transformer for HashnodeTransformer {
    type Request = PostInput;
    type Remote = HashnodePost;
    type Context = HashnodeContext;

    fn to_wire(&self, post: &Post, context: &HashnodeContext) -> PostInput {
        let mut tags: Vec<TagInput> = Vec::new();
        for tag in &post.tags {
            let slug = slugify(tag, MAX_TAG_LENGTH);
            if slug.is_empty() || tags.iter().any(|t| t.slug == slug) {
                continue;
            }
            tags.push(TagInput {
                name: tag.trim().chars().take(MAX_TAG_LENGTH).collect(),
                slug,
            });
        }
        tags.truncate(MAX_TAGS);

        PostInput {
            id: None,
            title: post.title.trim().to_string(),
            content_markdown: post.content.clone(),
            publication_id: context.publication_id.clone(),
            subtitle: post.description.clone(),
            tags,
            cover_image_options: post.cover_image.clone().map(|url| CoverImageInput {
                cover_image_url: url,
            }),
            original_article_url: post.canonical_url.clone(),
            published_at: post.published_at,
        }
    }

    fn from_wire(&self, remote: HashnodePost) -> PlatformPost {
        let published_at = parse_timestamp(remote.published_at.as_deref());

        PlatformPost {
            platform_id: remote.id,
            platform: HASHNODE_NAME.to_string(),
            title: remote.title,
            content: remote
                .content
                .and_then(|c| c.markdown)
                .unwrap_or_default(),
            publish_status: if published_at.is_some() {
                PublishStatus::Published
            } else {
                PublishStatus::Draft
            },
            platform_url: remote.url,
            description: remote.subtitle.or(remote.brief).filter(|d| !d.is_empty()),
            tags: remote
                .tags
                .unwrap_or_default()
                .into_iter()
                .filter_map(|t| t.slug.or(t.name))
                .collect(),
            canonical_url: remote.canonical_url,
            cover_image: remote.cover_image.and_then(|c| c.url),
            stats: PostStats {
                views: remote.views.unwrap_or(0),
                likes: remote.reaction_count.unwrap_or(0),
                comments: remote.response_count.unwrap_or(0),
            },
            published_at,
            updated_at: parse_timestamp(remote.updated_at.as_deref()),
        }
    }

    fn validate(&self, post: &Post) -> Vec<String> {
        let mut violations = common_violations(HASHNODE_NAME, post, MAX_TITLE_LENGTH);
        violations.extend(tag_violations(
            HASHNODE_NAME,
            &post.tags,
            MAX_TAGS,
            MAX_TAG_LENGTH,
        ));
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> HashnodeContext {
        HashnodeContext {
            publication_id: "pub-1".to_string(),
        }
    }

    #[test]
    fn test_to_wire_structured_tags() {
        let post = Post::new("Async Rust", "body")
            .with_tags(["Rust Lang", "rust-lang", "Tokio!"])
            .with_description("A tour")
            .with_cover_image("https://img.example.com/c.png")
            .with_canonical_url("https://blog.example.com/async");

        let input = HashnodeTransformer.to_wire(&post, &context());
        assert_eq!(
            input.tags,
            vec![
                TagInput {
                    name: "Rust Lang".to_string(),
                    slug: "rust-lang".to_string()
                },
                TagInput {
                    name: "Tokio!".to_string(),
                    slug: "tokio".to_string()
                },
            ]
        );
        assert_eq!(input.publication_id, "pub-1");
        assert_eq!(input.subtitle.as_deref(), Some("A tour"));
        assert!(input.id.is_none());
    }

    #[test]
    fn test_to_wire_json_field_names() {
        let post = Post::new("T", "body")
            .with_cover_image("https://img.example.com/c.png")
            .with_canonical_url("https://blog.example.com/t");
        let json = serde_json::to_value(HashnodeTransformer.to_wire(&post, &context())).unwrap();

        assert_eq!(json["contentMarkdown"], "body");
        assert_eq!(json["publicationId"], "pub-1");
        assert_eq!(json["originalArticleURL"], "https://blog.example.com/t");
        assert_eq!(
            json["coverImageOptions"]["coverImageURL"],
            "https://img.example.com/c.png"
        );
        assert!(json.get("id").is_none());
        assert!(json.get("subtitle").is_none());
    }

    #[test]
    fn test_from_wire_full_post() {
        let remote: HashnodePost = serde_json::from_value(serde_json::json!({
            "id": "65a1",
            "title": "Async Rust",
            "subtitle": null,
            "brief": "A tour of async",
            "url": "https://me.hashnode.dev/async-rust",
            "publishedAt": "2024-01-12T10:00:00.000Z",
            "updatedAt": "2024-01-13T10:00:00.000Z",
            "views": 120,
            "reactionCount": 8,
            "responseCount": 2,
            "content": { "markdown": "body" },
            "tags": [{ "name": "Rust", "slug": "rust" }],
            "coverImage": { "url": "https://cdn.hashnode.com/c.png" }
        }))
        .unwrap();

        let post = HashnodeTransformer.from_wire(remote);
        assert_eq!(post.platform_id, "65a1");
        assert_eq!(post.platform, "Hashnode");
        assert_eq!(post.content, "body");
        assert_eq!(post.description.as_deref(), Some("A tour of async"));
        assert_eq!(post.tags, vec!["rust"]);
        assert_eq!(post.publish_status, PublishStatus::Published);
        assert_eq!(post.stats, PostStats { views: 120, likes: 8, comments: 2 });
        assert_eq!(post.cover_image.as_deref(), Some("https://cdn.hashnode.com/c.png"));
    }

    #[test]
    fn test_from_wire_draft_with_missing_fields() {
        let remote: HashnodePost =
            serde_json::from_value(serde_json::json!({ "id": "d1" })).unwrap();
        let post = HashnodeTransformer.from_wire(remote);
        assert_eq!(post.platform_id, "d1");
        assert_eq!(post.publish_status, PublishStatus::Draft);
        assert_eq!(post.stats, PostStats::default());
        assert!(post.tags.is_empty());
    }

    #[test]
    fn test_validate_limits() {
        let post = Post::new("t".repeat(251), "body")
            .with_tags(["a", "b", "c", "d", "e", "f"]);
        let violations = HashnodeTransformer.validate(&post);
        assert_eq!(violations.len(), 2);
        assert!(violations[0].contains("250 character limit"));
        assert_eq!(violations[1], "Hashnode allows at most 5 tags (got 6)");
    }
}
