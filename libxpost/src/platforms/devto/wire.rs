//! Dev.to article payloads and their mapping to the canonical model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DEVTO_NAME, MAX_TAGS, MAX_TAG_LENGTH, MAX_TITLE_LENGTH};
use crate::platforms::tags::{sanitize_tags, tag_violations};
use crate::platforms::{common_violations, Transformer};
use crate::types::{PlatformPost, Post, PostStats, PublishStatus};

/// Body of `POST /articles` and `PUT /articles/{id}`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ArticleEnvelope {
    pub article: ArticleBody,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ArticleBody {
    pub title: String,
    pub body_markdown: String,
    pub published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_image: Option<String>,
}

/// `tag_list` is a comma string on single-article endpoints and an array on
/// `/articles/me/*`
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TagList {
    Joined(String),
    List(Vec<String>),
}

impl TagList {
    fn into_vec(self) -> Vec<String> {
        match self {
            TagList::List(tags) => tags,
            TagList::Joined(joined) => joined
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

/// Article as returned by the Dev.to API
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct DevToArticle {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub body_markdown: Option<String>,
    pub url: Option<String>,
    pub canonical_url: Option<String>,
    pub cover_image: Option<String>,
    pub tag_list: Option<TagList>,
    pub tags: Option<TagList>,
    pub published: Option<bool>,
    pub published_at: Option<String>,
    pub edited_at: Option<String>,
    pub page_views_count: Option<u64>,
    pub public_reactions_count: Option<u64>,
    pub positive_reactions_count: Option<u64>,
    pub comments_count: Option<u64>,
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DevToTransformer;

impl Transformer for DevToTransformer {
    type Request = ArticleEnvelope;
    type Remote = DevToArticle;
    type Context = ();

    fn to_wire(&self, post: &Post, _context: &()) -> ArticleEnvelope {
        // Dev.to tags are alphanumeric only
        let tags = sanitize_tags(&post.tags, MAX_TAG_LENGTH)
            .into_iter()
            .map(|t| t.replace('-', ""))
            .filter(|t| !t.is_empty())
            .take(MAX_TAGS)
            .collect();

        ArticleEnvelope {
            article: ArticleBody {
                title: post.title.trim().to_string(),
                body_markdown: post.content.clone(),
                published: post.publish_status.is_published(),
                description: post.description.clone(),
                tags,
                canonical_url: post.canonical_url.clone(),
                main_image: post.cover_image.clone(),
            },
        }
    }

    fn from_wire(&self, remote: DevToArticle) -> PlatformPost {
        let published_at = parse_timestamp(remote.published_at.as_deref());
        let published = remote.published.unwrap_or(published_at.is_some());
        let tags = remote
            .tag_list
            .or(remote.tags)
            .map(TagList::into_vec)
            .unwrap_or_default();

        PlatformPost {
            platform_id: remote.id.to_string(),
            platform: DEVTO_NAME.to_string(),
            title: remote.title,
            content: remote.body_markdown.unwrap_or_default(),
            publish_status: if published {
                PublishStatus::Published
            } else {
                PublishStatus::Draft
            },
            platform_url: remote.url,
            description: remote.description.filter(|d| !d.is_empty()),
            tags,
            canonical_url: remote.canonical_url,
            cover_image: remote.cover_image,
            stats: PostStats {
                views: remote.page_views_count.unwrap_or(0),
                likes: remote
                    .public_reactions_count
                    .or(remote.positive_reactions_count)
                    .unwrap_or(0),
                comments: remote.comments_count.unwrap_or(0),
            },
            published_at,
            updated_at: parse_timestamp(remote.edited_at.as_deref()),
        }
    }

    fn validate(&self, post: &Post) -> Vec<String> {
        let mut violations = common_violations(DEVTO_NAME, post, MAX_TITLE_LENGTH);
        violations.extend(tag_violations(
            DEVTO_NAME,
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

    #[test]
    fn test_to_wire_maps_fields() {
        let post = Post::new("  Hello  ", "# Hello\n\nbody")
            .with_description("intro")
            .with_tags(["Rust", "Web Dev", "rust"])
            .with_canonical_url("https://blog.example.com/hello")
            .with_cover_image("https://img.example.com/c.png")
            .published();

        let envelope = DevToTransformer.to_wire(&post, &());
        let article = envelope.article;
        assert_eq!(article.title, "Hello");
        assert_eq!(article.body_markdown, "# Hello\n\nbody");
        assert!(article.published);
        assert_eq!(article.tags, vec!["rust", "webdev"]);
        assert_eq!(article.main_image.as_deref(), Some("https://img.example.com/c.png"));
        assert_eq!(
            article.canonical_url.as_deref(),
            Some("https://blog.example.com/hello")
        );
    }

    #[test]
    fn test_to_wire_skips_empty_optionals() {
        let post = Post::new("T", "body");
        let json = serde_json::to_value(DevToTransformer.to_wire(&post, &())).unwrap();
        let article = &json["article"];
        assert_eq!(article["published"], false);
        assert!(article.get("description").is_none());
        assert!(article.get("main_image").is_none());
        assert_eq!(article["tags"], serde_json::json!([]));
    }

    #[test]
    fn test_from_wire_single_article_shape() {
        let remote: DevToArticle = serde_json::from_value(serde_json::json!({
            "id": 150589,
            "title": "Byte Sized Episode 2",
            "description": "Lets talk about stacks",
            "body_markdown": "# Stacks",
            "url": "https://dev.to/bytesized/byte-sized-episode-2-1ajd",
            "tag_list": "career, computerscience",
            "published_at": "2019-07-31T11:15:06Z",
            "edited_at": "2019-08-01T10:00:00Z",
            "public_reactions_count": 22,
            "comments_count": 3,
            "cover_image": null
        }))
        .unwrap();

        let post = DevToTransformer.from_wire(remote);
        assert_eq!(post.platform_id, "150589");
        assert_eq!(post.platform, "Dev.to");
        assert_eq!(post.tags, vec!["career", "computerscience"]);
        assert_eq!(post.publish_status, PublishStatus::Published);
        assert_eq!(post.stats.likes, 22);
        assert_eq!(post.stats.comments, 3);
        assert_eq!(post.stats.views, 0);
        assert!(post.updated_at.is_some());
        assert!(post.cover_image.is_none());
    }

    #[test]
    fn test_from_wire_list_shape_and_missing_fields() {
        let remote: DevToArticle = serde_json::from_value(serde_json::json!({
            "id": 7,
            "tag_list": ["rust", "async"],
            "published": false,
            "page_views_count": 10,
            "published_at": "garbage"
        }))
        .unwrap();

        let post = DevToTransformer.from_wire(remote);
        assert_eq!(post.platform_id, "7");
        assert_eq!(post.title, "");
        assert_eq!(post.content, "");
        assert_eq!(post.tags, vec!["rust", "async"]);
        assert_eq!(post.publish_status, PublishStatus::Draft);
        assert_eq!(post.stats.views, 10);
        assert!(post.published_at.is_none());
    }

    #[test]
    fn test_validate_tag_count() {
        let post = Post::new("T", "body").with_tags(["a", "b", "c", "d", "e", "f"]);
        let violations = DevToTransformer.validate(&post);
        assert_eq!(violations, vec!["Dev.to allows at most 4 tags (got 6)"]);
    }

    #[test]
    fn test_validate_accepts_good_post() {
        let post = Post::new("T", "# T\n\nbody").with_tags(["a", "b"]);
        assert!(DevToTransformer.validate(&post).is_empty());
    }
}
