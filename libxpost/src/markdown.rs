//! Markdown article parsing
//!
//! An article is a markdown file with optional TOML frontmatter between two
//! `+++` lines:
//!
//! ```text
//! +++
//! title = "Async Rust in practice"
//! description = "What I learned shipping tokio services"
//! tags = ["rust", "async"]
//! canonical_url = "https://blog.example.com/async-rust"
//! published = true
//! +++
//!
//! Body goes here.
//! ```
//!
//! Without a frontmatter title, a leading `# ` heading becomes the title and
//! is removed from the body.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{ParseError, Result};
use crate::types::{Post, PublishStatus};

const DELIMITER: &str = "+++";

#[derive(Debug, Default, Deserialize)]
struct Frontmatter {
    title: Option<String>,
    description: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    canonical_url: Option<String>,
    cover_image: Option<String>,
    #[serde(default)]
    published: bool,
    // Native TOML datetime or a quoted string
    published_at: Option<toml::Value>,
}

/// Split `input` into (frontmatter, body)
fn split_frontmatter(input: &str) -> Result<(Option<&str>, &str)> {
    let input = input.trim_start_matches('\u{feff}');

    let Some(first_line_end) = input.find('\n') else {
        return if input.trim() == DELIMITER {
            Err(ParseError::UnterminatedFrontmatter.into())
        } else {
            Ok((None, input))
        };
    };

    if input[..first_line_end].trim() != DELIMITER {
        return Ok((None, input));
    }

    let rest = &input[first_line_end + 1..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim() == DELIMITER {
            let frontmatter = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((Some(frontmatter), body));
        }
        offset += line.len();
    }

    Err(ParseError::UnterminatedFrontmatter.into())
}

/// First `# ` heading if it is the first non-blank line, and the body without it
fn take_heading(body: &str) -> (Option<String>, String) {
    let mut lines = body.lines().skip_while(|l| l.trim().is_empty());
    match lines.next() {
        Some(line) if line.starts_with("# ") => {
            let title = line[2..].trim().to_string();
            let rest: Vec<&str> = lines.collect();
            (Some(title).filter(|t| !t.is_empty()), rest.join("\n"))
        }
        _ => (None, body.to_string()),
    }
}

fn parse_published_at(value: &toml::Value) -> Result<DateTime<Utc>> {
    let raw = match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ParseError::InvalidDate(raw).into())
}

/// Parse a markdown article into a [`Post`]
///
/// # Errors
///
/// - `ParseError::UnterminatedFrontmatter` if the opening `+++` has no match
/// - `ParseError::Frontmatter` if the frontmatter is not valid TOML
/// - `ParseError::MissingTitle` if neither frontmatter nor a heading gives a title
/// - `ParseError::EmptyContent` if nothing is left for the body
pub fn parse(input: &str) -> Result<Post> {
    let (frontmatter, body) = split_frontmatter(input)?;
    let meta: Frontmatter = match frontmatter {
        Some(raw) => toml::from_str(raw).map_err(ParseError::from)?,
        None => Frontmatter::default(),
    };

    let explicit_title = meta
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let (title, content) = match explicit_title {
        Some(title) => (title, body.to_string()),
        None => {
            let (heading, rest) = take_heading(body);
            (heading.ok_or(ParseError::MissingTitle)?, rest)
        }
    };

    let content = content.trim().to_string();
    if content.is_empty() {
        return Err(ParseError::EmptyContent.into());
    }

    let published_at = meta.published_at.as_ref().map(parse_published_at).transpose()?;

    Ok(Post {
        title,
        content,
        description: meta.description.filter(|d| !d.trim().is_empty()),
        tags: meta.tags,
        canonical_url: meta.canonical_url,
        cover_image: meta.cover_image,
        publish_status: if meta.published {
            PublishStatus::Published
        } else {
            PublishStatus::Draft
        },
        published_at,
    })
}

/// Read and parse a markdown file
pub fn parse_file(path: impl AsRef<Path>) -> Result<Post> {
    let path = path.as_ref();
    tracing::debug!("Reading article from {}", path.display());
    let input = std::fs::read_to_string(path).map_err(ParseError::from)?;
    parse(&input)
}
