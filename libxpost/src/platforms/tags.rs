//! Tag normalisation shared by the platform transformers

/// Normalise a tag to `[a-z0-9-]`, at most `max_len` characters
///
/// Lower-cases, turns whitespace runs into a single `-`, drops every other
/// character outside the allowed set and truncates. Applying it twice gives
/// the same result as applying it once.
pub fn sanitize_tag(tag: &str, max_len: usize) -> String {
    let lowered = tag.trim().to_lowercase();
    let hyphenated = lowered.split_whitespace().collect::<Vec<_>>().join("-");

    hyphenated
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .take(max_len)
        .collect()
}

/// URL slug for a tag: sanitized, without repeated or edge hyphens
pub fn slugify(tag: &str, max_len: usize) -> String {
    let sanitized = sanitize_tag(tag, max_len);
    sanitized
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Sanitize a list of tags, dropping empties and duplicates while keeping order
pub fn sanitize_tags(tags: &[String], max_len: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let clean = sanitize_tag(tag, max_len);
        if !clean.trim_matches('-').is_empty() && !out.contains(&clean) {
            out.push(clean);
        }
    }
    out
}

/// Shared tag rules: count ceiling, character set and length ceiling
pub(crate) fn tag_violations(
    platform: &str,
    tags: &[String],
    max_tags: usize,
    max_len: usize,
) -> Vec<String> {
    let mut violations = Vec::new();

    if tags.len() > max_tags {
        violations.push(format!(
            "{} allows at most {} tags (got {})",
            platform,
            max_tags,
            tags.len()
        ));
    }

    for tag in tags {
        if slugify(tag, max_len).is_empty() {
            violations.push(format!("Tag '{}' has no letters or digits", tag));
        } else if tag.trim().chars().count() > max_len {
            violations.push(format!(
                "Tag '{}' exceeds {}'s {} character limit",
                tag, platform, max_len
            ));
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_basic() {
        assert_eq!(sanitize_tag("Rust", 30), "rust");
        assert_eq!(sanitize_tag("  Web Dev  ", 30), "web-dev");
        assert_eq!(sanitize_tag("C++", 30), "c");
        assert_eq!(sanitize_tag("node.js", 30), "nodejs");
        assert_eq!(sanitize_tag("machine   learning", 30), "machine-learning");
    }

    #[test]
    fn test_sanitize_truncates() {
        assert_eq!(sanitize_tag("abcdefghij", 4), "abcd");
    }

    #[test]
    fn test_sanitize_strips_non_ascii() {
        assert_eq!(sanitize_tag("Über Café", 30), "ber-caf");
        assert_eq!(sanitize_tag("日本語", 30), "");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let samples = [
            "Rust",
            "  Web   Dev ",
            "C# and .NET",
            "--already-clean--",
            "Ünïcödé tag",
            "a very long tag that will definitely be truncated",
            "tabs\tand\nnewlines",
            "",
            "İstanbul",
        ];
        for max_len in [4, 20, 30] {
            for sample in samples {
                let once = sanitize_tag(sample, max_len);
                assert_eq!(sanitize_tag(&once, max_len), once, "input: {:?}", sample);
            }
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Web -- Dev", 50), "web-dev");
        assert_eq!(slugify("-rust-", 50), "rust");
    }

    #[test]
    fn test_sanitize_tags_dedupes() {
        let tags = vec!["Rust".to_string(), "rust".to_string(), "!!".to_string()];
        assert_eq!(sanitize_tags(&tags, 30), vec!["rust"]);
    }

    #[test]
    fn test_tag_violations() {
        let tags: Vec<String> = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let violations = tag_violations("Dev.to", &tags, 4, 30);
        assert_eq!(violations, vec!["Dev.to allows at most 4 tags (got 6)"]);

        let tags = vec!["???".to_string(), "--".to_string(), "x".repeat(31)];
        let violations = tag_violations("Dev.to", &tags, 4, 30);
        assert_eq!(violations.len(), 3);
        assert!(violations[0].contains("no letters"));
        assert!(violations[1].contains("no letters"));
        assert!(violations[2].contains("30 character limit"));
    }
}
