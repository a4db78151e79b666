//! HTTP plumbing shared by the REST and GraphQL clients
//!
//! Every response or transport failure is mapped into the shared
//! [`PlatformError`] taxonomy here, so the per-platform clients only deal
//! with their own payload shapes.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::HttpConfig;
use crate::error::{ErrorCode, PlatformError, Result};

/// Longest slice of a response body quoted in error messages
const MAX_BODY_EXCERPT: usize = 200;

/// Build the `reqwest` client owned by a single platform client
pub fn build_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| {
            PlatformError::remote(
                ErrorCode::Unknown,
                format!("Failed to create HTTP client: {}", e),
            )
        })?;
    Ok(client)
}

/// Map a transport-level failure (no HTTP response) to a platform error
pub fn map_transport_error(platform: &str, context: &str, err: reqwest::Error) -> PlatformError {
    if err.is_timeout() {
        return PlatformError::remote(
            ErrorCode::Timeout,
            format!("{} request timed out during {}: {}", platform, context, err),
        );
    }

    if err.is_connect() || err.is_request() {
        return PlatformError::remote(
            ErrorCode::ConnectionError,
            format!(
                "Could not reach {} during {}: {}. Check your internet connection.",
                platform, context, err
            ),
        );
    }

    if err.is_decode() {
        return PlatformError::remote(
            ErrorCode::Unknown,
            format!("{} returned an unreadable response during {}: {}", platform, context, err),
        );
    }

    PlatformError::remote(
        ErrorCode::Unknown,
        format!("{} request failed during {}: {}", platform, context, err),
    )
}

/// Map a non-success HTTP status to a platform error
pub fn map_status(
    platform: &str,
    context: &str,
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
) -> PlatformError {
    let detail = error_detail(body);

    match status.as_u16() {
        401 | 403 => PlatformError::Authentication(format!(
            "{} rejected the credentials during {} ({}): {}. Check your API key.",
            platform, context, status, detail
        )),
        400 | 422 => PlatformError::Validation(format!(
            "{} rejected the request during {} ({}): {}",
            platform, context, status, detail
        )),
        404 => PlatformError::remote(
            ErrorCode::NotFound,
            format!("{} resource not found during {}: {}", platform, context, detail),
        ),
        429 => PlatformError::rate_limited(
            format!(
                "{} rate limit exceeded during {}: {}",
                platform, context, detail
            ),
            headers
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after),
        ),
        500..=599 => PlatformError::remote(
            ErrorCode::ServerError,
            format!("{} server error during {} ({}): {}", platform, context, status, detail),
        ),
        _ => PlatformError::remote(
            ErrorCode::Unknown,
            format!(
                "{} returned unexpected status during {} ({}): {}",
                platform, context, status, detail
            ),
        ),
    }
}

/// Parse a `Retry-After` header value: delta-seconds or an HTTP date
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let when = chrono::DateTime::parse_from_rfc2822(value).ok()?;
    let wait = when.with_timezone(&chrono::Utc) - chrono::Utc::now();
    Some(wait.to_std().unwrap_or(Duration::ZERO))
}

/// Check the status and decode a JSON body
pub async fn read_json<T: DeserializeOwned>(
    platform: &str,
    context: &str,
    response: Response,
) -> Result<T> {
    let response = ensure_success(platform, context, response).await?;
    let value = response
        .json::<T>()
        .await
        .map_err(|e| map_transport_error(platform, context, e))?;
    Ok(value)
}

/// Turn a non-success response into an error, passing successful ones through
pub async fn ensure_success(platform: &str, context: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let headers = response.headers().clone();
    let body = response.text().await.unwrap_or_default();
    tracing::debug!("{} {} failed with {}: {}", platform, context, status, body);
    Err(map_status(platform, context, status, &headers, &body).into())
}

/// Pull a human-readable message out of an error body
fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message", "errors"] {
            match value.get(key) {
                Some(serde_json::Value::String(s)) => return s.clone(),
                Some(other) if !other.is_null() => return other.to_string(),
                _ => {}
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "no response body".to_string();
    }
    trimmed.chars().take(MAX_BODY_EXCERPT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn status(code: u16) -> StatusCode {
        StatusCode::from_u16(code).unwrap()
    }

    #[test]
    fn test_auth_statuses() {
        for code in [401, 403] {
            let err = map_status("Dev.to", "create", status(code), &HeaderMap::new(), "");
            assert!(matches!(err, PlatformError::Authentication(_)));
        }
    }

    #[test]
    fn test_validation_status_uses_body_message() {
        let err = map_status(
            "Dev.to",
            "create",
            status(422),
            &HeaderMap::new(),
            r#"{"error":"Title can't be blank","status":422}"#,
        );
        match err {
            PlatformError::Validation(msg) => assert!(msg.contains("Title can't be blank")),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_status_codes() {
        let headers = HeaderMap::new();
        assert_eq!(
            map_status("Dev.to", "get", status(404), &headers, "").code(),
            Some(ErrorCode::NotFound)
        );
        assert_eq!(
            map_status("Dev.to", "get", status(502), &headers, "").code(),
            Some(ErrorCode::ServerError)
        );
        assert_eq!(
            map_status("Dev.to", "get", status(418), &headers, "").code(),
            Some(ErrorCode::Unknown)
        );
    }

    #[test]
    fn test_rate_limit_reads_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("30"));
        let err = map_status("Dev.to", "create", status(429), &headers, "");
        match err {
            PlatformError::Remote {
                code, retry_after, ..
            } => {
                assert_eq!(code, ErrorCode::RateLimit);
                assert_eq!(retry_after, Some(Duration::from_secs(30)));
            }
            other => panic!("Expected rate limit, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after("120"), Some(Duration::from_secs(120)));
        assert_eq!(parse_retry_after(" 5 "), Some(Duration::from_secs(5)));
        assert_eq!(
            parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"),
            Some(Duration::ZERO)
        );
        assert_eq!(parse_retry_after("soon"), None);
    }

    #[test]
    fn test_error_detail_fallbacks() {
        assert_eq!(error_detail(""), "no response body");
        assert_eq!(error_detail("plain text"), "plain text");
        assert_eq!(error_detail(r#"{"message":"nope"}"#), "nope");
        assert_eq!(error_detail(&"x".repeat(500)).len(), MAX_BODY_EXCERPT);
    }
}
