//! Error types for xpost

use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, XpostError>;

#[derive(Error, Debug)]
pub enum XpostError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Platform {0} not configured")]
    UnknownPlatform(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl XpostError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            XpostError::InvalidInput(_) | XpostError::Parse(_) => 3,
            XpostError::Platform(PlatformError::Validation(_)) => 3,
            XpostError::Platform(PlatformError::Authentication(_)) => 2,
            XpostError::Platform(_) => 1,
            XpostError::Config(_) => 1,
            XpostError::UnknownPlatform(_) => 1,
        }
    }

    /// Borrow the platform error, if this is one
    pub fn as_platform(&self) -> Option<&PlatformError> {
        match self {
            XpostError::Platform(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read markdown file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Invalid frontmatter: {0}")]
    Frontmatter(#[from] toml::de::Error),

    #[error("Unterminated frontmatter block")]
    UnterminatedFrontmatter,

    #[error("Invalid published_at '{0}' (expected an RFC 3339 timestamp)")]
    InvalidDate(String),

    #[error("Post has no title (set `title` in frontmatter or start with a `# ` heading)")]
    MissingTitle,

    #[error("Post body is empty")]
    EmptyContent,
}

/// Reason code attached to remote failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    RateLimit,
    ServerError,
    Timeout,
    ConnectionError,
    NotFound,
    Unknown,
}

impl ErrorCode {
    /// Transient failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::RateLimit
                | ErrorCode::ServerError
                | ErrorCode::Timeout
                | ErrorCode::ConnectionError
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::RateLimit => "RATE_LIMIT",
            ErrorCode::ServerError => "SERVER_ERROR",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::ConnectionError => "CONNECTION_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Content validation failed: {0}")]
    Validation(String),

    #[error("{code}: {message}")]
    Remote {
        code: ErrorCode,
        message: String,
        /// Server-provided `Retry-After` hint, when one was sent
        retry_after: Option<Duration>,
    },

    #[error("Not implemented: {0}")]
    NotImplemented(String),
}

impl PlatformError {
    /// Build a remote failure without a retry hint
    pub fn remote(code: ErrorCode, message: impl Into<String>) -> Self {
        PlatformError::Remote {
            code,
            message: message.into(),
            retry_after: None,
        }
    }

    /// Build a rate-limit failure carrying the server's retry hint
    pub fn rate_limited(message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        PlatformError::Remote {
            code: ErrorCode::RateLimit,
            message: message.into(),
            retry_after,
        }
    }

    /// Reason code for remote failures
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            PlatformError::Remote { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_invalid_input() {
        let error = XpostError::InvalidInput("Empty content".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_authentication_error() {
        let error = XpostError::Platform(PlatformError::Authentication("bad key".to_string()));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_validation_error() {
        let error = XpostError::Platform(PlatformError::Validation("too many tags".to_string()));
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_remote_error() {
        let error = XpostError::Platform(PlatformError::remote(ErrorCode::ServerError, "boom"));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_unknown_platform_message() {
        let error = XpostError::UnknownPlatform("medium".to_string());
        assert_eq!(error.to_string(), "Platform medium not configured");
    }

    #[test]
    fn test_remote_error_formatting() {
        let error = PlatformError::remote(ErrorCode::Timeout, "Dev.to request timed out");
        assert_eq!(error.to_string(), "TIMEOUT: Dev.to request timed out");

        let wrapped: XpostError = error.into();
        assert_eq!(
            wrapped.to_string(),
            "Platform error: TIMEOUT: Dev.to request timed out"
        );
    }

    #[test]
    fn test_error_message_formatting_validation() {
        let error = XpostError::Platform(PlatformError::Validation(
            "Dev.to allows at most 4 tags (got 6)".to_string(),
        ));
        assert_eq!(
            error.to_string(),
            "Platform error: Content validation failed: Dev.to allows at most 4 tags (got 6)"
        );
    }

    #[test]
    fn test_retryable_codes() {
        assert!(ErrorCode::RateLimit.is_retryable());
        assert!(ErrorCode::ServerError.is_retryable());
        assert!(ErrorCode::Timeout.is_retryable());
        assert!(ErrorCode::ConnectionError.is_retryable());
        assert!(!ErrorCode::NotFound.is_retryable());
        assert!(!ErrorCode::Unknown.is_retryable());
    }

    #[test]
    fn test_rate_limited_carries_hint() {
        let error = PlatformError::rate_limited("slow down", Some(Duration::from_secs(5)));
        match error {
            PlatformError::Remote {
                code, retry_after, ..
            } => {
                assert_eq!(code, ErrorCode::RateLimit);
                assert_eq!(retry_after, Some(Duration::from_secs(5)));
            }
            _ => panic!("Expected remote error"),
        }
    }

    #[test]
    fn test_error_conversion_from_config_error() {
        let config_error = ConfigError::MissingField("devto.api_key".to_string());
        let error: XpostError = config_error.into();
        assert!(matches!(error, XpostError::Config(_)));
        assert_eq!(
            error.to_string(),
            "Configuration error: Missing required field: devto.api_key"
        );
    }

    #[test]
    fn test_platform_error_clone() {
        // Retry keeps the last error around, so it must be cloneable
        let original = PlatformError::remote(ErrorCode::ConnectionError, "refused");
        let cloned = original.clone();
        assert_eq!(original.to_string(), cloned.to_string());
        assert_eq!(cloned.code(), Some(ErrorCode::ConnectionError));
    }
}
