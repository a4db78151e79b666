//! Configuration management for xpost
//!
//! Settings come from a TOML file, then environment variables override the
//! platform secrets. Platform sections are turned into
//! [`PlatformCredentials`] when the file is loaded, so a half-filled section
//! fails here rather than at the first API call.

use std::path::{Path, PathBuf};

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

pub const DEFAULT_DEVTO_BASE_URL: &str = "https://dev.to/api";
pub const DEFAULT_HASHNODE_ENDPOINT: &str = "https://gql.hashnode.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub http: HttpConfig,
    pub devto: Option<DevToConfig>,
    pub hashnode: Option<HashnodeConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Platforms targeted when the caller names none (empty means all configured)
    #[serde(default)]
    pub platforms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_rate_limit_delay_ms")]
    pub rate_limit_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            rate_limit_delay_ms: default_rate_limit_delay_ms(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_rate_limit_delay_ms() -> u64 {
    60_000
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("xpost/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevToConfig {
    #[serde(default)]
    pub api_key: String,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HashnodeConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub publication_id: String,
    pub endpoint: Option<String>,
}

/// Validated credentials for one platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCredentials {
    DevTo(DevToCredentials),
    Hashnode(HashnodeCredentials),
}

impl PlatformCredentials {
    /// Registry key for the platform these credentials belong to
    pub fn key(&self) -> &'static str {
        match self {
            PlatformCredentials::DevTo(_) => "devto",
            PlatformCredentials::Hashnode(_) => "hashnode",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevToCredentials {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashnodeCredentials {
    pub token: String,
    pub publication_id: String,
    pub endpoint: String,
}

impl Config {
    /// Load configuration from the default location
    ///
    /// A missing file is not an error: credentials may come entirely from
    /// the environment (including a `.env` file in the working directory).
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = resolve_config_path()?;
        let mut config = if config_path.exists() {
            Self::read_file(&config_path)?
        } else {
            tracing::debug!("No config file at {}", config_path.display());
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// As with [`Config::load`], a `.env` file in the working directory is
    /// read before the environment overrides are applied.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::read_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string (no env overrides)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Override platform secrets from `DEVTO_API_KEY`, `HASHNODE_TOKEN` and
    /// `HASHNODE_PUBLICATION_ID`
    pub fn apply_env_overrides(&mut self) {
        if let Some(api_key) = env_value("DEVTO_API_KEY") {
            self.devto.get_or_insert_with(DevToConfig::default).api_key = api_key;
        }
        if let Some(token) = env_value("HASHNODE_TOKEN") {
            self.hashnode.get_or_insert_with(HashnodeConfig::default).token = token;
        }
        if let Some(publication_id) = env_value("HASHNODE_PUBLICATION_ID") {
            self.hashnode
                .get_or_insert_with(HashnodeConfig::default)
                .publication_id = publication_id;
        }
    }

    /// Check every configured section and the transport settings
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }
        self.credentials()?;
        Ok(())
    }

    /// Build the validated credential set, in a stable order (devto, hashnode)
    pub fn credentials(&self) -> Result<Vec<PlatformCredentials>> {
        let mut credentials = Vec::new();

        if let Some(devto) = &self.devto {
            let base_url = devto
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_DEVTO_BASE_URL.to_string());
            credentials.push(PlatformCredentials::DevTo(DevToCredentials {
                api_key: required(&devto.api_key, "devto.api_key")?,
                base_url: checked_url(base_url, "devto.base_url")?,
            }));
        }

        if let Some(hashnode) = &self.hashnode {
            let endpoint = hashnode
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_HASHNODE_ENDPOINT.to_string());
            credentials.push(PlatformCredentials::Hashnode(HashnodeCredentials {
                token: required(&hashnode.token, "hashnode.token")?,
                publication_id: required(&hashnode.publication_id, "hashnode.publication_id")?,
                endpoint: checked_url(endpoint, "hashnode.endpoint")?,
            }));
        }

        Ok(credentials)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: &str, field: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::MissingField(field.to_string()).into());
    }
    Ok(value.to_string())
}

fn checked_url(value: String, field: &str) -> Result<String> {
    let url = Url::parse(&value).map_err(|e| ConfigError::InvalidValue {
        field: field.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }
        .into());
    }
    Ok(value.trim_end_matches('/').to_string())
}

/// Resolve the configuration file path (XDG config directory unless overridden)
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("XPOST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("xpost").join("config.toml"))
}
