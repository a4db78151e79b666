//! Platform registry
//!
//! An ordered, immutable set of platform clients keyed by their registry key.
//! Built once (from configuration or from explicit clients) and shared by
//! reference with the dispatcher.

use std::sync::Arc;

use tracing::debug;

use crate::config::{Config, PlatformCredentials};
use crate::error::{Result, XpostError};
use crate::platforms::devto::DevToClient;
use crate::platforms::hashnode::HashnodeClient;
use crate::platforms::Platform;
use crate::retry::RetryPolicy;

#[derive(Clone, Default)]
pub struct PlatformRegistry {
    platforms: Vec<Arc<dyn Platform>>,
}

impl PlatformRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from explicit clients, keeping their order
    ///
    /// # Errors
    ///
    /// Returns `XpostError::InvalidInput` when two clients share a key.
    pub fn from_platforms(platforms: Vec<Arc<dyn Platform>>) -> Result<Self> {
        platforms
            .into_iter()
            .try_fold(Self::new(), |registry, platform| registry.with_platform(platform))
    }

    /// Add one client at the end of the registry
    pub fn with_platform(mut self, platform: Arc<dyn Platform>) -> Result<Self> {
        if self.get(platform.key()).is_some() {
            return Err(XpostError::InvalidInput(format!(
                "Platform {} is registered more than once",
                platform.key()
            )));
        }
        self.platforms.push(platform);
        Ok(self)
    }

    /// Build the real clients for every platform section in the configuration
    ///
    /// Platforms without a section are simply absent; dispatching to them
    /// reports them as not configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let retry = RetryPolicy::from(&config.retry);
        let mut registry = Self::new();

        for credentials in config.credentials()? {
            debug!("Registering platform {}", credentials.key());
            let platform: Arc<dyn Platform> = match &credentials {
                PlatformCredentials::DevTo(devto) => {
                    Arc::new(DevToClient::new(devto, &config.http, retry)?)
                }
                PlatformCredentials::Hashnode(hashnode) => {
                    Arc::new(HashnodeClient::new(hashnode, &config.http, retry)?)
                }
            };
            registry = registry.with_platform(platform)?;
        }

        Ok(registry)
    }

    pub fn get(&self, key: &str) -> Option<&Arc<dyn Platform>> {
        self.platforms.iter().find(|p| p.key() == key)
    }

    /// Registry keys in registration order
    pub fn keys(&self) -> Vec<String> {
        self.platforms.iter().map(|p| p.key().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

impl std::fmt::Debug for PlatformRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformRegistry")
            .field("platforms", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DevToConfig, HashnodeConfig};
    use crate::platforms::mock::MockPlatform;

    #[test]
    fn test_from_platforms_keeps_order() {
        let registry = PlatformRegistry::from_platforms(vec![
            Arc::new(MockPlatform::success("hashnode")),
            Arc::new(MockPlatform::success("devto")),
        ])
        .unwrap();

        assert_eq!(registry.keys(), vec!["hashnode", "devto"]);
        assert_eq!(registry.len(), 2);
        assert!(registry.get("devto").is_some());
        assert!(registry.get("medium").is_none());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let result = PlatformRegistry::from_platforms(vec![
            Arc::new(MockPlatform::success("devto")),
            Arc::new(MockPlatform::success("devto")),
        ]);

        match result {
            Err(XpostError::InvalidInput(msg)) => assert!(msg.contains("devto")),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_from_config_builds_clients() {
        let config = Config {
            devto: Some(DevToConfig {
                api_key: "key".to_string(),
                base_url: None,
            }),
            hashnode: Some(HashnodeConfig {
                token: "token".to_string(),
                publication_id: "pub".to_string(),
                endpoint: None,
            }),
            ..Default::default()
        };

        let registry = PlatformRegistry::from_config(&config).unwrap();
        assert_eq!(registry.keys(), vec!["devto", "hashnode"]);
        assert_eq!(registry.get("devto").unwrap().name(), "Dev.to");
        assert_eq!(registry.get("hashnode").unwrap().name(), "Hashnode");
    }

    #[test]
    fn test_from_config_empty() {
        let registry = PlatformRegistry::from_config(&Config::default()).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_from_config_incomplete_section() {
        let config = Config {
            hashnode: Some(HashnodeConfig {
                token: "token".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };

        let err = PlatformRegistry::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("hashnode.publication_id"));
    }
}
