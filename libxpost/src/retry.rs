//! Retry with exponential backoff for remote platform operations
//!
//! Each attempt's failure is classified by [`RetryPolicy::decide`], which
//! returns the next step as a value. The executor loop only sleeps and
//! re-invokes; it never inspects errors itself.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::RetryConfig;
use crate::error::{ErrorCode, PlatformError, Result, XpostError};

/// Next step after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for the given delay, then try again
    Retry(Duration),
    /// Return the error to the caller unchanged
    GiveUp,
}

/// Bounded retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (3 means 4 attempts total)
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each following one
    pub base_delay: Duration,
    /// Delay used for rate limits when the server sent no hint
    pub rate_limit_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            rate_limit_delay: Duration::from_millis(60_000),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            rate_limit_delay: Duration::from_millis(config.rate_limit_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Exponential delay before retry number `retries_used + 1`
    pub fn backoff(&self, retries_used: u32) -> Duration {
        let factor = 2u32.checked_pow(retries_used).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Classify a failure after `retries_used` retries have already happened
    pub fn decide(&self, retries_used: u32, error: &XpostError) -> RetryDecision {
        if retries_used >= self.max_retries {
            return RetryDecision::GiveUp;
        }

        match error.as_platform() {
            Some(PlatformError::Remote {
                code, retry_after, ..
            }) if code.is_retryable() => {
                let delay = if *code == ErrorCode::RateLimit {
                    retry_after.unwrap_or(self.rate_limit_delay)
                } else {
                    self.backoff(retries_used)
                };
                RetryDecision::Retry(delay)
            }
            _ => RetryDecision::GiveUp,
        }
    }

    /// Run `op` until it succeeds or the policy gives up
    ///
    /// The last error is returned as-is once retries are exhausted.
    pub async fn execute<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut retries_used = 0;

        loop {
            match op().await {
                Ok(value) => {
                    if retries_used > 0 {
                        info!("{} succeeded on attempt {}", label, retries_used + 1);
                    }
                    return Ok(value);
                }
                Err(e) => match self.decide(retries_used, &e) {
                    RetryDecision::Retry(delay) => {
                        warn!(
                            "Transient error during {} (attempt {}/{}): {}. Retrying in {}ms...",
                            label,
                            retries_used + 1,
                            self.max_retries + 1,
                            e,
                            delay.as_millis()
                        );
                        sleep(delay).await;
                        retries_used += 1;
                    }
                    RetryDecision::GiveUp => {
                        if retries_used > 0 {
                            warn!(
                                "{} failed after {} attempts: {}",
                                label,
                                retries_used + 1,
                                e
                            );
                        }
                        return Err(e);
                    }
                },
            }
        }
    }
}
