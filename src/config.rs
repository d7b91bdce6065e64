//! Client configuration management.
//!
//! Consolidates environment variable reads and provides validated
//! configuration for the sync client.

use std::time::Duration;

use crate::poller::DEFAULT_POLL_INTERVAL;
use crate::store::RetryPolicy;

/// Complete client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the poker node's HTTP gateway.
    pub base_url: String,
    /// Cadence between scheduled reconciles. Zero disables polling.
    pub poll_interval: Duration,
    /// Backoff policy for the reconcile reads.
    pub retry: RetryPolicy,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// # Arguments
    ///
    /// * `base_url_override` - Optional gateway URL override (from CLI args)
    /// * `poll_interval_override` - Optional cadence override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but unparseable, or if the
    /// resulting configuration fails validation.
    pub fn from_env(
        base_url_override: Option<String>,
        poll_interval_override: Option<Duration>,
    ) -> Result<Self, ConfigError> {
        let base_url = base_url_override
            .or_else(|| std::env::var("POKER_API_URL").ok())
            .unwrap_or_else(|| "http://localhost:8080".to_string());

        let poll_interval = poll_interval_override.unwrap_or_else(|| {
            Duration::from_millis(parse_env_or(
                "POKER_POLL_INTERVAL_MS",
                DEFAULT_POLL_INTERVAL.as_millis() as u64,
            ))
        });

        let retry = RetryPolicy {
            max_retries: parse_env_or("POKER_READ_MAX_RETRIES", 2),
            initial_delay: Duration::from_millis(parse_env_or("POKER_READ_RETRY_DELAY_MS", 250)),
            max_delay: Duration::from_millis(parse_env_or("POKER_READ_RETRY_CAP_MS", 2000)),
        };

        let config = ClientConfig {
            base_url,
            poll_interval,
            retry,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                var: "POKER_API_URL".to_string(),
                reason: "Must start with http:// or https://".to_string(),
            });
        }

        if self.retry.initial_delay > self.retry.max_delay {
            return Err(ConfigError::Invalid {
                var: "POKER_READ_RETRY_DELAY_MS".to_string(),
                reason: format!(
                    "Must not exceed the retry cap ({} ms)",
                    self.retry.max_delay.as_millis()
                ),
            });
        }

        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse an environment variable with a default fallback.
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
