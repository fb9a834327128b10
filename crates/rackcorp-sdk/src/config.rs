// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration for the RackCorp SDK.

use std::time::Duration;

use crate::error::{Result, SdkError};

/// Default JSON endpoint of the RackCorp API.
pub const DEFAULT_API_URL: &str = "https://api.rackcorp.net/api/rest/v1.2/json.php";

/// Configuration for the RackcorpClient.
#[derive(Debug, Clone)]
pub struct SdkConfig {
    /// Endpoint every envelope is posted to.
    pub api_url: String,
    /// API key identifier.
    pub api_uuid: String,
    /// API key secret.
    pub api_secret: String,
    /// Request timeout.
    pub request_timeout: Duration,
    /// Delay between searches while waiting for pending transactions.
    pub poll_interval: Duration,
    /// Upper bound on waiting for pending transactions. `None` waits indefinitely.
    pub poll_timeout: Option<Duration>,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_uuid: String::new(),
            api_secret: String::new(),
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(2),
            poll_timeout: None,
        }
    }
}

impl SdkConfig {
    /// Create a configuration with the given credentials and default values.
    pub fn new(api_uuid: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_uuid: api_uuid.into(),
            api_secret: api_secret.into(),
            ..Self::default()
        }
    }

    /// Create a configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RACKCORP_API_UUID`: API key identifier (required)
    /// - `RACKCORP_API_SECRET`: API key secret (required)
    /// - `RACKCORP_API_URL`: Endpoint (default: the public v1.2 JSON endpoint)
    /// - `RACKCORP_REQUEST_TIMEOUT_MS`: Request timeout in milliseconds (default: 30000)
    /// - `RACKCORP_POLL_INTERVAL_MS`: Pending transaction poll interval (default: 2000)
    /// - `RACKCORP_POLL_TIMEOUT_MS`: Pending transaction wait limit (default: unbounded)
    pub fn from_env() -> Result<Self> {
        let api_uuid = std::env::var("RACKCORP_API_UUID")
            .map_err(|_| SdkError::Config("RACKCORP_API_UUID is required".to_string()))?;

        let api_secret = std::env::var("RACKCORP_API_SECRET")
            .map_err(|_| SdkError::Config("RACKCORP_API_SECRET is required".to_string()))?;

        let api_url =
            std::env::var("RACKCORP_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let request_timeout_ms: u64 = std::env::var("RACKCORP_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".to_string())
            .parse()
            .map_err(|e| SdkError::Config(format!("invalid RACKCORP_REQUEST_TIMEOUT_MS: {}", e)))?;

        let poll_interval_ms: u64 = std::env::var("RACKCORP_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "2000".to_string())
            .parse()
            .map_err(|e| SdkError::Config(format!("invalid RACKCORP_POLL_INTERVAL_MS: {}", e)))?;

        let poll_timeout = match std::env::var("RACKCORP_POLL_TIMEOUT_MS") {
            Ok(v) => Some(Duration::from_millis(v.parse().map_err(|e| {
                SdkError::Config(format!("invalid RACKCORP_POLL_TIMEOUT_MS: {}", e))
            })?)),
            Err(_) => None,
        };

        Ok(Self {
            api_url,
            api_uuid,
            api_secret,
            request_timeout: Duration::from_millis(request_timeout_ms),
            poll_interval: Duration::from_millis(poll_interval_ms),
            poll_timeout,
        })
    }

    /// Set the API endpoint.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the pending transaction poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Bound the time spent waiting for pending transactions.
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SdkConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert!(config.poll_timeout.is_none());
    }

    #[test]
    fn test_new_keeps_credentials() {
        let config = SdkConfig::new("uuid-1", "secret-1");
        assert_eq!(config.api_uuid, "uuid-1");
        assert_eq!(config.api_secret, "secret-1");
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_builder_methods() {
        let config = SdkConfig::new("u", "s")
            .with_api_url("http://127.0.0.1:9000/json.php")
            .with_request_timeout(Duration::from_secs(5))
            .with_poll_interval(Duration::from_millis(250))
            .with_poll_timeout(Duration::from_secs(60));

        assert_eq!(config.api_url, "http://127.0.0.1:9000/json.php");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.poll_timeout, Some(Duration::from_secs(60)));
    }
}
