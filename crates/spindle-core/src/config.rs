// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Client configuration and request URL composition.
//!
//! [`ClientConfig`] is immutable once the client has been started. The URL
//! helpers live here because the request shape is pure configuration: base
//! URL, optional device path segment, and the sample query parameters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Constants
// =============================================================================

/// Default sample stream interval in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = 500;

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default retry backoff in milliseconds.
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 10_000;

/// Default maximum number of samples per request window.
pub const DEFAULT_MAX_SAMPLE_COUNT: u64 = 200;

// =============================================================================
// ClientConfig
// =============================================================================

/// Configuration for a single agent client.
///
/// One client serves one agent base URL with an optional device filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the agent, e.g. `http://agent.example:5000`.
    pub base_url: String,

    /// Restricts requests and stream selection to one device by name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,

    /// Sample stream interval in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Request timeout in milliseconds. Applies to one-shot requests and
    /// to the connect and read-idle phases of the sample stream.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Backoff before retrying after any failure, in milliseconds.
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    /// Maximum number of samples requested per window.
    #[serde(default = "default_max_sample_count")]
    pub max_sample_count: u64,
}

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_retry_interval_ms() -> u64 {
    DEFAULT_RETRY_INTERVAL_MS
}

fn default_max_sample_count() -> u64 {
    DEFAULT_MAX_SAMPLE_COUNT
}

impl ClientConfig {
    /// Creates a configuration with defaults for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            device_name: None,
            interval_ms: DEFAULT_INTERVAL_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
            max_sample_count: DEFAULT_MAX_SAMPLE_COUNT,
        }
    }

    /// Returns a builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::missing_field("base_url"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::validation(
                "base_url",
                "must start with http:// or https://",
            ));
        }
        if self.interval_ms == 0 {
            return Err(ConfigError::validation("interval_ms", "must be positive"));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::validation("timeout_ms", "must be positive"));
        }
        if self.retry_interval_ms == 0 {
            return Err(ConfigError::validation(
                "retry_interval_ms",
                "must be positive",
            ));
        }
        if self.max_sample_count == 0 {
            return Err(ConfigError::validation(
                "max_sample_count",
                "must be at least 1",
            ));
        }
        if let Some(name) = &self.device_name {
            if name.trim().is_empty() {
                return Err(ConfigError::validation(
                    "device_name",
                    "must not be empty when set",
                ));
            }
        }
        Ok(())
    }

    /// Sample stream interval.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Retry backoff.
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    // =========================================================================
    // Request URLs
    // =========================================================================

    /// URL of the probe request.
    pub fn probe_url(&self) -> String {
        self.device_scoped("probe")
    }

    /// URL of the current request.
    pub fn current_url(&self) -> String {
        self.device_scoped("current")
    }

    /// URL of the assets request. Assets are agent-wide, never
    /// device-scoped.
    pub fn assets_url(&self) -> String {
        format!("{}/assets", self.trimmed_base())
    }

    /// URL of a sample stream request starting at `from`.
    pub fn sample_url(&self, from: u64) -> String {
        format!(
            "{}?from={}&count={}&interval={}",
            self.device_scoped("sample"),
            from,
            self.max_sample_count,
            self.interval_ms
        )
    }

    fn device_scoped(&self, operation: &str) -> String {
        match &self.device_name {
            Some(device) => format!("{}/{}/{}", self.trimmed_base(), device, operation),
            None => format!("{}/{}", self.trimmed_base(), operation),
        }
    }

    fn trimmed_base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    device_name: Option<String>,
    interval_ms: Option<u64>,
    timeout_ms: Option<u64>,
    retry_interval_ms: Option<u64>,
    max_sample_count: Option<u64>,
}

impl ClientConfigBuilder {
    /// Sets the agent base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the device name filter.
    pub fn device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self
    }

    /// Sets the sample stream interval.
    pub fn interval_ms(mut self, millis: u64) -> Self {
        self.interval_ms = Some(millis);
        self
    }

    /// Sets the request timeout.
    pub fn timeout_ms(mut self, millis: u64) -> Self {
        self.timeout_ms = Some(millis);
        self
    }

    /// Sets the retry backoff.
    pub fn retry_interval_ms(mut self, millis: u64) -> Self {
        self.retry_interval_ms = Some(millis);
        self
    }

    /// Sets the maximum sample window size.
    pub fn max_sample_count(mut self, count: u64) -> Self {
        self.max_sample_count = Some(count);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> ConfigResult<ClientConfig> {
        let config = ClientConfig {
            base_url: self.base_url.ok_or_else(|| ConfigError::missing_field("base_url"))?,
            device_name: self.device_name,
            interval_ms: self.interval_ms.unwrap_or(DEFAULT_INTERVAL_MS),
            timeout_ms: self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
            retry_interval_ms: self.retry_interval_ms.unwrap_or(DEFAULT_RETRY_INTERVAL_MS),
            max_sample_count: self.max_sample_count.unwrap_or(DEFAULT_MAX_SAMPLE_COUNT),
        };

        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("http://agent.example:5000");
        assert_eq!(config.interval_ms, 500);
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(config.retry_interval_ms, 10_000);
        assert_eq!(config.max_sample_count, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::builder()
            .base_url("http://agent.example:5000")
            .device_name("VMC-3Axis")
            .interval_ms(250)
            .max_sample_count(100)
            .build()
            .unwrap();

        assert_eq!(config.device_name.as_deref(), Some("VMC-3Axis"));
        assert_eq!(config.interval_ms, 250);
        assert_eq!(config.max_sample_count, 100);
    }

    #[test]
    fn test_builder_requires_base_url() {
        let result = ClientConfig::builder().build();
        assert!(matches!(result, Err(ConfigError::MissingField { .. })));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ClientConfig::new("ftp://agent");
        assert!(config.validate().is_err());

        config.base_url = "http://agent".to_string();
        config.interval_ms = 0;
        assert!(config.validate().is_err());

        config.interval_ms = 500;
        config.max_sample_count = 0;
        assert!(config.validate().is_err());

        config.max_sample_count = 1;
        config.device_name = Some("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_urls_without_device() {
        let config = ClientConfig::new("http://agent.example:5000/");

        assert_eq!(config.probe_url(), "http://agent.example:5000/probe");
        assert_eq!(config.current_url(), "http://agent.example:5000/current");
        assert_eq!(config.assets_url(), "http://agent.example:5000/assets");
        assert_eq!(
            config.sample_url(1000),
            "http://agent.example:5000/sample?from=1000&count=200&interval=500"
        );
    }

    #[test]
    fn test_urls_with_device() {
        let config = ClientConfig::builder()
            .base_url("http://agent.example:5000")
            .device_name("VMC-3Axis")
            .build()
            .unwrap();

        assert_eq!(
            config.probe_url(),
            "http://agent.example:5000/VMC-3Axis/probe"
        );
        assert_eq!(
            config.sample_url(7),
            "http://agent.example:5000/VMC-3Axis/sample?from=7&count=200&interval=500"
        );
        // Assets stay agent-wide even with a device filter.
        assert_eq!(config.assets_url(), "http://agent.example:5000/assets");
    }

    #[test]
    fn test_serde_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url": "http://agent.example:5000"}"#).unwrap();

        assert_eq!(config.interval_ms, DEFAULT_INTERVAL_MS);
        assert_eq!(config.max_sample_count, DEFAULT_MAX_SAMPLE_COUNT);
        assert!(config.device_name.is_none());
    }
}
