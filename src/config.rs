//! Tap configuration
//!
//! The configuration is a small JSON document. `api_key` and `endpoint` can
//! also come from the environment (`INCIDENT_API_KEY`, `INCIDENT_ENDPOINT`);
//! values in the file win over the environment.

use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::types::{BackoffType, OptionStringExt};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default incident.io API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.incident.io";

/// Environment variable holding the API key
pub const ENV_API_KEY: &str = "INCIDENT_API_KEY";

/// Environment variable overriding the API endpoint
pub const ENV_ENDPOINT: &str = "INCIDENT_ENDPOINT";

/// Tap configuration loaded from `--config`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// Bearer token for the incident.io API
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Page size sent with paginated requests
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Total attempts per request, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Per-request timeout
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Client-side request budget (0 disables throttling)
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    /// Override for the User-Agent header
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_page_size() -> u32 {
    50
}

fn default_max_attempts() -> u32 {
    5
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_requests_per_minute() -> u32 {
    1200
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_endpoint(),
            page_size: default_page_size(),
            max_attempts: default_max_attempts(),
            timeout_seconds: default_timeout_seconds(),
            requests_per_minute: default_requests_per_minute(),
            user_agent: None,
        }
    }
}

impl TapConfig {
    /// Load configuration from an optional file plus the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let contents = match path {
            Some(path) => Some(std::fs::read_to_string(path).map_err(|e| {
                Error::config(format!(
                    "Failed to read config file {}: {e}",
                    path.display()
                ))
            })?),
            None => None,
        };
        Self::from_sources(contents.as_deref(), |key| std::env::var(key).ok())
    }

    /// Build configuration from raw JSON and an environment lookup.
    ///
    /// Non-empty file values take precedence over the environment.
    pub fn from_sources<F>(json: Option<&str>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: TapConfig = match json {
            Some(json) => serde_json::from_str(json)
                .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?,
            None => TapConfig::default(),
        };

        if config.api_key.trim().is_empty() {
            if let Some(key) = env(ENV_API_KEY).none_if_empty() {
                config.api_key = key;
            }
        }

        let endpoint_in_file = json
            .and_then(|j| serde_json::from_str::<serde_json::Value>(j).ok())
            .and_then(|v| v.get("endpoint").and_then(|e| e.as_str()).map(String::from))
            .none_if_empty();
        if endpoint_in_file.is_none() {
            if let Some(endpoint) = env(ENV_ENDPOINT).none_if_empty() {
                config.endpoint = endpoint;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate required fields and value ranges
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::missing_field("api_key"));
        }
        url::Url::parse(&self.endpoint)
            .map_err(|e| Error::invalid_value("endpoint", e.to_string()))?;
        if self.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be greater than 0"));
        }
        if self.max_attempts == 0 {
            return Err(Error::invalid_value("max_attempts", "must be greater than 0"));
        }
        Ok(())
    }

    /// HTTP client configuration derived from this config
    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(&self.endpoint)
            .bearer_token(&self.api_key)
            .timeout(Duration::from_secs(self.timeout_seconds))
            .max_attempts(self.max_attempts)
            .page_size(self.page_size)
            .backoff(
                BackoffType::Exponential,
                Duration::from_secs(2),
                Duration::from_secs(60),
            );

        builder = if self.requests_per_minute == 0 {
            builder.no_rate_limit()
        } else {
            builder.rate_limit(RateLimiterConfig::per_minute(self.requests_per_minute))
        };

        if let Some(agent) = self.user_agent.clone().none_if_empty() {
            builder = builder.user_agent(agent);
        }

        builder.build()
    }
}
