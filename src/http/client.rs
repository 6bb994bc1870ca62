//! HTTP client with retry and rate limiting
//!
//! Provides the client used for every incident.io call:
//! - Bearer authentication and a versioned User-Agent on every request
//! - Automatic retries of transient failures with configurable backoff
//! - Rate limiting to stay under the API quota
//! - Error classification into transient and fatal API errors

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::error::{is_retryable_status, Error, Result};
use crate::types::BackoffType;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for all requests
    pub base_url: Option<String>,
    /// Bearer token sent in the Authorization header
    pub bearer_token: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Total attempts per request, including the first
    pub max_attempts: u32,
    /// Page size applied to paginated requests that do not set one
    pub page_size: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            bearer_token: None,
            timeout: Duration::from_secs(30),
            max_attempts: 5,
            page_size: 50,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            rate_limit: Some(RateLimiterConfig::default()),
            default_headers: HashMap::new(),
            user_agent: format!("tap-incident/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the bearer token
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.config.bearer_token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set total attempts per request
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    /// Set the default page size
    pub fn page_size(mut self, size: u32) -> Self {
        self.config.page_size = size;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters
    pub query: HashMap<String, String>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body (JSON)
    pub body: Option<Value>,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
    /// Override total attempts for this request
    pub max_attempts: Option<u32>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set total attempts
    #[must_use]
    pub fn attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }
}

/// HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Default page size for paginated requests
    pub fn page_size(&self) -> u32 {
        self.config.page_size
    }

    /// Fetch one page: GET `path` and parse the body as JSON
    pub async fn fetch_page(&self, path: &str, config: RequestConfig) -> Result<Value> {
        self.request_json(Method::GET, path, config).await
    }

    /// Make a request and parse the JSON response
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<T> {
        let body = self.request(method, path, config).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Make a generic request and read the whole response body.
    ///
    /// Transient failures (connect errors, timeouts, bodies cut off while
    /// reading, 429 and any 5xx) are retried until `max_attempts` is used up.
    /// Any other non-success status is returned immediately as
    /// [`Error::Api`].
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<Vec<u8>> {
        let full_url = self.build_url(path);
        let max_attempts = config
            .max_attempts
            .unwrap_or(self.config.max_attempts)
            .max(1);
        let timeout = config.timeout.unwrap_or(self.config.timeout);

        let mut attempt = 0;
        loop {
            attempt += 1;

            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            let mut req = self
                .client
                .request(method.clone(), &full_url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .timeout(timeout);

            if let Some(ref token) = self.config.bearer_token {
                req = req.bearer_auth(token);
            }

            for (key, value) in &self.config.default_headers {
                req = req.header(key.as_str(), value.as_str());
            }

            for (key, value) in &config.headers {
                req = req.header(key.as_str(), value.as_str());
            }

            if !config.query.is_empty() {
                req = req.query(&config.query);
            }

            if let Some(ref body) = config.body {
                req = req.json(body);
            }

            debug!(
                "{} {} (attempt {}/{})",
                method, full_url, attempt, max_attempts
            );

            let error = match req.send().await {
                Ok(response) if response.status().is_success() => {
                    match response.bytes().await {
                        Ok(body) => return Ok(body.to_vec()),
                        Err(e) => {
                            let error = Error::Http(e);
                            if !error.is_retryable() || attempt >= max_attempts {
                                return Err(error);
                            }
                            error
                        }
                    }
                }
                Ok(response) => {
                    let status = response.status();
                    let retry_after = if status == StatusCode::TOO_MANY_REQUESTS {
                        extract_retry_after(&response)
                    } else {
                        None
                    };
                    let body = response.text().await.unwrap_or_default();
                    let error = Error::api(status.as_u16(), &body);

                    if !is_retryable_status(status.as_u16()) || attempt >= max_attempts {
                        return Err(error);
                    }

                    if let Some(wait) = retry_after {
                        let delay = wait.min(self.config.max_backoff);
                        warn!(
                            "Rate limited (429) on {}, attempt {}/{}, waiting {:?}",
                            full_url, attempt, max_attempts, delay
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    error
                }
                Err(e) => {
                    let error = Error::Http(e);
                    if !error.is_retryable() || attempt >= max_attempts {
                        return Err(error);
                    }
                    error
                }
            };

            let delay = self.calculate_backoff(attempt - 1);
            warn!(
                "Request to {} failed ({}), attempt {}/{}, retrying in {:?}",
                full_url, error, attempt, max_attempts, delay
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                format!("{base}/{path}")
            }
            None => path.to_string(),
        }
    }

    /// Calculate backoff delay after the given number of failed retries
    pub fn calculate_backoff(&self, retry: u32) -> Duration {
        let delay = match self.config.backoff_type {
            BackoffType::Constant => self.config.initial_backoff,
            BackoffType::Linear => self.config.initial_backoff.saturating_mul(retry + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(retry);
                self.config.initial_backoff.saturating_mul(factor)
            }
        };

        std::cmp::min(delay, self.config.max_backoff)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.config.base_url)
            .field("max_attempts", &self.config.max_attempts)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Extract the retry-after header value, in seconds
fn extract_retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
