//! HTTP client module
//!
//! Provides the authenticated incident.io client with retry, rate limiting,
//! and backoff strategies.
//!
//! # Features
//!
//! - **Automatic Retries**: transient failures retried up to `max_attempts`
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Backoff Strategies**: Constant, linear, and exponential backoff
//! - **Authentication**: Bearer token and versioned User-Agent on every request

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
