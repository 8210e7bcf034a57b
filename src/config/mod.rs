//! Configuration types for the fulfillment API client.
//!
//! This module provides the configuration used to initialize an
//! [`ApiClient`](crate::ApiClient).
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`ClientConfig`]: The immutable configuration holding all client settings
//! - [`ClientConfigBuilder`]: A builder for constructing [`ClientConfig`] instances
//! - [`ApiToken`]: A validated bearer token with masked debug output
//! - [`BaseUrl`]: A validated API host URL
//! - [`ApiVersion`]: The API version sent in the `X-Api-Version` header
//! - [`RetryPolicy`]: Retry limits, retryable methods and statuses, backoff
//!
//! # Example
//!
//! ```rust
//! use fulfillment_api::{ApiToken, ClientConfig, RetryPolicy};
//! use std::time::Duration;
//!
//! let config = ClientConfig::builder()
//!     .api_token(ApiToken::new("my-token").unwrap())
//!     .timeout(Duration::from_secs(10))
//!     .retry(RetryPolicy::default().limit(3))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.base_url().as_ref(), "http://localhost:8080");
//! ```

mod newtypes;
mod retry;
mod version;

pub use newtypes::{ApiToken, BaseUrl};
pub use retry::{default_backoff, BackoffFn, RetryPolicy};
pub use version::ApiVersion;

use std::time::Duration;

use crate::error::ConfigError;

/// Environment variable holding the API token.
pub const ENV_API_TOKEN: &str = "FULFILLMENT_API_TOKEN";
/// Environment variable holding the base URL.
pub const ENV_BASE_URL: &str = "FULFILLMENT_API_BASE_URL";
/// Environment variable holding the API version.
pub const ENV_API_VERSION: &str = "FULFILLMENT_API_VERSION";
/// Environment variable holding the per-attempt timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "FULFILLMENT_API_TIMEOUT_MS";

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Configuration for the fulfillment API client.
///
/// `ClientConfig` is created once and never mutated; every call made through
/// a client reads from the same configuration.
///
/// # Thread Safety
///
/// `ClientConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    api_token: ApiToken,
    base_url: BaseUrl,
    api_version: ApiVersion,
    timeout: Duration,
    retry: RetryPolicy,
    user_agent_prefix: Option<String>,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Builds a configuration from `FULFILLMENT_API_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the token is missing or any value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    /// Builds a configuration using `lookup` to resolve variable names.
    ///
    /// Unset variables fall back to the builder defaults; only
    /// [`ENV_API_TOKEN`] is required.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the token is missing or any value is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fulfillment_api::ClientConfig;
    ///
    /// let config = ClientConfig::from_env_with(|name| match name {
    ///     "FULFILLMENT_API_TOKEN" => Some("token".to_string()),
    ///     "FULFILLMENT_API_VERSION" => Some("1.4".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(config.api_version().to_string(), "1.4");
    /// ```
    pub fn from_env_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(ENV_API_TOKEN).ok_or(ConfigError::MissingRequiredField {
            field: "api_token",
        })?;
        let mut builder = Self::builder().api_token(ApiToken::new(token)?);

        if let Some(url) = lookup(ENV_BASE_URL) {
            builder = builder.base_url(BaseUrl::new(url)?);
        }
        if let Some(version) = lookup(ENV_API_VERSION) {
            builder = builder.api_version(version.parse()?);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let millis = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidEnvValue {
                    name: ENV_TIMEOUT_MS,
                    value: raw.clone(),
                })?;
            builder = builder.timeout(Duration::from_millis(millis));
        }

        builder.build()
    }

    /// Returns the API token.
    #[must_use]
    pub const fn api_token(&self) -> &ApiToken {
        &self.api_token
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the API version.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Returns the per-attempt timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// `api_token` is required. All other fields have defaults.
///
/// # Defaults
///
/// - `base_url`: `http://localhost:8080`
/// - `api_version`: `1.5`
/// - `timeout`: 30 seconds per attempt
/// - `retry`: [`RetryPolicy::default`]
/// - `user_agent_prefix`: `None`
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    api_token: Option<ApiToken>,
    base_url: Option<BaseUrl>,
    api_version: Option<ApiVersion>,
    timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
    user_agent_prefix: Option<String>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API token (required).
    #[must_use]
    pub fn api_token(mut self, token: ApiToken) -> Self {
        self.api_token = Some(token);
        self
    }

    /// Sets the base URL.
    #[must_use]
    pub fn base_url(mut self, url: BaseUrl) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API version.
    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Sets the per-attempt timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`ClientConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `api_token` is not set.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let api_token = self
            .api_token
            .ok_or(ConfigError::MissingRequiredField { field: "api_token" })?;

        Ok(ClientConfig {
            api_token,
            base_url: self.base_url.unwrap_or_default(),
            api_version: self.api_version.unwrap_or_else(ApiVersion::latest),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            retry: self.retry.unwrap_or_default(),
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}
