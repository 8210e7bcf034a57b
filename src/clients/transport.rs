//! HTTP transport with retry and timeout handling.
//!
//! This module provides the [`Transport`] type, which sends an
//! [`ApiRequest`] with the configured headers and per-attempt timeout,
//! retries transient failure statuses according to the
//! [`RetryPolicy`](crate::RetryPolicy), and classifies the final failure.

use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use crate::clients::classify::{classify, parse_error_body, parse_retry_after};
use crate::clients::errors::ApiError;
use crate::clients::http_request::{ApiRequest, RequestBody};
use crate::clients::http_response::{collect_headers, RawResponse};
use crate::config::ClientConfig;
use crate::error::ConfigError;

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fixed path prefix between the base URL and every resource path.
pub const API_PREFIX: &str = "/api";

/// Sends requests to the fulfillment API.
///
/// The transport handles:
/// - URL construction from the base URL, `/api` prefix, and request path
/// - Default headers including bearer token, API version, and User-Agent
/// - Per-attempt timeouts
/// - Retries of retryable methods on retryable statuses
/// - Classification of the final non-2xx response
///
/// # Thread Safety
///
/// `Transport` is `Send + Sync`, making it safe to share across async tasks.
#[derive(Debug)]
pub struct Transport {
    client: reqwest::Client,
    config: ClientConfig,
    default_headers: HashMap<String, String>,
}

// Verify Transport is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Transport>();
};

impl Transport {
    /// Creates a transport for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the underlying HTTP client
    /// cannot be created (for example, TLS initialization failure).
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let user_agent = format!("{user_agent_prefix}Fulfillment API Library v{SDK_VERSION} | Rust");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());
        default_headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", config.api_token().as_ref()),
        );
        default_headers.insert("X-Api-Version".to_string(), config.api_version().to_string());

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .map_err(|e| ConfigError::HttpClient {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            config,
            default_headers,
        })
    }

    /// Returns the configuration this transport was built with.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the headers sent with every request.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Returns the full URL for a request path.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}{}", self.config.base_url(), API_PREFIX, path)
    }

    /// Sends the request, retrying per the retry policy.
    ///
    /// Returns the first 2xx response unchanged.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Transport`] on timeout or network failure (never retried)
    /// - the classified error for the last non-2xx response otherwise
    pub async fn execute(&self, request: &ApiRequest<'_>) -> Result<RawResponse, ApiError> {
        let url = self.url_for(&request.path);
        let policy = self.config.retry();

        let mut headers = self.default_headers.clone();
        if !request.is_multipart() {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }
        for (key, value) in &request.extra_headers {
            headers.insert(key.clone(), value.clone());
        }

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            tracing::debug!(method = %request.method, url = %url, attempt, "Sending request");

            let req_builder = self.build_attempt(request, &url, &headers)?;
            let res = req_builder
                .send()
                .await
                .map_err(|e| self.transport_error(e))?;

            let status = res.status().as_u16();
            let res_headers = collect_headers(res.headers());
            // A failure status is classified even when its body is cut off.
            let body = match res.bytes().await {
                Ok(body) => body.to_vec(),
                Err(e) if (200..300).contains(&status) => return Err(self.transport_error(e)),
                Err(e) => {
                    tracing::debug!(status, error = %e, "Failed to read error response body");
                    Vec::new()
                }
            };
            let response = RawResponse::new(status, res_headers, body);

            if let Some(reason) = response.deprecation_reason() {
                tracing::warn!(
                    path = %request.path,
                    reason,
                    "Deprecated request to fulfillment API"
                );
            }

            if response.is_ok() {
                return Ok(response);
            }

            if policy.should_retry(request.method, status, attempt) {
                let retry_after = response
                    .header("retry-after")
                    .and_then(|value| parse_retry_after(value, SystemTime::now()))
                    .map(Duration::from_secs);
                let delay = policy.delay_for(attempt, status, retry_after);
                tracing::warn!(
                    method = %request.method,
                    url = %url,
                    status,
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Retrying request after failure status"
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            let error_body = parse_error_body(response.header("content-type"), &response.body);
            return Err(classify(status, &response.headers, error_body));
        }
    }

    fn build_attempt(
        &self,
        request: &ApiRequest<'_>,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        let mut req_builder = self
            .client
            .request(request.method.into(), url)
            .timeout(self.config.timeout());

        for (key, value) in headers {
            req_builder = req_builder.header(key, value);
        }

        if !request.query.is_empty() {
            req_builder = req_builder.query(&request.query);
        }

        // Multipart forms are consumed on send, so each attempt rebuilds its body.
        match &request.body {
            Some(RequestBody::Json(body)) => {
                req_builder = req_builder.body(body.to_string());
            }
            Some(RequestBody::Multipart(upload)) => {
                let part = reqwest::multipart::Part::bytes(upload.bytes.clone())
                    .file_name(upload.file_name.clone())
                    .mime_str(&upload.content_type)
                    .map_err(|e| ApiError::transport("Invalid upload content type", e))?;
                req_builder = req_builder.multipart(reqwest::multipart::Form::new().part("file", part));
            }
            None => {}
        }

        Ok(req_builder)
    }

    fn transport_error(&self, error: reqwest::Error) -> ApiError {
        let message = if error.is_timeout() {
            format!(
                "Request timed out after {}ms",
                self.config.timeout().as_millis()
            )
        } else {
            format!("Network error: {error}")
        };
        ApiError::transport(message, error)
    }
}
