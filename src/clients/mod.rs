//! HTTP client types for fulfillment API communication.
//!
//! This module provides the request pipeline and the layers beneath it.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`ApiClient`]: The request pipeline (request validation, transport,
//!   response validation)
//! - [`Transport`]: Sends requests with headers, timeout, and retries
//! - [`ApiRequest`]: A request to be sent to the API
//! - [`RawResponse`]: An unparsed response
//! - [`HttpMethod`]: HTTP methods
//! - [`ApiError`] / [`ErrorKind`]: The error taxonomy
//! - [`classify`]: Maps failed responses onto [`ApiError`]
//!
//! # Retry Behavior
//!
//! The transport retries according to the configured
//! [`RetryPolicy`](crate::RetryPolicy):
//!
//! - only methods in the retryable set (GET, PUT, HEAD, DELETE, OPTIONS,
//!   TRACE by default), never POST or PATCH
//! - only statuses in the retryable set (408, 413, 429, 500, 502, 503, 504)
//! - `Retry-After` replaces the backoff for 413, 429 and 503
//! - timeouts and network errors are returned immediately
//!
//! The last failure is classified into an [`ApiError`].

mod api_client;
mod classify;
mod errors;
mod http_request;
mod http_response;
mod transport;

pub use api_client::ApiClient;
pub use classify::{classify, classify_at, parse_error_body, parse_retry_after};
pub use errors::{
    ApiError, BoxError, ErrorKind, DEFAULT_AUTHENTICATION_MESSAGE, DEFAULT_NOT_FOUND_MESSAGE,
    DEFAULT_RATE_LIMIT_MESSAGE, DEFAULT_VALIDATION_MESSAGE,
};
pub use http_request::{ApiRequest, ApiRequestBuilder, FileUpload, HttpMethod, RequestBody};
pub use http_response::{header_value, RawResponse, ResponseHeaders};
pub use transport::{Transport, API_PREFIX, SDK_VERSION};
