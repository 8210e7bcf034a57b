//! The error taxonomy returned by every API call.
//!
//! Every failure surfaced by the [`ApiClient`](crate::ApiClient) is exactly
//! one [`ApiError`] variant. Errors are produced once, at the point of
//! failure, and propagate unchanged.
//!
//! # Error Handling
//!
//! - [`ApiError::Transport`]: the request never produced a usable response
//!   (network error, timeout, unparseable success body)
//! - [`ApiError::Api`]: a non-2xx status with no more specific mapping
//! - [`ApiError::Validation`]: a request or response failed its schema, or
//!   the server answered 400/422
//! - [`ApiError::Authentication`]: the server answered 401
//! - [`ApiError::RateLimited`]: the server answered 429
//! - [`ApiError::NotFound`]: the server answered 404
//!
//! # Example
//!
//! ```rust,ignore
//! use fulfillment_api::{ApiError, ErrorKind};
//!
//! match client.call::<Item>(request, &schema).await {
//!     Ok(item) => println!("{item:?}"),
//!     Err(ApiError::RateLimited { retry_after, .. }) => {
//!         println!("Slow down, retry in {retry_after:?}s");
//!     }
//!     Err(ApiError::Validation { issues, .. }) => {
//!         for issue in issues {
//!             println!("{issue}");
//!         }
//!     }
//!     Err(e) if e.kind() == ErrorKind::Authentication => println!("Check the token"),
//!     Err(e) => println!("Failed: {e}"),
//! }
//! ```

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::schema::ValidationIssue;

/// Boxed underlying cause of a transport failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Default message for 401 responses without a body message.
pub const DEFAULT_AUTHENTICATION_MESSAGE: &str = "Authentication failed";
/// Default message for 404 responses without a body message.
pub const DEFAULT_NOT_FOUND_MESSAGE: &str = "Resource not found";
/// Default message for 429 responses without a body message.
pub const DEFAULT_RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded";
/// Default message for 400/422 responses without a body message.
pub const DEFAULT_VALIDATION_MESSAGE: &str = "Invalid request";

/// The kind of an [`ApiError`], for matching without destructuring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Network failure, timeout, or unparseable success body.
    Transport,
    /// Unclassified non-2xx response.
    Api,
    /// Schema failure or 400/422 response.
    Validation,
    /// 401 response.
    Authentication,
    /// 429 response.
    RateLimited,
    /// 404 response.
    NotFound,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transport => "transport",
            Self::Api => "api",
            Self::Validation => "validation",
            Self::Authentication => "authentication",
            Self::RateLimited => "rate_limited",
            Self::NotFound => "not_found",
        };
        f.write_str(name)
    }
}

/// An API call failure.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request did not produce a usable response.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
        /// The underlying cause, such as a `reqwest::Error`.
        #[source]
        source: Option<BoxError>,
    },

    /// A non-2xx response without a more specific mapping.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the response body, or the status reason.
        message: String,
        /// The parsed response body.
        raw_response: Option<Value>,
    },

    /// A payload failed validation, locally or on the server.
    #[error("Validation failed: {message}")]
    Validation {
        /// Summary of the failure.
        message: String,
        /// Every issue found.
        issues: Vec<ValidationIssue>,
        /// HTTP status (400 or 422) for server-side failures.
        status: Option<u16>,
        /// The parsed response body, for server-side failures.
        raw_response: Option<Value>,
    },

    /// The server rejected the credentials (401).
    #[error("Authentication error: {message}")]
    Authentication {
        /// Message from the response body, or a default.
        message: String,
        /// The parsed response body.
        raw_response: Option<Value>,
    },

    /// The server is throttling requests (429).
    #[error("Rate limited: {message}")]
    RateLimited {
        /// Message from the response body, or a default.
        message: String,
        /// Seconds to wait, from the `Retry-After` header.
        retry_after: Option<u64>,
        /// The parsed response body.
        raw_response: Option<Value>,
    },

    /// The requested resource does not exist (404).
    #[error("Not found: {message}")]
    NotFound {
        /// Message from the response body, or a default.
        message: String,
        /// The parsed response body.
        raw_response: Option<Value>,
    },
}

// Verify ApiError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ApiError>();
};

impl ApiError {
    /// Creates a transport error wrapping `source`.
    pub fn transport(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a validation error from locally found issues.
    #[must_use]
    pub fn validation(message: impl Into<String>, issues: Vec<ValidationIssue>) -> Self {
        Self::Validation {
            message: message.into(),
            issues,
            status: None,
            raw_response: None,
        }
    }

    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Api { .. } => ErrorKind::Api,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::NotFound { .. } => ErrorKind::NotFound,
        }
    }

    /// Returns the HTTP status code for errors produced from a response.
    ///
    /// Local validation failures and transport failures have no status.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Authentication { .. } => Some(401),
            Self::RateLimited { .. } => Some(429),
            Self::NotFound { .. } => Some(404),
            Self::Validation { status, .. } => *status,
            Self::Transport { .. } => None,
        }
    }

    /// Returns the server-requested delay in seconds, for rate limits.
    #[must_use]
    pub const fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Returns the validation issues, empty for other kinds.
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Self::Validation { issues, .. } => issues,
            _ => &[],
        }
    }

    /// Returns the parsed response body, if the error came from a response.
    #[must_use]
    pub const fn raw_response(&self) -> Option<&Value> {
        match self {
            Self::Api { raw_response, .. }
            | Self::Validation { raw_response, .. }
            | Self::Authentication { raw_response, .. }
            | Self::RateLimited { raw_response, .. }
            | Self::NotFound { raw_response, .. } => raw_response.as_ref(),
            Self::Transport { .. } => None,
        }
    }

    /// Returns `true` if retrying the same call later may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::RateLimited { .. } => true,
            Self::Api { status, .. } => matches!(*status, 408 | 500 | 502 | 503 | 504),
            Self::Validation { .. } | Self::Authentication { .. } | Self::NotFound { .. } => false,
        }
    }
}
