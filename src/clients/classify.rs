//! Mapping of failed HTTP responses onto [`ApiError`].
//!
//! Classification is total: every status and every body shape, including
//! malformed or missing bodies, produces exactly one error.

use std::time::SystemTime;

use serde_json::Value;

use crate::clients::errors::{
    ApiError, DEFAULT_AUTHENTICATION_MESSAGE, DEFAULT_NOT_FOUND_MESSAGE,
    DEFAULT_RATE_LIMIT_MESSAGE, DEFAULT_VALIDATION_MESSAGE,
};
use crate::clients::http_response::{header_value, ResponseHeaders};
use crate::schema::ValidationIssue;

/// Classifies a non-2xx response using the current time for `Retry-After` dates.
///
/// # Example
///
/// ```rust
/// use fulfillment_api::clients::classify;
/// use fulfillment_api::ErrorKind;
/// use serde_json::json;
/// use std::collections::HashMap;
///
/// let mut headers = HashMap::new();
/// headers.insert("retry-after".to_string(), vec!["120".to_string()]);
///
/// let error = classify(429, &headers, Some(json!({"message": "slow down"})));
/// assert_eq!(error.kind(), ErrorKind::RateLimited);
/// assert_eq!(error.retry_after(), Some(120));
/// ```
#[must_use]
pub fn classify(status: u16, headers: &ResponseHeaders, body: Option<Value>) -> ApiError {
    classify_at(status, headers, body, SystemTime::now())
}

/// Classifies a non-2xx response, resolving `Retry-After` dates against `now`.
#[must_use]
pub fn classify_at(
    status: u16,
    headers: &ResponseHeaders,
    body: Option<Value>,
    now: SystemTime,
) -> ApiError {
    let body_message = body.as_ref().and_then(message_from_body);
    let message_or = |default: &str| body_message.clone().unwrap_or_else(|| default.to_string());

    match status {
        401 => ApiError::Authentication {
            message: message_or(DEFAULT_AUTHENTICATION_MESSAGE),
            raw_response: body,
        },
        404 => ApiError::NotFound {
            message: message_or(DEFAULT_NOT_FOUND_MESSAGE),
            raw_response: body,
        },
        429 => ApiError::RateLimited {
            message: message_or(DEFAULT_RATE_LIMIT_MESSAGE),
            retry_after: header_value(headers, "retry-after")
                .and_then(|value| parse_retry_after(value, now)),
            raw_response: body,
        },
        400 | 422 => {
            let message = message_or(DEFAULT_VALIDATION_MESSAGE);
            ApiError::Validation {
                issues: vec![ValidationIssue::custom(Vec::new(), message.clone())],
                message,
                status: Some(status),
                raw_response: body,
            }
        }
        _ => ApiError::Api {
            status,
            message: message_or(&format!("Request failed with status {status}")),
            raw_response: body,
        },
    }
}

/// Parses an error body for classification.
///
/// JSON content types are parsed as JSON; anything else is kept as text.
/// Returns `None` for empty or unparseable bodies.
#[must_use]
pub fn parse_error_body(content_type: Option<&str>, bytes: &[u8]) -> Option<Value> {
    let is_json = content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"));
    if is_json {
        return serde_json::from_slice(bytes).ok();
    }

    let text = String::from_utf8_lossy(bytes);
    if text.trim().is_empty() {
        None
    } else {
        Some(Value::String(text.into_owned()))
    }
}

/// Parses a `Retry-After` header value into whole seconds.
///
/// Accepts delay-seconds or an HTTP date. Dates in the past yield 0;
/// fractional seconds round up. Anything else yields `None`.
///
/// # Example
///
/// ```rust
/// use fulfillment_api::clients::parse_retry_after;
/// use std::time::{Duration, SystemTime};
///
/// let now = SystemTime::now();
/// assert_eq!(parse_retry_after("120", now), Some(120));
/// assert_eq!(parse_retry_after("soon", now), None);
///
/// let in_a_minute = httpdate::fmt_http_date(now + Duration::from_secs(61));
/// let seconds = parse_retry_after(&in_a_minute, now).unwrap();
/// assert!((60..=61).contains(&seconds));
/// ```
#[must_use]
pub fn parse_retry_after(value: &str, now: SystemTime) -> Option<u64> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(seconds);
    }

    let date = httpdate::parse_http_date(value).ok()?;
    Some(date.duration_since(now).map_or(0, |wait| {
        wait.as_secs() + u64::from(wait.subsec_nanos() > 0)
    }))
}

fn message_from_body(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.trim().is_empty())
        .map(ToString::to_string)
}
