//! Raw HTTP responses returned by the transport.
//!
//! This module provides the [`RawResponse`] type: the status, headers, and
//! unparsed body of a response. Parsing and schema validation happen in the
//! request pipeline, not here.

use std::collections::HashMap;

/// Response header map with lower-cased names; repeated headers keep every value.
pub type ResponseHeaders = HashMap<String, Vec<String>>;

/// Headers the server uses to flag a deprecated API version or endpoint.
const DEPRECATION_HEADERS: [&str; 2] = ["deprecation", "x-api-deprecated-reason"];

/// An unparsed HTTP response.
///
/// # Example
///
/// ```rust
/// use fulfillment_api::clients::RawResponse;
/// use std::collections::HashMap;
///
/// let mut headers = HashMap::new();
/// headers.insert("content-type".to_string(), vec!["application/json".to_string()]);
///
/// let response = RawResponse::new(200, headers, br#"{"id":"1"}"#.to_vec());
/// assert!(response.is_ok());
/// assert_eq!(response.header("Content-Type"), Some("application/json"));
/// assert_eq!(response.text(), r#"{"id":"1"}"#);
/// ```
#[derive(Clone, Debug)]
pub struct RawResponse {
    /// The HTTP status code.
    pub status: u16,
    /// Response headers, keyed by lower-cased name.
    pub headers: ResponseHeaders,
    /// The raw response body.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Creates a response. Header names are lower-cased.
    #[must_use]
    pub fn new(status: u16, headers: ResponseHeaders, body: Vec<u8>) -> Self {
        let headers = headers
            .into_iter()
            .map(|(name, values)| (name.to_lowercase(), values))
            .collect();
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status >= 200 && self.status <= 299
    }

    /// Returns the first value of the named header (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }

    /// Returns the body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Returns the deprecation notice sent by the server, if any.
    #[must_use]
    pub fn deprecation_reason(&self) -> Option<&str> {
        DEPRECATION_HEADERS
            .iter()
            .find_map(|name| self.header(name))
    }
}

/// Looks up the first value of a header in a lower-cased header map.
#[must_use]
pub fn header_value<'a>(headers: &'a ResponseHeaders, name: &str) -> Option<&'a str> {
    headers
        .get(&name.to_lowercase())
        .and_then(|values| values.first())
        .map(String::as_str)
}

/// Converts reqwest headers into a [`ResponseHeaders`] map.
pub(crate) fn collect_headers(headers: &reqwest::header::HeaderMap) -> ResponseHeaders {
    let mut result: ResponseHeaders = HashMap::new();
    for (name, value) in headers {
        let key = name.as_str().to_lowercase();
        let value = value.to_str().unwrap_or_default().to_string();
        result.entry(key).or_default().push(value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> ResponseHeaders {
        let mut map: ResponseHeaders = HashMap::new();
        for (name, value) in pairs {
            map.entry((*name).to_string())
                .or_default()
                .push((*value).to_string());
        }
        map
    }

    #[test]
    fn test_is_ok_covers_2xx_only() {
        assert!(RawResponse::new(200, HashMap::new(), Vec::new()).is_ok());
        assert!(RawResponse::new(204, HashMap::new(), Vec::new()).is_ok());
        assert!(!RawResponse::new(199, HashMap::new(), Vec::new()).is_ok());
        assert!(!RawResponse::new(301, HashMap::new(), Vec::new()).is_ok());
        assert!(!RawResponse::new(404, HashMap::new(), Vec::new()).is_ok());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = RawResponse::new(
            200,
            headers(&[("Retry-After", "30"), ("X-Trace", "a"), ("X-Trace", "b")]),
            Vec::new(),
        );

        assert_eq!(response.header("retry-after"), Some("30"));
        assert_eq!(response.header("RETRY-AFTER"), Some("30"));
        assert_eq!(response.header("x-trace"), Some("a"));
        assert_eq!(response.headers["x-trace"].len(), 2);
        assert!(response.header("missing").is_none());
    }

    #[test]
    fn test_text_is_lossy() {
        let response = RawResponse::new(200, HashMap::new(), vec![b'o', b'k', 0xff]);
        assert!(response.text().starts_with("ok"));
    }

    #[test]
    fn test_deprecation_reason() {
        let response = RawResponse::new(
            200,
            headers(&[("X-Api-Deprecated-Reason", "version 1.3 is retired")]),
            Vec::new(),
        );
        assert_eq!(response.deprecation_reason(), Some("version 1.3 is retired"));

        let response = RawResponse::new(200, HashMap::new(), Vec::new());
        assert!(response.deprecation_reason().is_none());
    }
}
