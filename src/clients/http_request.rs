//! Request descriptors for the fulfillment API.
//!
//! This module provides the [`ApiRequest`] type and its builder. A request
//! names the method, the path below the `/api` prefix, an optional JSON or
//! multipart body, query parameters, and an optional schema the JSON body
//! must satisfy before anything is sent.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::schema::Schema;

/// HTTP methods understood by the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
    /// HTTP PUT.
    Put,
    /// HTTP PATCH.
    Patch,
    /// HTTP DELETE.
    Delete,
    /// HTTP HEAD.
    Head,
    /// HTTP OPTIONS.
    Options,
    /// HTTP TRACE.
    Trace,
}

impl HttpMethod {
    /// Returns the upper-case method name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Patch => Self::PATCH,
            HttpMethod::Delete => Self::DELETE,
            HttpMethod::Head => Self::HEAD,
            HttpMethod::Options => Self::OPTIONS,
            HttpMethod::Trace => Self::TRACE,
        }
    }
}

/// A file sent as the single `file` part of a multipart request.
#[derive(Clone)]
pub struct FileUpload {
    /// File name reported to the server.
    pub file_name: String,
    /// MIME type of the content.
    pub content_type: String,
    /// Raw file content.
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Creates an upload from raw bytes.
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

// Content is omitted; uploads can be large.
impl fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// The body of a request.
#[derive(Clone, Debug)]
pub enum RequestBody {
    /// A JSON document, sent with `Content-Type: application/json`.
    Json(Value),
    /// A multipart form with one `file` part.
    Multipart(FileUpload),
}

impl RequestBody {
    /// Returns the JSON document, if this is a JSON body.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Multipart(_) => None,
        }
    }
}

/// A request to be sent through the [`ApiClient`](crate::ApiClient).
///
/// # Example
///
/// ```rust
/// use fulfillment_api::{ApiRequest, HttpMethod};
/// use fulfillment_api::schema::{object, string};
/// use serde_json::json;
///
/// let schema = object([("code", string())]);
/// let request = ApiRequest::builder(HttpMethod::Post, "/items")
///     .json(json!({"code": "A-1"}))
///     .schema(&schema)
///     .query_param("dry_run", "true")
///     .build();
///
/// assert_eq!(request.path, "/items");
/// assert!(request.request_schema.is_some());
/// ```
#[derive(Clone, Debug)]
pub struct ApiRequest<'a> {
    /// The HTTP method.
    pub method: HttpMethod,
    /// The path below the `/api` prefix, starting with `/`.
    pub path: String,
    /// The request body, if any.
    pub body: Option<RequestBody>,
    /// Query parameters, in insertion order.
    pub query: Vec<(String, String)>,
    /// Headers added to (or overriding) the defaults.
    pub extra_headers: HashMap<String, String>,
    /// Schema the JSON body must satisfy before sending.
    pub request_schema: Option<&'a Schema>,
}

impl<'a> ApiRequest<'a> {
    /// Creates a new builder for constructing an `ApiRequest`.
    #[must_use]
    pub fn builder(method: HttpMethod, path: impl Into<String>) -> ApiRequestBuilder<'a> {
        ApiRequestBuilder::new(method, path)
    }

    /// Returns the JSON body, if any.
    #[must_use]
    pub fn json_body(&self) -> Option<&Value> {
        self.body.as_ref().and_then(RequestBody::as_json)
    }

    /// Returns `true` if the body is multipart.
    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        matches!(self.body, Some(RequestBody::Multipart(_)))
    }
}

/// Builder for constructing [`ApiRequest`] instances.
#[derive(Debug)]
pub struct ApiRequestBuilder<'a> {
    request: ApiRequest<'a>,
}

impl<'a> ApiRequestBuilder<'a> {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        let mut path = path.into();
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        Self {
            request: ApiRequest {
                method,
                path,
                body: None,
                query: Vec::new(),
                extra_headers: HashMap::new(),
                request_schema: None,
            },
        }
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn json(mut self, body: impl Into<Value>) -> Self {
        self.request.body = Some(RequestBody::Json(body.into()));
        self
    }

    /// Sets a multipart body with a single `file` part.
    #[must_use]
    pub fn file(mut self, upload: FileUpload) -> Self {
        self.request.body = Some(RequestBody::Multipart(upload));
        self
    }

    /// Sets the schema the JSON body must satisfy.
    #[must_use]
    pub const fn schema(mut self, schema: &'a Schema) -> Self {
        self.request.request_schema = Some(schema);
        self
    }

    /// Appends all query parameters.
    #[must_use]
    pub fn query(mut self, query: impl IntoIterator<Item = (String, String)>) -> Self {
        self.request.query.extend(query);
        self
    }

    /// Appends a single query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.query.push((key.into(), value.into()));
        self
    }

    /// Adds a single extra header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.extra_headers.insert(key.into(), value.into());
        self
    }

    /// Builds the [`ApiRequest`].
    #[must_use]
    pub fn build(self) -> ApiRequest<'a> {
        self.request
    }
}
