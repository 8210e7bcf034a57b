//! The request pipeline every API call passes through.
//!
//! [`ApiClient::call`] validates the outbound payload, sends it through the
//! [`Transport`], and validates and deserializes the response. Failures at
//! any stage surface as a single [`ApiError`].

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::clients::errors::ApiError;
use crate::clients::http_request::{ApiRequest, RequestBody};
use crate::clients::transport::Transport;
use crate::config::ClientConfig;
use crate::error::ConfigError;
use crate::schema::Schema;

/// Typed client for the fulfillment API.
///
/// One client can be shared by any number of concurrent tasks; each call
/// owns its own retry state.
///
/// # Thread Safety
///
/// `ApiClient` is `Send + Sync`.
///
/// # Example
///
/// ```rust,no_run
/// use fulfillment_api::schema::{object, string};
/// use fulfillment_api::{ApiClient, ApiRequest, ApiToken, ClientConfig, HttpMethod};
/// use serde_json::Value;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::builder()
///     .api_token(ApiToken::new("my-token")?)
///     .build()?;
/// let client = ApiClient::new(config)?;
///
/// let schema = object([("id", string()), ("code", string())]).passthrough();
/// let request = ApiRequest::builder(HttpMethod::Get, "/items/42").build();
/// let item: Value = client.call(request, &schema).await?;
/// println!("{item}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ApiClient {
    transport: Transport,
}

// Verify ApiClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ApiClient>();
};

impl ApiClient {
    /// Creates a client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            transport: Transport::new(config)?,
        })
    }

    /// Creates a client configured from `FULFILLMENT_API_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the environment holds no token or an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        self.transport.config()
    }

    /// Returns the underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Sends a request and returns the response validated against
    /// `response_schema` and deserialized into `T`.
    ///
    /// An empty response body is treated as `null` when the schema accepts
    /// an absent value and as `{}` otherwise; it is not validated.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Validation`] if the request body fails its schema (no
    ///   request is sent), the response fails `response_schema`, or the
    ///   validated value does not fit `T`
    /// - [`ApiError::Transport`] on network failure, timeout, or an
    ///   unparseable success body
    /// - the classified error for a non-2xx response
    pub async fn call<T: DeserializeOwned>(
        &self,
        request: ApiRequest<'_>,
        response_schema: &Schema,
    ) -> Result<T, ApiError> {
        let value = self.call_value(request, response_schema).await?;
        serde_json::from_value(value).map_err(|e| {
            tracing::debug!(error = %e, "Validated response does not fit target type");
            ApiError::validation(
                format!("Response could not be deserialized: {e}"),
                Vec::new(),
            )
        })
    }

    /// Like [`call`](Self::call), returning the validated JSON value.
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn call_value(
        &self,
        request: ApiRequest<'_>,
        response_schema: &Schema,
    ) -> Result<Value, ApiError> {
        let request = validate_request(request)?;
        let response = self.transport.execute(&request).await?;

        let text = response.text();
        if text.trim().is_empty() {
            return Ok(if response_schema.accepts_absent() {
                Value::Null
            } else {
                Value::Object(Map::new())
            });
        }

        let parsed: Value = serde_json::from_str(&text).map_err(|e| {
            ApiError::transport(
                format!("Response body from {} is not valid JSON", request.path),
                e,
            )
        })?;

        response_schema.validate(&parsed).map_err(|issues| {
            tracing::debug!(
                path = %request.path,
                issues = issues.len(),
                "Response failed schema validation"
            );
            ApiError::validation("Invalid response from API", issues)
        })
    }

    /// Sends a request expecting a binary document and returns its bytes.
    ///
    /// Used for PDF endpoints; sends `Accept: application/pdf` and skips
    /// response validation.
    ///
    /// # Errors
    ///
    /// Same as [`call`](Self::call), minus response validation.
    pub async fn call_binary(&self, request: ApiRequest<'_>) -> Result<Vec<u8>, ApiError> {
        let mut request = validate_request(request)?;
        request
            .extra_headers
            .entry("Accept".to_string())
            .or_insert_with(|| "application/pdf".to_string());

        let response = self.transport.execute(&request).await?;
        Ok(response.body)
    }
}

/// Validates the JSON body against the request schema, replacing it with the
/// normalized value.
fn validate_request(mut request: ApiRequest<'_>) -> Result<ApiRequest<'_>, ApiError> {
    let Some(schema) = request.request_schema else {
        return Ok(request);
    };

    let body = request.json_body();
    let normalized = schema.validate_optional(body).map_err(|issues| {
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            issues = issues.len(),
            "Request failed schema validation"
        );
        ApiError::validation("Invalid request payload", issues)
    })?;

    if !request.is_multipart() && !(body.is_none() && normalized.is_null()) {
        request.body = Some(RequestBody::Json(normalized));
    }
    Ok(request)
}
