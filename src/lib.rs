//! # Fulfillment API Rust Client
//!
//! A typed client for a warehousing and fulfillment HTTP API: items, inbound
//! warehousings, outbound shipments, and transfers between warehouses.
//!
//! ## Overview
//!
//! Every call passes through one pipeline:
//!
//! 1. the request body is validated against its [`Schema`]; a failure is
//!    returned as [`ApiError::Validation`] before any network I/O
//! 2. the [`Transport`](clients::Transport) sends the request with the
//!    configured headers, timeout, and retry policy
//! 3. a non-2xx response is classified into one [`ErrorKind`]
//! 4. a 2xx body is parsed and validated against the response schema, then
//!    deserialized into the target type
//!
//! This crate provides:
//! - Type-safe configuration via [`ClientConfig`] and [`ClientConfigBuilder`]
//! - Validated newtypes for the token, base URL, and API version
//! - Composable runtime schemas in [`schema`]
//! - A closed error taxonomy, [`ApiError`]
//! - Resource wrappers in [`rest::resources`]
//!
//! ## Quick Start
//!
//! ```rust
//! use fulfillment_api::{ApiToken, ApiVersion, BaseUrl, ClientConfig};
//!
//! let config = ClientConfig::builder()
//!     .api_token(ApiToken::new("your-api-token").unwrap())
//!     .base_url(BaseUrl::new("https://fulfillment.example.com").unwrap())
//!     .api_version(ApiVersion::latest())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.api_version().to_string(), "1.5");
//! ```
//!
//! ## Making API Requests
//!
//! ```rust,no_run
//! use fulfillment_api::rest::resources::Shipment;
//! use fulfillment_api::rest::Resource;
//! use fulfillment_api::{ApiClient, ApiError, ErrorKind};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::from_env()?;
//!
//! match Shipment::get(&client, "shp_123").await {
//!     Ok(shipment) => println!("status: {:?}", shipment.status),
//!     Err(ApiError::NotFound { .. }) => println!("no such shipment"),
//!     Err(e) if e.kind() == ErrorKind::RateLimited => {
//!         println!("retry in {:?}s", e.retry_after());
//!     }
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Lower-Level Calls
//!
//! ```rust,no_run
//! use fulfillment_api::schema::{object, string};
//! use fulfillment_api::{ApiClient, ApiRequest, HttpMethod};
//!
//! # async fn run(client: ApiClient) -> Result<(), fulfillment_api::ApiError> {
//! let response_schema = object([("status", string())]).passthrough();
//! let request = ApiRequest::builder(HttpMethod::Get, "/health").build();
//! let body = client.call_value(request, &response_schema).await?;
//! println!("{body}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: Newtypes and request payloads validate before use
//! - **Thread-safe**: All public types are `Send + Sync`
//! - **Async-first**: Designed for use with the Tokio runtime
//! - **Typed failures**: Every error is exactly one [`ErrorKind`]

pub mod clients;
pub mod config;
pub mod error;
pub mod rest;
pub mod schema;

// Re-export public types at crate root for convenience
pub use config::{ApiToken, ApiVersion, BaseUrl, ClientConfig, ClientConfigBuilder, RetryPolicy};
pub use error::ConfigError;

// Re-export pipeline types
pub use clients::{
    ApiClient, ApiError, ApiRequest, ApiRequestBuilder, ErrorKind, FileUpload, HttpMethod,
    RawResponse,
};

// Re-export schema types
pub use schema::{IssueKind, PathSegment, Schema, ValidationIssue, ValidationResult};
