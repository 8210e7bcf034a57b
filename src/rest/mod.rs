//! Resource-oriented wrappers over the request pipeline.
//!
//! This module provides:
//!
//! - **[`Resource`] trait**: `get`, `list`, `create`, `update`, and `delete`
//!   for any type that declares its paths and schemas
//! - **Path building**: [`ResourcePath`] tables with [`build_path`]
//!   interpolation
//! - **Parameters**: [`serialize_to_query`] for list filters and
//!   [`require_id`] for path identifiers
//! - **[`resources`]**: items, warehousings, shipments, and transfers
//!
//! # Example
//!
//! ```rust,no_run
//! use fulfillment_api::rest::resources::{Item, ItemListParams, NewItem};
//! use fulfillment_api::rest::Resource;
//! use fulfillment_api::{ApiClient, ApiToken, ClientConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::builder()
//!     .api_token(ApiToken::new("secret-token")?)
//!     .build()?;
//! let client = ApiClient::new(config)?;
//!
//! let created = Item::create(
//!     &client,
//!     &NewItem {
//!         code: Some("SKU-1".into()),
//!         name: Some("T-shirt".into()),
//!         ..Default::default()
//!     },
//! )
//! .await?;
//!
//! let items = Item::list(&client, &ItemListParams::default()).await?;
//! println!("{} items, newest {:?}", items.len(), created.id);
//! # Ok(())
//! # }
//! ```

mod params;
mod path;
mod resource;

pub mod resources;

pub use params::{require_id, require_path_param, serialize_to_query};
pub use path::{build_path, get_path, ResourceOperation, ResourcePath};
pub use resource::Resource;
