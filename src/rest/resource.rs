//! The [`Resource`] trait for CRUD endpoints.
//!
//! A resource declares its paths, names, payload types, and schemas; the
//! trait supplies `get`, `list`, `create`, `update`, and `delete` on top of
//! the [`ApiClient`] pipeline.
//!
//! # Implementing a Resource
//!
//! ```rust,ignore
//! impl Resource for Transfer {
//!     type Create = NewTransfer;
//!     type Update = TransferUpdate;
//!     type ListParams = TransferListParams;
//!
//!     const NAME: &'static str = "Transfer";
//!     const PLURAL: &'static str = "transfers";
//!     const PATHS: &'static [ResourcePath] = &[/* ... */];
//!
//!     fn schema() -> &'static Schema { transfer_schema() }
//!     fn list_schema() -> &'static Schema { transfer_list_schema() }
//!     fn create_schema() -> &'static Schema { new_transfer_schema() }
//!     fn update_schema() -> &'static Schema { transfer_update_schema() }
//! }
//!
//! let transfer = Transfer::get(&client, "T-1").await?;
//! let transfers = Transfer::list(&client, &TransferListParams::default()).await?;
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::clients::{ApiClient, ApiError, ApiRequest, ApiRequestBuilder};
use crate::rest::params::{require_id, serialize_to_query};
use crate::rest::path::{build_path, get_path, ResourceOperation, ResourcePath};
use crate::schema::{array, object, Field, Schema};

/// A remote record type with standard CRUD endpoints.
#[allow(async_fn_in_trait)]
pub trait Resource: DeserializeOwned + Send + Sync + Sized {
    /// Payload accepted by `create`.
    type Create: Serialize + Sync;
    /// Payload accepted by `update`.
    type Update: Serialize + Sync;
    /// Filters and paging accepted by `list`.
    type ListParams: Serialize + Default + Sync;

    /// The singular name, used in error messages (e.g. "Item").
    const NAME: &'static str;
    /// The plural name, used in paths and as the list response key.
    const PLURAL: &'static str;
    /// Declared endpoints.
    const PATHS: &'static [ResourcePath];

    /// Schema of a single record response.
    fn schema() -> &'static Schema;
    /// Schema of a list response (`{"<plural>": [...]}`).
    fn list_schema() -> &'static Schema;
    /// Schema the `create` payload must satisfy.
    fn create_schema() -> &'static Schema;
    /// Schema the `update` payload must satisfy.
    fn update_schema() -> &'static Schema;

    /// Fetches a record by ID.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a blank `id` (no request sent),
    /// [`ApiError::NotFound`] if the record does not exist, or any other
    /// pipeline error.
    async fn get(client: &ApiClient, id: &str) -> Result<Self, ApiError> {
        let id = require_id(id)?;
        let request = resource_request::<Self>(ResourceOperation::Find, &[("id", id)])?.build();
        client.call(request, Self::schema()).await
    }

    /// Lists records matching `params`.
    ///
    /// # Errors
    ///
    /// Returns any pipeline error.
    async fn list(client: &ApiClient, params: &Self::ListParams) -> Result<Vec<Self>, ApiError> {
        let query = serialize_to_query(params)?;
        let request = resource_request::<Self>(ResourceOperation::All, &[])?
            .query(query)
            .build();
        let value = client.call_value(request, Self::list_schema()).await?;
        records_from_list::<Self>(value, Self::PLURAL)
    }

    /// Creates a record.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] if `data` fails
    /// [`create_schema`](Self::create_schema) (no request sent), or any
    /// other pipeline error.
    async fn create(client: &ApiClient, data: &Self::Create) -> Result<Self, ApiError> {
        let request = resource_request::<Self>(ResourceOperation::Create, &[])?
            .json(to_body(data)?)
            .schema(Self::create_schema())
            .build();
        client.call(request, Self::schema()).await
    }

    /// Updates a record.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a blank `id` or a payload failing
    /// [`update_schema`](Self::update_schema) (no request sent), or any other
    /// pipeline error.
    async fn update(client: &ApiClient, id: &str, data: &Self::Update) -> Result<Self, ApiError> {
        let id = require_id(id)?;
        let request = resource_request::<Self>(ResourceOperation::Update, &[("id", id)])?
            .json(to_body(data)?)
            .schema(Self::update_schema())
            .build();
        client.call(request, Self::schema()).await
    }

    /// Deletes a record and returns the server's acknowledgement body.
    ///
    /// An empty response body yields `{}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a blank `id` (no request sent),
    /// or any other pipeline error.
    async fn delete(client: &ApiClient, id: &str) -> Result<Value, ApiError> {
        let id = require_id(id)?;
        let request = resource_request::<Self>(ResourceOperation::Delete, &[("id", id)])?.build();
        client.call_value(request, acknowledgement_schema()).await
    }
}

/// Schema for acknowledgement bodies of delete and cancel endpoints.
pub(crate) fn acknowledgement_schema() -> &'static Schema {
    static SCHEMA: std::sync::OnceLock<Schema> = std::sync::OnceLock::new();
    SCHEMA.get_or_init(|| object(Vec::<Field>::new()).passthrough())
}

/// Starts a request for a declared endpoint of `R`.
pub(crate) fn resource_request<'a, R: Resource>(
    operation: ResourceOperation,
    ids: &[(&str, &str)],
) -> Result<ApiRequestBuilder<'a>, ApiError> {
    let path = get_path(R::PATHS, operation).ok_or_else(|| {
        ApiError::validation(
            format!("{} has no '{}' endpoint", R::NAME, operation.as_str()),
            Vec::new(),
        )
    })?;
    Ok(ApiRequest::builder(path.http_method, build_path(path.template, ids)))
}

/// Serializes a payload into a JSON body.
pub(crate) fn to_body<T: Serialize>(data: &T) -> Result<Value, ApiError> {
    serde_json::to_value(data).map_err(|e| {
        ApiError::validation(format!("Failed to serialize request body: {e}"), Vec::new())
    })
}

/// Extracts and deserializes the records under `key` of a list response.
pub(crate) fn records_from_list<T: DeserializeOwned>(
    mut value: Value,
    key: &str,
) -> Result<Vec<T>, ApiError> {
    let records = value.get_mut(key).map_or(Value::Array(Vec::new()), Value::take);
    serde_json::from_value(records).map_err(|e| {
        ApiError::validation(
            format!("Response could not be deserialized: {e}"),
            Vec::new(),
        )
    })
}

/// The list schema for records matching `record`, keyed by `plural`.
///
/// A missing key reads as an empty list.
pub(crate) fn list_of(plural: &str, record: Schema) -> Schema {
    object([(plural, array(record).with_default(Value::Array(Vec::new())))])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_records_from_list_reads_plural_key() {
        let value = json!({"items": [1, 2, 3]});
        let records: Vec<u32> = records_from_list(value, "items").unwrap();
        assert_eq!(records, vec![1, 2, 3]);
    }

    #[test]
    fn test_records_from_list_missing_key_is_empty() {
        let records: Vec<u32> = records_from_list(json!({}), "items").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_records_from_list_type_mismatch_is_validation() {
        let error = records_from_list::<u32>(json!({"items": ["x"]}), "items").unwrap_err();
        assert_eq!(error.kind(), crate::clients::ErrorKind::Validation);
    }

    #[test]
    fn test_list_schema_defaults_missing_key_to_empty() {
        let schema = list_of("items", crate::schema::string());
        assert_eq!(schema.validate(&json!({})).unwrap(), json!({"items": []}));
        assert!(schema.validate(&json!({"items": [1]})).is_err());
    }

    #[derive(Debug, serde::Deserialize)]
    struct Carrier;

    fn carrier_schema() -> &'static Schema {
        static SCHEMA: std::sync::OnceLock<Schema> = std::sync::OnceLock::new();
        SCHEMA.get_or_init(|| object([("code", crate::schema::string())]))
    }

    impl Resource for Carrier {
        type Create = ();
        type Update = ();
        type ListParams = ();

        const NAME: &'static str = "Carrier";
        const PLURAL: &'static str = "carriers";
        const PATHS: &'static [ResourcePath] = &[ResourcePath::new(
            crate::clients::HttpMethod::Get,
            ResourceOperation::Find,
            &["id"],
            "/carriers/{id}",
        )];

        fn schema() -> &'static Schema {
            carrier_schema()
        }

        fn list_schema() -> &'static Schema {
            carrier_schema()
        }

        fn create_schema() -> &'static Schema {
            carrier_schema()
        }

        fn update_schema() -> &'static Schema {
            carrier_schema()
        }
    }

    fn offline_client() -> ApiClient {
        let config = crate::ClientConfig::builder()
            .api_token(crate::ApiToken::new("token").unwrap())
            .base_url(crate::BaseUrl::new("http://127.0.0.1:1").unwrap())
            .build()
            .unwrap();
        ApiClient::new(config).unwrap()
    }

    #[test]
    fn test_undeclared_operation_is_validation_error() {
        let client = offline_client();
        let error = tokio_test::block_on(Carrier::delete(&client, "dhl")).unwrap_err();

        assert_eq!(error.kind(), crate::clients::ErrorKind::Validation);
        assert!(error.to_string().contains("Carrier has no 'delete' endpoint"));
    }

    #[test]
    fn test_blank_id_fails_before_transport() {
        let client = offline_client();
        let error = tokio_test::block_on(Carrier::get(&client, "")).unwrap_err();

        assert!(error.issues()[0].is_at(&["id"]));
    }

    #[test]
    fn test_acknowledgement_schema_accepts_any_object() {
        let value = json!({"deleted": true, "id": "1"});
        assert_eq!(acknowledgement_schema().validate(&value).unwrap(), value);
        assert!(!acknowledgement_schema().accepts_absent());
    }
}
