//! Item resource implementation.
//!
//! Besides CRUD, items support bulk registration and product images.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::clients::{ApiClient, ApiError, FileUpload};
use crate::rest::params::{require_id, require_path_param};
use crate::rest::resource::{
    acknowledgement_schema, list_of, records_from_list, resource_request, to_body, Resource,
};
use crate::rest::{ResourceOperation, ResourcePath};
use crate::schema::{array, enumeration, field, number, object, string, Field, Schema};
use crate::HttpMethod;

use super::common::{self, Page, BULK_LIMIT};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Normal,
    Set,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ItemImage {
    #[serde(skip_serializing)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Item {
    #[serde(skip_serializing)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ItemImage>>,
    #[serde(skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NewItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Fields to change on an existing item; the code is fixed once registered.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ItemListParams {
    #[serde(flatten)]
    pub page: Page,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_since: Option<DateTime<Utc>>,
}

fn kind_schema() -> Schema {
    enumeration(["normal", "set"])
}

fn image_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        object([
            ("id", string().min_len(1)),
            ("url", string().min_len(1)),
            ("position", number().min(0.0).coerce().optional()),
        ])
    })
}

fn item_attributes() -> Vec<Field> {
    vec![
        field("name", string().min_len(1).max_len(255)),
        field("barcode", string().max_len(64).nullish()),
        field("price", number().min(0.0).coerce().nullish()),
        field("weight", number().min(0.0).coerce().nullish()),
        field("kind", kind_schema().optional()),
        field("tags", array(string().min_len(1)).optional()),
    ]
}

fn item_fields() -> Schema {
    object([field("code", common::code())]).extend(item_attributes())
}

fn item_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        item_fields().extend([
            ("id", string().min_len(1)),
            ("images", array(image_schema().clone()).optional()),
            ("created_at", common::timestamp()),
            ("updated_at", common::timestamp()),
        ])
    })
}

fn item_list_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| list_of(Item::PLURAL, item_schema().clone()))
}

fn new_item_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(item_fields)
}

fn item_update_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| object(item_attributes()).partial())
}

fn bulk_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        object([(
            Item::PLURAL,
            array(new_item_schema().clone())
                .min_items(1)
                .max_items(BULK_LIMIT),
        )])
    })
}

impl Resource for Item {
    type Create = NewItem;
    type Update = ItemUpdate;
    type ListParams = ItemListParams;

    const NAME: &'static str = "Item";
    const PLURAL: &'static str = "items";

    const PATHS: &'static [ResourcePath] = &[
        ResourcePath::new(HttpMethod::Get, ResourceOperation::Find, &["id"], "/items/{id}"),
        ResourcePath::new(HttpMethod::Get, ResourceOperation::All, &[], "/items"),
        ResourcePath::new(HttpMethod::Post, ResourceOperation::Create, &[], "/items"),
        ResourcePath::new(HttpMethod::Put, ResourceOperation::Update, &["id"], "/items/{id}"),
        ResourcePath::new(
            HttpMethod::Delete,
            ResourceOperation::Delete,
            &["id"],
            "/items/{id}",
        ),
        ResourcePath::new(
            HttpMethod::Post,
            ResourceOperation::Action("bulk"),
            &[],
            "/items/bulk",
        ),
        ResourcePath::new(
            HttpMethod::Post,
            ResourceOperation::Action("upload_image"),
            &["id"],
            "/items/{id}/images",
        ),
        ResourcePath::new(
            HttpMethod::Delete,
            ResourceOperation::Action("delete_image"),
            &["id", "image_id"],
            "/items/{id}/images/{image_id}",
        ),
    ];

    fn schema() -> &'static Schema {
        item_schema()
    }

    fn list_schema() -> &'static Schema {
        item_list_schema()
    }

    fn create_schema() -> &'static Schema {
        new_item_schema()
    }

    fn update_schema() -> &'static Schema {
        item_update_schema()
    }
}

impl Item {
    /// Registers several items in one request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] if `items` is empty, longer than
    /// [`BULK_LIMIT`], or any entry fails validation (no request sent). Issue
    /// paths start at `["items", index]`.
    pub async fn bulk_create(client: &ApiClient, items: &[NewItem]) -> Result<Vec<Self>, ApiError> {
        let body = json!({ "items": to_body(&items)? });
        let request = resource_request::<Self>(ResourceOperation::Action("bulk"), &[])?
            .json(body)
            .schema(bulk_schema())
            .build();
        let value = client.call_value(request, item_list_schema()).await?;
        records_from_list(value, Self::PLURAL)
    }

    /// Uploads a product image as multipart field `file`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a blank `id` (no request sent),
    /// or any other pipeline error.
    pub async fn upload_image(
        client: &ApiClient,
        id: &str,
        upload: FileUpload,
    ) -> Result<ItemImage, ApiError> {
        let id = require_id(id)?;
        let request =
            resource_request::<Self>(ResourceOperation::Action("upload_image"), &[("id", id)])?
                .file(upload)
                .build();
        client.call(request, image_schema()).await
    }

    /// Removes a product image.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a blank `id` or `image_id` (no
    /// request sent), or any other pipeline error.
    pub async fn delete_image(
        client: &ApiClient,
        id: &str,
        image_id: &str,
    ) -> Result<Value, ApiError> {
        let id = require_id(id)?;
        let image_id = require_path_param("image_id", image_id)?;
        let request = resource_request::<Self>(
            ResourceOperation::Action("delete_image"),
            &[("id", id), ("image_id", image_id)],
        )?
        .build();
        client.call_value(request, acknowledgement_schema()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::{get_path, serialize_to_query};
    use crate::schema::IssueKind;

    #[test]
    fn test_item_serialization_omits_read_only_fields() {
        let item = Item {
            id: Some("itm_1".into()),
            code: Some("SKU-1".into()),
            name: Some("T-shirt".into()),
            price: Some(1200.0),
            kind: Some(ItemKind::Set),
            created_at: Some(Utc::now()),
            ..Default::default()
        };

        let parsed = serde_json::to_value(&item).unwrap();

        assert_eq!(parsed["code"], "SKU-1");
        assert_eq!(parsed["kind"], "set");
        assert!(parsed.get("id").is_none());
        assert!(parsed.get("created_at").is_none());
        assert!(parsed.get("barcode").is_none());
    }

    #[test]
    fn test_schema_valid_response_deserializes() {
        let response = json!({
            "id": "itm_1",
            "code": "SKU-1",
            "name": "T-shirt",
            "price": "1200",
            "barcode": null,
            "tags": ["summer"],
            "images": [{"id": "img_1", "url": "https://cdn.example.com/1.png", "position": 1}],
            "created_at": "2024-05-01T09:30:00Z",
            "stock": 4
        });

        let value = Item::schema().validate(&response).unwrap();
        assert!(value.get("stock").is_none());

        let item: Item = serde_json::from_value(value).unwrap();
        assert_eq!(item.price, Some(1200.0));
        assert_eq!(item.barcode, None);
        assert_eq!(item.images.unwrap()[0].id.as_deref(), Some("img_1"));
        assert!(item.created_at.is_some());
    }

    #[test]
    fn test_new_item_requires_code() {
        let payload = serde_json::to_value(NewItem {
            name: Some("T-shirt".into()),
            ..Default::default()
        })
        .unwrap();

        let issues = Item::create_schema().validate(&payload).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_at(&["code"]));
        assert_eq!(issues[0].kind, IssueKind::InvalidType);
        assert_eq!(issues[0].message, "Required");
    }

    #[test]
    fn test_update_schema_drops_code_and_requires_nothing() {
        let value = Item::update_schema()
            .validate(&json!({"code": "X", "price": "5"}))
            .unwrap();
        assert_eq!(value, json!({"price": 5}));
        assert!(Item::update_schema().validate(&json!({})).is_ok());
    }

    #[test]
    fn test_bulk_schema_reports_indexed_paths() {
        let body = json!({"items": [
            {"code": "A", "name": "First"},
            {"name": "Second"}
        ]});
        let issues = bulk_schema().validate(&body).unwrap_err();
        assert!(issues[0].is_at(&["items", "1", "code"]));

        let empty = bulk_schema().validate(&json!({"items": []})).unwrap_err();
        assert_eq!(empty[0].kind, IssueKind::TooSmall);
    }

    #[test]
    fn test_item_list_params_flatten_page() {
        let params = ItemListParams {
            page: Page {
                page: Some(2),
                per_page: Some(50),
            },
            codes: Some(vec!["A".into(), "B".into()]),
            ..Default::default()
        };
        let query = serialize_to_query(&params).unwrap();
        assert!(query.contains(&("page".to_string(), "2".to_string())));
        assert!(query.contains(&("per_page".to_string(), "50".to_string())));
        assert!(query.contains(&("codes".to_string(), "A,B".to_string())));
    }

    #[test]
    fn test_item_path_constants_are_correct() {
        let find_path = get_path(Item::PATHS, ResourceOperation::Find).unwrap();
        assert_eq!(find_path.template, "/items/{id}");
        assert_eq!(find_path.http_method, HttpMethod::Get);

        let delete_image = get_path(Item::PATHS, ResourceOperation::Action("delete_image")).unwrap();
        assert_eq!(delete_image.http_method, HttpMethod::Delete);
        assert_eq!(delete_image.id_count(), 2);

        let bulk = get_path(Item::PATHS, ResourceOperation::Action("bulk")).unwrap();
        assert_eq!(bulk.template, "/items/bulk");

        assert_eq!(Item::NAME, "Item");
        assert_eq!(Item::PLURAL, "items");
    }
}
