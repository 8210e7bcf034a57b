//! Shipment (outbound order) resource implementation.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::clients::{ApiClient, ApiError};
use crate::rest::params::require_id;
use crate::rest::resource::{
    acknowledgement_schema, list_of, records_from_list, resource_request, to_body, Resource,
};
use crate::rest::{ResourceOperation, ResourcePath};
use crate::schema::{array, enumeration, object, string, Schema};
use crate::HttpMethod;

use super::common::{self, Address, LineItem, Page, BULK_LIMIT};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShipmentStatus {
    #[default]
    Pending,
    Picking,
    Shipped,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Shipment {
    #[serde(skip_serializing)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing)]
    pub status: Option<ShipmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<LineItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_delivery_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing)]
    pub tracking_number: Option<String>,
    #[serde(skip_serializing)]
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct NewShipment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<LineItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_delivery_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

pub type ShipmentUpdate = NewShipment;

/// A change requested on a shipment the warehouse has started processing.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ModifyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_delivery_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ShipmentListParams {
    #[serde(flatten)]
    pub page: Page,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ShipmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipped_since: Option<DateTime<Utc>>,
}

fn shipment_fields() -> Schema {
    object([
        ("reference", string().min_len(1).max_len(100).optional()),
        ("recipient", common::address()),
        ("items", array(common::line_item()).min_items(1)),
        ("shipping_method", string().min_len(1).optional()),
        ("requested_delivery_date", common::date().nullish()),
        ("note", string().max_len(1000).nullish()),
    ])
}

fn shipment_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        shipment_fields().extend([
            ("id", string().min_len(1)),
            (
                "status",
                enumeration(["pending", "picking", "shipped", "cancelled"]),
            ),
            ("tracking_number", string().nullish()),
            ("shipped_at", common::timestamp()),
            ("created_at", common::timestamp()),
            ("updated_at", common::timestamp()),
        ])
    })
}

fn shipment_list_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| list_of(Shipment::PLURAL, shipment_schema().clone()))
}

fn new_shipment_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(shipment_fields)
}

fn shipment_update_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| shipment_fields().partial())
}

fn bulk_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        object([(
            Shipment::PLURAL,
            array(new_shipment_schema().clone())
                .min_items(1)
                .max_items(BULK_LIMIT),
        )])
    })
}

fn modify_request_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        object([
            ("reason", string().min_len(1).max_len(500)),
            ("recipient", common::address().optional()),
            ("requested_delivery_date", common::date().optional()),
            ("note", string().max_len(1000).optional()),
        ])
    })
}

impl Resource for Shipment {
    type Create = NewShipment;
    type Update = ShipmentUpdate;
    type ListParams = ShipmentListParams;

    const NAME: &'static str = "Shipment";
    const PLURAL: &'static str = "shipments";

    const PATHS: &'static [ResourcePath] = &[
        ResourcePath::new(
            HttpMethod::Get,
            ResourceOperation::Find,
            &["id"],
            "/shipments/{id}",
        ),
        ResourcePath::new(HttpMethod::Get, ResourceOperation::All, &[], "/shipments"),
        ResourcePath::new(HttpMethod::Post, ResourceOperation::Create, &[], "/shipments"),
        ResourcePath::new(
            HttpMethod::Put,
            ResourceOperation::Update,
            &["id"],
            "/shipments/{id}",
        ),
        ResourcePath::new(
            HttpMethod::Delete,
            ResourceOperation::Delete,
            &["id"],
            "/shipments/{id}",
        ),
        ResourcePath::new(
            HttpMethod::Post,
            ResourceOperation::Action("bulk"),
            &[],
            "/shipments/bulk",
        ),
        ResourcePath::new(
            HttpMethod::Post,
            ResourceOperation::Action("modify"),
            &["id"],
            "/shipments/{id}/modify",
        ),
        ResourcePath::new(
            HttpMethod::Post,
            ResourceOperation::Action("cancel"),
            &["id"],
            "/shipments/{id}/cancel",
        ),
    ];

    fn schema() -> &'static Schema {
        shipment_schema()
    }

    fn list_schema() -> &'static Schema {
        shipment_list_schema()
    }

    fn create_schema() -> &'static Schema {
        new_shipment_schema()
    }

    fn update_schema() -> &'static Schema {
        shipment_update_schema()
    }
}

impl Shipment {
    /// Creates several shipments in one request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] if `shipments` is empty, longer than
    /// [`BULK_LIMIT`], or any entry fails validation (no request sent).
    pub async fn bulk_create(
        client: &ApiClient,
        shipments: &[NewShipment],
    ) -> Result<Vec<Self>, ApiError> {
        let body = json!({ "shipments": to_body(&shipments)? });
        let request = resource_request::<Self>(ResourceOperation::Action("bulk"), &[])?
            .json(body)
            .schema(bulk_schema())
            .build();
        let value = client.call_value(request, shipment_list_schema()).await?;
        records_from_list(value, Self::PLURAL)
    }

    /// Asks the warehouse to change a shipment already in progress.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a blank `id` or a request without
    /// a `reason` (no request sent), or any other pipeline error.
    pub async fn modify_request(
        client: &ApiClient,
        id: &str,
        data: &ModifyRequest,
    ) -> Result<Self, ApiError> {
        let id = require_id(id)?;
        let request = resource_request::<Self>(ResourceOperation::Action("modify"), &[("id", id)])?
            .json(to_body(data)?)
            .schema(modify_request_schema())
            .build();
        client.call(request, shipment_schema()).await
    }

    /// Asks the warehouse to cancel a shipment. An empty response body
    /// yields `{}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a blank `id` (no request sent),
    /// or any other pipeline error.
    pub async fn cancel_request(client: &ApiClient, id: &str) -> Result<Value, ApiError> {
        let id = require_id(id)?;
        let request =
            resource_request::<Self>(ResourceOperation::Action("cancel"), &[("id", id)])?.build();
        client.call_value(request, acknowledgement_schema()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::get_path;

    fn recipient() -> Address {
        Address {
            name: Some("Jane Smith".into()),
            postal_code: Some("94107".into()),
            region: Some("CA".into()),
            city: Some("San Francisco".into()),
            address_line1: Some("500 Howard St".into()),
            phone: Some("415-555-0100".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_shipment_passes_create_schema() {
        let shipment = NewShipment {
            reference: Some("ORD-1".into()),
            recipient: Some(recipient()),
            items: Some(vec![LineItem::new("A-1", 1)]),
            requested_delivery_date: NaiveDate::from_ymd_opt(2024, 7, 1),
            ..Default::default()
        };
        let value = serde_json::to_value(&shipment).unwrap();
        assert!(Shipment::create_schema().validate(&value).is_ok());
    }

    #[test]
    fn test_new_shipment_requires_an_item() {
        let shipment = NewShipment {
            recipient: Some(recipient()),
            items: Some(Vec::new()),
            ..Default::default()
        };
        let value = serde_json::to_value(&shipment).unwrap();
        let issues = Shipment::create_schema().validate(&value).unwrap_err();
        assert!(issues[0].is_at(&["items"]));
    }

    #[test]
    fn test_missing_recipient_field_is_reported_with_full_path() {
        let mut address = recipient();
        address.city = None;
        let shipment = NewShipment {
            recipient: Some(address),
            items: Some(vec![LineItem::new("A-1", 1)]),
            ..Default::default()
        };
        let value = serde_json::to_value(&shipment).unwrap();
        let issues = Shipment::create_schema().validate(&value).unwrap_err();
        assert!(issues[0].is_at(&["recipient", "city"]));
    }

    #[test]
    fn test_modify_request_requires_reason() {
        let value = serde_json::to_value(ModifyRequest::default()).unwrap();
        let issues = modify_request_schema().validate(&value).unwrap_err();
        assert!(issues[0].is_at(&["reason"]));
    }

    #[test]
    fn test_shipment_serialization_omits_read_only_fields() {
        let shipment = Shipment {
            id: Some("shp_1".into()),
            status: Some(ShipmentStatus::Shipped),
            tracking_number: Some("1Z999".into()),
            reference: Some("ORD-1".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&shipment).unwrap();
        assert_eq!(value, json!({"reference": "ORD-1"}));
    }

    #[test]
    fn test_shipment_path_constants_are_correct() {
        let cancel = get_path(Shipment::PATHS, ResourceOperation::Action("cancel")).unwrap();
        assert_eq!(cancel.template, "/shipments/{id}/cancel");
        assert_eq!(cancel.http_method, HttpMethod::Post);

        let modify = get_path(Shipment::PATHS, ResourceOperation::Action("modify")).unwrap();
        assert_eq!(modify.template, "/shipments/{id}/modify");

        assert_eq!(Shipment::NAME, "Shipment");
        assert_eq!(Shipment::PLURAL, "shipments");
    }
}
