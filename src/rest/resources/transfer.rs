//! Transfer (stock movement between warehouses) resource implementation.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rest::resource::{list_of, Resource};
use crate::rest::{ResourceOperation, ResourcePath};
use crate::schema::{array, enumeration, object, string, Schema, ValidationIssue};
use crate::HttpMethod;

use super::common::{self, LineItem, Page};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    #[default]
    Requested,
    InTransit,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Transfer {
    #[serde(skip_serializing)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_warehouse: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_warehouse: Option<String>,
    #[serde(skip_serializing)]
    pub status: Option<TransferStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<LineItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct NewTransfer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_warehouse: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_warehouse: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<LineItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

pub type TransferUpdate = NewTransfer;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TransferListParams {
    #[serde(flatten)]
    pub page: Page,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TransferStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_warehouse: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_warehouse: Option<String>,
}

fn distinct_warehouses(value: &Value) -> Vec<ValidationIssue> {
    let from = value.get("from_warehouse").and_then(Value::as_str);
    let to = value.get("to_warehouse").and_then(Value::as_str);
    match (from, to) {
        (Some(from), Some(to)) if from == to => vec![ValidationIssue::custom(
            vec!["to_warehouse".into()],
            "Destination must differ from the source warehouse",
        )],
        _ => Vec::new(),
    }
}

fn transfer_fields() -> Schema {
    object([
        ("from_warehouse", common::code()),
        ("to_warehouse", common::code()),
        ("scheduled_date", common::date().nullish()),
        ("items", array(common::line_item()).min_items(1)),
        ("note", string().max_len(1000).nullish()),
    ])
}

fn transfer_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        transfer_fields().extend([
            ("id", string().min_len(1)),
            (
                "status",
                enumeration(["requested", "in_transit", "completed", "cancelled"]),
            ),
            ("created_at", common::timestamp()),
            ("updated_at", common::timestamp()),
        ])
    })
}

fn transfer_list_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| list_of(Transfer::PLURAL, transfer_schema().clone()))
}

fn new_transfer_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| transfer_fields().refine("distinct_warehouses", distinct_warehouses))
}

fn transfer_update_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        transfer_fields()
            .partial()
            .refine("distinct_warehouses", distinct_warehouses)
    })
}

impl Resource for Transfer {
    type Create = NewTransfer;
    type Update = TransferUpdate;
    type ListParams = TransferListParams;

    const NAME: &'static str = "Transfer";
    const PLURAL: &'static str = "transfers";

    const PATHS: &'static [ResourcePath] = &[
        ResourcePath::new(
            HttpMethod::Get,
            ResourceOperation::Find,
            &["id"],
            "/transfers/{id}",
        ),
        ResourcePath::new(HttpMethod::Get, ResourceOperation::All, &[], "/transfers"),
        ResourcePath::new(HttpMethod::Post, ResourceOperation::Create, &[], "/transfers"),
        ResourcePath::new(
            HttpMethod::Put,
            ResourceOperation::Update,
            &["id"],
            "/transfers/{id}",
        ),
        ResourcePath::new(
            HttpMethod::Delete,
            ResourceOperation::Delete,
            &["id"],
            "/transfers/{id}",
        ),
    ];

    fn schema() -> &'static Schema {
        transfer_schema()
    }

    fn list_schema() -> &'static Schema {
        transfer_list_schema()
    }

    fn create_schema() -> &'static Schema {
        new_transfer_schema()
    }

    fn update_schema() -> &'static Schema {
        transfer_update_schema()
    }
}
