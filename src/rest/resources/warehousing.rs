//! Warehousing (inbound stock) resource implementation.
//!
//! Create and update payloads carry two cross-field rules on top of their
//! structure:
//!
//! - [`duplicate_item_codes`]: an item code may appear once per request
//! - [`arrival_window`]: `arrival_time_from` must be earlier than
//!   `arrival_time_to`
//!
//! Both report [`IssueKind::Custom`](crate::schema::IssueKind::Custom) issues
//! and run before any request is sent.

use std::collections::HashSet;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clients::{ApiClient, ApiError};
use crate::rest::params::{require_id, serialize_to_query};
use crate::rest::resource::{list_of, records_from_list, resource_request, Resource};
use crate::rest::{ResourceOperation, ResourcePath};
use crate::schema::{array, enumeration, object, string, PathSegment, Schema, ValidationIssue};
use crate::HttpMethod;

use super::common::{self, LineItem, Page};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WarehousingStatus {
    #[default]
    Pending,
    Arrived,
    Stocked,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Warehousing {
    #[serde(skip_serializing)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing)]
    pub status: Option<WarehousingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_time_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_time_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<LineItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing)]
    pub stocked_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct NewWarehousing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_time_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_time_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<LineItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

pub type WarehousingUpdate = NewWarehousing;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct WarehousingListParams {
    #[serde(flatten)]
    pub page: Page,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WarehousingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_date_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_date_to: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_code: Option<String>,
}

/// Reports every line item whose code already appeared earlier in `items`.
#[must_use]
pub fn duplicate_item_codes(value: &Value) -> Vec<ValidationIssue> {
    let Some(items) = value.get("items").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut issues = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let Some(code) = item.get("item_code").and_then(Value::as_str) else {
            continue;
        };
        if !seen.insert(code) {
            issues.push(ValidationIssue::custom(
                vec!["items".into(), PathSegment::Index(index), "item_code".into()],
                format!("Duplicate item code '{code}'"),
            ));
        }
    }
    issues
}

/// Requires `arrival_time_from` to be earlier than `arrival_time_to` when
/// both are given.
#[must_use]
pub fn arrival_window(value: &Value) -> Vec<ValidationIssue> {
    let time = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .and_then(|raw| NaiveTime::parse_from_str(raw, "%H:%M").ok())
    };

    match (time("arrival_time_from"), time("arrival_time_to")) {
        (Some(from), Some(to)) if from >= to => vec![ValidationIssue::custom(
            vec!["arrival_time_to".into()],
            "Arrival window must end after it starts",
        )],
        _ => Vec::new(),
    }
}

fn status_schema() -> Schema {
    enumeration(["pending", "arrived", "stocked", "cancelled"])
}

fn warehousing_fields() -> Schema {
    object([
        ("reference", string().min_len(1).max_len(100).optional()),
        ("expected_date", common::date()),
        ("arrival_time_from", common::time_of_day().nullish()),
        ("arrival_time_to", common::time_of_day().nullish()),
        ("items", array(common::line_item()).min_items(1)),
        ("note", string().max_len(1000).nullish()),
    ])
}

fn warehousing_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        warehousing_fields().extend([
            ("id", string().min_len(1)),
            ("status", status_schema()),
            ("stocked_at", common::timestamp()),
            ("created_at", common::timestamp()),
            ("updated_at", common::timestamp()),
        ])
    })
}

fn warehousing_list_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| list_of(Warehousing::PLURAL, warehousing_schema().clone()))
}

fn new_warehousing_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        warehousing_fields()
            .refine("duplicate_item_codes", duplicate_item_codes)
            .refine("arrival_window", arrival_window)
    })
}

fn warehousing_update_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        warehousing_fields()
            .partial()
            .refine("duplicate_item_codes", duplicate_item_codes)
            .refine("arrival_window", arrival_window)
    })
}

impl Resource for Warehousing {
    type Create = NewWarehousing;
    type Update = WarehousingUpdate;
    type ListParams = WarehousingListParams;

    const NAME: &'static str = "Warehousing";
    const PLURAL: &'static str = "warehousings";

    const PATHS: &'static [ResourcePath] = &[
        ResourcePath::new(
            HttpMethod::Get,
            ResourceOperation::Find,
            &["id"],
            "/warehousings/{id}",
        ),
        ResourcePath::new(HttpMethod::Get, ResourceOperation::All, &[], "/warehousings"),
        ResourcePath::new(
            HttpMethod::Post,
            ResourceOperation::Create,
            &[],
            "/warehousings",
        ),
        ResourcePath::new(
            HttpMethod::Put,
            ResourceOperation::Update,
            &["id"],
            "/warehousings/{id}",
        ),
        ResourcePath::new(
            HttpMethod::Delete,
            ResourceOperation::Delete,
            &["id"],
            "/warehousings/{id}",
        ),
        ResourcePath::new(
            HttpMethod::Get,
            ResourceOperation::Action("stocked"),
            &[],
            "/warehousings/stocked",
        ),
        ResourcePath::new(
            HttpMethod::Get,
            ResourceOperation::Action("label"),
            &["id"],
            "/warehousings/{id}/label.pdf",
        ),
    ];

    fn schema() -> &'static Schema {
        warehousing_schema()
    }

    fn list_schema() -> &'static Schema {
        warehousing_list_schema()
    }

    fn create_schema() -> &'static Schema {
        new_warehousing_schema()
    }

    fn update_schema() -> &'static Schema {
        warehousing_update_schema()
    }
}

impl Warehousing {
    /// Lists warehousings whose stock has been received.
    ///
    /// # Errors
    ///
    /// Returns any pipeline error.
    pub async fn list_stocked(
        client: &ApiClient,
        params: &WarehousingListParams,
    ) -> Result<Vec<Self>, ApiError> {
        let query = serialize_to_query(params)?;
        let request = resource_request::<Self>(ResourceOperation::Action("stocked"), &[])?
            .query(query)
            .build();
        let value = client.call_value(request, warehousing_list_schema()).await?;
        records_from_list(value, Self::PLURAL)
    }

    /// Downloads the arrival label as PDF bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a blank `id` (no request sent),
    /// [`ApiError::NotFound`] for an unknown warehousing, or any other
    /// transport error.
    pub async fn label(client: &ApiClient, id: &str) -> Result<Vec<u8>, ApiError> {
        let id = require_id(id)?;
        let request =
            resource_request::<Self>(ResourceOperation::Action("label"), &[("id", id)])?.build();
        client.call_binary(request).await
    }
}
