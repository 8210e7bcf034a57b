//! Types and schema fragments shared by several resources.

use serde::{Deserialize, Serialize};

use crate::schema::{integer, object, string, Schema};

/// An item code and quantity inside a warehousing, shipment, or transfer.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LineItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl LineItem {
    /// Creates a line item.
    #[must_use]
    pub fn new(item_code: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_code: Some(item_code.into()),
            quantity: Some(quantity),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Paging parameters accepted by every list endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Page {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

/// Most records accepted by one bulk request.
pub const BULK_LIMIT: usize = 100;

pub(crate) const CODE_MAX_LEN: usize = 50;

/// Item and record codes: 1 to 50 characters.
pub(crate) fn code() -> Schema {
    string().min_len(1).max_len(CODE_MAX_LEN)
}

/// Positive quantities that fit a `u32`; numeric strings are accepted.
pub(crate) fn quantity() -> Schema {
    integer().min(1.0).max(f64::from(u32::MAX)).coerce()
}

/// Calendar dates as `YYYY-MM-DD`.
pub(crate) fn date() -> Schema {
    string().pattern(r"^\d{4}-\d{2}-\d{2}$")
}

/// Times of day as `HH:MM`.
pub(crate) fn time_of_day() -> Schema {
    string().pattern(r"^([01]\d|2[0-3]):[0-5]\d$")
}

/// Server timestamps; absent or null on some records.
pub(crate) fn timestamp() -> Schema {
    string().nullish()
}

pub(crate) fn line_item() -> Schema {
    object([("item_code", code()), ("quantity", quantity())])
}

pub(crate) fn address() -> Schema {
    object([
        ("name", string().min_len(1).max_len(100)),
        ("company", string().max_len(100).nullish()),
        ("postal_code", string().pattern(r"^[0-9A-Za-z -]{3,10}$")),
        ("region", string().min_len(1)),
        ("city", string().min_len(1)),
        ("address_line1", string().min_len(1).max_len(200)),
        ("address_line2", string().max_len(200).nullish()),
        ("phone", string().pattern(r"^\+?[0-9-]{6,20}$")),
    ])
}
