//! Path templates for resource endpoints.
//!
//! Each resource declares its endpoints as a table of [`ResourcePath`]s.
//! [`get_path`] picks the entry for an operation and [`build_path`]
//! interpolates identifiers, percent-encoding each value so an identifier
//! can never add path segments.
//!
//! # Example
//!
//! ```rust
//! use fulfillment_api::rest::{build_path, get_path, ResourceOperation, ResourcePath};
//! use fulfillment_api::HttpMethod;
//!
//! const PATHS: &[ResourcePath] = &[
//!     ResourcePath::new(HttpMethod::Get, ResourceOperation::Find, &["id"], "/items/{id}"),
//!     ResourcePath::new(
//!         HttpMethod::Delete,
//!         ResourceOperation::Action("delete_image"),
//!         &["id", "image_id"],
//!         "/items/{id}/images/{image_id}",
//!     ),
//! ];
//!
//! let path = get_path(PATHS, ResourceOperation::Action("delete_image")).unwrap();
//! let url = build_path(path.template, &[("id", "A 1"), ("image_id", "7")]);
//! assert_eq!(url, "/items/A%201/images/7");
//! ```

use crate::clients::HttpMethod;

/// Operations that can be performed on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceOperation {
    /// Fetch a single record by ID.
    Find,
    /// List records.
    All,
    /// Create a record.
    Create,
    /// Update a record.
    Update,
    /// Delete a record.
    Delete,
    /// A resource-specific endpoint, by name.
    Action(&'static str),
}

impl ResourceOperation {
    /// Returns the default HTTP method for this operation.
    ///
    /// Actions default to POST.
    #[must_use]
    pub const fn default_http_method(&self) -> HttpMethod {
        match self {
            Self::Find | Self::All => HttpMethod::Get,
            Self::Create | Self::Action(_) => HttpMethod::Post,
            Self::Update => HttpMethod::Put,
            Self::Delete => HttpMethod::Delete,
        }
    }

    /// Returns the operation name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Find => "find",
            Self::All => "all",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Action(name) => *name,
        }
    }
}

/// An endpoint of a resource: method, operation, identifiers, and template.
///
/// Templates start with `/` and use `{name}` placeholders, for example
/// `/shipments/{id}/cancel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourcePath {
    /// The HTTP method for this path.
    pub http_method: HttpMethod,
    /// The operation this path is used for.
    pub operation: ResourceOperation,
    /// Identifier placeholders in the template, in order.
    pub ids: &'static [&'static str],
    /// The URL template with `{name}` placeholders.
    pub template: &'static str,
}

impl ResourcePath {
    /// Creates a new `ResourcePath`.
    #[must_use]
    pub const fn new(
        http_method: HttpMethod,
        operation: ResourceOperation,
        ids: &'static [&'static str],
        template: &'static str,
    ) -> Self {
        Self {
            http_method,
            operation,
            ids,
            template,
        }
    }

    /// Returns the number of identifiers the template needs.
    #[must_use]
    pub const fn id_count(&self) -> usize {
        self.ids.len()
    }
}

/// Returns the path declared for `operation`, if any.
#[must_use]
pub fn get_path(paths: &[ResourcePath], operation: ResourceOperation) -> Option<&ResourcePath> {
    paths.iter().find(|p| p.operation == operation)
}

/// Interpolates `{name}` placeholders with percent-encoded values.
///
/// Placeholders without a value are left unchanged.
#[must_use]
pub fn build_path(template: &str, ids: &[(&str, &str)]) -> String {
    let mut result = template.to_string();

    for (key, value) in ids {
        let placeholder = format!("{{{key}}}");
        result = result.replace(&placeholder, &urlencoding::encode(value));
    }

    result
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceOperation>();
    assert_send_sync::<ResourcePath>();
};
