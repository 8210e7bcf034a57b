//! Query serialization and path parameter checks.

use serde::Serialize;
use serde_json::Value;

use crate::clients::ApiError;
use crate::schema::{IssueKind, ValidationIssue};

/// Serializes a parameter struct into query pairs.
///
/// `None` fields are skipped, arrays are joined with commas, and nested
/// objects are dropped. Keys come out in sorted order.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] if `params` cannot be serialized.
///
/// # Example
///
/// ```rust
/// use fulfillment_api::rest::serialize_to_query;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Params {
///     page: Option<u32>,
///     codes: Vec<&'static str>,
///     status: Option<String>,
/// }
///
/// let query = serialize_to_query(&Params { page: Some(2), codes: vec!["A", "B"], status: None }).unwrap();
/// assert_eq!(
///     query,
///     vec![("codes".to_string(), "A,B".to_string()), ("page".to_string(), "2".to_string())]
/// );
/// ```
pub fn serialize_to_query<T: Serialize>(params: &T) -> Result<Vec<(String, String)>, ApiError> {
    let value = serde_json::to_value(params).map_err(|e| {
        ApiError::validation(format!("Failed to serialize query parameters: {e}"), Vec::new())
    })?;

    let mut query = Vec::new();

    if let Value::Object(map) = value {
        for (key, val) in map {
            match val {
                Value::Null | Value::Object(_) => {}
                Value::String(s) => query.push((key, s)),
                Value::Number(n) => query.push((key, n.to_string())),
                Value::Bool(b) => query.push((key, b.to_string())),
                Value::Array(arr) => {
                    let values: Vec<String> = arr
                        .iter()
                        .filter_map(|v| match v {
                            Value::String(s) => Some(s.clone()),
                            Value::Number(n) => Some(n.to_string()),
                            _ => None,
                        })
                        .collect();
                    if !values.is_empty() {
                        query.push((key, values.join(",")));
                    }
                }
            }
        }
    }

    Ok(query)
}

/// Checks that a path identifier is non-blank and returns it trimmed.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] with one issue at `[name]`.
pub fn require_path_param<'a>(name: &str, value: &'a str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        tracing::debug!(param = name, "Rejected blank path parameter");
        return Err(ApiError::validation(
            format!("Invalid path parameter '{name}'"),
            vec![ValidationIssue::new(
                IssueKind::TooSmall,
                vec![name.into()],
                "String must contain at least 1 character(s)",
            )],
        ));
    }
    Ok(trimmed)
}

/// Checks the `id` path parameter. See [`require_path_param`].
///
/// # Errors
///
/// Returns [`ApiError::Validation`] with one issue at `["id"]`.
pub fn require_id(id: &str) -> Result<&str, ApiError> {
    require_path_param("id", id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ErrorKind;
    use chrono::{TimeZone, Utc};
    use serde::Serialize;

    #[derive(Serialize, Default)]
    struct ListParams {
        #[serde(skip_serializing_if = "Option::is_none")]
        page: Option<u32>,
        per_page: Option<u32>,
        codes: Vec<String>,
        active: Option<bool>,
        updated_since: Option<chrono::DateTime<Utc>>,
        nested: Option<serde_json::Value>,
    }

    #[test]
    fn test_default_params_serialize_to_empty_query() {
        assert!(serialize_to_query(&ListParams::default()).unwrap().is_empty());
        assert!(serialize_to_query(&()).unwrap().is_empty());
    }

    #[test]
    fn test_all_value_kinds() {
        let params = ListParams {
            page: Some(3),
            per_page: Some(100),
            codes: vec!["A-1".to_string(), "B-2".to_string()],
            active: Some(false),
            updated_since: Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()),
            nested: Some(serde_json::json!({"x": 1})),
        };

        let query = serialize_to_query(&params).unwrap();
        let get = |key: &str| {
            query
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("page"), Some("3"));
        assert_eq!(get("per_page"), Some("100"));
        assert_eq!(get("codes"), Some("A-1,B-2"));
        assert_eq!(get("active"), Some("false"));
        assert_eq!(get("updated_since"), Some("2024-05-01T09:30:00Z"));
        assert_eq!(get("nested"), None);
    }

    #[test]
    fn test_require_id_rejects_blank() {
        for blank in ["", "   "] {
            let error = require_id(blank).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::Validation);
            assert!(error.issues()[0].is_at(&["id"]));
        }
    }

    #[test]
    fn test_require_id_trims() {
        assert_eq!(require_id(" 42 ").unwrap(), "42");
    }

    #[test]
    fn test_require_path_param_names_the_parameter() {
        let error = require_path_param("image_id", "").unwrap_err();
        assert!(error.issues()[0].is_at(&["image_id"]));
    }
}
