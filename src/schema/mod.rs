//! Composable structural schemas for request and response payloads.
//!
//! A [`Schema`] describes the shape of a JSON value. Validating a value never
//! fails abruptly: it returns either the normalized value (defaults applied,
//! numeric strings coerced, unknown keys stripped) or the full list of
//! [`ValidationIssue`]s, each pointing at the offending field.
//!
//! # Example
//!
//! ```rust
//! use fulfillment_api::schema::{self, integer, object, string};
//! use serde_json::json;
//!
//! let item = object([
//!     ("code", string().min_len(1).max_len(30)),
//!     ("name", string().optional()),
//!     ("price", integer().min(0.0).coerce()),
//! ]);
//!
//! let valid = schema::validate(&item, &json!({"code": "A-1", "price": "1200"})).unwrap();
//! assert_eq!(valid, json!({"code": "A-1", "price": 1200}));
//!
//! let issues = schema::validate(&item, &json!({"price": 10})).unwrap_err();
//! assert!(issues[0].is_at(&["code"]));
//! assert_eq!(issues[0].message, "Required");
//! ```

mod issue;

pub use issue::{format_path, IssueKind, PathSegment, ValidationIssue};

use regex::Regex;
use serde_json::{Map, Number, Value};

/// Result of validating a value: the normalized value, or every issue found.
pub type ValidationResult = Result<Value, Vec<ValidationIssue>>;

/// A named predicate run after its inner schema accepted a value.
///
/// The check returns issues with paths relative to the refined value.
#[derive(Clone, Copy, Debug)]
pub struct Refinement {
    /// Name logged when the check reports issues.
    pub name: &'static str,
    /// The predicate.
    pub check: fn(&Value) -> Vec<ValidationIssue>,
}

/// A compiled string pattern.
#[derive(Clone, Debug)]
pub struct Pattern {
    source: String,
    regex: Option<Regex>,
}

impl Pattern {
    fn new(source: &str) -> Self {
        let regex = match Regex::new(source) {
            Ok(regex) => Some(regex),
            Err(error) => {
                tracing::error!(pattern = source, %error, "Schema pattern failed to compile");
                None
            }
        };
        Self {
            source: source.to_string(),
            regex,
        }
    }

    fn is_match(&self, value: &str) -> bool {
        self.regex.as_ref().is_some_and(|regex| regex.is_match(value))
    }
}

/// Constraints on a string value.
#[derive(Clone, Debug, Default)]
pub struct StringRules {
    min_len: Option<usize>,
    max_len: Option<usize>,
    pattern: Option<Pattern>,
}

/// Constraints on a numeric value.
#[derive(Clone, Debug, Default)]
pub struct NumberRules {
    integer: bool,
    min: Option<f64>,
    max: Option<f64>,
    coerce: bool,
}

/// How an object schema treats keys it does not declare.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownKeys {
    /// Drop undeclared keys from the normalized value.
    #[default]
    Strip,
    /// Keep undeclared keys unvalidated.
    Passthrough,
    /// Report undeclared keys as an issue.
    Strict,
}

/// A declared object field.
#[derive(Clone, Debug)]
pub struct Field {
    /// The JSON key.
    pub name: String,
    /// The schema for the field value.
    pub schema: Schema,
}

/// A structural description of a JSON value.
#[derive(Clone, Debug)]
pub enum Schema {
    /// Accepts anything, including an absent value.
    Any,
    /// Accepts only an absent value.
    Void,
    /// A JSON boolean.
    Boolean,
    /// A JSON string.
    String(StringRules),
    /// A JSON number, optionally coerced from a numeric string.
    Number(NumberRules),
    /// Exactly this JSON value.
    Literal(Value),
    /// One of the listed strings.
    Enumeration(Vec<String>),
    /// An array of values matching the item schema.
    Array {
        /// Schema for every element.
        items: Box<Schema>,
        /// Minimum number of elements.
        min_items: Option<usize>,
        /// Maximum number of elements.
        max_items: Option<usize>,
    },
    /// An object with declared fields.
    Object {
        /// Declared fields, in declaration order.
        fields: Vec<Field>,
        /// Treatment of undeclared keys.
        unknown: UnknownKeys,
    },
    /// An object whose values all match one schema.
    Record(Box<Schema>),
    /// The first member that accepts the value.
    Union(Vec<Schema>),
    /// The inner schema, or an absent value.
    Optional(Box<Schema>),
    /// The inner schema, or `null`.
    Nullable(Box<Schema>),
    /// The inner schema, with this value used when absent.
    Default(Box<Schema>, Value),
    /// The inner schema followed by a refinement.
    Refined(Box<Schema>, Refinement),
}

/// A schema accepting any value.
#[must_use]
pub const fn any() -> Schema {
    Schema::Any
}

/// A schema accepting only an absent value (empty response bodies).
#[must_use]
pub const fn void() -> Schema {
    Schema::Void
}

/// A boolean schema.
#[must_use]
pub const fn boolean() -> Schema {
    Schema::Boolean
}

/// An unconstrained string schema.
#[must_use]
pub fn string() -> Schema {
    Schema::String(StringRules::default())
}

/// An unconstrained number schema.
#[must_use]
pub fn number() -> Schema {
    Schema::Number(NumberRules::default())
}

/// An integer schema.
#[must_use]
pub fn integer() -> Schema {
    Schema::Number(NumberRules {
        integer: true,
        ..NumberRules::default()
    })
}

/// A schema accepting exactly `value`.
#[must_use]
pub fn literal(value: impl Into<Value>) -> Schema {
    Schema::Literal(value.into())
}

/// A schema accepting one of `values`.
#[must_use]
pub fn enumeration<I, S>(values: I) -> Schema
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Schema::Enumeration(values.into_iter().map(Into::into).collect())
}

/// An array schema.
#[must_use]
pub fn array(items: Schema) -> Schema {
    Schema::Array {
        items: Box::new(items),
        min_items: None,
        max_items: None,
    }
}

impl<K: Into<String>> From<(K, Schema)> for Field {
    fn from((name, schema): (K, Schema)) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// A declared object field.
#[must_use]
pub fn field(name: impl Into<String>, schema: Schema) -> Field {
    Field {
        name: name.into(),
        schema,
    }
}

/// An object schema from [`Field`]s or `(key, schema)` pairs.
#[must_use]
pub fn object<I>(fields: I) -> Schema
where
    I: IntoIterator,
    I::Item: Into<Field>,
{
    Schema::Object {
        fields: fields.into_iter().map(Into::into).collect(),
        unknown: UnknownKeys::Strip,
    }
}

/// A string-keyed map schema.
#[must_use]
pub fn record(values: Schema) -> Schema {
    Schema::Record(Box::new(values))
}

/// A union schema; members are tried in order.
#[must_use]
pub fn union(members: impl IntoIterator<Item = Schema>) -> Schema {
    Schema::Union(members.into_iter().collect())
}

/// Validates `value` against `schema`.
///
/// # Errors
///
/// Returns every [`ValidationIssue`] found.
pub fn validate(schema: &Schema, value: &Value) -> ValidationResult {
    schema.validate(value)
}

impl Schema {
    /// Accepts an absent value in addition to the schema.
    #[must_use]
    pub fn optional(self) -> Self {
        Self::Optional(Box::new(self))
    }

    /// Accepts `null` in addition to the schema.
    #[must_use]
    pub fn nullable(self) -> Self {
        Self::Nullable(Box::new(self))
    }

    /// Accepts absent or `null` in addition to the schema.
    #[must_use]
    pub fn nullish(self) -> Self {
        self.nullable().optional()
    }

    /// Uses `value` when the input is absent.
    #[must_use]
    pub fn with_default(self, value: impl Into<Value>) -> Self {
        Self::Default(Box::new(self), value.into())
    }

    /// Runs `check` after the schema accepts a value.
    #[must_use]
    pub fn refine(self, name: &'static str, check: fn(&Value) -> Vec<ValidationIssue>) -> Self {
        Self::Refined(Box::new(self), Refinement { name, check })
    }

    /// Sets the minimum string length in characters. No effect on other schemas.
    #[must_use]
    pub fn min_len(self, len: usize) -> Self {
        self.map_string(|rules| rules.min_len = Some(len))
    }

    /// Sets the maximum string length in characters. No effect on other schemas.
    #[must_use]
    pub fn max_len(self, len: usize) -> Self {
        self.map_string(|rules| rules.max_len = Some(len))
    }

    /// Requires strings to match `pattern`. No effect on other schemas.
    #[must_use]
    pub fn pattern(self, pattern: &str) -> Self {
        self.map_string(|rules| rules.pattern = Some(Pattern::new(pattern)))
    }

    /// Sets the inclusive numeric lower bound. No effect on other schemas.
    #[must_use]
    pub fn min(self, min: f64) -> Self {
        self.map_number(|rules| rules.min = Some(min))
    }

    /// Sets the inclusive numeric upper bound. No effect on other schemas.
    #[must_use]
    pub fn max(self, max: f64) -> Self {
        self.map_number(|rules| rules.max = Some(max))
    }

    /// Accepts numeric strings and converts them to numbers.
    #[must_use]
    pub fn coerce(self) -> Self {
        self.map_number(|rules| rules.coerce = true)
    }

    /// Sets the minimum array length. No effect on other schemas.
    #[must_use]
    pub fn min_items(mut self, len: usize) -> Self {
        if let Self::Array { min_items, .. } = &mut self {
            *min_items = Some(len);
        }
        self
    }

    /// Sets the maximum array length. No effect on other schemas.
    #[must_use]
    pub fn max_items(mut self, len: usize) -> Self {
        if let Self::Array { max_items, .. } = &mut self {
            *max_items = Some(len);
        }
        self
    }

    /// Keeps undeclared object keys. No effect on other schemas.
    #[must_use]
    pub fn passthrough(self) -> Self {
        self.with_unknown_keys(UnknownKeys::Passthrough)
    }

    /// Rejects undeclared object keys. No effect on other schemas.
    #[must_use]
    pub fn strict(self) -> Self {
        self.with_unknown_keys(UnknownKeys::Strict)
    }

    /// Makes every declared object field optional. No effect on other schemas.
    #[must_use]
    pub fn partial(mut self) -> Self {
        if let Self::Object { fields, .. } = &mut self {
            for field in fields.iter_mut() {
                if !field.schema.accepts_absent() {
                    let schema = std::mem::replace(&mut field.schema, Self::Any);
                    field.schema = schema.optional();
                }
            }
        }
        self
    }

    /// Adds or replaces object fields. No effect on other schemas.
    #[must_use]
    pub fn extend<I>(mut self, extra: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Field>,
    {
        if let Self::Object { fields, .. } = &mut self {
            for added in extra.into_iter().map(Into::into) {
                if let Some(existing) = fields.iter_mut().find(|field| field.name == added.name) {
                    existing.schema = added.schema;
                } else {
                    fields.push(added);
                }
            }
        }
        self
    }

    /// Validates a present value.
    ///
    /// # Errors
    ///
    /// Returns every [`ValidationIssue`] found.
    pub fn validate(&self, value: &Value) -> ValidationResult {
        self.validate_optional(Some(value))
    }

    /// Validates a value that may be absent. An accepted absent value
    /// normalizes to `null`.
    ///
    /// # Errors
    ///
    /// Returns every [`ValidationIssue`] found.
    pub fn validate_optional(&self, value: Option<&Value>) -> ValidationResult {
        let mut path = Vec::new();
        let mut issues = Vec::new();
        let normalized = self.check(value, &mut path, &mut issues);
        if issues.is_empty() {
            Ok(normalized.unwrap_or(Value::Null))
        } else {
            Err(issues)
        }
    }

    /// Returns `true` if the schema accepts an absent value.
    #[must_use]
    pub fn accepts_absent(&self) -> bool {
        match self {
            Self::Any | Self::Void | Self::Optional(_) | Self::Default(..) => true,
            Self::Nullable(inner) | Self::Refined(inner, _) => inner.accepts_absent(),
            Self::Union(members) => members.iter().any(Self::accepts_absent),
            _ => false,
        }
    }

    fn map_string(mut self, update: impl FnOnce(&mut StringRules)) -> Self {
        if let Self::String(rules) = &mut self {
            update(rules);
        }
        self
    }

    fn map_number(mut self, update: impl FnOnce(&mut NumberRules)) -> Self {
        if let Self::Number(rules) = &mut self {
            update(rules);
        }
        self
    }

    fn with_unknown_keys(mut self, mode: UnknownKeys) -> Self {
        if let Self::Object { unknown, .. } = &mut self {
            *unknown = mode;
        }
        self
    }

    /// Validates `value` at `path`, pushing issues and returning the
    /// normalized value (`None` for an accepted absent value).
    fn check(
        &self,
        value: Option<&Value>,
        path: &mut Vec<PathSegment>,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<Value> {
        match self {
            Self::Any => value.cloned(),
            Self::Void => {
                if let Some(value) = value {
                    issues.push(invalid_type(path, "void", value));
                }
                None
            }
            Self::Optional(inner) => value.and_then(|value| inner.check(Some(value), path, issues)),
            Self::Nullable(inner) => match value {
                Some(Value::Null) => Some(Value::Null),
                other => inner.check(other, path, issues),
            },
            Self::Default(inner, default) => inner.check(Some(value.unwrap_or(default)), path, issues),
            Self::Refined(inner, refinement) => {
                let before = issues.len();
                let normalized = inner.check(value, path, issues);
                if issues.len() == before {
                    if let Some(accepted) = &normalized {
                        let refined = (refinement.check)(accepted);
                        if !refined.is_empty() {
                            tracing::debug!(
                                refinement = refinement.name,
                                issues = refined.len(),
                                "Refinement rejected value"
                            );
                        }
                        for mut issue in refined {
                            let mut full_path = path.clone();
                            full_path.append(&mut issue.path);
                            issue.path = full_path;
                            issues.push(issue);
                        }
                    }
                }
                normalized
            }
            Self::Union(members) => check_union(members, value, path, issues),
            _ => {
                let Some(value) = value else {
                    issues.push(ValidationIssue::new(
                        IssueKind::InvalidType,
                        path.clone(),
                        "Required",
                    ));
                    return None;
                };
                self.check_present(value, path, issues)
            }
        }
    }

    fn check_present(
        &self,
        value: &Value,
        path: &mut Vec<PathSegment>,
        issues: &mut Vec<ValidationIssue>,
    ) -> Option<Value> {
        match self {
            Self::Boolean => {
                if value.is_boolean() {
                    Some(value.clone())
                } else {
                    issues.push(invalid_type(path, "boolean", value));
                    None
                }
            }
            Self::String(rules) => check_string(rules, value, path, issues),
            Self::Number(rules) => check_number(rules, value, path, issues),
            Self::Literal(expected) => {
                if value == expected {
                    Some(value.clone())
                } else {
                    issues.push(ValidationIssue::new(
                        IssueKind::InvalidLiteral,
                        path.clone(),
                        format!("Invalid literal value, expected {expected}"),
                    ));
                    None
                }
            }
            Self::Enumeration(options) => match value.as_str() {
                Some(s) if options.iter().any(|option| option == s) => Some(value.clone()),
                _ => {
                    let expected = options
                        .iter()
                        .map(|option| format!("'{option}'"))
                        .collect::<Vec<_>>()
                        .join(" | ");
                    issues.push(ValidationIssue::new(
                        IssueKind::InvalidEnumValue,
                        path.clone(),
                        format!("Invalid enum value. Expected {expected}, received {value}"),
                    ));
                    None
                }
            },
            Self::Array {
                items,
                min_items,
                max_items,
            } => {
                let Some(elements) = value.as_array() else {
                    issues.push(invalid_type(path, "array", value));
                    return None;
                };
                if let Some(min) = min_items.filter(|min| elements.len() < *min) {
                    issues.push(ValidationIssue::new(
                        IssueKind::TooSmall,
                        path.clone(),
                        format!("Array must contain at least {min} element(s)"),
                    ));
                }
                if let Some(max) = max_items.filter(|max| elements.len() > *max) {
                    issues.push(ValidationIssue::new(
                        IssueKind::TooBig,
                        path.clone(),
                        format!("Array must contain at most {max} element(s)"),
                    ));
                }
                let mut normalized = Vec::with_capacity(elements.len());
                for (index, element) in elements.iter().enumerate() {
                    path.push(PathSegment::Index(index));
                    normalized.push(items.check(Some(element), path, issues).unwrap_or(Value::Null));
                    path.pop();
                }
                Some(Value::Array(normalized))
            }
            Self::Object { fields, unknown } => {
                let Some(map) = value.as_object() else {
                    issues.push(invalid_type(path, "object", value));
                    return None;
                };
                let mut normalized = Map::new();
                for field in fields {
                    path.push(PathSegment::Key(field.name.clone()));
                    if let Some(accepted) = field.schema.check(map.get(&field.name), path, issues) {
                        normalized.insert(field.name.clone(), accepted);
                    }
                    path.pop();
                }
                let mut undeclared = map
                    .iter()
                    .filter(|(key, _)| !fields.iter().any(|field| &field.name == *key));
                match unknown {
                    UnknownKeys::Strip => {}
                    UnknownKeys::Passthrough => {
                        for (key, extra) in undeclared {
                            normalized.insert(key.clone(), extra.clone());
                        }
                    }
                    UnknownKeys::Strict => {
                        let keys = undeclared
                            .by_ref()
                            .map(|(key, _)| format!("'{key}'"))
                            .collect::<Vec<_>>();
                        if !keys.is_empty() {
                            issues.push(ValidationIssue::new(
                                IssueKind::UnrecognizedKeys,
                                path.clone(),
                                format!("Unrecognized key(s) in object: {}", keys.join(", ")),
                            ));
                        }
                    }
                }
                Some(Value::Object(normalized))
            }
            Self::Record(values) => {
                let Some(map) = value.as_object() else {
                    issues.push(invalid_type(path, "object", value));
                    return None;
                };
                let mut normalized = Map::new();
                for (key, entry) in map {
                    path.push(PathSegment::Key(key.clone()));
                    if let Some(accepted) = values.check(Some(entry), path, issues) {
                        normalized.insert(key.clone(), accepted);
                    }
                    path.pop();
                }
                Some(Value::Object(normalized))
            }
            // Wrappers are resolved in `check`.
            Self::Any
            | Self::Void
            | Self::Optional(_)
            | Self::Nullable(_)
            | Self::Default(..)
            | Self::Refined(..)
            | Self::Union(_) => self.check(Some(value), path, issues),
        }
    }
}

fn check_union(
    members: &[Schema],
    value: Option<&Value>,
    path: &mut Vec<PathSegment>,
    issues: &mut Vec<ValidationIssue>,
) -> Option<Value> {
    let depth = path.len();
    // Deepest reach wins; the first member wins ties.
    let mut best: Option<(usize, Vec<ValidationIssue>)> = None;
    let mut only_type_mismatches = true;

    for member in members {
        let mut member_issues = Vec::new();
        let normalized = member.check(value, path, &mut member_issues);
        if member_issues.is_empty() {
            return normalized;
        }

        let reach = member_issues
            .iter()
            .map(|issue| issue.path.len())
            .max()
            .unwrap_or(depth);
        only_type_mismatches &= member_issues
            .iter()
            .all(|issue| issue.kind == IssueKind::InvalidType && issue.path.len() == depth);

        let better = best
            .as_ref()
            .map_or(true, |(best_reach, _)| reach > *best_reach);
        if better {
            best = Some((reach, member_issues));
        }
    }

    match best {
        Some((_, member_issues)) if !only_type_mismatches => issues.extend(member_issues),
        _ => {
            let message = if value.is_none() {
                "Required".to_string()
            } else {
                "Invalid input: value matches none of the allowed shapes".to_string()
            };
            let kind = if value.is_none() {
                IssueKind::InvalidType
            } else {
                IssueKind::InvalidUnion
            };
            issues.push(ValidationIssue::new(kind, path.clone(), message));
        }
    }
    None
}

fn check_string(
    rules: &StringRules,
    value: &Value,
    path: &[PathSegment],
    issues: &mut Vec<ValidationIssue>,
) -> Option<Value> {
    let Some(s) = value.as_str() else {
        issues.push(invalid_type(path, "string", value));
        return None;
    };

    let len = s.chars().count();
    if let Some(min) = rules.min_len.filter(|min| len < *min) {
        issues.push(ValidationIssue::new(
            IssueKind::TooSmall,
            path.to_vec(),
            format!("String must contain at least {min} character(s)"),
        ));
    }
    if let Some(max) = rules.max_len.filter(|max| len > *max) {
        issues.push(ValidationIssue::new(
            IssueKind::TooBig,
            path.to_vec(),
            format!("String must contain at most {max} character(s)"),
        ));
    }
    if let Some(pattern) = rules.pattern.as_ref().filter(|pattern| !pattern.is_match(s)) {
        issues.push(ValidationIssue::new(
            IssueKind::InvalidString,
            path.to_vec(),
            format!("String does not match pattern {}", pattern.source),
        ));
    }

    Some(value.clone())
}

fn check_number(
    rules: &NumberRules,
    value: &Value,
    path: &[PathSegment],
    issues: &mut Vec<ValidationIssue>,
) -> Option<Value> {
    let (number, normalized) = match value {
        Value::Number(n) => (n.as_f64(), value.clone()),
        Value::String(s) if rules.coerce => match s.trim().parse::<f64>() {
            Ok(parsed) if parsed.is_finite() && !s.trim().is_empty() => {
                (Some(parsed), number_value(parsed))
            }
            _ => {
                issues.push(ValidationIssue::new(
                    IssueKind::InvalidType,
                    path.to_vec(),
                    format!("Expected numeric string, received {value}"),
                ));
                return None;
            }
        },
        _ => {
            let expected = if rules.integer { "integer" } else { "number" };
            issues.push(invalid_type(path, expected, value));
            return None;
        }
    };

    let Some(number) = number else {
        issues.push(invalid_type(path, "number", value));
        return None;
    };

    if rules.integer && number.fract() != 0.0 {
        issues.push(ValidationIssue::new(
            IssueKind::InvalidType,
            path.to_vec(),
            "Expected integer, received float",
        ));
    }
    if let Some(min) = rules.min.filter(|min| number < *min) {
        issues.push(ValidationIssue::new(
            IssueKind::TooSmall,
            path.to_vec(),
            format!("Number must be greater than or equal to {min}"),
        ));
    }
    if let Some(max) = rules.max.filter(|max| number > *max) {
        issues.push(ValidationIssue::new(
            IssueKind::TooBig,
            path.to_vec(),
            format!("Number must be less than or equal to {max}"),
        ));
    }

    // Whole floats under an integer schema read as integers.
    if rules.integer && normalized.is_f64() && number.fract() == 0.0 {
        return Some(number_value(number));
    }
    Some(normalized)
}

#[allow(clippy::cast_possible_truncation)]
fn number_value(parsed: f64) -> Value {
    let whole = parsed.fract() == 0.0 && parsed.abs() < 9_007_199_254_740_992.0;
    if whole {
        Value::Number(Number::from(parsed as i64))
    } else {
        Number::from_f64(parsed).map_or(Value::Null, Value::Number)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn invalid_type(path: &[PathSegment], expected: &str, received: &Value) -> ValidationIssue {
    ValidationIssue::new(
        IssueKind::InvalidType,
        path.to_vec(),
        format!("Expected {expected}, received {}", json_type(received)),
    )
}
