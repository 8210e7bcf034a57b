//! Structured validation issues.

use std::fmt;

use serde::Serialize;

/// One step in the path from the validated root to an offending value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// An object key.
    Key(String),
    /// An array index.
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Renders a path as `items.0.code`; the empty path renders as `(root)`.
#[must_use]
pub fn format_path(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return "(root)".to_string();
    }
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// The category of a validation issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// The value has the wrong JSON type, or a required value is missing.
    InvalidType,
    /// The value differs from the expected literal.
    InvalidLiteral,
    /// The value is not one of the allowed enumeration members.
    InvalidEnumValue,
    /// The value matches none of the union members.
    InvalidUnion,
    /// A string failed its pattern constraint.
    InvalidString,
    /// A string, number, or array is below its lower bound.
    TooSmall,
    /// A string, number, or array is above its upper bound.
    TooBig,
    /// An object contains keys a strict schema does not allow.
    UnrecognizedKeys,
    /// A refinement or server-side rule rejected the value.
    Custom,
}

impl IssueKind {
    /// Returns the wire name of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidType => "invalid_type",
            Self::InvalidLiteral => "invalid_literal",
            Self::InvalidEnumValue => "invalid_enum_value",
            Self::InvalidUnion => "invalid_union",
            Self::InvalidString => "invalid_string",
            Self::TooSmall => "too_small",
            Self::TooBig => "too_big",
            Self::UnrecognizedKeys => "unrecognized_keys",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation failure: where, what, and which kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Path from the validated root to the offending value.
    pub path: Vec<PathSegment>,
    /// Human-readable description.
    pub message: String,
    /// Issue category.
    pub kind: IssueKind,
}

impl ValidationIssue {
    /// Creates an issue.
    #[must_use]
    pub fn new(kind: IssueKind, path: Vec<PathSegment>, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            kind,
        }
    }

    /// Creates a [`IssueKind::Custom`] issue.
    #[must_use]
    pub fn custom(path: Vec<PathSegment>, message: impl Into<String>) -> Self {
        Self::new(IssueKind::Custom, path, message)
    }

    /// Returns `true` if the issue points at exactly `path`.
    #[must_use]
    pub fn is_at<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.path.len() == path.len()
            && self
                .path
                .iter()
                .zip(path)
                .all(|(segment, expected)| segment.to_string() == expected.as_ref())
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", format_path(&self.path), self.message)
    }
}
