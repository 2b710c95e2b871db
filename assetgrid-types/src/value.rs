//! Heterogeneous cell values and the convergence comparator.
//!
//! Every cell in a table holds a `Value`. Comparisons that decide whether a
//! pending optimistic edit has been confirmed by the authoritative data use
//! [`converged`], which is structural and type-aware rather than plain
//! equality: media descriptors compare by their identifying sub-fields
//! (delivery URLs are re-signed between reads and must not defeat the check).

use crate::ids::RowId;
use crate::schema::PropertyKind;
use serde::{Deserialize, Serialize};

/// Descriptor of an uploaded media file attached to a cell.
///
/// `url` is a transient delivery URL supplied by the media subsystem; it is
/// carried for display but excluded from convergence comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    /// Stable storage key assigned at upload time.
    pub key: String,
    /// Original file name.
    pub name: String,
    /// MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Transient delivery URL, if one has been issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl MediaDescriptor {
    /// Returns true if both descriptors identify the same uploaded file,
    /// ignoring the transient delivery URL.
    #[must_use]
    pub fn same_source(&self, other: &Self) -> bool {
        self.key == other.key
            && self.name == other.name
            && self.content_type == other.content_type
            && self.size == other.size
    }
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Free text.
    Text(String),
    /// Whole number.
    Integer(i64),
    /// Decimal number.
    Float(f64),
    /// Checkbox.
    Bool(bool),
    /// One option out of a property's declared option list.
    Tag(String),
    /// Link to another row.
    Reference(RowId),
    /// Uploaded media file.
    Media(MediaDescriptor),
    /// Empty cell.
    Null,
}

impl Value {
    /// Returns true for the empty value.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Renders the value the way it appears in a cell before editing begins.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Value::Text(s) | Value::Tag(s) => s.clone(),
            Value::Integer(n) => n.to_string(),
            // Debug formatting keeps the decimal point ("42.0", not "42"),
            // which float re-validation requires.
            Value::Float(f) => format!("{f:?}"),
            Value::Bool(b) => b.to_string(),
            Value::Reference(id) => id.to_string(),
            Value::Media(m) => m.name.clone(),
            Value::Null => String::new(),
        }
    }

    /// Coerces this value to the given property kind, for paste targets.
    ///
    /// Returns `Null` when no sensible coercion exists; a paste never writes
    /// a value of the wrong type into a column.
    #[must_use]
    pub fn coerce_to(&self, kind: PropertyKind) -> Value {
        if self.is_null() {
            return Value::Null;
        }
        match kind {
            PropertyKind::Text => match self {
                Value::Media(_) | Value::Reference(_) => Value::Null,
                other => Value::Text(other.display()),
            },
            PropertyKind::Integer => match self {
                Value::Integer(n) => Value::Integer(*n),
                Value::Text(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::Integer)
                    .unwrap_or(Value::Null),
                _ => Value::Null,
            },
            PropertyKind::Float => match self {
                Value::Float(f) => Value::Float(*f),
                Value::Integer(n) => Value::Float(*n as f64),
                Value::Text(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Value::Float)
                    .unwrap_or(Value::Null),
                _ => Value::Null,
            },
            PropertyKind::Boolean => match self {
                Value::Bool(b) => Value::Bool(*b),
                Value::Text(s) => match s.trim() {
                    "true" => Value::Bool(true),
                    "false" => Value::Bool(false),
                    _ => Value::Null,
                },
                _ => Value::Null,
            },
            PropertyKind::Tag => match self {
                Value::Tag(t) => Value::Tag(t.clone()),
                Value::Text(s) => Value::Tag(s.clone()),
                _ => Value::Null,
            },
            PropertyKind::Reference => match self {
                Value::Reference(id) => Value::Reference(*id),
                Value::Text(s) => RowId::parse(s.trim())
                    .map(Value::Reference)
                    .unwrap_or(Value::Null),
                _ => Value::Null,
            },
            PropertyKind::Media => match self {
                Value::Media(m) => Value::Media(m.clone()),
                _ => Value::Null,
            },
        }
    }
}

/// Type-aware structural equality between two cell values.
///
/// Used wherever the engine decides whether an optimistic edit has been
/// confirmed, or whether a remote update diverges from a local draft.
#[must_use]
pub fn converged(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Media(m), Value::Media(n)) => m.same_source(n),
        (Value::Float(x), Value::Float(y)) => x.to_bits() == y.to_bits(),
        _ => a == b,
    }
}
