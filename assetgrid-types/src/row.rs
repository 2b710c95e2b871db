//! Rows and row patches.
//!
//! A row is one asset in a table: a stable id, a display name, a bag of
//! property values keyed by user-defined column keys, and an integer ordering
//! key establishing canonical display order. Rows created locally but not yet
//! persisted carry `pending = true` and a temporary id.

use crate::ids::{PropertyKey, RowId, TableId};
use crate::value::{converged, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Display-name stub for rows that have not been named yet.
pub const UNTITLED: &str = "Untitled";

/// One asset in a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Stable identity, immutable for the row's lifetime.
    pub id: RowId,
    /// The owning table.
    pub table_id: TableId,
    /// Display name.
    pub name: String,
    /// Property values keyed by column key. Absent keys display as empty.
    pub values: HashMap<PropertyKey, Value>,
    /// Ordering key. Unique within a table once normalized.
    pub row_index: i64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// True for a locally-created row the persistence layer has not
    /// confirmed yet (temporary id).
    #[serde(default)]
    pub pending: bool,
}

impl Row {
    /// Creates a persisted row shell.
    #[must_use]
    pub fn new(id: RowId, table_id: TableId, name: impl Into<String>, row_index: i64) -> Self {
        Self {
            id,
            table_id,
            name: name.into(),
            values: HashMap::new(),
            row_index,
            created_at: Utc::now(),
            pending: false,
        }
    }

    /// Creates a placeholder row with a temporary id.
    #[must_use]
    pub fn placeholder(table_id: TableId, row_index: i64) -> Self {
        Self {
            id: RowId::placeholder(),
            table_id,
            name: UNTITLED.to_string(),
            values: HashMap::new(),
            row_index,
            created_at: Utc::now(),
            pending: true,
        }
    }

    /// Builder-style value assignment.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<PropertyKey>, value: Value) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Returns the value for a column key, if set.
    #[must_use]
    pub fn value(&self, key: &PropertyKey) -> Option<&Value> {
        self.values.get(key)
    }

    /// Sets a value in place.
    pub fn set_value(&mut self, key: impl Into<PropertyKey>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Returns true if the row still carries the name stub.
    #[must_use]
    pub fn is_untitled(&self) -> bool {
        self.name == UNTITLED
    }

    /// Type-aware content comparison against another revision of this row.
    ///
    /// Compares the name, the ordering key, and every property value with the
    /// convergence comparator. Identity fields are not compared; callers pair
    /// rows by id first.
    #[must_use]
    pub fn content_matches(&self, other: &Row) -> bool {
        if self.name != other.name
            || self.row_index != other.row_index
            || self.values.len() != other.values.len()
        {
            return false;
        }
        self.values.iter().all(|(key, value)| {
            other
                .values
                .get(key)
                .is_some_and(|theirs| converged(value, theirs))
        })
    }
}

/// The unit of a batched update: one row's changed fields only.
///
/// Carrying only touched keys keeps a batched write from clobbering columns
/// another collaborator edited since our snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowPatch {
    pub row_id: RowId,
    /// New display name, when the name field was touched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New values for touched columns.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub values: HashMap<PropertyKey, Value>,
    /// New ordering key, when index normalization or shifting touched it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_index: Option<i64>,
}

impl RowPatch {
    /// Creates an empty patch for a row.
    #[must_use]
    pub fn new(row_id: RowId) -> Self {
        Self {
            row_id,
            name: None,
            values: HashMap::new(),
            row_index: None,
        }
    }

    /// Builder-style value assignment.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<PropertyKey>, value: Value) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Builder-style name assignment.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder-style ordering-key assignment.
    #[must_use]
    pub fn with_index(mut self, row_index: i64) -> Self {
        self.row_index = Some(row_index);
        self
    }

    /// True if the patch carries no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.values.is_empty() && self.row_index.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::MediaDescriptor;

    fn row() -> Row {
        Row::new(RowId::new(), TableId::new(), "Asset A", 1)
            .with_value("color", Value::Text("Blue".into()))
    }

    #[test]
    fn content_matches_ignores_identity() {
        let a = row();
        let mut b = a.clone();
        b.id = RowId::new();
        b.created_at = Utc::now();
        assert!(a.content_matches(&b));
    }

    #[test]
    fn content_differs_on_value_change() {
        let a = row();
        let mut b = a.clone();
        b.set_value("color", Value::Text("Red".into()));
        assert!(!a.content_matches(&b));
    }

    #[test]
    fn content_differs_on_index_change() {
        let a = row();
        let mut b = a.clone();
        b.row_index = 9;
        assert!(!a.content_matches(&b));
    }

    #[test]
    fn content_matches_through_media_url_churn() {
        let media = |url: &str| {
            Value::Media(MediaDescriptor {
                key: "u/k".into(),
                name: "f.png".into(),
                content_type: "image/png".into(),
                size: 1,
                url: Some(url.into()),
            })
        };
        let a = row().with_value("file", media("https://cdn/x?sig=1"));
        let mut b = a.clone();
        b.set_value("file", media("https://cdn/x?sig=2"));
        assert!(a.content_matches(&b));
    }

    #[test]
    fn placeholder_rows_are_pending_and_untitled() {
        let p = Row::placeholder(TableId::new(), 5);
        assert!(p.pending);
        assert!(p.is_untitled());
        assert_eq!(p.row_index, 5);
    }

    #[test]
    fn empty_patch() {
        let patch = RowPatch::new(RowId::new());
        assert!(patch.is_empty());
        assert!(!patch.clone().with_name("n").is_empty());
        assert!(!patch.with_value("k", Value::Null).is_empty());
    }
}
