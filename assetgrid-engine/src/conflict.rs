//! Conflict tracking for concurrent edits to the same cell.
//!
//! When a remote update lands on a cell the local user is actively editing
//! with a different value, the divergence is recorded here instead of being
//! applied. The user resolves it explicitly; nothing is merged automatically.

use crate::editor::CellField;
use assetgrid_types::{RowId, UserId, Value};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

/// A tracked divergence between a local in-progress edit and a remote edit.
#[derive(Debug, Clone)]
pub struct ConflictRecord {
    pub row_id: RowId,
    pub field: CellField,
    /// The local draft at the time the remote edit arrived.
    pub local: Value,
    /// The competing remote value (latest, if several arrived).
    pub remote: Value,
    pub remote_user: UserId,
    pub remote_user_name: String,
    pub at: DateTime<Utc>,
}

/// Live conflict records, keyed by cell.
///
/// Records exist only while the cell is actively being edited; a newer remote
/// event for the same cell supersedes the unresolved record rather than
/// queueing behind it.
#[derive(Debug, Default)]
pub struct ConflictTracker {
    records: HashMap<(RowId, CellField), ConflictRecord>,
}

impl ConflictTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a divergence, superseding any unresolved record for the cell.
    pub fn record(&mut self, record: ConflictRecord) {
        debug!(
            "conflict on row {} field {}: local {:?} vs remote {:?} by {}",
            record.row_id, record.field, record.local, record.remote, record.remote_user_name
        );
        self.records
            .insert((record.row_id, record.field.clone()), record);
    }

    /// The unresolved record for a cell, if any.
    #[must_use]
    pub fn get(&self, row_id: &RowId, field: &CellField) -> Option<&ConflictRecord> {
        self.records.get(&(*row_id, field.clone()))
    }

    /// Keep-local resolution: the record is discarded, the local draft
    /// remains authoritative for this edit session.
    pub fn resolve_keep_local(&mut self, row_id: &RowId, field: &CellField) -> Option<ConflictRecord> {
        self.records.remove(&(*row_id, field.clone()))
    }

    /// Accept-remote resolution: the record is discarded and the remote
    /// value returned so the caller can replace the draft.
    pub fn resolve_accept_remote(&mut self, row_id: &RowId, field: &CellField) -> Option<Value> {
        self.records
            .remove(&(*row_id, field.clone()))
            .map(|r| r.remote)
    }

    /// Drops every record for a row (the row left the display).
    pub fn clear_row(&mut self, row_id: &RowId) {
        self.records.retain(|(r, _), _| r != row_id);
    }

    /// Number of unresolved records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no conflicts are outstanding.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
