//! Typed notification channel, scoped to one table instance.
//!
//! Replaces the process-wide ad-hoc event bus of older builds: every notice a
//! collaborator layer might care about (failure surfacing, conflict
//! detection, the engine's own confirmed-mutation broadcasts) flows through a
//! broadcast channel owned by the table engine.

use crate::editor::CellField;
use assetgrid_types::{Row, RowId, Value};
use tokio::sync::broadcast;

/// Notices published by the engine.
#[derive(Debug, Clone)]
pub enum TableNotice {
    /// The schema subsystem replaced the column layout.
    SchemaChanged,
    /// Any open detail form should reset to the reconciled base state.
    FormReset,
    /// The debounce window for a pending cell edit elapsed; the driver
    /// should invoke `save_cell`.
    AutoSaveDue { row_id: RowId, field: CellField },
    /// A single-cell save failed and was rolled back. Retryable.
    EditFailed { row_id: RowId, message: String },
    /// A divergent remote edit was recorded for a cell being edited locally.
    ConflictDetected { row_id: RowId, field: CellField },
    /// One or more row deletions failed; the rows were restored.
    DeleteFailed { failed: usize },
    /// A row insertion failed; its placeholders were removed.
    InsertFailed { message: String },
    /// Confirmed local cell update, for the realtime transport to broadcast.
    CellUpdateSent {
        row_id: RowId,
        field: CellField,
        value: Value,
    },
    /// Confirmed local row creation.
    AssetCreateSent { row: Row },
    /// Confirmed local row deletion.
    AssetDeleteSent { row_id: RowId },
}

/// Publish/subscribe handle for [`TableNotice`]s.
#[derive(Debug, Clone)]
pub struct TableBus {
    tx: broadcast::Sender<TableNotice>,
}

impl TableBus {
    /// Creates a bus retaining up to `capacity` undelivered notices per
    /// subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribes to all notices published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TableNotice> {
        self.tx.subscribe()
    }

    /// Publishes a notice. Dropped silently when nobody is subscribed.
    pub fn publish(&self, notice: TableNotice) {
        let _ = self.tx.send(notice);
    }
}

impl Default for TableBus {
    fn default() -> Self {
        Self::new(64)
    }
}
