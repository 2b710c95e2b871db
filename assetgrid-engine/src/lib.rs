//! Synchronization and reconciliation engine for AssetGrid tables.
//!
//! Keeps a locally-held replicated row sequence consistent with three inputs
//! that never pause for each other:
//!
//! - the authoritative row list delivered by the persistence layer
//! - this client's own unconfirmed (optimistic) edits
//! - concurrent edits broadcast from other collaborators
//!
//! while preserving a stable visual ordering and recovering cleanly from
//! partial failures.
//!
//! # Components
//!
//! - **[`Reconciler`]**: merges authoritative reads into the sequence
//!   (bootstrap, in-place patch, or full replacement), resolving placeholder
//!   rows to their persisted counterparts
//! - **[`OverlayStore`]**: uncommitted local mutations applied on top of the
//!   reconciled base for display
//! - **[`EditController`]**: the cell editing state machine with type-aware
//!   input validation and rollback
//! - **[`ConflictTracker`]**: divergent concurrent edits surfaced for
//!   explicit keep-local / accept-remote resolution
//! - **Batch operators**: fill-down, multi-row insert with index
//!   renormalization, delete, clear-contents, and clipboard cut/copy/paste
//! - **[`TableEngine`]**: the per-table facade wiring it all together over a
//!   pluggable [`ReplicatedSequence`](assetgrid_crdt::ReplicatedSequence)
//!
//! # Data flow
//!
//! persistence → [`TableEngine::apply_authoritative`] → sequence → overlay →
//! display rows. User actions mutate the overlay and sequence immediately and
//! persist asynchronously; the overlay entry clears once an authoritative
//! read reflects it. Remote collaborator events enter through
//! [`TableEngine::handle_remote`] and either apply directly or surface as
//! conflicts when they collide with the actively-edited cell.

mod batch;
mod bus;
mod clipboard;
mod conflict;
mod debounce;
mod editor;
mod error;
mod overlay;
mod persistence;
mod reconcile;
mod selection;
mod table;

pub use batch::{
    plan_clear, plan_delete, plan_fill_down, plan_insert, DeletePlan, FillPlan, InsertPlan,
    Placement,
};
pub use bus::{TableBus, TableNotice};
pub use clipboard::{capture, plan_paste, AppendedRow, ClipboardBuffer, PastePlan};
pub use conflict::{ConflictRecord, ConflictTracker};
pub use debounce::Debouncer;
pub use editor::{parse_input, CellField, EditController, EditState};
pub use error::{EngineError, EngineResult, PersistenceError};
pub use overlay::{OverlayStore, RowDraft};
pub use persistence::PersistenceService;
pub use reconcile::{ReconcileConfig, ReconcileOutcome, ReconcileStrategy, Reconciler};
pub use selection::{CellRange, Selection, NAME_COLUMN};
pub use table::{TableEngine, TableEngineConfig};
