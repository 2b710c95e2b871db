//! The table engine facade.
//!
//! Wires the replicated sequence, optimistic overlay, reconciler, cell edit
//! controller, conflict tracker, selection, clipboard and debouncer into one
//! per-table instance, and owns every persistence call so failures are caught
//! and rolled back at the operator boundary.
//!
//! Data flow: authoritative reads enter through [`apply_authoritative`],
//! collaborator events through [`handle_remote`]; local mutations hit the
//! overlay and the sequence immediately and persistence asynchronously.
//!
//! [`apply_authoritative`]: TableEngine::apply_authoritative
//! [`handle_remote`]: TableEngine::handle_remote

use crate::batch::{plan_clear, plan_delete, plan_fill_down, plan_insert, InsertPlan, Placement};
use crate::bus::{TableBus, TableNotice};
use crate::clipboard::{capture, plan_paste, ClipboardBuffer};
use crate::conflict::{ConflictRecord, ConflictTracker};
use crate::debounce::Debouncer;
use crate::editor::{parse_input, CellField, EditController, EditState};
use crate::error::{EngineError, EngineResult, PersistenceError};
use crate::overlay::{OverlayStore, RowDraft};
use crate::persistence::PersistenceService;
use crate::reconcile::{ReconcileConfig, ReconcileOutcome, Reconciler};
use crate::selection::{CellRange, Selection};
use assetgrid_crdt::ReplicatedSequence;
use assetgrid_types::{
    PropertyKey, PropertyKind, RemoteEvent, RemoteEventPayload, Row, RowId, Schema, TableId, Value,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Tunables for one table engine instance.
#[derive(Debug, Clone)]
pub struct TableEngineConfig {
    /// Quiet window before an in-progress cell edit auto-saves.
    pub debounce_window: Duration,
    /// Reconciliation tunables.
    pub reconcile: ReconcileConfig,
    /// Notice-bus capacity per subscriber.
    pub bus_capacity: usize,
}

impl Default for TableEngineConfig {
    fn default() -> Self {
        Self {
            debounce_window: Duration::from_millis(400),
            reconcile: ReconcileConfig::default(),
            bus_capacity: 64,
        }
    }
}

/// Synchronization and editing engine for one table.
pub struct TableEngine<S: ReplicatedSequence<Row>> {
    table_id: TableId,
    schema: Schema,
    seq: S,
    overlay: OverlayStore,
    reconciler: Reconciler,
    editor: EditController,
    conflicts: ConflictTracker,
    selection: Selection,
    clipboard: Option<ClipboardBuffer>,
    debouncer: Debouncer,
    persistence: Arc<dyn PersistenceService>,
    bus: TableBus,
}

impl<S: ReplicatedSequence<Row>> TableEngine<S> {
    /// Creates an engine over an existing sequence.
    pub fn new(
        table_id: TableId,
        schema: Schema,
        seq: S,
        persistence: Arc<dyn PersistenceService>,
        config: TableEngineConfig,
    ) -> Self {
        Self {
            table_id,
            schema,
            seq,
            overlay: OverlayStore::new(),
            reconciler: Reconciler::new(config.reconcile),
            editor: EditController::new(),
            conflicts: ConflictTracker::new(),
            selection: Selection::default(),
            clipboard: None,
            debouncer: Debouncer::new(config.debounce_window),
            persistence,
            bus: TableBus::new(config.bus_capacity),
        }
    }

    // ── Accessors ────────────────────────────────────────────────

    /// The owning table.
    #[must_use]
    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    /// The current column layout.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Replaces the column layout (schema subsystem pushed an update).
    pub fn set_schema(&mut self, schema: Schema) {
        self.schema = schema;
        self.bus.publish(TableNotice::SchemaChanged);
        self.bus.publish(TableNotice::FormReset);
    }

    /// Subscribes to engine notices.
    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<TableNotice> {
        self.bus.subscribe()
    }

    /// Current edit state.
    #[must_use]
    pub fn edit_state(&self) -> &EditState {
        self.editor.state()
    }

    /// Unresolved conflicts.
    #[must_use]
    pub fn conflicts(&self) -> &ConflictTracker {
        &self.conflicts
    }

    /// Mutable selection state.
    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    /// The captured clipboard buffer, if any.
    #[must_use]
    pub fn clipboard(&self) -> Option<&ClipboardBuffer> {
        self.clipboard.as_ref()
    }

    /// The rows as displayed: the sequence minus optimistically-deleted rows,
    /// with pending edits applied on top.
    #[must_use]
    pub fn display_rows(&self) -> Vec<Row> {
        self.seq
            .to_vec()
            .into_iter()
            .filter(|r| !self.overlay.is_deleted(&r.id))
            .map(|r| self.overlay.apply_to(&r))
            .collect()
    }

    // ── Authoritative data & remote events ───────────────────────

    /// Merges a freshly-read authoritative row list.
    ///
    /// Overlay convergence runs first so confirmed edits stop masking the
    /// base, then the reconciler aligns the sequence, then placeholder
    /// registrations whose rows were resolved (or removed) are retired.
    pub fn apply_authoritative(&mut self, rows: &[Row]) -> ReconcileOutcome {
        self.overlay.clear_when_converged(rows);
        let outcome = self.reconciler.reconcile(&mut self.seq, rows);

        let live: HashSet<RowId> = self.seq.to_vec().iter().map(|r| r.id).collect();
        for id in self.overlay.created_ids() {
            if !live.contains(&id) {
                self.overlay.take_created(&id);
            }
        }
        outcome
    }

    /// Applies a collaborator's broadcast event.
    ///
    /// A cell update on the actively-edited cell with a divergent value is
    /// recorded as a conflict instead of being applied; an equal value is
    /// silent convergence. Everything else applies directly. Applying the
    /// same event twice leaves the same state as applying it once.
    pub fn handle_remote(&mut self, event: RemoteEvent) {
        match event.payload {
            RemoteEventPayload::CellUpdate {
                property_key,
                value,
            } => {
                if self.overlay.is_deleted(&event.row_id) {
                    return;
                }
                let field = CellField::from_event_key(property_key);
                if self.editor.is_active_cell(&event.row_id, &field) {
                    let Ok(kind) = self.field_kind(&field) else {
                        return;
                    };
                    if self.editor.remote_diverges(kind, &value) {
                        let local = self
                            .editor
                            .draft_for(&event.row_id, &field)
                            .map(|draft| {
                                parse_input(kind, &field, draft)
                                    .unwrap_or_else(|_| Value::Text(draft.to_string()))
                            })
                            .unwrap_or(Value::Null);
                        self.conflicts.record(ConflictRecord {
                            row_id: event.row_id,
                            field: field.clone(),
                            local,
                            remote: value,
                            remote_user: event.user_id,
                            remote_user_name: event.user_name,
                            at: event.timestamp,
                        });
                        self.bus.publish(TableNotice::ConflictDetected {
                            row_id: event.row_id,
                            field,
                        });
                        return;
                    }
                    // Equal to the draft: apply silently, editing continues.
                }
                if let Some((pos, mut row)) = self.seq_find(&event.row_id) {
                    Self::set_field(&mut row, &field, &value);
                    self.seq_replace(pos, row);
                }
            }
            RemoteEventPayload::AssetCreated { row } => {
                let snapshot = self.seq.to_vec();
                if snapshot.iter().any(|r| r.id == row.id) {
                    return;
                }
                let pos = snapshot
                    .iter()
                    .position(|r| r.row_index > row.row_index)
                    .unwrap_or(snapshot.len());
                self.seq.insert(pos, vec![row]);
            }
            RemoteEventPayload::AssetDeleted => {
                if let Some((pos, _)) = self.seq_find(&event.row_id) {
                    self.seq.delete(pos, 1);
                }
                self.overlay.clear_edit(&event.row_id);
                self.overlay.restore(&event.row_id);
                self.conflicts.clear_row(&event.row_id);
            }
        }
    }

    // ── Cell editing ─────────────────────────────────────────────

    /// Enters editing on a cell of a displayed row.
    pub fn begin_edit(&mut self, row_id: RowId, field: CellField) -> EngineResult<()> {
        let kind = self.field_kind(&field)?;
        let row = self
            .display_rows()
            .into_iter()
            .find(|r| r.id == row_id)
            .ok_or(EngineError::RowNotFound(row_id))?;
        self.editor.begin_edit(&row, field, kind)
    }

    /// Updates the draft and re-arms the auto-save debounce window.
    pub fn set_draft(&mut self, input: impl Into<String>) {
        self.editor.set_draft(input);
        if let EditState::Editing { row_id, field, .. } = self.editor.state() {
            let (row_id, field) = (*row_id, field.clone());
            let bus = self.bus.clone();
            self.debouncer.schedule(async move {
                bus.publish(TableNotice::AutoSaveDue { row_id, field });
            });
        }
    }

    /// Discards the draft without issuing any mutation.
    pub fn cancel_edit(&mut self) {
        self.debouncer.cancel();
        self.editor.cancel();
    }

    /// Validates and saves the in-progress draft.
    ///
    /// The overlay and the sequence are mutated immediately for live
    /// collaborator visibility; on persistence failure both are reverted and
    /// editing reopens with the attempted draft. On success the overlay entry
    /// is left for the reconciler to clear on the next authoritative read,
    /// avoiding a flash-then-revert when the read lags the write.
    pub async fn save_cell(&mut self) -> EngineResult<()> {
        let field = match self.editor.state() {
            EditState::Editing { field, .. } => field.clone(),
            _ => return Err(EngineError::InvalidRange("no cell is being edited".into())),
        };
        let kind = self.field_kind(&field)?;
        let (row_id, field, value, _original) = self.editor.begin_save(kind)?;
        self.debouncer.cancel();

        let (pos, before) = self
            .seq_find(&row_id)
            .ok_or(EngineError::RowNotFound(row_id))?;

        let draft = match &field {
            CellField::Name => RowDraft::name(value.display()),
            CellField::Property(key) => RowDraft::value(key.clone(), value.clone()),
        };
        self.overlay.apply_edit(row_id, draft);

        let mut after = before.clone();
        Self::set_field(&mut after, &field, &value);
        self.seq_replace(pos, after);

        let (name_arg, values_arg): (Option<String>, HashMap<PropertyKey, Value>) = match &field {
            CellField::Name => (Some(value.display()), HashMap::new()),
            CellField::Property(key) => (None, HashMap::from([(key.clone(), value.clone())])),
        };

        match self
            .persistence
            .update_row(row_id, name_arg.as_deref(), &values_arg)
            .await
        {
            Ok(()) => {
                debug!("cell save confirmed for row {} field {}", row_id, field);
                self.editor.complete_save(&row_id, &field);
                self.bus.publish(TableNotice::CellUpdateSent {
                    row_id,
                    field,
                    value,
                });
                Ok(())
            }
            Err(err) => {
                warn!("cell save failed for row {} field {}: {}", row_id, field, err);
                // A superseding cancel already moved the controller on; the
                // late response is then ignored rather than rolled back.
                if self.editor.is_saving(&row_id, &field) {
                    if let Some((pos, _)) = self.seq_find(&row_id) {
                        self.seq_replace(pos, before);
                    }
                    self.overlay.retract_edit(&row_id, field.property_key());
                    self.editor.fail_save(&row_id, &field);
                    self.bus.publish(TableNotice::EditFailed {
                        row_id,
                        message: err.to_string(),
                    });
                }
                Err(err.into())
            }
        }
    }

    // ── Conflict resolution ──────────────────────────────────────

    /// Keep-local: the conflict record is discarded and the local draft
    /// remains authoritative for this edit session.
    pub fn resolve_keep_local(
        &mut self,
        row_id: RowId,
        field: CellField,
    ) -> Option<ConflictRecord> {
        self.conflicts.resolve_keep_local(&row_id, &field)
    }

    /// Accept-remote: the draft is replaced with the remote value if the
    /// cell is still being edited; the record is discarded either way.
    pub fn resolve_accept_remote(&mut self, row_id: RowId, field: CellField) -> Option<Value> {
        let remote = self.conflicts.resolve_accept_remote(&row_id, &field)?;
        self.editor.accept_remote(&row_id, &field, &remote);
        Some(remote)
    }

    // ── Batch operators ──────────────────────────────────────────

    /// Copies the start row's value down through the end row, one batched
    /// persistence call for the whole range.
    pub async fn fill_down(
        &mut self,
        start: RowId,
        end: RowId,
        key: PropertyKey,
    ) -> EngineResult<()> {
        let display = self.display_rows();
        let plan = plan_fill_down(&display, &self.schema, start, end, &key)?;
        info!(
            "fill-down '{}' across {} rows",
            key,
            plan.row_ids.len()
        );

        let mut before = Vec::new();
        for id in &plan.row_ids {
            if let Some((pos, row)) = self.seq_find(id) {
                before.push((pos, row.clone()));
                let mut after = row;
                after.values.insert(key.clone(), plan.value.clone());
                self.seq_replace(pos, after);
            }
            self.overlay
                .apply_edit(*id, RowDraft::value(key.clone(), plan.value.clone()));
        }

        match self.persistence.update_rows(&plan.patches).await {
            Ok(()) => {
                for id in &plan.row_ids {
                    self.bus.publish(TableNotice::CellUpdateSent {
                        row_id: *id,
                        field: CellField::Property(key.clone()),
                        value: plan.value.clone(),
                    });
                }
                Ok(())
            }
            Err(err) => {
                warn!("fill-down failed: {}", err);
                for (pos, row) in before {
                    self.seq_replace(pos, row);
                }
                for id in &plan.row_ids {
                    self.overlay.retract_edit(id, Some(&key));
                }
                self.bus.publish(TableNotice::EditFailed {
                    row_id: start,
                    message: err.to_string(),
                });
                Err(err.into())
            }
        }
    }

    /// Inserts rows above or below the current selection.
    ///
    /// Ordering keys are normalized and shifted first, placeholders appear in
    /// the sequence immediately, and each creation is persisted; failed
    /// creations remove their placeholder and surface a notice, without
    /// aborting the rest of the batch. Returns the placeholder ids actually
    /// kept (resolved to real rows by a later authoritative read).
    pub async fn insert_rows(
        &mut self,
        placement: Placement,
        count: usize,
    ) -> EngineResult<Vec<RowId>> {
        let display = self.display_rows();
        let targets = self.selection.target_rows(&display);
        let plan = plan_insert(&display, &targets, placement, count)?;
        info!(
            "inserting {} rows at display position {}",
            count, plan.display_pos
        );

        self.apply_reindex(&plan);

        let mut placeholders = Vec::with_capacity(count);
        for key in &plan.new_indices {
            let row = Row::placeholder(self.table_id, *key);
            self.overlay.apply_new_row(row.clone());
            placeholders.push(row);
        }
        let seq_pos = self.seq_pos_for_display(&display, plan.display_pos);
        self.seq.insert(seq_pos, placeholders.clone());

        if !plan.index_patches.is_empty() {
            if let Err(err) = self.persistence.update_rows(&plan.index_patches).await {
                warn!("index normalization failed, removing placeholders: {}", err);
                for row in &placeholders {
                    self.remove_placeholder(&row.id);
                }
                self.bus.publish(TableNotice::InsertFailed {
                    message: err.to_string(),
                });
                return Err(err.into());
            }
        }

        let mut kept = Vec::with_capacity(count);
        for row in &placeholders {
            match self
                .persistence
                .create_row(self.table_id, &row.name, &row.values, Some(row.row_index))
                .await
            {
                Ok(real_id) => {
                    kept.push(row.id);
                    let mut confirmed = row.clone();
                    confirmed.id = real_id;
                    confirmed.pending = false;
                    self.bus
                        .publish(TableNotice::AssetCreateSent { row: confirmed });
                }
                Err(err) => {
                    warn!("row creation failed: {}", err);
                    self.remove_placeholder(&row.id);
                    self.bus.publish(TableNotice::InsertFailed {
                        message: err.to_string(),
                    });
                }
            }
        }
        Ok(kept)
    }

    /// Deletes the given rows: placeholders locally, persisted rows through
    /// the backend (batched when supported). A row already deleted remotely
    /// counts as success; other failures restore visibility and are reported
    /// as an aggregate count. Returns the number of rows actually deleted.
    pub async fn delete_rows(&mut self, targets: &[RowId]) -> EngineResult<usize> {
        let snapshot = self.seq.to_vec();
        let plan = plan_delete(&snapshot, targets);
        info!(
            "deleting {} placeholders, {} persisted rows",
            plan.placeholders.len(),
            plan.persisted.len()
        );

        for id in &plan.placeholders {
            self.remove_placeholder(id);
        }
        for id in &plan.persisted {
            self.overlay.mark_deleted(*id);
        }

        let mut failed = 0;
        if !plan.persisted.is_empty() {
            if self.persistence.supports_batch_delete() {
                match self.persistence.delete_rows(&plan.persisted).await {
                    Ok(()) | Err(PersistenceError::NotFound) => {
                        for id in &plan.persisted {
                            self.bus.publish(TableNotice::AssetDeleteSent { row_id: *id });
                        }
                    }
                    Err(err) => {
                        warn!("batched delete failed: {}", err);
                        for id in &plan.persisted {
                            self.overlay.restore(id);
                        }
                        failed = plan.persisted.len();
                    }
                }
            } else {
                for id in &plan.persisted {
                    match self.persistence.delete_row(*id).await {
                        Ok(()) | Err(PersistenceError::NotFound) => {
                            self.bus.publish(TableNotice::AssetDeleteSent { row_id: *id });
                        }
                        Err(err) => {
                            warn!("delete failed for row {}: {}", id, err);
                            self.overlay.restore(id);
                            failed += 1;
                        }
                    }
                }
            }
        }

        if failed > 0 {
            self.bus.publish(TableNotice::DeleteFailed { failed });
        }
        Ok(plan.placeholders.len() + plan.persisted.len() - failed)
    }

    /// Deletes whatever the current selection targets, then clears it.
    pub async fn delete_selection(&mut self) -> EngineResult<usize> {
        let display = self.display_rows();
        let targets = self.selection.target_rows(&display);
        let deleted = self.delete_rows(&targets).await?;
        self.selection.clear();
        Ok(deleted)
    }

    /// Clears a rectangular cell range to kind-specific empty values, one
    /// batched update carrying only the touched keys of each affected row.
    pub async fn clear_cells(&mut self, range: CellRange) -> EngineResult<()> {
        let display = self.display_rows();
        let patches = plan_clear(&display, &self.schema, &range);
        if patches.is_empty() {
            return Ok(());
        }

        let mut before = Vec::new();
        for patch in &patches {
            if let Some((pos, row)) = self.seq_find(&patch.row_id) {
                before.push((pos, row.clone()));
                let mut after = row;
                if let Some(name) = &patch.name {
                    after.name = name.clone();
                }
                for (key, value) in &patch.values {
                    after.values.insert(key.clone(), value.clone());
                }
                self.seq_replace(pos, after);
            }
            self.overlay.apply_edit(
                patch.row_id,
                RowDraft {
                    name: patch.name.clone(),
                    values: patch.values.clone(),
                },
            );
        }

        match self.persistence.update_rows(&patches).await {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!("clear-contents failed: {}", err);
                for (pos, row) in before {
                    self.seq_replace(pos, row);
                }
                for patch in &patches {
                    if patch.name.is_some() {
                        self.overlay.retract_edit(&patch.row_id, None);
                    }
                    for key in patch.values.keys() {
                        self.overlay.retract_edit(&patch.row_id, Some(key));
                    }
                }
                self.bus.publish(TableNotice::EditFailed {
                    row_id: patches[0].row_id,
                    message: err.to_string(),
                });
                Err(err.into())
            }
        }
    }

    // ── Clipboard ────────────────────────────────────────────────

    /// Captures a range for copy.
    pub fn copy(&mut self, range: CellRange) {
        let display = self.display_rows();
        self.clipboard = Some(capture(&display, &self.schema, range, false));
    }

    /// Captures a range for cut; the source clears after a successful paste.
    pub fn cut(&mut self, range: CellRange) {
        let display = self.display_rows();
        self.clipboard = Some(capture(&display, &self.schema, range, true));
    }

    /// Pastes the captured buffer with its top-left cell at `anchor`
    /// (display-row index, column index). Rows past the end of the table are
    /// appended as placeholders and persisted through the creation pipeline.
    pub async fn paste(&mut self, anchor: (usize, usize)) -> EngineResult<()> {
        let Some(buffer) = self.clipboard.clone() else {
            return Err(EngineError::InvalidRange("clipboard is empty".into()));
        };
        let display = self.display_rows();
        let plan = plan_paste(&display, &self.schema, &buffer, anchor);

        if !plan.patches.is_empty() {
            let mut before = Vec::new();
            for patch in &plan.patches {
                if let Some((pos, row)) = self.seq_find(&patch.row_id) {
                    before.push((pos, row.clone()));
                    let mut after = row;
                    if let Some(name) = &patch.name {
                        after.name = name.clone();
                    }
                    for (key, value) in &patch.values {
                        after.values.insert(key.clone(), value.clone());
                    }
                    self.seq_replace(pos, after);
                }
                self.overlay.apply_edit(
                    patch.row_id,
                    RowDraft {
                        name: patch.name.clone(),
                        values: patch.values.clone(),
                    },
                );
            }

            if let Err(err) = self.persistence.update_rows(&plan.patches).await {
                warn!("paste failed: {}", err);
                for (pos, row) in before {
                    self.seq_replace(pos, row);
                }
                for patch in &plan.patches {
                    if patch.name.is_some() {
                        self.overlay.retract_edit(&patch.row_id, None);
                    }
                    for key in patch.values.keys() {
                        self.overlay.retract_edit(&patch.row_id, Some(key));
                    }
                }
                self.bus.publish(TableNotice::EditFailed {
                    row_id: plan.patches[0].row_id,
                    message: err.to_string(),
                });
                return Err(err.into());
            }
        }

        // Overflow rows append as placeholders carrying the pasted values.
        let base_index = display.len() as i64;
        for (offset, contents) in plan.appended.iter().enumerate() {
            let mut row = Row::placeholder(self.table_id, base_index + offset as i64 + 1);
            if let Some(name) = &contents.name {
                row.name = name.clone();
            }
            row.values = contents.values.clone();
            self.overlay.apply_new_row(row.clone());
            let tail = self.seq.len();
            self.seq.insert(tail, vec![row.clone()]);

            match self
                .persistence
                .create_row(self.table_id, &row.name, &row.values, Some(row.row_index))
                .await
            {
                Ok(real_id) => {
                    let mut confirmed = row.clone();
                    confirmed.id = real_id;
                    confirmed.pending = false;
                    self.bus
                        .publish(TableNotice::AssetCreateSent { row: confirmed });
                }
                Err(err) => {
                    warn!("pasted row creation failed: {}", err);
                    self.remove_placeholder(&row.id);
                    self.bus.publish(TableNotice::InsertFailed {
                        message: err.to_string(),
                    });
                }
            }
        }

        if buffer.cut {
            self.clear_cells(buffer.bound).await?;
            self.clipboard = None;
        }
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────

    fn field_kind(&self, field: &CellField) -> EngineResult<PropertyKind> {
        match field {
            CellField::Name => Ok(PropertyKind::Text),
            CellField::Property(key) => self
                .schema
                .property(key)
                .map(|p| p.kind)
                .ok_or_else(|| EngineError::PropertyNotFound(key.clone())),
        }
    }

    fn seq_find(&self, row_id: &RowId) -> Option<(usize, Row)> {
        self.seq
            .to_vec()
            .into_iter()
            .enumerate()
            .find(|(_, r)| r.id == *row_id)
    }

    /// Replaces the row at a sequence position (delete + insert keeps every
    /// other position stable).
    fn seq_replace(&mut self, pos: usize, row: Row) {
        self.seq.delete(pos, 1);
        self.seq.insert(pos, vec![row]);
    }

    fn seq_pos_for_display(&self, display: &[Row], pos: usize) -> usize {
        display
            .get(pos)
            .and_then(|row| self.seq.to_vec().iter().position(|r| r.id == row.id))
            .unwrap_or(self.seq.len())
    }

    fn set_field(row: &mut Row, field: &CellField, value: &Value) {
        match field {
            CellField::Name => row.name = value.display(),
            CellField::Property(key) => {
                row.values.insert(key.clone(), value.clone());
            }
        }
    }

    fn apply_reindex(&mut self, plan: &InsertPlan) {
        for (row_id, key) in &plan.reindexed {
            if let Some((pos, mut row)) = self.seq_find(row_id) {
                if row.row_index != *key {
                    row.row_index = *key;
                    self.seq_replace(pos, row);
                }
            }
        }
    }

    fn remove_placeholder(&mut self, row_id: &RowId) {
        if let Some((pos, _)) = self.seq_find(row_id) {
            self.seq.delete(pos, 1);
        }
        self.overlay.take_created(row_id);
    }
}
