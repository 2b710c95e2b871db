//! Optimistic overlay store.
//!
//! Holds the local client's uncommitted mutations: edited cell values, newly
//! created placeholder rows, and rows marked for deletion. The overlay is
//! applied on top of the reconciled base for display, and entries are dropped
//! only when the authoritative data demonstrably reflects them.

use assetgrid_types::{converged, PropertyKey, Row, RowId, Value};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// The locally-desired state of one row, not yet confirmed by persistence.
#[derive(Debug, Clone, Default)]
pub struct RowDraft {
    /// Pending display-name change.
    pub name: Option<String>,
    /// Pending property-value changes.
    pub values: HashMap<PropertyKey, Value>,
}

impl RowDraft {
    /// A draft carrying a single property change.
    #[must_use]
    pub fn value(key: impl Into<PropertyKey>, value: Value) -> Self {
        Self {
            name: None,
            values: HashMap::from([(key.into(), value)]),
        }
    }

    /// A draft carrying a name change.
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            values: HashMap::new(),
        }
    }

    /// True when the draft carries no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.values.is_empty()
    }
}

/// Uncommitted local mutations, keyed by row id.
#[derive(Debug, Default)]
pub struct OverlayStore {
    edits: HashMap<RowId, RowDraft>,
    created: HashMap<RowId, Row>,
    deleted: HashSet<RowId>,
}

impl OverlayStore {
    /// Creates an empty overlay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ── Edits ────────────────────────────────────────────────────

    /// Merges a draft into the row's pending edit entry.
    pub fn apply_edit(&mut self, row_id: RowId, draft: RowDraft) {
        let entry = self.edits.entry(row_id).or_default();
        if let Some(name) = draft.name {
            entry.name = Some(name);
        }
        entry.values.extend(draft.values);
    }

    /// The pending edit for a row, if any.
    #[must_use]
    pub fn edit(&self, row_id: &RowId) -> Option<&RowDraft> {
        self.edits.get(row_id)
    }

    /// Removes one field from a row's pending edit (rollback after a failed
    /// save). `key: None` retracts the name change.
    pub fn retract_edit(&mut self, row_id: &RowId, key: Option<&PropertyKey>) {
        if let Some(entry) = self.edits.get_mut(row_id) {
            match key {
                Some(k) => {
                    entry.values.remove(k);
                }
                None => entry.name = None,
            }
            if entry.is_empty() {
                self.edits.remove(row_id);
            }
        }
    }

    /// Drops a row's entire pending edit.
    pub fn clear_edit(&mut self, row_id: &RowId) {
        self.edits.remove(row_id);
    }

    // ── Created placeholders ─────────────────────────────────────

    /// Registers a locally-created placeholder row.
    pub fn apply_new_row(&mut self, row: Row) {
        self.created.insert(row.id, row);
    }

    /// Removes a placeholder registration (resolved or rolled back).
    pub fn take_created(&mut self, row_id: &RowId) -> Option<Row> {
        self.created.remove(row_id)
    }

    /// True if the id belongs to a locally-created, unpersisted row.
    #[must_use]
    pub fn is_created(&self, row_id: &RowId) -> bool {
        self.created.contains_key(row_id)
    }

    /// Ids of all registered placeholder rows.
    #[must_use]
    pub fn created_ids(&self) -> Vec<RowId> {
        self.created.keys().copied().collect()
    }

    // ── Deleted-id set ───────────────────────────────────────────

    /// Hides a row from display ahead of delete confirmation.
    pub fn mark_deleted(&mut self, row_id: RowId) {
        self.deleted.insert(row_id);
    }

    /// Restores a row's visibility after a failed delete.
    pub fn restore(&mut self, row_id: &RowId) {
        self.deleted.remove(row_id);
    }

    /// True if the row is optimistically hidden.
    #[must_use]
    pub fn is_deleted(&self, row_id: &RowId) -> bool {
        self.deleted.contains(row_id)
    }

    // ── Convergence ──────────────────────────────────────────────

    /// Drops pending edits the authoritative data now reflects, and retires
    /// deleted ids the authoritative data no longer contains.
    ///
    /// Runs whenever an authoritative row list arrives — never on a timer —
    /// so a stale overlay cannot mask a legitimate later update, and a fresh
    /// overlay is not cleared before the read actually reflects it.
    pub fn clear_when_converged(&mut self, authoritative: &[Row]) {
        let by_id: HashMap<RowId, &Row> = authoritative.iter().map(|r| (r.id, r)).collect();

        self.edits.retain(|row_id, draft| {
            let Some(row) = by_id.get(row_id) else {
                // Row not yet visible in the authoritative read; keep waiting.
                return true;
            };
            let name_confirmed = draft
                .name
                .as_ref()
                .is_none_or(|name| &row.name == name);
            let values_confirmed = draft.values.iter().all(|(key, value)| {
                row.values
                    .get(key)
                    .is_some_and(|theirs| converged(value, theirs))
            });
            let keep = !(name_confirmed && values_confirmed);
            if !keep {
                debug!("overlay for row {} converged, dropping", row_id);
            }
            keep
        });

        // A deleted id is retired once the authoritative list stops carrying
        // it, not on a timer, so the row cannot flicker back in between.
        self.deleted.retain(|row_id| by_id.contains_key(row_id));
    }

    // ── Display composition ──────────────────────────────────────

    /// Applies the row's pending edit (if any) for display.
    #[must_use]
    pub fn apply_to(&self, row: &Row) -> Row {
        let Some(draft) = self.edits.get(&row.id) else {
            return row.clone();
        };
        let mut out = row.clone();
        if let Some(name) = &draft.name {
            out.name = name.clone();
        }
        for (key, value) in &draft.values {
            out.values.insert(key.clone(), value.clone());
        }
        out
    }

    /// Number of rows with pending edits.
    #[must_use]
    pub fn pending_edit_count(&self) -> usize {
        self.edits.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetgrid_types::TableId;

    fn row(name: &str, color: &str) -> Row {
        Row::new(RowId::new(), TableId::new(), name, 1)
            .with_value("color", Value::Text(color.into()))
    }

    #[test]
    fn edit_applies_for_display() {
        let base = row("A", "Blue");
        let mut overlay = OverlayStore::new();
        overlay.apply_edit(base.id, RowDraft::value("color", Value::Text("Red".into())));
        let shown = overlay.apply_to(&base);
        assert_eq!(shown.value(&"color".into()), Some(&Value::Text("Red".into())));
        assert_eq!(shown.name, "A");
    }

    #[test]
    fn converged_edit_is_dropped() {
        let mut base = row("A", "Blue");
        let mut overlay = OverlayStore::new();
        overlay.apply_edit(base.id, RowDraft::value("color", Value::Text("Red".into())));

        // Authoritative data still has the old value: entry stays.
        overlay.clear_when_converged(std::slice::from_ref(&base));
        assert!(overlay.edit(&base.id).is_some());

        base.set_value("color", Value::Text("Red".into()));
        overlay.clear_when_converged(std::slice::from_ref(&base));
        assert!(overlay.edit(&base.id).is_none());
    }

    #[test]
    fn partial_convergence_keeps_entry() {
        let mut base = row("A", "Blue");
        let mut overlay = OverlayStore::new();
        let mut draft = RowDraft::value("color", Value::Text("Red".into()));
        draft.name = Some("B".into());
        overlay.apply_edit(base.id, draft);

        // Only the value landed; the rename has not.
        base.set_value("color", Value::Text("Red".into()));
        overlay.clear_when_converged(std::slice::from_ref(&base));
        assert!(overlay.edit(&base.id).is_some());
    }

    #[test]
    fn deleted_id_retires_with_authoritative_absence() {
        let base = row("A", "Blue");
        let mut overlay = OverlayStore::new();
        overlay.mark_deleted(base.id);
        assert!(overlay.is_deleted(&base.id));

        // Still present authoritatively: stays hidden, does not flicker back.
        overlay.clear_when_converged(std::slice::from_ref(&base));
        assert!(overlay.is_deleted(&base.id));

        overlay.clear_when_converged(&[]);
        assert!(!overlay.is_deleted(&base.id));
    }

    #[test]
    fn retract_edit_removes_single_field() {
        let base = row("A", "Blue");
        let mut overlay = OverlayStore::new();
        let mut draft = RowDraft::value("color", Value::Text("Red".into()));
        draft.name = Some("B".into());
        overlay.apply_edit(base.id, draft);

        overlay.retract_edit(&base.id, Some(&"color".into()));
        assert!(overlay.edit(&base.id).is_some_and(|d| d.values.is_empty()));
        overlay.retract_edit(&base.id, None);
        assert!(overlay.edit(&base.id).is_none());
    }
}
