//! Cell edit state machine.
//!
//! Tracks which cell is being edited, validates typed input against the
//! property kind, and sequences the optimistic-save lifecycle:
//!
//! `Idle → Editing → Saving → Idle` on success, or back to `Editing` with the
//! attempted draft on failure so the user can retry. The controller holds no
//! I/O; the table engine drives persistence around it.

use crate::error::{EngineError, EngineResult};
use assetgrid_types::{PropertyKey, PropertyKind, Row, Value, UNTITLED};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The field a cell edit targets: the display name or a schema property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellField {
    Name,
    Property(PropertyKey),
}

impl CellField {
    /// The schema property key, if this is not the name field.
    #[must_use]
    pub fn property_key(&self) -> Option<&PropertyKey> {
        match self {
            CellField::Name => None,
            CellField::Property(key) => Some(key),
        }
    }

    /// Maps the realtime-event addressing (`None` = name) onto a field.
    #[must_use]
    pub fn from_event_key(key: Option<PropertyKey>) -> Self {
        match key {
            Some(k) => CellField::Property(k),
            None => CellField::Name,
        }
    }
}

impl fmt::Display for CellField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellField::Name => f.write_str("name"),
            CellField::Property(key) => write!(f, "{key}"),
        }
    }
}

/// Which cell is being edited, and where in the save lifecycle it is.
#[derive(Debug, Clone, Default)]
pub enum EditState {
    #[default]
    Idle,
    Editing {
        row_id: assetgrid_types::RowId,
        field: CellField,
        draft: String,
        /// The displayed value when editing began, for rollback.
        original: Value,
    },
    Saving {
        row_id: assetgrid_types::RowId,
        field: CellField,
        draft: String,
        original: Value,
    },
}

/// Parses typed input into a value of the property's kind.
///
/// Integer input must not contain a decimal point; float input must contain
/// one. Empty input clears the cell.
pub fn parse_input(kind: PropertyKind, field: &CellField, input: &str) -> EngineResult<Value> {
    let trimmed = input.trim();
    match kind {
        PropertyKind::Text => Ok(Value::Text(input.to_string())),
        PropertyKind::Integer => {
            if trimmed.is_empty() {
                return Ok(Value::Null);
            }
            if trimmed.contains('.') {
                return Err(EngineError::TypeMismatch {
                    property: field.to_string(),
                    input: input.to_string(),
                });
            }
            trimmed
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| EngineError::TypeMismatch {
                    property: field.to_string(),
                    input: input.to_string(),
                })
        }
        PropertyKind::Float => {
            if trimmed.is_empty() {
                return Ok(Value::Null);
            }
            if !trimmed.contains('.') {
                return Err(EngineError::TypeMismatch {
                    property: field.to_string(),
                    input: input.to_string(),
                });
            }
            trimmed
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| EngineError::TypeMismatch {
                    property: field.to_string(),
                    input: input.to_string(),
                })
        }
        // Single-click kinds never enter the keyboard editor.
        _ => Err(EngineError::TypeMismatch {
            property: field.to_string(),
            input: input.to_string(),
        }),
    }
}

/// The cell edit controller.
#[derive(Debug, Default)]
pub struct EditController {
    state: EditState,
}

impl EditController {
    /// Creates an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &EditState {
        &self.state
    }

    /// True if the given cell is being edited or saved.
    #[must_use]
    pub fn is_active_cell(&self, row_id: &assetgrid_types::RowId, field: &CellField) -> bool {
        match &self.state {
            EditState::Editing { row_id: r, field: f, .. }
            | EditState::Saving { row_id: r, field: f, .. } => r == row_id && f == field,
            EditState::Idle => false,
        }
    }

    /// The in-progress draft for the given cell, if it is active.
    #[must_use]
    pub fn draft_for(&self, row_id: &assetgrid_types::RowId, field: &CellField) -> Option<&str> {
        match &self.state {
            EditState::Editing { row_id: r, field: f, draft, .. }
            | EditState::Saving { row_id: r, field: f, draft, .. }
                if r == row_id && f == field =>
            {
                Some(draft)
            }
            _ => None,
        }
    }

    /// True if a save is in flight for the given cell.
    #[must_use]
    pub fn is_saving(&self, row_id: &assetgrid_types::RowId, field: &CellField) -> bool {
        matches!(&self.state, EditState::Saving { row_id: r, field: f, .. } if r == row_id && f == field)
    }

    /// Enters editing on a cell, capturing the displayed value.
    ///
    /// Only keyboard-editable kinds are accepted; booleans, tags, references
    /// and media use single-click controls outside this state machine. The
    /// initial draft falls back to the row name only for the name field, and
    /// not when the name is still the "Untitled" stub.
    pub fn begin_edit(
        &mut self,
        row: &Row,
        field: CellField,
        kind: PropertyKind,
    ) -> EngineResult<()> {
        if !kind.is_keyboard_editable() {
            return Err(EngineError::UnsupportedKind(
                field
                    .property_key()
                    .cloned()
                    .unwrap_or_else(|| PropertyKey::from("name")),
            ));
        }
        let original = match &field {
            CellField::Name => Value::Text(row.name.clone()),
            CellField::Property(key) => row.value(key).cloned().unwrap_or(Value::Null),
        };
        let draft = match &field {
            CellField::Name if row.name == UNTITLED => String::new(),
            CellField::Name => row.name.clone(),
            CellField::Property(_) => original.display(),
        };
        self.state = EditState::Editing {
            row_id: row.id,
            field,
            draft,
            original,
        };
        Ok(())
    }

    /// Replaces the draft while editing (each keystroke).
    pub fn set_draft(&mut self, input: impl Into<String>) {
        if let EditState::Editing { draft, .. } = &mut self.state {
            *draft = input.into();
        }
    }

    /// Validates the draft and transitions `Editing → Saving`.
    ///
    /// On validation failure the state is untouched and editing stays open.
    pub fn begin_save(
        &mut self,
        kind: PropertyKind,
    ) -> EngineResult<(assetgrid_types::RowId, CellField, Value, Value)> {
        let EditState::Editing { row_id, field, draft, original } = &self.state else {
            return Err(EngineError::InvalidRange("no cell is being edited".into()));
        };
        let value = parse_input(kind, field, draft)?;
        let (row_id, field, draft, original) =
            (*row_id, field.clone(), draft.clone(), original.clone());
        self.state = EditState::Saving {
            row_id,
            field: field.clone(),
            draft,
            original: original.clone(),
        };
        Ok((row_id, field, value, original))
    }

    /// Save confirmed: back to idle, unless the controller has already moved
    /// on (a superseding cancel), in which case the response is ignored.
    pub fn complete_save(&mut self, row_id: &assetgrid_types::RowId, field: &CellField) {
        if matches!(&self.state, EditState::Saving { row_id: r, field: f, .. } if r == row_id && f == field)
        {
            self.state = EditState::Idle;
        }
    }

    /// Save failed: restore `Editing` with the attempted draft for retry.
    /// Ignored if the controller already left the cell.
    pub fn fail_save(&mut self, row_id: &assetgrid_types::RowId, field: &CellField) {
        if !self.is_saving(row_id, field) {
            return;
        }
        if let EditState::Saving { row_id, field, draft, original } = std::mem::take(&mut self.state)
        {
            self.state = EditState::Editing {
                row_id,
                field,
                draft,
                original,
            };
        }
    }

    /// Discards the draft and returns to idle. No mutation is issued.
    pub fn cancel(&mut self) {
        self.state = EditState::Idle;
    }

    /// Replaces the draft with a remote value (conflict resolved as
    /// accept-remote) if the cell is still being edited.
    pub fn accept_remote(
        &mut self,
        row_id: &assetgrid_types::RowId,
        field: &CellField,
        remote: &Value,
    ) {
        if let EditState::Editing { row_id: r, field: f, draft, .. } = &mut self.state {
            if r == row_id && f == field {
                *draft = remote.display();
            }
        }
    }

    /// Whether an incoming remote value diverges from the in-progress draft
    /// for this cell. Equal values are silent convergence, not a conflict.
    #[must_use]
    pub fn remote_diverges(&self, kind: PropertyKind, remote: &Value) -> bool {
        let (field, draft) = match &self.state {
            EditState::Editing { field, draft, .. }
            | EditState::Saving { field, draft, .. } => (field, draft),
            EditState::Idle => return false,
        };
        match parse_input(kind, field, draft) {
            Ok(local) => !assetgrid_types::converged(&local, remote),
            // An unparseable draft cannot equal a typed remote value; fall
            // back to comparing rendered text.
            Err(_) => draft != &remote.display(),
        }
    }
}
