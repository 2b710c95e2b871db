//! Planning for batch operators: fill-down, multi-row insert, delete, and
//! clear-contents.
//!
//! Planners are pure index math over the current display order; the table
//! engine applies a plan to the overlay and the sequence, then issues the
//! persistence calls and rolls back on failure.

use crate::error::{EngineError, EngineResult};
use crate::selection::{CellRange, NAME_COLUMN};
use assetgrid_types::{PropertyKey, Row, RowId, RowPatch, Schema, Value};

/// Where new rows land relative to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Above,
    Below,
}

/// A planned multi-row insert.
#[derive(Debug, Clone)]
pub struct InsertPlan {
    /// Display position the new rows occupy.
    pub display_pos: usize,
    /// Ordering keys for the new rows, contiguous and freed by the shift.
    pub new_indices: Vec<i64>,
    /// Ordering-key updates for existing rows (normalization plus shift),
    /// only for rows whose key actually changes.
    pub index_patches: Vec<RowPatch>,
    /// Final ordering key for every existing row, in display order.
    pub reindexed: Vec<(RowId, i64)>,
}

/// Plans inserting `count` rows above or below the selected rows.
///
/// Ordering keys are first normalized to compact 1-based sequential numbering
/// matching the current display order (repairing legacy duplicate or stale
/// keys), then every row at or after the anchor is shifted by `count` to free
/// a contiguous run for the new rows.
pub fn plan_insert(
    display: &[Row],
    targets: &[RowId],
    placement: Placement,
    count: usize,
) -> EngineResult<InsertPlan> {
    if count == 0 {
        return Err(EngineError::InvalidRange("insert of zero rows".into()));
    }
    if targets.is_empty() {
        return Err(EngineError::InvalidRange("no rows selected".into()));
    }

    let mut positions = Vec::with_capacity(targets.len());
    for id in targets {
        let pos = display
            .iter()
            .position(|r| r.id == *id)
            .ok_or(EngineError::RowNotFound(*id))?;
        positions.push(pos);
    }

    let anchor = match placement {
        Placement::Above => *positions.iter().min().unwrap_or(&0),
        Placement::Below => positions.iter().max().map(|p| p + 1).unwrap_or(0),
    };

    let mut index_patches = Vec::new();
    let mut reindexed = Vec::with_capacity(display.len());
    for (pos, row) in display.iter().enumerate() {
        let normalized = pos as i64 + 1;
        let shifted = if pos >= anchor {
            normalized + count as i64
        } else {
            normalized
        };
        reindexed.push((row.id, shifted));
        if row.row_index != shifted && !row.pending {
            index_patches.push(RowPatch::new(row.id).with_index(shifted));
        }
    }

    let new_indices = (0..count).map(|i| anchor as i64 + 1 + i as i64).collect();

    Ok(InsertPlan {
        display_pos: anchor,
        new_indices,
        index_patches,
        reindexed,
    })
}

/// A planned fill-down.
#[derive(Debug, Clone)]
pub struct FillPlan {
    /// The value copied from the start row.
    pub value: Value,
    /// Every row receiving the value, in display order (start row included).
    pub row_ids: Vec<RowId>,
    /// One patch per row in the range, carrying only the filled key.
    pub patches: Vec<RowPatch>,
}

/// Plans copying the start row's value down to the end row, inclusive.
///
/// Downward only (`end` strictly below `start`), and only for text, integer
/// and float properties.
pub fn plan_fill_down(
    display: &[Row],
    schema: &Schema,
    start: RowId,
    end: RowId,
    key: &PropertyKey,
) -> EngineResult<FillPlan> {
    let property = schema
        .property(key)
        .ok_or_else(|| EngineError::PropertyNotFound(key.clone()))?;
    if !property.kind.is_fillable() {
        return Err(EngineError::UnsupportedKind(key.clone()));
    }

    let start_pos = display
        .iter()
        .position(|r| r.id == start)
        .ok_or(EngineError::RowNotFound(start))?;
    let end_pos = display
        .iter()
        .position(|r| r.id == end)
        .ok_or(EngineError::RowNotFound(end))?;
    if end_pos <= start_pos {
        return Err(EngineError::InvalidRange(format!(
            "fill-down requires the end row below the start row (start {start_pos}, end {end_pos})"
        )));
    }

    let value = display[start_pos]
        .value(key)
        .cloned()
        .unwrap_or(Value::Null);

    let rows = &display[start_pos..=end_pos];
    let row_ids: Vec<RowId> = rows.iter().map(|r| r.id).collect();
    let patches = rows
        .iter()
        .map(|r| RowPatch::new(r.id).with_value(key.clone(), value.clone()))
        .collect();

    Ok(FillPlan {
        value,
        row_ids,
        patches,
    })
}

/// A planned deletion, split by persistence status.
#[derive(Debug, Clone)]
pub struct DeletePlan {
    /// Unpersisted placeholder rows: removed locally, no network call.
    pub placeholders: Vec<RowId>,
    /// Persisted rows: hidden optimistically, then deleted remotely.
    pub persisted: Vec<RowId>,
}

/// Splits the targeted ids by whether they are placeholder rows.
pub fn plan_delete(rows: &[Row], targets: &[RowId]) -> DeletePlan {
    let mut placeholders = Vec::new();
    let mut persisted = Vec::new();
    for id in targets {
        match rows.iter().find(|r| r.id == *id) {
            Some(row) if row.pending => placeholders.push(*id),
            Some(_) => persisted.push(*id),
            // Already gone; nothing to do.
            None => {}
        }
    }
    DeletePlan {
        placeholders,
        persisted,
    }
}

/// Plans clearing a rectangular cell range.
///
/// The name column clears to an empty string, booleans to `false`, and every
/// other kind to null. Each patch carries only the touched keys.
pub fn plan_clear(display: &[Row], schema: &Schema, range: &CellRange) -> Vec<RowPatch> {
    let mut patches = Vec::new();
    for row_pos in range.row_indices() {
        let Some(row) = display.get(row_pos) else {
            break;
        };
        let mut patch = RowPatch::new(row.id);
        for col in range.col_indices() {
            if col == NAME_COLUMN {
                patch.name = Some(String::new());
            } else if let Some(property) = schema.property_at(col - 1) {
                patch
                    .values
                    .insert(property.key.clone(), property.kind.cleared_value());
            }
        }
        if !patch.is_empty() {
            patches.push(patch);
        }
    }
    patches
}
