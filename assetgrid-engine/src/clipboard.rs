//! Clipboard capture and paste planning.
//!
//! Copy and cut capture the selected rectangular bound as a 2-D grid of raw
//! values plus the bound itself (the bound feeds border rendering, which is
//! outside this core). Paste anchors the grid at a destination cell, coerces
//! every value to the destination column's kind, and appends rows when the
//! grid runs past the end of the table.

use crate::selection::{CellRange, NAME_COLUMN};
use assetgrid_types::{PropertyKey, Row, RowPatch, Schema, Value};
use std::collections::HashMap;

/// Captured cell grid.
#[derive(Debug, Clone)]
pub struct ClipboardBuffer {
    /// Raw values, row-major, covering the captured bound.
    pub values: Vec<Vec<Value>>,
    /// The captured bound.
    pub bound: CellRange,
    /// True for a cut: the source range is cleared after a successful paste.
    pub cut: bool,
}

/// Captures the values under a rectangular bound from the display rows.
#[must_use]
pub fn capture(display: &[Row], schema: &Schema, range: CellRange, cut: bool) -> ClipboardBuffer {
    let mut values = Vec::with_capacity(range.row_count());
    for row_pos in range.row_indices() {
        let mut grid_row = Vec::with_capacity(range.col_count());
        for col in range.col_indices() {
            let value = display.get(row_pos).map_or(Value::Null, |row| {
                if col == NAME_COLUMN {
                    Value::Text(row.name.clone())
                } else {
                    schema
                        .property_at(col - 1)
                        .and_then(|p| row.value(&p.key))
                        .cloned()
                        .unwrap_or(Value::Null)
                }
            });
            grid_row.push(value);
        }
        values.push(grid_row);
    }
    ClipboardBuffer {
        values,
        bound: range,
        cut,
    }
}

/// The changes a paste will make to one appended row.
#[derive(Debug, Clone, Default)]
pub struct AppendedRow {
    pub name: Option<String>,
    pub values: HashMap<PropertyKey, Value>,
}

/// A planned paste.
#[derive(Debug, Clone)]
pub struct PastePlan {
    /// Patches against rows that already exist, touched keys only.
    pub patches: Vec<RowPatch>,
    /// Contents for rows appended past the end of the table, in order.
    pub appended: Vec<AppendedRow>,
}

/// Plans pasting the buffer with its top-left cell at `anchor`
/// (display-row index, column index).
///
/// Values are coerced to the destination column's kind; grid columns that run
/// past the schema are dropped.
#[must_use]
pub fn plan_paste(
    display: &[Row],
    schema: &Schema,
    buffer: &ClipboardBuffer,
    anchor: (usize, usize),
) -> PastePlan {
    let mut patches: HashMap<usize, RowPatch> = HashMap::new();
    let mut appended: HashMap<usize, AppendedRow> = HashMap::new();

    for (r, grid_row) in buffer.values.iter().enumerate() {
        let row_pos = anchor.0 + r;
        for (c, value) in grid_row.iter().enumerate() {
            let col = anchor.1 + c;
            let (name, keyed) = if col == NAME_COLUMN {
                match value.coerce_to(assetgrid_types::PropertyKind::Text) {
                    Value::Text(s) => (Some(s), None),
                    _ => (Some(String::new()), None),
                }
            } else {
                let Some(property) = schema.property_at(col - 1) else {
                    continue;
                };
                (
                    None,
                    Some((property.key.clone(), value.coerce_to(property.kind))),
                )
            };

            if let Some(row) = display.get(row_pos) {
                let patch = patches
                    .entry(row_pos)
                    .or_insert_with(|| RowPatch::new(row.id));
                if let Some(name) = name {
                    patch.name = Some(name);
                }
                if let Some((key, value)) = keyed {
                    patch.values.insert(key, value);
                }
            } else {
                let entry = appended.entry(row_pos - display.len()).or_default();
                if let Some(name) = name {
                    entry.name = Some(name);
                }
                if let Some((key, value)) = keyed {
                    entry.values.insert(key, value);
                }
            }
        }
    }

    let mut patch_list: Vec<(usize, RowPatch)> = patches.into_iter().collect();
    patch_list.sort_by_key(|(pos, _)| *pos);

    // Appended rows must be contiguous from the end of the table even if the
    // grid left gaps (it never does for rectangular captures, but the plan
    // stays well-formed regardless).
    let appended_count = appended.keys().max().map_or(0, |m| m + 1);
    let mut appended_rows = vec![AppendedRow::default(); appended_count];
    for (offset, row) in appended {
        appended_rows[offset] = row;
    }

    PastePlan {
        patches: patch_list.into_iter().map(|(_, p)| p).collect(),
        appended: appended_rows,
    }
}
