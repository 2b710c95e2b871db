//! Selection bookkeeping.
//!
//! Batch operators resolve their target rows from the current selection in a
//! fixed priority order: checkbox-selected rows, then drag-selected cells,
//! then the right-click context row.

use assetgrid_types::{Row, RowId};

/// Column position 0 is the display-name column; schema properties follow at
/// their display index plus one.
pub const NAME_COLUMN: usize = 0;

/// An inclusive rectangular cell bound: display-row range × column range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    /// Inclusive (first, last) display-row indices.
    pub rows: (usize, usize),
    /// Inclusive (first, last) column indices (see [`NAME_COLUMN`]).
    pub cols: (usize, usize),
}

impl CellRange {
    /// Builds a normalized range from two corner cells in any order.
    #[must_use]
    pub fn new(a: (usize, usize), b: (usize, usize)) -> Self {
        Self {
            rows: (a.0.min(b.0), a.0.max(b.0)),
            cols: (a.1.min(b.1), a.1.max(b.1)),
        }
    }

    /// Number of rows covered.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.1 - self.rows.0 + 1
    }

    /// Number of columns covered.
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.cols.1 - self.cols.0 + 1
    }

    /// Iterates the covered display-row indices.
    pub fn row_indices(&self) -> impl Iterator<Item = usize> {
        self.rows.0..=self.rows.1
    }

    /// Iterates the covered column indices.
    pub fn col_indices(&self) -> impl Iterator<Item = usize> {
        self.cols.0..=self.cols.1
    }
}

/// The current selection state for one table view.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Checkbox-selected row ids, in click order.
    pub checked: Vec<RowId>,
    /// Drag-selected rectangular cell bound.
    pub drag: Option<CellRange>,
    /// Row under the open context menu, if any.
    pub context_row: Option<RowId>,
}

impl Selection {
    /// Resolves the rows a batch operator should target, in display order,
    /// honoring the checkbox → drag → context-menu priority.
    #[must_use]
    pub fn target_rows(&self, display: &[Row]) -> Vec<RowId> {
        if !self.checked.is_empty() {
            let mut ids: Vec<RowId> = display
                .iter()
                .filter(|r| self.checked.contains(&r.id))
                .map(|r| r.id)
                .collect();
            // Checked rows that scrolled out of the display are still targets.
            for id in &self.checked {
                if !ids.contains(id) {
                    ids.push(*id);
                }
            }
            return ids;
        }
        if let Some(range) = &self.drag {
            return range
                .row_indices()
                .filter_map(|i| display.get(i).map(|r| r.id))
                .collect();
        }
        self.context_row.into_iter().collect()
    }

    /// True when nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checked.is_empty() && self.drag.is_none() && self.context_row.is_none()
    }

    /// Clears all selection state.
    pub fn clear(&mut self) {
        self.checked.clear();
        self.drag = None;
        self.context_row = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetgrid_types::TableId;

    fn rows(n: usize) -> Vec<Row> {
        let table = TableId::new();
        (0..n)
            .map(|i| Row::new(RowId::new(), table, format!("r{i}"), i as i64 + 1))
            .collect()
    }

    #[test]
    fn range_normalizes_corners() {
        let range = CellRange::new((4, 2), (1, 5));
        assert_eq!(range.rows, (1, 4));
        assert_eq!(range.cols, (2, 5));
        assert_eq!(range.row_count(), 4);
        assert_eq!(range.col_count(), 4);
    }

    #[test]
    fn checked_rows_win_over_drag() {
        let display = rows(5);
        let selection = Selection {
            checked: vec![display[3].id, display[1].id],
            drag: Some(CellRange::new((0, 0), (4, 0))),
            context_row: Some(display[0].id),
        };
        // Display order, not click order.
        assert_eq!(
            selection.target_rows(&display),
            vec![display[1].id, display[3].id]
        );
    }

    #[test]
    fn drag_rows_resolve_by_display_index() {
        let display = rows(5);
        let selection = Selection {
            checked: Vec::new(),
            drag: Some(CellRange::new((1, 0), (3, 2))),
            context_row: None,
        };
        assert_eq!(
            selection.target_rows(&display),
            vec![display[1].id, display[2].id, display[3].id]
        );
    }

    #[test]
    fn context_row_is_last_resort() {
        let display = rows(2);
        let selection = Selection {
            checked: Vec::new(),
            drag: None,
            context_row: Some(display[1].id),
        };
        assert_eq!(selection.target_rows(&display), vec![display[1].id]);
    }
}
