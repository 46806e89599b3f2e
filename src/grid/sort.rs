use std::cmp::Ordering;
use tracing::trace;

use crate::data::compare::compare_cells;
use crate::data::table::DataTable;
use crate::grid::column::ColumnSpec;

/// Direction of the single active sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    None,
    Ascending,
    Descending,
}

/// The grid's sort configuration: at most one column sorted at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    pub column: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    /// Advance the tri-state cycle for a header click. Clicking the active
    /// column steps none -> asc -> desc -> none; clicking any other column
    /// starts that column at asc. Returns the new direction.
    pub fn cycle(&mut self, column_id: &str) -> SortDirection {
        let same = self.column.as_deref() == Some(column_id);

        self.direction = match (same, self.direction) {
            (false, _) => SortDirection::Ascending,
            (true, SortDirection::None) => SortDirection::Ascending,
            (true, SortDirection::Ascending) => SortDirection::Descending,
            (true, SortDirection::Descending) => SortDirection::None,
        };

        self.column = if self.direction == SortDirection::None {
            None
        } else {
            Some(column_id.to_string())
        };

        trace!("sort cycle: {:?} {:?}", self.column, self.direction);
        self.direction
    }

    pub fn is_active(&self) -> bool {
        self.column.is_some() && self.direction != SortDirection::None
    }
}

/// Stable-sort a vector of source row indices by one column.
///
/// The source rows are never reordered; only the index vector moves. Nulls
/// order after every defined value in both directions; only the relative
/// order of defined values flips with the direction. A `None` direction
/// leaves the indices untouched.
pub fn sort_indices(
    indices: &mut [usize],
    table: &DataTable,
    column: &ColumnSpec,
    direction: SortDirection,
) {
    if direction == SortDirection::None {
        return;
    }

    indices.sort_by(|&a, &b| {
        let row_a = match table.rows.get(a) {
            Some(r) => r,
            None => return Ordering::Equal,
        };
        let row_b = match table.rows.get(b) {
            Some(r) => r,
            None => return Ordering::Equal,
        };

        let val_a = column.value_for(table, row_a);
        let val_b = column.value_for(table, row_b);

        // Nulls last, independent of direction
        match (val_a.is_null(), val_b.is_null()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }

        let cmp = compare_cells(&val_a, &val_b);
        match direction {
            SortDirection::Descending => cmp.reverse(),
            _ => cmp,
        }
    });
}
