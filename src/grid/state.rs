use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::data::table::{DataRow, DataTable};
use crate::data::value::CellValue;
use crate::grid::column::{find_duplicate_id, ColumnSpec};
use crate::grid::edit::{parse_edit_value, EditController, EditPolicy};
use crate::grid::layout::ColumnLayout;
use crate::grid::selection::{SelectionTracker, StaleKeys};
use crate::grid::sort::{sort_indices, SortDirection, SortState};
use crate::grid::window::{compute_window, max_scroll_top, Density, ViewportWindow};
use crate::grid::RowKey;

/// Notification hooks out of the grid. All of them are observers, never a
/// source of truth: the grid's own state is already updated when they fire.
#[derive(Default)]
pub struct GridCallbacks {
    pub on_sort: Option<Box<dyn FnMut(&str, SortDirection)>>,
    pub on_selection_change: Option<Box<dyn FnMut(&[RowKey])>>,
    pub on_cell_edit: Option<Box<dyn FnMut(&RowKey, &str, &CellValue)>>,
    pub on_row_click: Option<Box<dyn FnMut(&RowKey)>>,
}

impl std::fmt::Debug for GridCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridCallbacks")
            .field("on_sort", &self.on_sort.is_some())
            .field("on_selection_change", &self.on_selection_change.is_some())
            .field("on_cell_edit", &self.on_cell_edit.is_some())
            .field("on_row_click", &self.on_row_click.is_some())
            .finish()
    }
}

/// The whole interactive grid: source table, column specs, and every engine
/// composed into one state machine. Every mutation is a synchronous in-memory
/// transition; the render pipeline re-derives sorted order, window slice, and
/// visible columns from here each frame.
#[derive(Debug)]
pub struct GridState {
    table: Arc<DataTable>,
    columns: Vec<ColumnSpec>,
    key_column: String,

    /// Row identity per source row index, derived from the key column.
    row_keys: Vec<RowKey>,
    /// Source row indices in display order (sorting permutes this, never the
    /// source rows).
    view_rows: Vec<usize>,

    pub sort: SortState,
    pub selection: SelectionTracker,
    expanded: HashSet<RowKey>,
    pub edit: EditController,
    pub layout: ColumnLayout,

    density: Density,
    row_height_override: Option<u32>,
    virtual_scroll: bool,
    overscan: usize,
    scroll_top: i64,
    viewport_height: Option<u32>,

    stale_keys: StaleKeys,
    pub callbacks: GridCallbacks,

    /// Crosshair: (index into the ordered view, index into the visible column
    /// order).
    cursor_row: usize,
    cursor_col: usize,
}

impl GridState {
    pub fn new(table: Arc<DataTable>, columns: Vec<ColumnSpec>, key_column: &str) -> Self {
        if let Some(dup) = find_duplicate_id(&columns) {
            warn!("duplicate column id {:?}; the first definition wins", dup);
        }

        let layout = ColumnLayout::new(&columns);
        let mut state = Self {
            table,
            columns,
            key_column: key_column.to_string(),
            row_keys: Vec::new(),
            view_rows: Vec::new(),
            sort: SortState::default(),
            selection: SelectionTracker::new(),
            expanded: HashSet::new(),
            edit: EditController::default(),
            layout,
            density: Density::default(),
            row_height_override: None,
            virtual_scroll: false,
            overscan: 2,
            scroll_top: 0,
            viewport_height: None,
            stale_keys: StaleKeys::default(),
            callbacks: GridCallbacks::default(),
            cursor_row: 0,
            cursor_col: 0,
        };
        state.rebuild_keys();
        state.apply_sort();
        state
    }

    // --- construction options --------------------------------------------

    pub fn with_virtual_scroll(mut self, on: bool) -> Self {
        self.virtual_scroll = on;
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_density(mut self, density: Density) -> Self {
        self.density = density;
        self
    }

    pub fn with_row_height(mut self, row_height: u32) -> Self {
        self.row_height_override = Some(row_height.max(1));
        self
    }

    pub fn with_edit_policy(mut self, policy: EditPolicy) -> Self {
        self.edit = EditController::new(policy);
        self
    }

    pub fn with_stale_keys(mut self, policy: StaleKeys) -> Self {
        self.stale_keys = policy;
        self
    }

    pub fn with_default_sort(mut self, column_id: &str, direction: SortDirection) -> Self {
        self.sort = SortState {
            column: (direction != SortDirection::None).then(|| column_id.to_string()),
            direction,
        };
        self.apply_sort();
        self
    }

    // --- accessors --------------------------------------------------------

    pub fn table(&self) -> &DataTable {
        &self.table
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column(&self, column_id: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    pub fn row_count(&self) -> usize {
        self.view_rows.len()
    }

    pub fn is_virtual(&self) -> bool {
        self.virtual_scroll
    }

    pub fn row_height(&self) -> u32 {
        self.row_height_override
            .unwrap_or_else(|| self.density.row_height())
    }

    pub fn density(&self) -> Density {
        self.density
    }

    pub fn set_density(&mut self, density: Density) {
        self.density = density;
        self.clamp_scroll();
    }

    pub fn cycle_density(&mut self) -> Density {
        self.set_density(self.density.cycle());
        self.density
    }

    /// Visible columns in display order (hidden filtered, pins applied).
    pub fn visible_columns(&self) -> Vec<&ColumnSpec> {
        self.layout
            .visible_order(&self.columns)
            .into_iter()
            .filter_map(|id| self.columns.iter().find(|c| c.id == id))
            .collect()
    }

    /// The ordered view: source row index plus identity, full length.
    pub fn view_rows(&self) -> &[usize] {
        &self.view_rows
    }

    pub fn row_at(&self, view_idx: usize) -> Option<&DataRow> {
        self.table.rows.get(*self.view_rows.get(view_idx)?)
    }

    pub fn key_at(&self, view_idx: usize) -> Option<&RowKey> {
        self.row_keys.get(*self.view_rows.get(view_idx)?)
    }

    /// Resolve one cell of the ordered view through a column's accessor.
    pub fn cell_value(&self, view_idx: usize, column: &ColumnSpec) -> CellValue {
        self.row_at(view_idx)
            .map(|row| column.value_for(&self.table, row))
            .unwrap_or(CellValue::Null)
    }

    // --- sorting ----------------------------------------------------------

    /// A header click on a sortable column: advance the tri-state cycle,
    /// re-derive the view, and notify. Clicks on unknown or unsortable
    /// columns are ignored.
    pub fn click_header(&mut self, column_id: &str) {
        let Some(column) = self.column(column_id) else {
            return;
        };
        if !column.sortable {
            return;
        }

        let direction = self.sort.cycle(column_id);
        self.apply_sort();

        if let Some(cb) = self.callbacks.on_sort.as_mut() {
            cb(column_id, direction);
        }
    }

    /// Re-derive `view_rows` from the source order plus the sort state. A
    /// cleared sort restores the source order exactly.
    fn apply_sort(&mut self) {
        self.view_rows = (0..self.table.row_count()).collect();

        if self.sort.direction == SortDirection::None {
            return;
        }
        let Some(column) = self
            .sort
            .column
            .as_deref()
            .and_then(|id| self.column(id))
            .cloned()
        else {
            return;
        };

        sort_indices(&mut self.view_rows, &self.table, &column, self.sort.direction);
        self.clamp_cursor();
    }

    // --- selection --------------------------------------------------------

    pub fn toggle_row_selection(&mut self, view_idx: usize) {
        let Some(key) = self.key_at(view_idx).cloned() else {
            return;
        };
        self.selection.toggle(key);
        self.notify_selection();
    }

    /// Select-all over the currently materialized row set: the window slice
    /// when virtualization is on, the full ordered view otherwise.
    pub fn select_all_toggle(&mut self) {
        let materialized = self.materialized_keys();
        self.selection.select_all_toggle(&materialized);
        self.notify_selection();
    }

    pub fn clear_selection(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.notify_selection();
        }
    }

    fn materialized_keys(&self) -> Vec<RowKey> {
        let window = self.window();
        self.view_rows[window.start_index..window.end_index]
            .iter()
            .filter_map(|&src| self.row_keys.get(src).cloned())
            .collect()
    }

    fn notify_selection(&mut self) {
        let keys = self.selection.to_vec();
        if let Some(cb) = self.callbacks.on_selection_change.as_mut() {
            cb(&keys);
        }
    }

    // --- expansion --------------------------------------------------------

    pub fn toggle_expanded(&mut self, view_idx: usize) {
        let Some(key) = self.key_at(view_idx).cloned() else {
            return;
        };
        if !self.expanded.remove(&key) {
            self.expanded.insert(key);
        }
    }

    pub fn is_expanded(&self, key: &RowKey) -> bool {
        self.expanded.contains(key)
    }

    // --- editing ----------------------------------------------------------

    /// Begin an inline edit at a view position. Refused for non-editable
    /// columns and, under `EditPolicy::Block`, while another edit is pending.
    pub fn start_edit(&mut self, view_idx: usize, column_id: &str) -> bool {
        let Some(column) = self.column(column_id).cloned() else {
            return false;
        };
        if !column.editable {
            return false;
        }
        let Some(key) = self.key_at(view_idx).cloned() else {
            return false;
        };

        let current = self.cell_value(view_idx, &column);
        self.edit.start_edit(key, column_id, &current)
    }

    /// Commit the in-flight edit: parse the buffer by the column's editor
    /// kind, fire `on_cell_edit` exactly once, clear the cursor. The source
    /// rows are never touched here; row data stays caller-owned.
    pub fn commit_edit(&mut self) -> bool {
        let Some((cell, buffer)) = self.edit.commit() else {
            return false;
        };

        let edit_type = self
            .column(&cell.column_id)
            .map(|c| c.edit_type)
            .unwrap_or_default();
        let value = parse_edit_value(&buffer, edit_type);

        debug!("cell edit committed: {}/{}", cell.row_key, cell.column_id);
        if let Some(cb) = self.callbacks.on_cell_edit.as_mut() {
            cb(&cell.row_key, &cell.column_id, &value);
        }
        true
    }

    pub fn cancel_edit(&mut self) {
        self.edit.cancel();
    }

    // --- layout passthroughs ---------------------------------------------

    pub fn toggle_column_hidden(&mut self, column_id: &str) {
        self.layout.toggle_hidden(column_id);
        self.clamp_cursor();
    }

    pub fn begin_column_resize(&mut self, column_id: &str, pointer_x: i32) {
        if let Some(column) = self.column(column_id).cloned() {
            self.layout.begin_resize(&column, pointer_x);
        }
    }

    pub fn update_column_resize(&mut self, pointer_x: i32) {
        if let Some(id) = self.layout.resizing().map(str::to_string) {
            if let Some(column) = self.column(&id).cloned() {
                self.layout.resize_to(&column, pointer_x);
            }
        }
    }

    pub fn end_column_resize(&mut self) {
        self.layout.end_resize();
    }

    pub fn reset_layout(&mut self) {
        self.layout.reset(&self.columns);
        self.clamp_cursor();
    }

    // --- viewport ---------------------------------------------------------

    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = Some(height);
        self.clamp_scroll();
    }

    pub fn scroll_top(&self) -> i64 {
        self.scroll_top
    }

    pub fn scroll_to(&mut self, y: i64) {
        self.scroll_top = y;
        self.clamp_scroll();
    }

    pub fn scroll_by(&mut self, dy: i64) {
        self.scroll_to(self.scroll_top + dy);
    }

    fn clamp_scroll(&mut self) {
        let max = max_scroll_top(self.viewport_height, self.row_height(), self.view_rows.len());
        self.scroll_top = self.scroll_top.clamp(0, max);
    }

    /// The window of rows to materialize this frame. With virtualization off
    /// this is simply the whole view.
    pub fn window(&self) -> ViewportWindow {
        if !self.virtual_scroll {
            let row_height = self.row_height() as u64;
            return ViewportWindow {
                start_index: 0,
                end_index: self.view_rows.len(),
                offset_y: 0,
                total_height: self.view_rows.len() as u64 * row_height,
            };
        }
        compute_window(
            self.scroll_top,
            self.viewport_height,
            self.row_height(),
            self.overscan,
            self.view_rows.len(),
        )
    }

    // --- cursor -----------------------------------------------------------

    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_col)
    }

    pub fn cursor_column(&self) -> Option<&ColumnSpec> {
        let visible = self.visible_columns();
        visible.get(self.cursor_col).copied()
    }

    pub fn cursor_key(&self) -> Option<&RowKey> {
        self.key_at(self.cursor_row)
    }

    pub fn move_cursor_vertical(&mut self, delta: i64) {
        if self.view_rows.is_empty() {
            return;
        }
        let last = self.view_rows.len() as i64 - 1;
        self.cursor_row = (self.cursor_row as i64 + delta).clamp(0, last) as usize;
        self.ensure_cursor_row_visible();
    }

    pub fn move_cursor_horizontal(&mut self, delta: i64) {
        let count = self.visible_columns().len();
        if count == 0 {
            return;
        }
        let last = count as i64 - 1;
        self.cursor_col = (self.cursor_col as i64 + delta).clamp(0, last) as usize;
    }

    pub fn cursor_to_first_row(&mut self) {
        self.cursor_row = 0;
        self.ensure_cursor_row_visible();
    }

    pub fn cursor_to_last_row(&mut self) {
        self.cursor_row = self.view_rows.len().saturating_sub(1);
        self.ensure_cursor_row_visible();
    }

    pub fn page_size_rows(&self) -> i64 {
        let height = self
            .viewport_height
            .unwrap_or(crate::grid::window::DEFAULT_CONTAINER_HEIGHT) as i64;
        (height / self.row_height().max(1) as i64).max(1)
    }

    /// Keep the cursor row inside the viewport, moving the scroll offset the
    /// minimal distance.
    fn ensure_cursor_row_visible(&mut self) {
        if !self.virtual_scroll {
            return;
        }
        let row_height = self.row_height() as i64;
        let viewport = self
            .viewport_height
            .unwrap_or(crate::grid::window::DEFAULT_CONTAINER_HEIGHT) as i64;

        let row_top = self.cursor_row as i64 * row_height;
        let row_bottom = row_top + row_height;

        if row_top < self.scroll_top {
            self.scroll_top = row_top;
        } else if row_bottom > self.scroll_top + viewport {
            self.scroll_top = row_bottom - viewport;
        }
        self.clamp_scroll();
    }

    fn clamp_cursor(&mut self) {
        self.cursor_row = self
            .cursor_row
            .min(self.view_rows.len().saturating_sub(1));
        self.cursor_col = self
            .cursor_col
            .min(self.visible_columns().len().saturating_sub(1));
    }

    // --- row interaction --------------------------------------------------

    pub fn row_click(&mut self, view_idx: usize) {
        let Some(key) = self.key_at(view_idx).cloned() else {
            return;
        };
        self.cursor_row = view_idx.min(self.view_rows.len().saturating_sub(1));
        if let Some(cb) = self.callbacks.on_row_click.as_mut() {
            cb(&key);
        }
    }

    // --- data replacement -------------------------------------------------

    /// Swap in a new source table. The sort configuration is kept and
    /// re-applied; selection and expansion reconcile against the new key set
    /// under `StaleKeys::Prune`, or are kept verbatim under `Retain`.
    pub fn set_table(&mut self, table: Arc<DataTable>) {
        self.table = table;
        self.rebuild_keys();
        self.apply_sort();
        self.clamp_scroll();
        self.clamp_cursor();

        if self.stale_keys == StaleKeys::Prune {
            let live: HashSet<RowKey> = self.row_keys.iter().cloned().collect();
            let before = self.selection.len();
            self.selection.reconcile(&live);
            self.expanded.retain(|key| live.contains(key));
            if self.selection.len() != before {
                self.notify_selection();
            }
        }
    }

    /// Derive row identity from the key column. A missing key column falls
    /// back to the row's source index; duplicates are tolerated but logged,
    /// since duplicate keys share selection and edit identity.
    fn rebuild_keys(&mut self) {
        let key_idx = self.table.column_index(&self.key_column);
        if key_idx.is_none() {
            warn!(
                "key column {:?} not found; falling back to row indices",
                self.key_column
            );
        }

        self.row_keys = self
            .table
            .rows
            .iter()
            .enumerate()
            .map(|(row_idx, row)| match key_idx.and_then(|i| row.get(i)) {
                Some(value) => RowKey::from(value),
                None => RowKey::new(row_idx.to_string()),
            })
            .collect();

        let mut seen = HashSet::new();
        for key in &self.row_keys {
            if !seen.insert(key) {
                warn!("duplicate row key {:?}; rows will share identity", key);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::{DataRow, SourceColumn};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn trades() -> Arc<DataTable> {
        let mut table = DataTable::new("trades");
        table.add_column(SourceColumn::new("id"));
        table.add_column(SourceColumn::new("amount"));
        for (id, amount) in [("r1", 30), ("r2", 10), ("r3", 20)] {
            table
                .add_row(DataRow::new(vec![
                    CellValue::String(id.into()),
                    CellValue::Integer(amount),
                ]))
                .unwrap();
        }
        Arc::new(table)
    }

    fn grid() -> GridState {
        GridState::new(
            trades(),
            vec![ColumnSpec::new("id"), ColumnSpec::new("amount")],
            "id",
        )
    }

    #[test]
    fn header_clicks_cycle_and_notify() {
        let observed = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&observed);

        let mut grid = grid();
        grid.callbacks.on_sort = Some(Box::new(move |col, dir| {
            sink.borrow_mut().push((col.to_string(), dir));
        }));

        grid.click_header("amount");
        assert_eq!(
            grid.view_rows()
                .iter()
                .map(|&i| grid.table().value(i, 1).unwrap().to_string())
                .collect::<Vec<_>>(),
            vec!["10", "20", "30"]
        );

        grid.click_header("amount");
        grid.click_header("amount");
        assert_eq!(grid.view_rows(), &[0, 1, 2]);

        let observed = observed.borrow();
        assert_eq!(
            *observed,
            vec![
                ("amount".to_string(), SortDirection::Ascending),
                ("amount".to_string(), SortDirection::Descending),
                ("amount".to_string(), SortDirection::None),
            ]
        );
    }

    #[test]
    fn selection_survives_resort() {
        let mut grid = grid();
        grid.toggle_row_selection(1); // r2
        assert!(grid.selection.is_selected(&RowKey::new("r2")));

        grid.click_header("amount");
        assert_eq!(grid.selection.to_vec(), vec![RowKey::new("r2")]);
        // r2 now sits at view position 0 (amount 10), still selected
        assert_eq!(grid.key_at(0), Some(&RowKey::new("r2")));
    }

    #[test]
    fn commit_edit_fires_hook_once_with_typed_value() {
        let edits = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&edits);

        let mut grid = GridState::new(
            trades(),
            vec![
                ColumnSpec::new("id"),
                ColumnSpec::new("amount").editable(crate::grid::column::EditType::Number),
            ],
            "id",
        );
        grid.callbacks.on_cell_edit = Some(Box::new(move |key, col, value| {
            sink.borrow_mut()
                .push((key.clone(), col.to_string(), value.clone()));
        }));

        assert!(grid.start_edit(0, "amount"));
        grid.edit.set_buffer("99");
        assert!(grid.commit_edit());
        assert!(!grid.commit_edit());

        let edits = edits.borrow();
        assert_eq!(edits.len(), 1);
        assert_eq!(
            edits[0],
            (RowKey::new("r1"), "amount".to_string(), CellValue::Integer(99))
        );
    }

    #[test]
    fn non_editable_column_refuses_edit() {
        let mut grid = grid();
        assert!(!grid.start_edit(0, "amount"));
        assert!(!grid.start_edit(0, "missing"));
    }

    #[test]
    fn set_table_prunes_stale_keys_by_default() {
        let mut grid = grid();
        grid.toggle_row_selection(0); // r1
        grid.toggle_row_selection(1); // r2

        let mut smaller = DataTable::new("trades");
        smaller.add_column(SourceColumn::new("id"));
        smaller.add_column(SourceColumn::new("amount"));
        smaller
            .add_row(DataRow::new(vec![
                CellValue::String("r2".into()),
                CellValue::Integer(5),
            ]))
            .unwrap();

        grid.set_table(Arc::new(smaller));
        assert_eq!(grid.selection.to_vec(), vec![RowKey::new("r2")]);
    }

    #[test]
    fn set_table_retains_keys_when_configured() {
        let mut grid = GridState::new(
            trades(),
            vec![ColumnSpec::new("id"), ColumnSpec::new("amount")],
            "id",
        )
        .with_stale_keys(StaleKeys::Retain);
        grid.toggle_row_selection(0);

        grid.set_table(Arc::new({
            let mut t = DataTable::new("empty");
            t.add_column(SourceColumn::new("id"));
            t.add_column(SourceColumn::new("amount"));
            t
        }));
        assert_eq!(grid.selection.to_vec(), vec![RowKey::new("r1")]);
    }

    #[test]
    fn select_all_covers_only_the_window_when_virtual() {
        let mut table = DataTable::new("big");
        table.add_column(SourceColumn::new("id"));
        for i in 0..100 {
            table
                .add_row(DataRow::new(vec![CellValue::String(format!("r{}", i))]))
                .unwrap();
        }

        let mut grid = GridState::new(Arc::new(table), vec![ColumnSpec::new("id")], "id")
            .with_virtual_scroll(true)
            .with_overscan(0)
            .with_row_height(44);
        grid.set_viewport_height(440); // exactly 10 rows

        grid.select_all_toggle();
        assert_eq!(grid.selection.len(), 10);
        for i in 0..10 {
            assert!(grid.selection.is_selected(&RowKey::new(format!("r{}", i))));
        }

        grid.select_all_toggle();
        assert!(grid.selection.is_empty());
    }
}
