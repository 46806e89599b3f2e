use std::sync::Arc;

use datagrid::data::table::{DataRow, DataTable, SourceColumn};
use datagrid::data::value::CellValue;
use datagrid::grid::column::{ColumnSpec, Pin};
use datagrid::grid::layout::ColumnLayout;
use datagrid::grid::GridState;

fn specs(ids: &[&str]) -> Vec<ColumnSpec> {
    ids.iter().map(|id| ColumnSpec::new(*id)).collect()
}

fn grid_with_columns(columns: Vec<ColumnSpec>) -> GridState {
    let mut table = DataTable::new("t");
    for spec in &columns {
        table.add_column(SourceColumn::new(&spec.id));
    }
    table
        .add_row(DataRow::new(
            columns.iter().map(|_| CellValue::Integer(0)).collect(),
        ))
        .unwrap();
    let key = columns[0].id.clone();
    GridState::new(Arc::new(table), columns, &key)
}

#[test]
fn drag_reorder_moves_rather_than_swaps() {
    let columns = specs(&["A", "B", "C", "D"]);
    let mut layout = ColumnLayout::new(&columns);

    layout.begin_drag("A");
    layout.drag_over("C");
    layout.end_drag();

    assert_eq!(layout.visible_order(&columns), vec!["B", "C", "A", "D"]);
}

#[test]
fn resize_clamps_at_both_bounds() {
    let column = ColumnSpec::new("v").with_width(150).with_width_bounds(50, 500);
    let mut grid = grid_with_columns(vec![column]);

    // Drag the handle 1000 units to the right
    grid.begin_column_resize("v", 100);
    grid.update_column_resize(1100);
    grid.end_column_resize();
    assert_eq!(grid.layout.width("v"), 500);

    // Fresh drag 1000 units to the left
    grid.begin_column_resize("v", 100);
    grid.update_column_resize(-900);
    grid.end_column_resize();
    assert_eq!(grid.layout.width("v"), 50);
}

#[test]
fn pointer_capture_count_returns_to_baseline() {
    let mut grid = grid_with_columns(specs(&["a", "b"]));
    let baseline = grid.layout.active_captures();
    assert_eq!(baseline, 0);

    // mousedown, a run of mousemoves, mouseup
    grid.begin_column_resize("a", 0);
    assert_eq!(grid.layout.active_captures(), 1);
    for x in (8..80).step_by(8) {
        grid.update_column_resize(x);
    }
    grid.end_column_resize();

    assert_eq!(grid.layout.active_captures(), baseline);
}

#[test]
fn capture_released_even_when_a_drag_is_abandoned_for_another() {
    let mut grid = grid_with_columns(specs(&["a", "b"]));

    grid.begin_column_resize("a", 0);
    grid.begin_column_resize("b", 0);
    assert_eq!(grid.layout.active_captures(), 1);
    grid.end_column_resize();
    assert_eq!(grid.layout.active_captures(), 0);

    // Ending with no session in flight stays at baseline
    grid.end_column_resize();
    assert_eq!(grid.layout.active_captures(), 0);
}

#[test]
fn non_resizable_columns_ignore_the_handle() {
    let column = ColumnSpec::new("v").resizable(false);
    let mut grid = grid_with_columns(vec![column]);

    grid.begin_column_resize("v", 0);
    assert!(grid.layout.resizing().is_none());
    assert_eq!(grid.layout.active_captures(), 0);
    grid.update_column_resize(500);
    assert_eq!(grid.layout.width("v"), 150);
}

#[test]
fn hidden_columns_disappear_from_rendering_and_width() {
    let mut grid = grid_with_columns(specs(&["a", "b", "c"]));

    grid.toggle_column_hidden("b");
    let visible: Vec<&str> = grid.visible_columns().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(visible, vec!["a", "c"]);
    assert_eq!(grid.layout.total_width(grid.columns()), 300);

    grid.toggle_column_hidden("b");
    assert_eq!(grid.visible_columns().len(), 3);
}

#[test]
fn declared_hidden_flag_seeds_the_layout() {
    let columns = vec![
        ColumnSpec::new("a"),
        ColumnSpec::new("b").hidden(true),
    ];
    let grid = grid_with_columns(columns);
    let visible: Vec<&str> = grid.visible_columns().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(visible, vec!["a"]);
}

#[test]
fn pinned_columns_stay_at_the_edges() {
    let columns = vec![
        ColumnSpec::new("a"),
        ColumnSpec::new("actions").pinned(Pin::Right),
        ColumnSpec::new("id").pinned(Pin::Left),
        ColumnSpec::new("b"),
    ];
    let grid = grid_with_columns(columns);
    let visible: Vec<&str> = grid.visible_columns().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(visible, vec!["id", "a", "b", "actions"]);
}

#[test]
fn reset_restores_the_caller_supplied_layout() {
    let columns = vec![
        ColumnSpec::new("a").with_width(120),
        ColumnSpec::new("b"),
        ColumnSpec::new("c"),
    ];
    let mut grid = grid_with_columns(columns);

    grid.layout.begin_drag("c");
    grid.layout.drag_over("a");
    grid.layout.end_drag();
    grid.toggle_column_hidden("b");
    grid.begin_column_resize("a", 0);
    grid.update_column_resize(300);
    grid.end_column_resize();

    grid.reset_layout();

    let visible: Vec<&str> = grid.visible_columns().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(visible, vec!["a", "b", "c"]);
    assert_eq!(grid.layout.width("a"), 120);
    assert_eq!(grid.layout.active_captures(), 0);
}
