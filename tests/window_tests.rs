use std::sync::Arc;

use datagrid::data::table::{DataRow, DataTable, SourceColumn};
use datagrid::data::value::CellValue;
use datagrid::grid::column::ColumnSpec;
use datagrid::grid::window::{compute_window, Density, ViewportWindow};
use datagrid::grid::GridState;

#[test]
fn window_arithmetic_matches_the_contract() {
    // rowHeight 44, container 500, overscan 5, 1000 rows, scrolled to 4400
    let w = compute_window(4400, Some(500), 44, 5, 1000);

    assert_eq!(w.start_index, 95);
    assert_eq!(w.offset_y, 4180);
    assert_eq!(w.total_height, 44_000);

    let visible = (500f64 / 44f64).ceil() as usize + 2 * 5;
    assert_eq!(w.end_index, 95 + visible);
}

#[test]
fn overscan_expands_the_slice_on_both_sides() {
    let none = compute_window(4400, Some(500), 44, 0, 1000);
    let some = compute_window(4400, Some(500), 44, 5, 1000);

    assert_eq!(none.start_index, some.start_index + 5);
    assert_eq!(some.len(), none.len() + 10);
}

#[test]
fn clamping_never_panics_on_malformed_input() {
    // Negative scroll
    let w = compute_window(-500, Some(500), 44, 5, 100);
    assert_eq!(w.start_index, 0);

    // Scroll far past the end
    let w = compute_window(10_000_000, Some(500), 44, 5, 100);
    assert!(w.end_index <= 100);
    assert!(w.start_index <= w.end_index);

    // Degenerate row height
    let w = compute_window(100, Some(500), 0, 0, 50);
    assert!(w.end_index <= 50);

    // Empty data
    let w = compute_window(0, Some(500), 44, 5, 0);
    assert_eq!(w, ViewportWindow::default());
}

#[test]
fn missing_container_height_falls_back_to_default() {
    let w = compute_window(0, None, 50, 0, 1000);
    // 500 / 50 = 10 rows
    assert_eq!(w.end_index, 10);
}

#[test]
fn grid_materializes_only_the_window() {
    let mut table = DataTable::new("t");
    table.add_column(SourceColumn::new("id"));
    for i in 0..1000 {
        table
            .add_row(DataRow::new(vec![CellValue::Integer(i)]))
            .unwrap();
    }

    let mut grid = GridState::new(Arc::new(table), vec![ColumnSpec::new("id")], "id")
        .with_virtual_scroll(true)
        .with_overscan(5)
        .with_row_height(44);
    grid.set_viewport_height(500);
    grid.scroll_to(4400);

    let w = grid.window();
    assert_eq!(w.start_index, 95);
    assert_eq!(w.offset_y, 4180);

    // Scrolling recomputes synchronously
    grid.scroll_by(440);
    assert_eq!(grid.window().start_index, 105);
}

#[test]
fn scroll_clamps_to_the_content_height() {
    let mut table = DataTable::new("t");
    table.add_column(SourceColumn::new("id"));
    for i in 0..20 {
        table
            .add_row(DataRow::new(vec![CellValue::Integer(i)]))
            .unwrap();
    }

    let mut grid = GridState::new(Arc::new(table), vec![ColumnSpec::new("id")], "id")
        .with_virtual_scroll(true)
        .with_row_height(44);
    grid.set_viewport_height(440);

    grid.scroll_to(-100);
    assert_eq!(grid.scroll_top(), 0);

    grid.scroll_to(1_000_000);
    assert_eq!(grid.scroll_top(), 20 * 44 - 440);
}

#[test]
fn virtualization_off_materializes_everything() {
    let mut table = DataTable::new("t");
    table.add_column(SourceColumn::new("id"));
    for i in 0..50 {
        table
            .add_row(DataRow::new(vec![CellValue::Integer(i)]))
            .unwrap();
    }

    let grid = GridState::new(Arc::new(table), vec![ColumnSpec::new("id")], "id");
    let w = grid.window();
    assert_eq!(w.start_index, 0);
    assert_eq!(w.end_index, 50);
    assert_eq!(w.offset_y, 0);
}

#[test]
fn density_presets_drive_row_height() {
    let mut table = DataTable::new("t");
    table.add_column(SourceColumn::new("id"));
    table
        .add_row(DataRow::new(vec![CellValue::Integer(1)]))
        .unwrap();

    let mut grid = GridState::new(Arc::new(table), vec![ColumnSpec::new("id")], "id");
    assert_eq!(grid.row_height(), 44);

    grid.set_density(Density::Compact);
    assert_eq!(grid.row_height(), 32);
    grid.set_density(Density::Comfortable);
    assert_eq!(grid.row_height(), 56);

    // Explicit override wins over the preset
    let grid = GridState::new(
        {
            let mut t = DataTable::new("t");
            t.add_column(SourceColumn::new("id"));
            Arc::new(t)
        },
        vec![ColumnSpec::new("id")],
        "id",
    )
    .with_row_height(20);
    assert_eq!(grid.row_height(), 20);
}
