use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
};

use crate::data::table::{DataRow, DataTable};
use crate::grid::column::Align;
use crate::grid::sort::SortDirection;
use crate::grid::GridState;

/// Logical width units per terminal cell. Column widths and resize math run
/// in logical units (default column width 150, bounds 50..500); the renderer
/// maps them onto terminal columns at this scale.
pub const LOGICAL_UNITS_PER_CELL: u16 = 8;

/// Narrowest and widest a column renders on screen, in terminal cells.
const MIN_CELLS: u16 = 4;
const MAX_CELLS: u16 = 60;

/// One rendered column: id plus its on-screen x range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSlot {
    pub column_id: String,
    pub x: u16,
    pub width: u16,
}

impl ColumnSlot {
    pub fn contains(&self, x: u16) -> bool {
        x >= self.x && x < self.x + self.width
    }

    /// The resize handle is the column's last cell (the separator).
    pub fn handle_at(&self, x: u16) -> bool {
        self.width > 0 && x == self.x + self.width - 1
    }
}

/// Where everything landed on screen last frame: the hit-testing map for
/// mouse input. Row entries pair a terminal line with the view index drawn
/// on it (expanded detail lines are absent from the map on purpose).
#[derive(Debug, Clone, Default)]
pub struct GridGeometry {
    pub area: Rect,
    pub header_y: u16,
    pub body_top: u16,
    pub columns: Vec<ColumnSlot>,
    pub rows: Vec<(u16, usize)>,
    /// x of the selection marker, when the grid is selectable.
    pub select_x: Option<u16>,
    /// x of the expand marker, when the grid is expandable.
    pub expand_x: Option<u16>,
}

impl GridGeometry {
    pub fn column_at(&self, x: u16) -> Option<&ColumnSlot> {
        self.columns.iter().find(|slot| slot.contains(x))
    }

    pub fn resize_handle_at(&self, x: u16) -> Option<&ColumnSlot> {
        self.columns.iter().find(|slot| slot.handle_at(x))
    }

    pub fn view_row_at(&self, y: u16) -> Option<usize> {
        self.rows
            .iter()
            .find(|(row_y, _)| *row_y == y)
            .map(|(_, idx)| *idx)
    }

    pub fn is_header(&self, y: u16) -> bool {
        y == self.header_y
    }

    /// Terminal x converted to logical units, for the resize engine.
    pub fn logical_x(x: u16) -> i32 {
        x as i32 * LOGICAL_UNITS_PER_CELL as i32
    }
}

/// Styling for the grid. Defaults follow the usual terminal table look:
/// bold yellow headers, reversed selection bar, dim stripes.
#[derive(Debug, Clone)]
pub struct GridTheme {
    pub header: Style,
    pub row: Style,
    pub alt_row: Style,
    pub selected: Style,
    pub crosshair: Style,
    pub null_cell: Style,
    pub editing: Style,
    pub detail: Style,
    pub footer: Style,
    pub dragged: Style,
}

impl Default for GridTheme {
    fn default() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            row: Style::default(),
            alt_row: Style::default().bg(Color::Rgb(24, 24, 28)),
            selected: Style::default().bg(Color::Rgb(30, 50, 80)),
            crosshair: Style::default().add_modifier(Modifier::REVERSED),
            null_cell: Style::default().fg(Color::DarkGray),
            editing: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan),
            detail: Style::default().fg(Color::Gray),
            footer: Style::default().fg(Color::DarkGray),
            dragged: Style::default().add_modifier(Modifier::DIM),
        }
    }
}

/// Renders a `GridState` into a terminal rect, materializing only the rows of
/// the current viewport window. Layout math lives in `geometry`, shared with
/// mouse hit-testing.
pub struct GridWidget<'a> {
    pub theme: &'a GridTheme,
    pub loading: bool,
    pub empty_message: &'a str,
    pub show_row_numbers: bool,
    pub use_glyphs: bool,
    pub selectable: bool,
    pub expandable: bool,
    pub expanded_detail: Option<&'a dyn Fn(&DataTable, &DataRow) -> String>,
}

impl<'a> GridWidget<'a> {
    pub fn new(theme: &'a GridTheme) -> Self {
        Self {
            theme,
            loading: false,
            empty_message: "No data available",
            show_row_numbers: false,
            use_glyphs: true,
            selectable: true,
            expandable: false,
            expanded_detail: None,
        }
    }

    pub fn loading(mut self, yes: bool) -> Self {
        self.loading = yes;
        self
    }

    pub fn empty_message(mut self, msg: &'a str) -> Self {
        self.empty_message = msg;
        self
    }

    pub fn show_row_numbers(mut self, yes: bool) -> Self {
        self.show_row_numbers = yes;
        self
    }

    pub fn use_glyphs(mut self, yes: bool) -> Self {
        self.use_glyphs = yes;
        self
    }

    pub fn expandable(mut self, detail: &'a dyn Fn(&DataTable, &DataRow) -> String) -> Self {
        self.expandable = true;
        self.expanded_detail = Some(detail);
        self
    }

    fn gutter_width(&self) -> u16 {
        let mut w = 0;
        if self.show_row_numbers {
            w += 6;
        }
        if self.selectable {
            w += 2;
        }
        if self.expandable {
            w += 2;
        }
        w
    }

    /// Compute the frame layout for the current grid state without drawing.
    pub fn geometry(&self, area: Rect, grid: &GridState) -> GridGeometry {
        let mut geo = GridGeometry {
            area,
            header_y: area.y,
            body_top: area.y + 2,
            ..GridGeometry::default()
        };
        if area.height < 4 || area.width < 8 {
            return geo;
        }

        let mut marker_x = area.x + if self.show_row_numbers { 6 } else { 0 };
        if self.selectable {
            geo.select_x = Some(marker_x);
            marker_x += 2;
        }
        if self.expandable {
            geo.expand_x = Some(marker_x);
        }

        // Column slots, left to right, as many as fit
        let mut x = area.x + self.gutter_width();
        let right = area.x + area.width;
        for column in grid.visible_columns() {
            if x >= right {
                break;
            }
            let logical = grid.layout.width(&column.id);
            let cells =
                (logical / LOGICAL_UNITS_PER_CELL).clamp(MIN_CELLS, MAX_CELLS).min(right - x);
            geo.columns.push(ColumnSlot {
                column_id: column.id.clone(),
                x,
                width: cells,
            });
            x += cells;
        }

        // Row map: window slice flowing down the body, expanded details
        // taking a line of their own
        let body_lines = area.height - 3; // header, separator, footer
        let window = grid.window();
        let mut y = geo.body_top;
        let body_bottom = geo.body_top + body_lines;
        let mut view_idx = window.start_index;
        while view_idx < window.end_index && y < body_bottom {
            geo.rows.push((y, view_idx));
            y += 1;
            if self.expandable && y < body_bottom {
                if let Some(key) = grid.key_at(view_idx) {
                    if grid.is_expanded(key) {
                        y += 1; // detail line
                    }
                }
            }
            view_idx += 1;
        }

        geo
    }

    /// Draw the grid. Updates the grid's viewport height from the area so
    /// the window computation and what is on screen stay in lockstep.
    pub fn render(&self, area: Rect, buf: &mut Buffer, grid: &mut GridState) -> GridGeometry {
        if area.height < 4 || area.width < 8 {
            return GridGeometry::default();
        }

        let body_lines = (area.height - 3) as u32;
        grid.set_viewport_height(body_lines * grid.row_height());

        let geo = self.geometry(area, grid);
        self.render_header(buf, grid, &geo);
        self.render_separator(buf, &geo);

        if self.loading {
            self.render_notice(buf, &geo, "Loading...");
        } else if grid.row_count() == 0 {
            self.render_notice(buf, &geo, self.empty_message);
        } else {
            self.render_body(buf, grid, &geo);
        }

        self.render_footer(buf, grid, &geo);
        geo
    }

    fn render_header(&self, buf: &mut Buffer, grid: &GridState, geo: &GridGeometry) {
        let y = geo.header_y;
        buf.set_style(Rect::new(geo.area.x, y, geo.area.width, 1), self.theme.header);

        let mut x = geo.area.x;
        if self.show_row_numbers {
            buf.set_stringn(x, y, "    #", 6, self.theme.header);
            x += 6;
        }
        if self.selectable {
            let all = grid.selection.len() == grid.row_count() && grid.row_count() > 0;
            let mark = if all { self.check_glyph() } else { " " };
            buf.set_stringn(x, y, mark, 2, self.theme.header);
        }

        let (asc, desc) = if self.use_glyphs { ("▲", "▼") } else { ("^", "v") };
        for slot in &geo.columns {
            let Some(column) = grid.column(&slot.column_id) else {
                continue;
            };
            let mut label = column.header.clone();
            if grid.sort.column.as_deref() == Some(column.id.as_str()) {
                match grid.sort.direction {
                    SortDirection::Ascending => label.push_str(asc),
                    SortDirection::Descending => label.push_str(desc),
                    SortDirection::None => {}
                }
            }
            let style = if grid.layout.dragging() == Some(column.id.as_str()) {
                self.theme.header.patch(self.theme.dragged)
            } else {
                self.theme.header
            };
            let text = fit(&label, slot.width.saturating_sub(1) as usize, column.align);
            buf.set_stringn(slot.x, y, &text, slot.width.saturating_sub(1) as usize, style);
            if slot.width > 0 {
                // Rightmost cell doubles as the resize handle
                let handle = if grid.layout.resizing() == Some(column.id.as_str()) {
                    "┃"
                } else {
                    "│"
                };
                buf.set_stringn(slot.x + slot.width - 1, y, handle, 1, self.theme.footer);
            }
        }
    }

    fn render_separator(&self, buf: &mut Buffer, geo: &GridGeometry) {
        let y = geo.header_y + 1;
        let line = "─".repeat(geo.area.width as usize);
        buf.set_stringn(geo.area.x, y, &line, geo.area.width as usize, self.theme.footer);
    }

    fn render_body(&self, buf: &mut Buffer, grid: &GridState, geo: &GridGeometry) {
        let (cursor_row, cursor_col) = grid.cursor();

        for &(y, view_idx) in &geo.rows {
            let key = grid.key_at(view_idx).cloned();
            let is_selected = key
                .as_ref()
                .map(|k| grid.selection.is_selected(k))
                .unwrap_or(false);

            let base = if is_selected {
                self.theme.selected
            } else if view_idx % 2 == 1 {
                self.theme.alt_row
            } else {
                self.theme.row
            };
            buf.set_style(Rect::new(geo.area.x, y, geo.area.width, 1), base);

            let mut x = geo.area.x;
            if self.show_row_numbers {
                let text = format!("{:>5}", view_idx + 1);
                buf.set_stringn(x, y, &text, 5, self.theme.footer.patch(base));
                x += 6;
            }
            if self.selectable {
                let mark = if is_selected { self.check_glyph() } else { "·" };
                buf.set_stringn(x, y, mark, 2, base);
                x += 2;
            }
            if self.expandable {
                let expanded = key.as_ref().map(|k| grid.is_expanded(k)).unwrap_or(false);
                let mark = self.expand_glyph(expanded);
                buf.set_stringn(x, y, mark, 2, base);
            }

            for (col_idx, slot) in geo.columns.iter().enumerate() {
                let Some(column) = grid.column(&slot.column_id) else {
                    continue;
                };
                let width = slot.width.saturating_sub(1) as usize;

                let is_editing = key
                    .as_ref()
                    .map(|k| grid.edit.is_editing_cell(k, &column.id))
                    .unwrap_or(false);

                if is_editing {
                    let text = fit(grid.edit.buffer(), width, column.align);
                    buf.set_stringn(slot.x, y, &text, width, self.theme.editing);
                    continue;
                }

                let value = grid.cell_value(view_idx, column);
                let mut style = if value.is_null() {
                    self.theme.null_cell.patch(base)
                } else {
                    base
                };
                let text = match grid.row_at(view_idx) {
                    Some(row) => column.display_text(&value, row, view_idx),
                    None => String::new(),
                };
                if view_idx == cursor_row && col_idx == cursor_col {
                    style = style.patch(self.theme.crosshair);
                }
                let text = fit(&text, width, column.align);
                buf.set_stringn(slot.x, y, &text, width, style);
            }

            // Detail line under an expanded row
            if let (Some(detail), Some(key)) = (self.expanded_detail, key.as_ref()) {
                if grid.is_expanded(key) && y + 1 < geo.body_top + geo.area.height - 3 {
                    if let Some(row) = grid.row_at(view_idx) {
                        let text = detail(grid.table(), row);
                        let indent = self.gutter_width() as usize + 2;
                        let avail = (geo.area.width as usize).saturating_sub(indent);
                        let line = format!("{}{}", " ".repeat(indent), fit_left(&text, avail));
                        buf.set_stringn(
                            geo.area.x,
                            y + 1,
                            &line,
                            geo.area.width as usize,
                            self.theme.detail,
                        );
                    }
                }
            }
        }
    }

    fn render_notice(&self, buf: &mut Buffer, geo: &GridGeometry, message: &str) {
        let y = geo.body_top + (geo.area.height.saturating_sub(3)) / 2;
        let x = geo.area.x
            + (geo.area.width.saturating_sub(message.len() as u16)) / 2;
        buf.set_stringn(x, y, message, geo.area.width as usize, self.theme.footer);
    }

    fn render_footer(&self, buf: &mut Buffer, grid: &GridState, geo: &GridGeometry) {
        let y = geo.area.y + geo.area.height - 1;
        let window = grid.window();
        let total = grid.row_count();

        let mut text = if total == 0 {
            "0 rows".to_string()
        } else if grid.is_virtual() {
            format!(
                "Showing {}-{} of {} rows",
                window.start_index + 1,
                window.end_index.min(total),
                total
            )
        } else {
            format!("{} rows", total)
        };
        if !grid.selection.is_empty() {
            text.push_str(&format!("  ·  {} selected", grid.selection.len()));
        }
        text.push_str(&format!("  ·  {}", grid.density().display_name()));

        buf.set_stringn(geo.area.x, y, &text, geo.area.width as usize, self.theme.footer);
    }

    fn check_glyph(&self) -> &'static str {
        if self.use_glyphs {
            "✓"
        } else {
            "x"
        }
    }

    fn expand_glyph(&self, expanded: bool) -> &'static str {
        match (self.use_glyphs, expanded) {
            (true, true) => "▾",
            (true, false) => "▸",
            (false, true) => "v",
            (false, false) => ">",
        }
    }
}

/// Pad or truncate to an exact width with the column's alignment.
fn fit(text: &str, width: usize, align: Align) -> String {
    let truncated: String = text.chars().take(width).collect();
    let pad = width.saturating_sub(truncated.chars().count());
    match align {
        Align::Left => format!("{}{}", truncated, " ".repeat(pad)),
        Align::Right => format!("{}{}", " ".repeat(pad), truncated),
        Align::Center => {
            let left = pad / 2;
            format!(
                "{}{}{}",
                " ".repeat(left),
                truncated,
                " ".repeat(pad - left)
            )
        }
    }
}

fn fit_left(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}
