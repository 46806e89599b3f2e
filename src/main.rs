use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::cell::RefCell;
use std::io::stdout;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use datagrid::config::Config;
use datagrid::data::loaders::{load_csv_to_table, load_json_to_table};
use datagrid::data::table::{DataRow, DataTable};
use datagrid::data::value::{CellType, CellValue};
use datagrid::grid::column::{Align, ColumnSpec, EditType};
use datagrid::grid::window::Density;
use datagrid::grid::{GridState, RowKey};
use datagrid::ui::grid_widget::LOGICAL_UNITS_PER_CELL;
use datagrid::ui::{map_key, CellEditor, EditorOutcome, GridAction, GridGeometry, GridTheme, GridWidget, MouseTracker};

struct CliArgs {
    path: String,
    key_column: Option<String>,
    density: Option<Density>,
    virtual_scroll: Option<bool>,
    row_height: Option<u32>,
}

fn print_usage() {
    eprintln!("Usage: datagrid <file.csv|file.json> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --key <column>        column whose values identify rows (default: first column)");
    eprintln!("  --density <preset>    compact | normal | comfortable");
    eprintln!("  --row-height <n>      override the row height in logical units");
    eprintln!("  --no-virtual          materialize every row instead of windowing");
    eprintln!();
    eprintln!("Keys: arrows/hjkl move, s sort, space select, ctrl-a select all,");
    eprintln!("      x expand, Enter edit, H hide column, </> reorder, +/- resize,");
    eprintln!("      r reset layout, d density, y yank cell, q quit");
}

fn parse_args() -> Result<CliArgs> {
    let mut args = std::env::args().skip(1);
    let mut parsed = CliArgs {
        path: String::new(),
        key_column: None,
        density: None,
        virtual_scroll: None,
        row_height: None,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--key" => parsed.key_column = Some(args.next().context("--key needs a value")?),
            "--density" => {
                let value = args.next().context("--density needs a value")?;
                parsed.density = Some(match value.as_str() {
                    "compact" => Density::Compact,
                    "normal" => Density::Normal,
                    "comfortable" => Density::Comfortable,
                    other => bail!("unknown density preset: {}", other),
                });
            }
            "--row-height" => {
                let value = args.next().context("--row-height needs a value")?;
                parsed.row_height = Some(value.parse().context("--row-height must be a number")?);
            }
            "--no-virtual" => parsed.virtual_scroll = Some(false),
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other if parsed.path.is_empty() => parsed.path = other.to_string(),
            other => bail!("unexpected argument: {}", other),
        }
    }

    if parsed.path.is_empty() {
        print_usage();
        bail!("no data file given");
    }
    Ok(parsed)
}

fn load_data_file(path: &str) -> Result<DataTable> {
    let p = Path::new(path);
    let name = p
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("data")
        .to_string();

    match p.extension().and_then(|e| e.to_str()) {
        Some("csv") => load_csv_to_table(p, &name),
        Some("json") => load_json_to_table(p, &name),
        _ => bail!("unsupported file type (expected .csv or .json): {}", path),
    }
}

/// Build display columns from the loaded schema: numbers right-aligned with a
/// number editor, dates with a date editor, everything else a text editor.
fn columns_from_schema(table: &DataTable) -> Vec<ColumnSpec> {
    table
        .columns
        .iter()
        .map(|source| {
            let spec = ColumnSpec::new(&source.name);
            match source.cell_type {
                CellType::Integer | CellType::Float => spec
                    .with_align(Align::Right)
                    .editable(EditType::Number),
                CellType::DateTime => spec.editable(EditType::Date),
                _ => spec.editable(EditType::Text),
            }
        })
        .collect()
}

fn row_detail(table: &DataTable, row: &DataRow) -> String {
    table
        .columns
        .iter()
        .zip(&row.cells)
        .map(|(col, cell)| format!("{}: {}", col.name, cell))
        .collect::<Vec<_>>()
        .join("  ·  ")
}

struct App {
    grid: GridState,
    key_column: String,
    theme: GridTheme,
    tracker: MouseTracker,
    geometry: GridGeometry,
    editor: Option<CellEditor>,
    pending_edits: Rc<RefCell<Vec<(RowKey, String, CellValue)>>>,
    clipboard: Option<arboard::Clipboard>,
    status: String,
    show_row_numbers: bool,
    use_glyphs: bool,
    should_quit: bool,
}

impl App {
    fn new(args: CliArgs, config: &Config) -> Result<Self> {
        let table = load_data_file(&args.path)?;
        let key_column = args
            .key_column
            .or_else(|| table.columns.first().map(|c| c.name.clone()))
            .context("table has no columns")?;

        let columns = columns_from_schema(&table);
        let mut grid = GridState::new(Arc::new(table), columns, &key_column)
            .with_virtual_scroll(args.virtual_scroll.unwrap_or(config.behavior.virtual_scroll))
            .with_overscan(config.behavior.overscan)
            .with_density(args.density.unwrap_or_else(|| config.density()))
            .with_edit_policy(config.edit_policy())
            .with_stale_keys(config.stale_keys());
        if let Some(height) = args.row_height {
            grid = grid.with_row_height(height);
        }

        let pending_edits: Rc<RefCell<Vec<(RowKey, String, CellValue)>>> =
            Rc::new(RefCell::new(Vec::new()));
        let edit_sink = Rc::clone(&pending_edits);
        grid.callbacks.on_cell_edit = Some(Box::new(move |key, column_id, value| {
            edit_sink
                .borrow_mut()
                .push((key.clone(), column_id.to_string(), value.clone()));
        }));
        grid.callbacks.on_sort = Some(Box::new(|column, direction| {
            info!("sorted by {} {:?}", column, direction);
        }));
        grid.callbacks.on_selection_change = Some(Box::new(|keys| {
            info!("selection changed: {} rows", keys.len());
        }));

        Ok(Self {
            grid,
            key_column,
            theme: GridTheme::default(),
            tracker: MouseTracker::new(),
            geometry: GridGeometry::default(),
            editor: None,
            pending_edits,
            clipboard: arboard::Clipboard::new().ok(),
            status: String::new(),
            show_row_numbers: config.display.show_row_numbers,
            use_glyphs: config.display.use_glyphs,
            should_quit: false,
        })
    }

    fn apply_action(&mut self, action: GridAction) {
        let grid = &mut self.grid;
        match action {
            GridAction::MoveUp => grid.move_cursor_vertical(-1),
            GridAction::MoveDown => grid.move_cursor_vertical(1),
            GridAction::MoveLeft => grid.move_cursor_horizontal(-1),
            GridAction::MoveRight => grid.move_cursor_horizontal(1),
            GridAction::PageUp => {
                let page = grid.page_size_rows();
                grid.move_cursor_vertical(-page);
            }
            GridAction::PageDown => {
                let page = grid.page_size_rows();
                grid.move_cursor_vertical(page);
            }
            GridAction::FirstRow => grid.cursor_to_first_row(),
            GridAction::LastRow => grid.cursor_to_last_row(),
            GridAction::ScrollBy(dy) => grid.scroll_by(dy),

            GridAction::ToggleSelect => {
                let (row, _) = grid.cursor();
                grid.toggle_row_selection(row);
            }
            GridAction::SelectAllVisible => grid.select_all_toggle(),
            GridAction::ClearSelection => grid.clear_selection(),

            GridAction::ToggleExpand => {
                let (row, _) = grid.cursor();
                grid.toggle_expanded(row);
            }

            GridAction::SortCurrentColumn => {
                if let Some(id) = grid.cursor_column().map(|c| c.id.clone()) {
                    grid.click_header(&id);
                }
            }
            GridAction::ClickHeader(id) => grid.click_header(&id),

            GridAction::HideCurrentColumn => {
                if let Some(id) = grid.cursor_column().map(|c| c.id.clone()) {
                    grid.toggle_column_hidden(&id);
                    self.status = format!("hid column {}", id);
                }
            }
            GridAction::MoveColumnLeft => {
                if let Some(id) = grid.cursor_column().map(|c| c.id.clone()) {
                    grid.layout.move_left(&id);
                }
            }
            GridAction::MoveColumnRight => {
                if let Some(id) = grid.cursor_column().map(|c| c.id.clone()) {
                    grid.layout.move_right(&id);
                }
            }
            GridAction::WidenColumn => self.adjust_current_column(LOGICAL_UNITS_PER_CELL as i32),
            GridAction::NarrowColumn => {
                self.adjust_current_column(-(LOGICAL_UNITS_PER_CELL as i32))
            }
            GridAction::ResetLayout => {
                grid.reset_layout();
                self.status = "layout reset".to_string();
            }

            GridAction::BeginResize { column_id, pointer_x } => {
                grid.begin_column_resize(&column_id, pointer_x);
            }
            GridAction::ResizeTo { pointer_x } => grid.update_column_resize(pointer_x),
            GridAction::EndResize => grid.end_column_resize(),
            GridAction::DragHeaderOver { dragged, target } => {
                if grid.layout.dragging() != Some(dragged.as_str()) {
                    grid.layout.begin_drag(&dragged);
                }
                grid.layout.drag_over(&target);
            }
            GridAction::EndDrag => grid.layout.end_drag(),

            GridAction::BeginEdit => self.begin_edit(),
            GridAction::ClickRow { view_idx } => grid.row_click(view_idx),

            GridAction::CycleDensity => {
                let density = grid.cycle_density();
                self.status = format!("density: {}", density.display_name());
            }
            GridAction::YankCell => self.yank(false),
            GridAction::YankRow => self.yank(true),
            GridAction::Quit => self.should_quit = true,
        }
    }

    fn adjust_current_column(&mut self, delta: i32) {
        if let Some(column) = self.grid.cursor_column().cloned() {
            self.grid.layout.adjust_width(&column, delta);
        }
    }

    fn begin_edit(&mut self) {
        let (row, _) = self.grid.cursor();
        let Some(column) = self.grid.cursor_column().cloned() else {
            return;
        };
        if self.grid.start_edit(row, &column.id) {
            self.editor = Some(CellEditor::for_column(&column, self.grid.edit.buffer()));
        } else if !column.editable {
            self.status = format!("column {} is not editable", column.id);
        } else {
            self.status = "finish the current edit first".to_string();
        }
    }

    fn handle_editor_key(&mut self, key: crossterm::event::KeyEvent) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        let outcome = editor.handle_key(key);
        self.grid.edit.set_buffer(editor.value());
        match outcome {
            EditorOutcome::Continue => {}
            EditorOutcome::Commit => {
                self.grid.commit_edit();
                self.editor = None;
            }
            EditorOutcome::Cancel => {
                self.grid.cancel_edit();
                self.editor = None;
            }
        }
    }

    /// Deliver committed edits back into the demo's own copy of the table.
    /// The grid never mutates rows itself; this is the caller's half of the
    /// contract, and it exercises data replacement and key reconciliation.
    fn apply_pending_edits(&mut self) {
        let edits: Vec<_> = self.pending_edits.borrow_mut().drain(..).collect();
        if edits.is_empty() {
            return;
        }

        let mut table = self.grid.table().clone();
        let Some(key_idx) = table.column_index(&self.key_column) else {
            return;
        };
        for (key, column_id, value) in edits {
            let Some(col_idx) = table.column_index(&column_id) else {
                continue;
            };
            let row_idx = table
                .rows
                .iter()
                .position(|row| row.get(key_idx).map(RowKey::from).as_ref() == Some(&key));
            if let Some(r) = row_idx {
                table.rows[r].cells[col_idx] = value;
                self.status = format!("updated {}/{}", key, column_id);
            }
        }
        self.grid.set_table(Arc::new(table));
    }

    fn yank(&mut self, whole_row: bool) {
        let (row, _) = self.grid.cursor();
        let text = if whole_row {
            self.grid
                .row_at(row)
                .map(|r| {
                    r.cells
                        .iter()
                        .map(|c| c.to_string())
                        .collect::<Vec<_>>()
                        .join("\t")
                })
                .unwrap_or_default()
        } else {
            self.grid
                .cursor_column()
                .map(|col| self.grid.cell_value(row, col).to_string())
                .unwrap_or_default()
        };

        match self.clipboard.as_mut() {
            Some(clipboard) => match clipboard.set_text(text) {
                Ok(()) => self.status = "yanked".to_string(),
                Err(e) => self.status = format!("clipboard error: {}", e),
            },
            None => self.status = "clipboard unavailable".to_string(),
        }
    }
}

fn main() -> Result<()> {
    let args = parse_args()?;
    let log_path = datagrid::logging::init_logging()?;
    let config = Config::load();

    let mut app = App::new(args, &config)?;
    if let Some(path) = log_path {
        info!("logging to {:?}", path);
    }

    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            if area.height < 2 {
                return;
            }
            let grid_area = Rect::new(area.x, area.y, area.width, area.height - 1);
            let status_area = Rect::new(area.x, area.y + area.height - 1, area.width, 1);

            let widget = GridWidget::new(&app.theme)
                .show_row_numbers(app.show_row_numbers)
                .use_glyphs(app.use_glyphs)
                .expandable(&row_detail);
            app.geometry = widget.render(grid_area, frame.buffer_mut(), &mut app.grid);

            // Editor overlay on the cursor cell, when visible
            if let Some(editor) = &app.editor {
                let (row, col) = app.grid.cursor();
                let cell_rect = app
                    .geometry
                    .rows
                    .iter()
                    .find(|(_, idx)| *idx == row)
                    .and_then(|&(y, _)| {
                        app.geometry.columns.get(col).map(|slot| {
                            Rect::new(slot.x, y, slot.width.saturating_sub(1).max(1), 1)
                        })
                    });
                if let Some(rect) = cell_rect {
                    editor.render(rect, frame.buffer_mut());
                }
            }

            let status = if app.status.is_empty() {
                "q quit · s sort · space select · Enter edit · ? see --help".to_string()
            } else {
                app.status.clone()
            };
            frame
                .buffer_mut()
                .set_stringn(status_area.x, status_area.y, &status, status_area.width as usize, app.theme.footer);
        })?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.editor.is_some() {
                        app.handle_editor_key(key);
                    } else if let Some(action) = map_key(key) {
                        app.status.clear();
                        app.apply_action(action);
                    }
                }
                Event::Mouse(mouse) => {
                    let resizing = app.grid.layout.resizing().is_some();
                    let row_height = app.grid.row_height();
                    let geometry = app.geometry.clone();
                    let actions = app.tracker.handle(mouse, &geometry, resizing, row_height);
                    for action in actions {
                        app.apply_action(action);
                    }
                }
                _ => {}
            }
        }

        app.apply_pending_edits();

        if app.should_quit {
            return Ok(());
        }
    }
}
