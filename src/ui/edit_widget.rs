use crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::grid::column::{ColumnSpec, EditType};

/// What a key press did to the active cell editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorOutcome {
    /// Still editing; the buffer may have changed.
    Continue,
    /// Enter: the caller should commit the buffered value.
    Commit,
    /// Escape: the caller should discard the buffer.
    Cancel,
}

/// The focused inline editor for one cell. Text, number, and date columns get
/// a tui-input line editor; select columns get an option list driven by the
/// arrow keys. The editor owns the in-progress text; the grid's edit buffer
/// is synced from here after every key.
#[derive(Debug)]
pub struct CellEditor {
    input: Input,
    edit_type: EditType,
    options: Vec<String>,
    option_labels: Vec<String>,
    option_idx: usize,
}

impl CellEditor {
    /// Build an editor for a column, seeded with the cell's current text.
    pub fn for_column(column: &ColumnSpec, initial: &str) -> Self {
        let options: Vec<String> = column
            .edit_options
            .iter()
            .map(|o| o.value.clone())
            .collect();
        let option_labels = column
            .edit_options
            .iter()
            .map(|o| o.label.clone())
            .collect();
        let option_idx = options
            .iter()
            .position(|v| v == initial)
            .unwrap_or(0);

        Self {
            input: Input::new(initial.to_string()).with_cursor(initial.len()),
            edit_type: column.edit_type,
            options,
            option_labels,
            option_idx,
        }
    }

    /// The value a commit would produce right now.
    pub fn value(&self) -> String {
        if self.edit_type == EditType::Select && !self.options.is_empty() {
            self.options[self.option_idx].clone()
        } else {
            self.input.value().to_string()
        }
    }

    /// Feed one key press. Enter commits, Escape cancels; everything else
    /// edits the buffer or moves the select highlight.
    pub fn handle_key(&mut self, key: KeyEvent) -> EditorOutcome {
        match key.code {
            KeyCode::Enter => return EditorOutcome::Commit,
            KeyCode::Esc => return EditorOutcome::Cancel,
            _ => {}
        }

        if self.edit_type == EditType::Select {
            match key.code {
                KeyCode::Up | KeyCode::Left => {
                    if self.option_idx > 0 {
                        self.option_idx -= 1;
                    }
                }
                KeyCode::Down | KeyCode::Right => {
                    if self.option_idx + 1 < self.options.len() {
                        self.option_idx += 1;
                    }
                }
                _ => {}
            }
            return EditorOutcome::Continue;
        }

        self.input.handle_event(&Event::Key(key));
        EditorOutcome::Continue
    }

    /// Draw the editor over a cell rect.
    pub fn render(&self, rect: Rect, buf: &mut Buffer) {
        if rect.width == 0 || rect.height == 0 {
            return;
        }

        let style = Style::default().fg(Color::Black).bg(Color::Cyan);
        buf.set_style(rect, style);

        if self.edit_type == EditType::Select {
            let label = self
                .option_labels
                .get(self.option_idx)
                .map(String::as_str)
                .unwrap_or("");
            let text = format!("‹{}›", label);
            buf.set_stringn(rect.x, rect.y, &text, rect.width as usize, style);
            return;
        }

        // Keep the cursor in view on narrow cells
        let width = rect.width as usize;
        let scroll = self.input.visual_scroll(width.saturating_sub(1));
        let text: String = self.input.value().chars().skip(scroll).collect();
        buf.set_stringn(rect.x, rect.y, &text, width, style);

        let cursor_x = rect.x + (self.input.visual_cursor().saturating_sub(scroll)) as u16;
        if cursor_x < rect.x + rect.width {
            buf.set_style(
                Rect::new(cursor_x, rect.y, 1, 1),
                style.add_modifier(Modifier::REVERSED),
            );
        }
    }
}
