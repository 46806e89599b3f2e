use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::ui::actions::GridAction;
use crate::ui::grid_widget::GridGeometry;

/// Map a key press to a grid action. Only called when no cell editor has
/// focus; the editor consumes keys first and commits/cancels itself.
pub fn map_key(key: KeyEvent) -> Option<GridAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('a') => Some(GridAction::SelectAllVisible),
            KeyCode::Char('c') => Some(GridAction::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(GridAction::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(GridAction::MoveDown),
        KeyCode::Left | KeyCode::Char('h') => Some(GridAction::MoveLeft),
        KeyCode::Right | KeyCode::Char('l') => Some(GridAction::MoveRight),
        KeyCode::PageUp => Some(GridAction::PageUp),
        KeyCode::PageDown => Some(GridAction::PageDown),
        KeyCode::Home | KeyCode::Char('g') => Some(GridAction::FirstRow),
        KeyCode::End | KeyCode::Char('G') => Some(GridAction::LastRow),

        KeyCode::Char(' ') => Some(GridAction::ToggleSelect),
        KeyCode::Esc => Some(GridAction::ClearSelection),
        KeyCode::Char('x') => Some(GridAction::ToggleExpand),

        KeyCode::Char('s') => Some(GridAction::SortCurrentColumn),

        KeyCode::Char('H') => Some(GridAction::HideCurrentColumn),
        KeyCode::Char('<') => Some(GridAction::MoveColumnLeft),
        KeyCode::Char('>') => Some(GridAction::MoveColumnRight),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(GridAction::WidenColumn),
        KeyCode::Char('-') => Some(GridAction::NarrowColumn),
        KeyCode::Char('r') => Some(GridAction::ResetLayout),

        KeyCode::Enter | KeyCode::F(2) | KeyCode::Char('i') => Some(GridAction::BeginEdit),

        KeyCode::Char('d') => Some(GridAction::CycleDensity),
        KeyCode::Char('y') => Some(GridAction::YankCell),
        KeyCode::Char('Y') => Some(GridAction::YankRow),
        KeyCode::Char('q') => Some(GridAction::Quit),
        _ => None,
    }
}

/// Tracks the press-drag-release shape of header mouse gestures between
/// events: a press on a header is only a sort click if the pointer never
/// dragged onto another column before release.
#[derive(Debug, Default)]
pub struct MouseTracker {
    pressed_header: Option<String>,
    dragging: bool,
}

impl MouseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate a mouse event against the last rendered geometry.
    /// `resizing` reports whether the grid has an active resize session;
    /// while it does, every drag feeds the resize and release ends it (the
    /// capture keeps tracking even outside the header, which is the point).
    pub fn handle(
        &mut self,
        event: MouseEvent,
        geo: &GridGeometry,
        resizing: bool,
        row_height: u32,
    ) -> Vec<GridAction> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if geo.is_header(event.row) {
                    if let Some(slot) = geo.resize_handle_at(event.column) {
                        return vec![GridAction::BeginResize {
                            column_id: slot.column_id.clone(),
                            pointer_x: GridGeometry::logical_x(event.column),
                        }];
                    }
                    if let Some(slot) = geo.column_at(event.column) {
                        self.pressed_header = Some(slot.column_id.clone());
                    }
                    return Vec::new();
                }

                if let Some(view_idx) = geo.view_row_at(event.row) {
                    let mut actions = vec![GridAction::ClickRow { view_idx }];
                    if geo.select_x.is_some_and(|x| event.column >= x && event.column < x + 2) {
                        actions.push(GridAction::ToggleSelect);
                    } else if geo.expand_x.is_some_and(|x| event.column >= x && event.column < x + 2)
                    {
                        actions.push(GridAction::ToggleExpand);
                    }
                    return actions;
                }
                Vec::new()
            }

            MouseEventKind::Drag(MouseButton::Left) => {
                if resizing {
                    return vec![GridAction::ResizeTo {
                        pointer_x: GridGeometry::logical_x(event.column),
                    }];
                }
                if let Some(dragged) = self.pressed_header.clone() {
                    if let Some(slot) = geo.column_at(event.column) {
                        if slot.column_id != dragged {
                            self.dragging = true;
                            return vec![GridAction::DragHeaderOver {
                                dragged,
                                target: slot.column_id.clone(),
                            }];
                        }
                    }
                }
                Vec::new()
            }

            MouseEventKind::Up(MouseButton::Left) => {
                if resizing {
                    self.pressed_header = None;
                    return vec![GridAction::EndResize];
                }
                if self.dragging {
                    self.dragging = false;
                    self.pressed_header = None;
                    return vec![GridAction::EndDrag];
                }
                if let Some(pressed) = self.pressed_header.take() {
                    let released_on_same = geo.is_header(event.row)
                        && geo
                            .column_at(event.column)
                            .is_some_and(|slot| slot.column_id == pressed);
                    if released_on_same {
                        return vec![GridAction::ClickHeader(pressed)];
                    }
                }
                Vec::new()
            }

            MouseEventKind::ScrollDown => {
                vec![GridAction::ScrollBy(3 * row_height as i64)]
            }
            MouseEventKind::ScrollUp => {
                vec![GridAction::ScrollBy(-3 * row_height as i64)]
            }

            _ => Vec::new(),
        }
    }
}
