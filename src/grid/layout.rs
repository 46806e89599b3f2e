use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

use crate::grid::column::{ColumnSpec, Pin, DEFAULT_WIDTH};
use crate::grid::pointer::{CaptureRegistry, PointerGrab};

/// An in-flight drag-resize: the column under the handle, where the pointer
/// started, and the width it started from. Holds the global pointer capture
/// for as long as the drag lives.
#[derive(Debug)]
struct ResizeSession {
    column_id: String,
    start_x: i32,
    start_width: u16,
    _grab: PointerGrab,
}

/// Client-local column layout: width, display order, and visibility for each
/// column, all independently mutable and none of it persisted. Data never
/// moves, only the column array over it.
#[derive(Debug, Default)]
pub struct ColumnLayout {
    /// Column ids in display order (pinning is applied on top of this).
    order: Vec<String>,
    widths: HashMap<String, u16>,
    hidden: HashSet<String>,
    /// Column id being drag-reordered, if any.
    dragging: Option<String>,
    resize: Option<ResizeSession>,
    captures: CaptureRegistry,
}

impl ColumnLayout {
    /// Seed order, widths, and visibility from the caller's column array.
    pub fn new(columns: &[ColumnSpec]) -> Self {
        let mut layout = Self {
            captures: CaptureRegistry::new(),
            ..Self::default()
        };
        layout.reset(columns);
        layout
    }

    /// Restore the originally-supplied layout: declared order, declared
    /// widths (150 when unspecified), declared hidden flags. Any active drag
    /// or resize is abandoned.
    pub fn reset(&mut self, columns: &[ColumnSpec]) {
        self.order = columns.iter().map(|c| c.id.clone()).collect();
        self.widths = columns
            .iter()
            .map(|c| (c.id.clone(), if c.width == 0 { DEFAULT_WIDTH } else { c.width }))
            .collect();
        self.hidden = columns
            .iter()
            .filter(|c| c.hidden)
            .map(|c| c.id.clone())
            .collect();
        self.dragging = None;
        self.resize = None;
    }

    pub fn width(&self, column_id: &str) -> u16 {
        self.widths.get(column_id).copied().unwrap_or(DEFAULT_WIDTH)
    }

    pub fn is_hidden(&self, column_id: &str) -> bool {
        self.hidden.contains(column_id)
    }

    /// Flip one column's visibility. Hidden columns are excluded from header
    /// and body rendering and from total-width computation, but keep their
    /// position in the order for when they come back.
    pub fn toggle_hidden(&mut self, column_id: &str) {
        if !self.order.iter().any(|id| id == column_id) {
            return;
        }
        if !self.hidden.remove(column_id) {
            self.hidden.insert(column_id.to_string());
        }
    }

    /// Display order with hidden columns filtered out and pinning applied:
    /// left-pinned columns first, then unpinned, then right-pinned, each
    /// group keeping its relative order.
    pub fn visible_order<'a>(&'a self, columns: &'a [ColumnSpec]) -> Vec<&'a str> {
        let pin_of = |id: &str| {
            columns
                .iter()
                .find(|c| c.id == id)
                .and_then(|c| c.pinned)
        };

        let visible: Vec<&str> = self
            .order
            .iter()
            .map(String::as_str)
            .filter(|id| !self.hidden.contains(*id))
            .collect();

        let mut ordered = Vec::with_capacity(visible.len());
        ordered.extend(visible.iter().copied().filter(|id| pin_of(id) == Some(Pin::Left)));
        ordered.extend(visible.iter().copied().filter(|id| pin_of(id).is_none()));
        ordered.extend(visible.iter().copied().filter(|id| pin_of(id) == Some(Pin::Right)));
        ordered
    }

    /// Sum of visible column widths.
    pub fn total_width(&self, columns: &[ColumnSpec]) -> u32 {
        self.visible_order(columns)
            .iter()
            .map(|id| self.width(id) as u32)
            .sum()
    }

    // --- drag reorder -----------------------------------------------------

    pub fn begin_drag(&mut self, column_id: &str) {
        if self.order.iter().any(|id| id == column_id) {
            self.dragging = Some(column_id.to_string());
        }
    }

    pub fn dragging(&self) -> Option<&str> {
        self.dragging.as_deref()
    }

    /// Dragging column A over column B moves A out of its slot and reinserts
    /// it at B's position. A move, not a swap, matching what a user expects
    /// from dragging a header sideways.
    pub fn drag_over(&mut self, target_id: &str) {
        let Some(dragged) = self.dragging.clone() else {
            return;
        };
        if dragged == target_id {
            return;
        }

        let (Some(from), Some(to)) = (
            self.order.iter().position(|id| *id == dragged),
            self.order.iter().position(|id| id == target_id),
        ) else {
            return;
        };

        let moved = self.order.remove(from);
        trace!("column {} moved to position {}", moved, to);
        self.order.insert(to, moved);
    }

    pub fn end_drag(&mut self) {
        self.dragging = None;
    }

    /// Keyboard reorder: move a column one slot toward the front.
    pub fn move_left(&mut self, column_id: &str) -> bool {
        match self.order.iter().position(|id| id == column_id) {
            Some(pos) if pos > 0 => {
                self.order.swap(pos - 1, pos);
                true
            }
            _ => false,
        }
    }

    /// Keyboard reorder: move a column one slot toward the back.
    pub fn move_right(&mut self, column_id: &str) -> bool {
        match self.order.iter().position(|id| id == column_id) {
            Some(pos) if pos + 1 < self.order.len() => {
                self.order.swap(pos, pos + 1);
                true
            }
            _ => false,
        }
    }

    // --- drag resize ------------------------------------------------------

    /// Start a drag-resize from a pointer position. Takes the global pointer
    /// capture; a session already in flight is replaced (its capture drops
    /// first).
    pub fn begin_resize(&mut self, column: &ColumnSpec, pointer_x: i32) {
        if !column.resizable {
            return;
        }
        let start_width = self.width(&column.id);
        self.resize = Some(ResizeSession {
            column_id: column.id.clone(),
            start_x: pointer_x,
            start_width,
            _grab: self.captures.grab(),
        });
        debug!("resize of {} started at width {}", column.id, start_width);
    }

    pub fn resizing(&self) -> Option<&str> {
        self.resize.as_ref().map(|s| s.column_id.as_str())
    }

    /// Track the pointer during an active resize. The new width is the start
    /// width plus pointer travel, clamped to the column's bounds.
    pub fn resize_to(&mut self, column: &ColumnSpec, pointer_x: i32) {
        let Some(session) = &self.resize else {
            return;
        };
        if session.column_id != column.id {
            return;
        }

        let delta = pointer_x - session.start_x;
        let unclamped = session.start_width as i32 + delta;
        let clamped = unclamped.clamp(column.min_width as i32, column.max_width as i32) as u16;
        self.widths.insert(column.id.clone(), clamped);
    }

    /// End the drag; releases the pointer capture.
    pub fn end_resize(&mut self) {
        if let Some(session) = self.resize.take() {
            debug!(
                "resize of {} finished at width {}",
                session.column_id,
                self.width(&session.column_id)
            );
        }
    }

    /// Programmatic resize (keyboard +/-), same clamping as the drag path.
    pub fn adjust_width(&mut self, column: &ColumnSpec, delta: i32) {
        if !column.resizable {
            return;
        }
        let current = self.width(&column.id) as i32;
        let clamped = (current + delta).clamp(column.min_width as i32, column.max_width as i32);
        self.widths.insert(column.id.clone(), clamped as u16);
    }

    /// Active global pointer captures; the drag-leak regression check.
    pub fn active_captures(&self) -> usize {
        self.captures.active_count()
    }
}
