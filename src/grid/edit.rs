use tracing::debug;

use crate::data::value::CellValue;
use crate::grid::column::EditType;
use crate::grid::RowKey;

/// What happens when `start_edit` is called while another cell is mid-edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditPolicy {
    /// Silently abandon the pending buffer (no commit callback fires). This
    /// is the historical behavior; the discard is deliberate and documented,
    /// not a bug.
    #[default]
    DiscardPending,
    /// Refuse the new edit until the pending one is committed or cancelled.
    Block,
}

/// Identity of the cell currently being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditingCell {
    pub row_key: RowKey,
    pub column_id: String,
}

/// Tracks the single in-flight inline edit: which cell, and the buffered text
/// the editor is accumulating. Never touches the source rows: a commit only
/// hands the buffered value back to the caller.
#[derive(Debug, Default)]
pub struct EditController {
    editing: Option<EditingCell>,
    buffer: String,
    policy: EditPolicy,
}

impl EditController {
    pub fn new(policy: EditPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn editing(&self) -> Option<&EditingCell> {
        self.editing.as_ref()
    }

    pub fn is_editing_cell(&self, row_key: &RowKey, column_id: &str) -> bool {
        self.editing
            .as_ref()
            .is_some_and(|e| &e.row_key == row_key && e.column_id == column_id)
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn set_buffer(&mut self, value: impl Into<String>) {
        self.buffer = value.into();
    }

    /// Begin editing a cell, seeding the buffer from its current value.
    /// Returns false if a pending edit blocks the request.
    pub fn start_edit(&mut self, row_key: RowKey, column_id: &str, current: &CellValue) -> bool {
        if let Some(pending) = &self.editing {
            match self.policy {
                EditPolicy::Block => {
                    debug!(
                        "edit of {}/{} blocked by pending edit of {}/{}",
                        row_key, column_id, pending.row_key, pending.column_id
                    );
                    return false;
                }
                EditPolicy::DiscardPending => {
                    debug!(
                        "discarding pending edit of {}/{}",
                        pending.row_key, pending.column_id
                    );
                }
            }
        }

        self.buffer = current.to_string();
        self.editing = Some(EditingCell {
            row_key,
            column_id: column_id.to_string(),
        });
        true
    }

    /// Finish the edit, yielding the cell identity and buffered text for the
    /// caller to deliver. Clears the cursor. Returns None when nothing was
    /// being edited.
    pub fn commit(&mut self) -> Option<(EditingCell, String)> {
        let cell = self.editing.take()?;
        let buffer = std::mem::take(&mut self.buffer);
        Some((cell, buffer))
    }

    /// Abandon the edit; the buffered value is discarded and no callback-worthy
    /// result is produced.
    pub fn cancel(&mut self) {
        self.editing = None;
        self.buffer.clear();
    }
}

/// Coerce a committed buffer back to a typed value according to the column's
/// editor kind. This is coercion, not validation: unparseable numbers fall
/// back to the raw text, and the caller applies any domain rules.
pub fn parse_edit_value(buffer: &str, edit_type: EditType) -> CellValue {
    if buffer.is_empty() {
        return CellValue::Null;
    }

    match edit_type {
        EditType::Number => buffer
            .parse::<i64>()
            .map(CellValue::Integer)
            .or_else(|_| buffer.parse::<f64>().map(CellValue::Float))
            .unwrap_or_else(|_| CellValue::String(buffer.to_string())),
        EditType::Date => CellValue::DateTime(buffer.to_string()),
        EditType::Text | EditType::Select => CellValue::String(buffer.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> RowKey {
        RowKey::new(s)
    }

    #[test]
    fn commit_yields_buffer_once_and_clears() {
        let mut edit = EditController::default();
        assert!(edit.start_edit(key("r1"), "name", &CellValue::String("old".into())));
        edit.set_buffer("new");

        let (cell, buffer) = edit.commit().unwrap();
        assert_eq!(cell.row_key, key("r1"));
        assert_eq!(cell.column_id, "name");
        assert_eq!(buffer, "new");

        assert!(edit.commit().is_none());
        assert!(edit.editing().is_none());
    }

    #[test]
    fn cancel_discards_without_result() {
        let mut edit = EditController::default();
        edit.start_edit(key("r1"), "name", &CellValue::String("old".into()));
        edit.set_buffer("new");
        edit.cancel();

        assert!(edit.editing().is_none());
        assert!(edit.commit().is_none());
    }

    #[test]
    fn discard_pending_policy_replaces_the_edit() {
        let mut edit = EditController::new(EditPolicy::DiscardPending);
        edit.start_edit(key("r1"), "name", &CellValue::String("a".into()));
        edit.set_buffer("unsaved");

        assert!(edit.start_edit(key("r2"), "qty", &CellValue::Integer(7)));
        assert!(edit.is_editing_cell(&key("r2"), "qty"));
        assert_eq!(edit.buffer(), "7");
    }

    #[test]
    fn block_policy_refuses_a_second_edit() {
        let mut edit = EditController::new(EditPolicy::Block);
        edit.start_edit(key("r1"), "name", &CellValue::String("a".into()));

        assert!(!edit.start_edit(key("r2"), "qty", &CellValue::Integer(7)));
        assert!(edit.is_editing_cell(&key("r1"), "name"));

        edit.cancel();
        assert!(edit.start_edit(key("r2"), "qty", &CellValue::Integer(7)));
    }

    #[test]
    fn buffers_parse_by_editor_kind() {
        assert_eq!(parse_edit_value("42", EditType::Number), CellValue::Integer(42));
        assert_eq!(parse_edit_value("2.5", EditType::Number), CellValue::Float(2.5));
        assert_eq!(
            parse_edit_value("abc", EditType::Number),
            CellValue::String("abc".into())
        );
        assert_eq!(
            parse_edit_value("2024-05-01", EditType::Date),
            CellValue::DateTime("2024-05-01".into())
        );
        assert_eq!(parse_edit_value("", EditType::Text), CellValue::Null);
    }
}
