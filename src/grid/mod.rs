pub mod column;
pub mod edit;
pub mod layout;
pub mod pointer;
pub mod selection;
pub mod sort;
pub mod state;
pub mod window;

pub use column::{Accessor, Align, CellFormatter, ColumnSpec, EditOption, EditType, Pin};
pub use edit::{EditController, EditPolicy, EditingCell};
pub use layout::ColumnLayout;
pub use pointer::{CaptureRegistry, PointerGrab};
pub use selection::{SelectionTracker, StaleKeys};
pub use sort::{SortDirection, SortState};
pub use state::{GridCallbacks, GridState};
pub use window::{compute_window, Density, ViewportWindow};

use crate::data::value::CellValue;
use std::fmt;

/// Stable row identity, taken from the caller-chosen key column. Two rows with
/// the same key are the same row for selection, expansion, and edit purposes,
/// regardless of display position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey(String);

impl RowKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&CellValue> for RowKey {
    fn from(value: &CellValue) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
