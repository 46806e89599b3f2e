use std::fmt;
use std::sync::Arc;

use crate::data::table::{DataRow, DataTable};
use crate::data::value::CellValue;

/// Default logical column width when the caller declares none.
pub const DEFAULT_WIDTH: u16 = 150;
/// Default resize bounds.
pub const DEFAULT_MIN_WIDTH: u16 = 50;
pub const DEFAULT_MAX_WIDTH: u16 = 500;

/// Horizontal cell alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Pinning intent: pinned columns stay at the edge of the grid while the rest
/// scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pin {
    Left,
    Right,
}

/// Which inline editor a column gets when editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditType {
    #[default]
    Text,
    Number,
    Select,
    Date,
}

/// One choice in a select-style editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOption {
    pub value: String,
    pub label: String,
}

impl EditOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// How a column pulls its value out of a row: either a named source column or
/// a caller-supplied derivation over the whole row.
#[derive(Clone)]
pub enum Accessor {
    Field(String),
    Derived(Arc<dyn Fn(&DataRow) -> CellValue + Send + Sync>),
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Accessor::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

/// Caller-supplied cell renderer: turns a resolved value (plus its row and
/// view position) into the text the grid displays. The grid shows whatever
/// comes back without interpreting it.
#[derive(Clone)]
pub struct CellFormatter(pub Arc<dyn Fn(&CellValue, &DataRow, usize) -> String + Send + Sync>);

impl fmt::Debug for CellFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CellFormatter(..)")
    }
}

/// Display-level column descriptor. The set of column ids supplied to a grid
/// is fixed for its lifetime; only order, width, and visibility change.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub id: String,
    pub header: String,
    pub accessor: Accessor,
    pub width: u16,
    pub min_width: u16,
    pub max_width: u16,
    pub align: Align,
    pub sortable: bool,
    pub resizable: bool,
    pub editable: bool,
    pub hidden: bool,
    pub pinned: Option<Pin>,
    pub edit_type: EditType,
    pub edit_options: Vec<EditOption>,
    pub formatter: Option<CellFormatter>,
}

impl ColumnSpec {
    /// A column whose id doubles as the source field name and header text.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            header: id.clone(),
            accessor: Accessor::Field(id.clone()),
            id,
            width: DEFAULT_WIDTH,
            min_width: DEFAULT_MIN_WIDTH,
            max_width: DEFAULT_MAX_WIDTH,
            align: Align::Left,
            sortable: true,
            resizable: true,
            editable: false,
            hidden: false,
            pinned: None,
            edit_type: EditType::Text,
            edit_options: Vec::new(),
            formatter: None,
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn with_accessor(mut self, accessor: Accessor) -> Self {
        self.accessor = accessor;
        self
    }

    pub fn derived<F>(mut self, f: F) -> Self
    where
        F: Fn(&DataRow) -> CellValue + Send + Sync + 'static,
    {
        self.accessor = Accessor::Derived(Arc::new(f));
        self
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    pub fn with_width_bounds(mut self, min: u16, max: u16) -> Self {
        self.min_width = min;
        self.max_width = max;
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn sortable(mut self, yes: bool) -> Self {
        self.sortable = yes;
        self
    }

    pub fn resizable(mut self, yes: bool) -> Self {
        self.resizable = yes;
        self
    }

    pub fn editable(mut self, edit_type: EditType) -> Self {
        self.editable = true;
        self.edit_type = edit_type;
        self
    }

    pub fn with_edit_options(mut self, options: Vec<EditOption>) -> Self {
        self.edit_options = options;
        self
    }

    pub fn hidden(mut self, yes: bool) -> Self {
        self.hidden = yes;
        self
    }

    pub fn pinned(mut self, pin: Pin) -> Self {
        self.pinned = Some(pin);
        self
    }

    pub fn with_formatter<F>(mut self, f: F) -> Self
    where
        F: Fn(&CellValue, &DataRow, usize) -> String + Send + Sync + 'static,
    {
        self.formatter = Some(CellFormatter(Arc::new(f)));
        self
    }

    /// Text for a cell: the formatter's output when one is supplied,
    /// otherwise the value's display form with nulls as "-".
    pub fn display_text(&self, value: &CellValue, row: &DataRow, view_idx: usize) -> String {
        match &self.formatter {
            Some(CellFormatter(f)) => f(value, row, view_idx),
            None if value.is_null() => "-".to_string(),
            None => value.to_string(),
        }
    }

    /// Resolve this column's value for a row. A field accessor that names an
    /// unknown source column degrades to Null so one bad descriptor never
    /// breaks the rest of the render.
    pub fn value_for(&self, table: &DataTable, row: &DataRow) -> CellValue {
        match &self.accessor {
            Accessor::Field(name) => table
                .column_index(name)
                .and_then(|idx| row.get(idx))
                .cloned()
                .unwrap_or(CellValue::Null),
            Accessor::Derived(f) => f(row),
        }
    }
}

/// Check a column set for duplicate ids; returns the first duplicate found.
pub fn find_duplicate_id(columns: &[ColumnSpec]) -> Option<&str> {
    let mut seen = std::collections::HashSet::new();
    columns
        .iter()
        .find(|c| !seen.insert(c.id.as_str()))
        .map(|c| c.id.as_str())
}
