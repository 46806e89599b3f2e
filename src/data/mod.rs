pub mod compare;
pub mod loaders;
pub mod table;
pub mod value;

pub use table::{DataRow, DataTable, SourceColumn};
pub use value::{CellType, CellValue};
