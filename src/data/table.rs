use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::data::value::{CellType, CellValue};

/// Storage-level column: name plus statistics gathered from the data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceColumn {
    pub name: String,
    pub cell_type: CellType,
    pub nullable: bool,
    pub null_count: usize,
}

impl SourceColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cell_type: CellType::String,
            nullable: true,
            null_count: 0,
        }
    }

    pub fn with_type(mut self, cell_type: CellType) -> Self {
        self.cell_type = cell_type;
        self
    }
}

/// One row of cells, positionally matched to the table's columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataRow {
    pub cells: Vec<CellValue>,
}

impl DataRow {
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// In-memory table: the grid's single source of row data. The grid itself
/// never mutates it; edits flow back to the caller through callbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataTable {
    pub name: String,
    pub columns: Vec<SourceColumn>,
    pub rows: Vec<DataRow>,
    pub metadata: HashMap<String, String>,
}

impl DataTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn add_column(&mut self, column: SourceColumn) -> &mut Self {
        self.columns.push(column);
        self
    }

    pub fn add_row(&mut self, row: DataRow) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(anyhow!(
                "row has {} cells but table has {} columns",
                row.len(),
                self.columns.len()
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn value(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row)?.get(col)
    }

    pub fn value_by_name(&self, row: usize, col_name: &str) -> Option<&CellValue> {
        let col_idx = self.column_index(col_name)?;
        self.value(row, col_idx)
    }

    /// Scan the data and update per-column type and null statistics.
    pub fn infer_column_types(&mut self) {
        for (col_idx, column) in self.columns.iter_mut().enumerate() {
            let mut inferred = CellType::Null;
            let mut null_count = 0;

            for row in &self.rows {
                if let Some(value) = row.get(col_idx) {
                    if value.is_null() {
                        null_count += 1;
                    } else {
                        inferred = inferred.merge(&value.cell_type());
                    }
                }
            }

            column.cell_type = inferred;
            column.null_count = null_count;
            column.nullable = null_count > 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_and_read_back() {
        let mut table = DataTable::new("people");
        table.add_column(SourceColumn::new("id").with_type(CellType::Integer));
        table.add_column(SourceColumn::new("name"));

        table
            .add_row(DataRow::new(vec![
                CellValue::Integer(1),
                CellValue::String("Alice".into()),
            ]))
            .unwrap();

        assert_eq!(table.row_count(), 1);
        assert_eq!(table.column_count(), 2);
        assert_eq!(
            table.value_by_name(0, "name"),
            Some(&CellValue::String("Alice".into()))
        );
    }

    #[test]
    fn ragged_row_is_rejected() {
        let mut table = DataTable::new("t");
        table.add_column(SourceColumn::new("a"));
        table.add_column(SourceColumn::new("b"));

        let err = table.add_row(DataRow::new(vec![CellValue::Integer(1)]));
        assert!(err.is_err());
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn type_inference_widens_and_counts_nulls() {
        let mut table = DataTable::new("t");
        table.add_column(SourceColumn::new("mixed"));

        table.add_row(DataRow::new(vec![CellValue::Integer(1)])).unwrap();
        table.add_row(DataRow::new(vec![CellValue::Float(2.5)])).unwrap();
        table.add_row(DataRow::new(vec![CellValue::Null])).unwrap();

        table.infer_column_types();

        assert_eq!(table.columns[0].cell_type, CellType::Float);
        assert_eq!(table.columns[0].null_count, 1);
        assert!(table.columns[0].nullable);
    }
}
