use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde_json::Value as JsonValue;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

use crate::data::table::{DataRow, DataTable, SourceColumn};
use crate::data::value::{CellType, CellValue};

/// Rows sampled per column when inferring CSV types.
const TYPE_SAMPLE_ROWS: usize = 100;

/// Load a CSV file (with a header row) into a DataTable.
pub fn load_csv_to_table<P: AsRef<Path>>(path: P, table_name: &str) -> Result<DataTable> {
    let file = File::open(&path)
        .with_context(|| format!("failed to open CSV file: {:?}", path.as_ref()))?;

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = reader.headers()?.clone();
    let mut table = DataTable::new(table_name);
    table
        .metadata
        .insert("source_path".to_string(), path.as_ref().display().to_string());

    for header in headers.iter() {
        table.add_column(SourceColumn::new(header));
    }

    let mut string_rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        string_rows.push(row);
    }

    // Infer column types from a sample before converting
    let mut column_types = vec![CellType::Null; headers.len()];
    for row in string_rows.iter().take(TYPE_SAMPLE_ROWS) {
        for (col_idx, value) in row.iter().enumerate() {
            if !value.is_empty() {
                let inferred = CellType::infer_from_str(value);
                column_types[col_idx] = column_types[col_idx].merge(&inferred);
            }
        }
    }
    for (col_idx, column) in table.columns.iter_mut().enumerate() {
        column.cell_type = column_types[col_idx].clone();
    }

    for string_row in string_rows {
        let cells = string_row
            .iter()
            .enumerate()
            .map(|(col_idx, value)| CellValue::parse_str(value, &column_types[col_idx]))
            .collect();
        table.add_row(DataRow::new(cells))?;
    }

    table.infer_column_types();

    debug!(
        "loaded CSV {:?}: {} rows, {} columns",
        path.as_ref(),
        table.row_count(),
        table.column_count()
    );

    Ok(table)
}

/// Load a JSON file holding an array of flat objects into a DataTable.
pub fn load_json_to_table<P: AsRef<Path>>(path: P, table_name: &str) -> Result<DataTable> {
    let file = File::open(&path)
        .with_context(|| format!("failed to open JSON file: {:?}", path.as_ref()))?;
    let reader = BufReader::new(file);

    let json_data: Vec<JsonValue> =
        serde_json::from_reader(reader).context("expected a JSON array of objects")?;

    let mut table = load_json_rows(json_data, table_name)?;
    table
        .metadata
        .insert("source_path".to_string(), path.as_ref().display().to_string());
    Ok(table)
}

/// Build a DataTable from already-parsed JSON rows. Column order follows the
/// first object's key order; keys missing from later objects become nulls.
pub fn load_json_rows(data: Vec<JsonValue>, table_name: &str) -> Result<DataTable> {
    let mut table = DataTable::new(table_name);

    if data.is_empty() {
        return Ok(table);
    }

    let first_keys: Option<Vec<String>> = data[0]
        .as_object()
        .map(|obj| obj.keys().cloned().collect());

    match first_keys {
        Some(keys) => {
            for key in keys {
                table.add_column(SourceColumn::new(key));
            }

            for json_row in data {
                let Some(row_obj) = json_row.as_object() else {
                    continue;
                };
                let cells = table
                    .columns
                    .iter()
                    .map(|column| {
                        row_obj
                            .get(&column.name)
                            .cloned()
                            .map(CellValue::from)
                            .unwrap_or(CellValue::Null)
                    })
                    .collect();
                table.add_row(DataRow::new(cells))?;
            }
        }
        None => {
            // Array of scalars: a single "value" column
            table.add_column(SourceColumn::new("value"));
            for json_value in data {
                table.add_row(DataRow::new(vec![CellValue::from(json_value)]))?;
            }
        }
    }

    table.infer_column_types();
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn csv_load_infers_types() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "id,name,amount").unwrap();
        writeln!(file, "1,Alice,10.5").unwrap();
        writeln!(file, "2,Bob,").unwrap();
        file.flush().unwrap();

        let table = load_csv_to_table(file.path(), "trades").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_names(), vec!["id", "name", "amount"]);
        assert_eq!(table.value_by_name(0, "id"), Some(&CellValue::Integer(1)));
        assert_eq!(table.value_by_name(1, "amount"), Some(&CellValue::Null));
        assert_eq!(table.columns[2].cell_type, CellType::Float);
    }

    #[test]
    fn json_rows_fill_missing_keys_with_null() {
        let table = load_json_rows(
            vec![
                json!({"id": 1, "name": "Alice"}),
                json!({"id": 2}),
            ],
            "t",
        )
        .unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.value_by_name(1, "name"), Some(&CellValue::Null));
    }

    #[test]
    fn json_scalar_array_becomes_value_column() {
        let table = load_json_rows(vec![json!(1), json!(2), json!(3)], "t").unwrap();
        assert_eq!(table.column_names(), vec!["value"]);
        assert_eq!(table.row_count(), 3);
    }
}
