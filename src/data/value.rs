use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical type of a grid column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellType {
    String,
    Integer,
    Float,
    Boolean,
    DateTime,
    Null,
    Mixed,
}

impl CellType {
    /// Infer the type of a raw text value (CSV fields, untyped JSON strings).
    pub fn infer_from_str(value: &str) -> Self {
        if value.is_empty() || value.eq_ignore_ascii_case("null") {
            return CellType::Null;
        }

        if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
            return CellType::Boolean;
        }

        if value.parse::<i64>().is_ok() {
            return CellType::Integer;
        }

        if value.parse::<f64>().is_ok() {
            return CellType::Float;
        }

        // Date-ish heuristic: ISO dates carry dashes, times carry colons
        if (value.contains('-') && value.len() >= 8) || (value.contains(':') && value.len() >= 5) {
            return CellType::DateTime;
        }

        CellType::String
    }

    /// Combine with another observed type when scanning a column.
    pub fn merge(&self, other: &CellType) -> CellType {
        if self == other {
            return self.clone();
        }

        match (self, other) {
            (CellType::Null, t) | (t, CellType::Null) => t.clone(),
            (CellType::Integer, CellType::Float) | (CellType::Float, CellType::Integer) => {
                CellType::Float
            }
            _ => CellType::Mixed,
        }
    }
}

/// A single cell value.
///
/// DateTime values are kept as their ISO-8601 text form; ordering on the text
/// matches chronological ordering for that format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(String),
    Null,
}

impl CellValue {
    /// Parse a raw text value according to a column type. Values that fail to
    /// parse fall back to `String` rather than erroring, so one bad field
    /// never poisons a load.
    pub fn parse_str(s: &str, cell_type: &CellType) -> Self {
        if s.is_empty() || s.eq_ignore_ascii_case("null") {
            return CellValue::Null;
        }

        match cell_type {
            CellType::String => CellValue::String(s.to_string()),
            CellType::Integer => s
                .parse::<i64>()
                .map(CellValue::Integer)
                .unwrap_or_else(|_| CellValue::String(s.to_string())),
            CellType::Float => s
                .parse::<f64>()
                .map(CellValue::Float)
                .unwrap_or_else(|_| CellValue::String(s.to_string())),
            CellType::Boolean => {
                let lower = s.to_lowercase();
                CellValue::Boolean(lower == "true" || lower == "1" || lower == "yes")
            }
            CellType::DateTime => CellValue::DateTime(s.to_string()),
            CellType::Null => CellValue::Null,
            CellType::Mixed => {
                let inferred = CellType::infer_from_str(s);
                Self::parse_str(s, &inferred)
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn cell_type(&self) -> CellType {
        match self {
            CellValue::String(_) => CellType::String,
            CellValue::Integer(_) => CellType::Integer,
            CellValue::Float(_) => CellType::Float,
            CellValue::Boolean(_) => CellType::Boolean,
            CellValue::DateTime(_) => CellType::DateTime,
            CellValue::Null => CellType::Null,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{}", s),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(fl) => write!(f, "{}", fl),
            CellValue::Boolean(b) => write!(f, "{}", b),
            CellValue::DateTime(dt) => write!(f, "{}", dt),
            CellValue::Null => write!(f, ""),
        }
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => CellValue::Null,
            serde_json::Value::Bool(b) => CellValue::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CellValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    CellValue::Float(f)
                } else {
                    CellValue::String(n.to_string())
                }
            }
            serde_json::Value::String(s) => {
                if s.contains('-') && s.len() >= 8 && s.len() <= 30 {
                    CellValue::DateTime(s)
                } else {
                    CellValue::String(s)
                }
            }
            // Nested structures are stored as their JSON text
            other => CellValue::String(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_basic_types() {
        assert_eq!(CellType::infer_from_str("123"), CellType::Integer);
        assert_eq!(CellType::infer_from_str("123.45"), CellType::Float);
        assert_eq!(CellType::infer_from_str("true"), CellType::Boolean);
        assert_eq!(CellType::infer_from_str("hello"), CellType::String);
        assert_eq!(CellType::infer_from_str(""), CellType::Null);
        assert_eq!(CellType::infer_from_str("2024-01-01"), CellType::DateTime);
    }

    #[test]
    fn merge_widens_numeric() {
        assert_eq!(
            CellType::Integer.merge(&CellType::Float),
            CellType::Float
        );
        assert_eq!(CellType::Null.merge(&CellType::Integer), CellType::Integer);
        assert_eq!(CellType::Boolean.merge(&CellType::String), CellType::Mixed);
    }

    #[test]
    fn parse_falls_back_to_string() {
        assert_eq!(
            CellValue::parse_str("abc", &CellType::Integer),
            CellValue::String("abc".to_string())
        );
        assert_eq!(CellValue::parse_str("", &CellType::Integer), CellValue::Null);
        assert_eq!(
            CellValue::parse_str("42", &CellType::Integer),
            CellValue::Integer(42)
        );
    }
}
