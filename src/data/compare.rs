use crate::data::value::CellValue;
use std::cmp::Ordering;

/// Total order over cell values, used by the sort engine.
///
/// Same-type values compare naturally; integers and floats compare by numeric
/// value. Remaining cross-type pairs fall back to a fixed type rank so mixed
/// columns still sort deterministically:
/// Null < Boolean < Integer/Float < String < DateTime.
///
/// Null ordering here is the raw rank; the sort engine applies its own
/// nulls-last rule before consulting this function.
pub fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    use CellValue::*;

    match (a, b) {
        (Integer(a), Integer(b)) => a.cmp(b),
        (Float(a), Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (String(a), String(b)) => a.cmp(b),
        (Boolean(a), Boolean(b)) => a.cmp(b),
        (DateTime(a), DateTime(b)) => a.cmp(b),

        (Null, Null) => Ordering::Equal,
        (Null, _) => Ordering::Less,
        (_, Null) => Ordering::Greater,

        // Numeric values compare across the int/float divide
        (Integer(i), Float(f)) => (*i as f64).partial_cmp(f).unwrap_or(Ordering::Equal),
        (Float(f), Integer(i)) => f.partial_cmp(&(*i as f64)).unwrap_or(Ordering::Equal),

        (Boolean(_), _) => Ordering::Less,
        (_, Boolean(_)) => Ordering::Greater,

        (Integer(_) | Float(_), _) => Ordering::Less,
        (_, Integer(_) | Float(_)) => Ordering::Greater,

        (String(_), DateTime(_)) => Ordering::Less,
        (DateTime(_), String(_)) => Ordering::Greater,
    }
}

/// Compare possibly-missing cells; a missing cell sorts like Null.
pub fn compare_optional_cells(a: Option<&CellValue>, b: Option<&CellValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_cells(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_type_ordering() {
        assert_eq!(
            compare_cells(&CellValue::Integer(1), &CellValue::Integer(2)),
            Ordering::Less
        );
        assert_eq!(
            compare_cells(
                &CellValue::String("apple".into()),
                &CellValue::String("banana".into())
            ),
            Ordering::Less
        );
        assert_eq!(
            compare_cells(
                &CellValue::DateTime("2024-01-01".into()),
                &CellValue::DateTime("2024-06-01".into())
            ),
            Ordering::Less
        );
    }

    #[test]
    fn numeric_cross_type_compares_by_value() {
        assert_eq!(
            compare_cells(&CellValue::Integer(2), &CellValue::Float(1.5)),
            Ordering::Greater
        );
        assert_eq!(
            compare_cells(&CellValue::Float(1.5), &CellValue::Integer(2)),
            Ordering::Less
        );
        assert_eq!(
            compare_cells(&CellValue::Integer(1), &CellValue::Float(1.0)),
            Ordering::Equal
        );
    }

    #[test]
    fn type_rank_for_mixed_columns() {
        assert_eq!(
            compare_cells(&CellValue::Boolean(true), &CellValue::Integer(0)),
            Ordering::Less
        );
        assert_eq!(
            compare_cells(&CellValue::Float(9e9), &CellValue::String("a".into())),
            Ordering::Less
        );
        assert_eq!(
            compare_cells(
                &CellValue::String("zzz".into()),
                &CellValue::DateTime("2024-01-01".into())
            ),
            Ordering::Less
        );
    }

    #[test]
    fn null_ranks_lowest_raw() {
        assert_eq!(
            compare_cells(&CellValue::Null, &CellValue::Boolean(false)),
            Ordering::Less
        );
        assert_eq!(compare_cells(&CellValue::Null, &CellValue::Null), Ordering::Equal);
        assert_eq!(
            compare_optional_cells(None, Some(&CellValue::Integer(1))),
            Ordering::Less
        );
    }
}
