use crate::data::cell::CellValue;
use std::cmp::Ordering;

/// Total ordering over cell values so a sort never panics on mixed columns.
/// Nulls sort before any non-null value; two nulls are equal. Integers and
/// floats compare numerically. Any other mixed pairing falls back to the
/// textual form of both operands.
pub fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Null, CellValue::Null) => Ordering::Equal,
        (CellValue::Null, _) => Ordering::Less,
        (_, CellValue::Null) => Ordering::Greater,

        (CellValue::Integer(a), CellValue::Integer(b)) => a.cmp(b),
        (CellValue::Float(a), CellValue::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (CellValue::Integer(a), CellValue::Float(b)) => {
            (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal)
        }
        (CellValue::Float(a), CellValue::Integer(b)) => {
            a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal)
        }

        (CellValue::Str(a), CellValue::Str(b)) => a.cmp(b),
        (CellValue::Date(a), CellValue::Date(b)) => a.cmp(b),

        (a, b) => a.to_string().cmp(&b.to_string()),
    }
}

/// Compare optional cells; a missing cell orders like a null.
pub fn compare_optional_cells(a: Option<&CellValue>, b: Option<&CellValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_cells(a, b),
    }
}
