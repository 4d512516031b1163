use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell value in a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Str(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    Null,
}

impl CellValue {
    /// Infer a typed value from a raw string field
    pub fn from_str_infer(s: &str) -> Self {
        if s.is_empty() || s.eq_ignore_ascii_case("null") {
            return CellValue::Null;
        }

        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }

        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }

        if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return CellValue::Date(d);
        }

        CellValue::Str(s.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Display length of the cell's textual form
    pub fn display_len(&self) -> usize {
        self.to_string().chars().count()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Str(s) => write!(f, "{}", s),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Null => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Str(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Str(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(x: f64) -> Self {
        CellValue::Float(x)
    }
}
