use std::fmt;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

/// A single worksheet value, kept with its source type so rows can be
/// written back unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Duration(TimeDelta),
}

impl Cell {
    /// Empty cells and empty strings both count as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            Cell::Float(v) => v.is_nan(),
            Cell::Int(_) | Cell::Bool(_) | Cell::DateTime(_) | Cell::Duration(_) => false,
        }
    }

    /// Text used when the cell participates in a group key.
    pub fn key_text(&self) -> Option<String> {
        if self.is_missing() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Float(v) => write!(f, "{}", format_float(*v)),
            Cell::Bool(true) => f.write_str("TRUE"),
            Cell::Bool(false) => f.write_str("FALSE"),
            Cell::DateTime(v) => f.write_str(&format_datetime(v)),
            Cell::Duration(v) => f.write_str(&format_duration(v)),
        }
    }
}

// Spreadsheets store every number as a float; integral values print as
// integers so "12" in a CSV and 12.0 in a workbook yield the same key.
pub fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// `YYYY-MM-DD`, or `YYYY-MM-DD HH:MM:SS` when there is a time part.
pub fn format_datetime(v: &NaiveDateTime) -> String {
    if v.time() == NaiveTime::MIN {
        v.format("%Y-%m-%d").to_string()
    } else {
        v.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// `H:MM:SS`, hours unbounded.
pub fn format_duration(v: &TimeDelta) -> String {
    let total = v.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();
    format!(
        "{sign}{}:{:02}:{:02}",
        total / 3600,
        total / 60 % 60,
        total % 60
    )
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Empty, Into::into)
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/cell.rs"]
mod tests;
