use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::cell::Cell;

/// Clinical wound classification code (I, II, III, ... stored as integers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WoundCategory(pub i64);

impl WoundCategory {
    /// Lenient integer coercion. Integers pass through, finite floats and
    /// numeric text are truncated toward zero, everything else is missing.
    pub fn coerce(cell: &Cell) -> Option<Self> {
        match cell {
            Cell::Int(v) => Some(Self(*v)),
            Cell::Float(v) => Self::from_float(*v),
            Cell::Text(s) => Self::parse(s),
            Cell::Bool(_) | Cell::DateTime(_) | Cell::Duration(_) | Cell::Empty => None,
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Ok(v) = text.parse::<i64>() {
            return Some(Self(v));
        }
        text.parse::<f64>().ok().and_then(Self::from_float)
    }

    fn from_float(v: f64) -> Option<Self> {
        if !v.is_finite() {
            return None;
        }
        let t = v.trunc();
        if t < i64::MIN as f64 || t > i64::MAX as f64 {
            return None;
        }
        Some(Self(t as i64))
    }
}

impl fmt::Display for WoundCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey {
    pub procedure_code: String,
    pub diagnosis_name: String,
}

impl GroupKey {
    pub fn new(procedure_code: impl Into<String>, diagnosis_name: impl Into<String>) -> Self {
        Self {
            procedure_code: procedure_code.into(),
            diagnosis_name: diagnosis_name.into(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.procedure_code, self.diagnosis_name)
    }
}

/// One observation from the reference table. The category is kept raw;
/// coercion happens when ratios are built.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRecord {
    pub procedure_code: String,
    pub diagnosis_name: String,
    pub wound_category: Cell,
}

impl ReferenceRecord {
    pub fn new(
        procedure_code: impl Into<String>,
        diagnosis_name: impl Into<String>,
        wound_category: impl Into<Cell>,
    ) -> Self {
        Self {
            procedure_code: procedure_code.into(),
            diagnosis_name: diagnosis_name.into(),
            wound_category: wound_category.into(),
        }
    }

    pub fn key(&self) -> GroupKey {
        GroupKey::new(self.procedure_code.as_str(), self.diagnosis_name.as_str())
    }

    pub fn category(&self) -> Option<WoundCategory> {
        WoundCategory::coerce(&self.wound_category)
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/record.rs"]
mod tests;
