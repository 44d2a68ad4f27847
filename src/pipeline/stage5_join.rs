use std::collections::HashSet;

use crate::input::{ColumnNames, InputError, Table};
use crate::model::{Cell, GroupKey, RatioMap};

/// Positions of the two key columns in the input worksheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyColumns {
    pub procedure_code: usize,
    pub diagnosis_name: usize,
}

impl KeyColumns {
    pub fn resolve(table: &Table, names: &ColumnNames) -> Result<Self, InputError> {
        Ok(Self {
            procedure_code: table.require_column(&names.procedure_code)?,
            diagnosis_name: table.require_column(&names.diagnosis_name)?,
        })
    }

    fn key_of(&self, row: &[Cell]) -> Option<GroupKey> {
        let procedure = row.get(self.procedure_code)?.key_text()?;
        let diagnosis = row.get(self.diagnosis_name)?.key_text()?;
        Some(GroupKey::new(procedure, diagnosis))
    }
}

#[derive(Debug, Clone)]
pub struct JoinOutput {
    pub table: Table,
    pub ratio_column: String,
    pub matched: usize,
    pub unmatched: usize,
    pub unmatched_keys: usize,
}

/// Left join of `input` against `ratio_map`: every input row comes out once,
/// in input order, with the ratio appended (empty when the key is unknown).
///
/// If the input already carries a column named `ratio_column` it is renamed
/// `<name>_x` and the new column is `<name>_y`.
pub fn join(input: &Table, keys: KeyColumns, ratio_column: &str, ratio_map: &RatioMap) -> JoinOutput {
    let mut columns = input.columns.clone();
    let out_column = match columns.iter().position(|c| c == ratio_column) {
        Some(existing) => {
            columns[existing] = format!("{ratio_column}_x");
            format!("{ratio_column}_y")
        }
        None => ratio_column.to_string(),
    };
    columns.push(out_column.clone());

    let mut table = Table::new(columns);
    table.rows.reserve(input.n_rows());
    let mut matched = 0usize;
    let mut unmatched = 0usize;
    let mut missing: HashSet<GroupKey> = HashSet::new();

    for row in &input.rows {
        let key = keys.key_of(row);
        let ratio = key.as_ref().and_then(|k| ratio_map.get(k));
        let cell = match ratio {
            Some(ratio) => {
                matched += 1;
                Cell::Text(ratio.to_string())
            }
            None => {
                unmatched += 1;
                if let Some(key) = key {
                    tracing::trace!(%key, "no reference ratio for key");
                    missing.insert(key);
                }
                Cell::Empty
            }
        };
        let mut out = Vec::with_capacity(row.len() + 1);
        out.extend(row.iter().cloned());
        out.resize(input.columns.len(), Cell::Empty);
        out.push(cell);
        table.rows.push(out);
    }

    JoinOutput {
        table,
        ratio_column: out_column,
        matched,
        unmatched,
        unmatched_keys: missing.len(),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_join.rs"]
mod tests;
