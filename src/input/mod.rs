use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod cache;
pub mod columns;
pub mod delimited;
pub mod workbook;

use crate::model::Cell;

pub use columns::{ColumnNames, HeaderPreset};

/// Row-major worksheet: a header row plus data rows of equal width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Pads or truncates `row` to the header width before storing it.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, InputError> {
        self.column_index(name)
            .ok_or_else(|| InputError::MissingColumn {
                column: name.to_string(),
                available: self.columns.join(", "),
            })
    }
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("reference table unavailable: {}", .path.display())]
    ReferenceUnavailable { path: PathBuf },
    #[error("input file not found: {}", .path.display())]
    MissingInput { path: PathBuf },
    #[error("unsupported table format: {}", .path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("required column '{column}' not found (available: {available})")]
    MissingColumn { column: String, available: String },
    #[error("table is empty: {}", .path.display())]
    EmptyTable { path: PathBuf },
    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("workbook error in {}: {message}", .path.display())]
    Workbook { path: PathBuf, message: String },
    #[error("worksheet '{sheet}' not found in {}", .path.display())]
    MissingSheet { path: PathBuf, sheet: String },
    #[error(
        "inputs {} and {} would both be written to {}",
        .first.display(),
        .second.display(),
        .output.display()
    )]
    DuplicateOutput {
        output: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("cache encode/decode error: {0}")]
    Cache(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv { gzip: bool },
    Tsv { gzip: bool },
    Workbook,
}

impl TableFormat {
    /// Picks the format from the file name; `-` is CSV on stdin/stdout.
    pub fn detect(path: &Path) -> Result<Self, InputError> {
        if path.as_os_str() == "-" {
            return Ok(TableFormat::Csv { gzip: false });
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        let (stem, gzip) = match name.strip_suffix(".gz") {
            Some(stem) => (stem.to_string(), true),
            None => (name, false),
        };
        let ext = stem.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        match (ext, gzip) {
            ("csv", _) => Ok(TableFormat::Csv { gzip }),
            ("tsv" | "txt", _) => Ok(TableFormat::Tsv { gzip }),
            ("xlsx" | "xlsm" | "xls" | "xlsb" | "ods", false) => Ok(TableFormat::Workbook),
            _ => Err(InputError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<Table, InputError> {
    let format = TableFormat::detect(path)?;
    if path.as_os_str() != "-" && !path.exists() {
        return Err(InputError::MissingInput {
            path: path.to_path_buf(),
        });
    }
    let table = match format {
        TableFormat::Csv { gzip } => delimited::read_delimited(path, b',', gzip)?,
        TableFormat::Tsv { gzip } => delimited::read_delimited(path, b'\t', gzip)?,
        TableFormat::Workbook => workbook::read_workbook(path, sheet)?,
    };
    if table.columns.is_empty() {
        return Err(InputError::EmptyTable {
            path: path.to_path_buf(),
        });
    }
    tracing::debug!(
        path = %path.display(),
        columns = table.columns.len(),
        rows = table.n_rows(),
        "table loaded"
    );
    Ok(table)
}

pub fn write_table(path: &Path, table: &Table) -> Result<(), InputError> {
    match TableFormat::detect(path)? {
        TableFormat::Csv { gzip } => delimited::write_delimited(path, table, b',', gzip),
        TableFormat::Tsv { gzip } => delimited::write_delimited(path, table, b'\t', gzip),
        TableFormat::Workbook if is_xlsx(path) => workbook::write_workbook(path, table),
        _ => Err(InputError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

fn is_xlsx(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"))
}

/// Reference table names tried in the working directory when none is given.
pub const REFERENCE_CANDIDATES: &[&str] = &[
    "对照表.xlsx",
    "对照表.csv",
    "reference.xlsx",
    "reference.csv",
];

pub fn find_reference_path(dir: &Path, explicit: Option<&Path>) -> Result<PathBuf, InputError> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(InputError::ReferenceUnavailable {
            path: path.to_path_buf(),
        });
    }
    for name in REFERENCE_CANDIDATES {
        let path = dir.join(name);
        if path.is_file() {
            return Ok(path);
        }
    }
    Err(InputError::ReferenceUnavailable {
        path: dir.join(REFERENCE_CANDIDATES[0]),
    })
}

/// Output location for one input: an explicit file, a directory, or
/// `<stem>.ratio.<ext>` next to the input. The upload name `待处理.xlsx`
/// maps to `切口分类.xlsx`.
pub fn resolve_output_path(input: &Path, out: Option<&Path>, multiple_inputs: bool) -> PathBuf {
    if input.as_os_str() == "-" && out.is_none() {
        return PathBuf::from("-");
    }
    let default_name = default_output_name(input);
    match out {
        Some(out) if out.as_os_str() == "-" => out.to_path_buf(),
        Some(out) if out.is_dir() || multiple_inputs => out.join(default_name),
        Some(out) => out.to_path_buf(),
        None => input
            .parent()
            .map(|p| p.join(&default_name))
            .unwrap_or_else(|| PathBuf::from(&default_name)),
    }
}

/// Resolves every input's output up front and refuses a batch in which two
/// inputs land on the same file. Repeated `-` (stdout) is allowed.
pub fn resolve_output_paths(
    inputs: &[PathBuf],
    out: Option<&Path>,
) -> Result<Vec<PathBuf>, InputError> {
    let multiple = inputs.len() > 1;
    let mut seen: HashMap<PathBuf, &Path> = HashMap::with_capacity(inputs.len());
    let mut outputs = Vec::with_capacity(inputs.len());
    for input in inputs {
        let output = resolve_output_path(input, out, multiple);
        if output.as_os_str() != "-" {
            if let Some(first) = seen.insert(output.clone(), input) {
                return Err(InputError::DuplicateOutput {
                    output,
                    first: first.to_path_buf(),
                    second: input.clone(),
                });
            }
        }
        outputs.push(output);
    }
    Ok(outputs)
}

fn default_output_name(input: &Path) -> String {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if name == "待处理.xlsx" {
        return "切口分类.xlsx".to_string();
    }
    let trimmed = name.strip_suffix(".gz").unwrap_or(&name);
    match trimmed.rsplit_once('.') {
        Some((stem, ext)) if matches!(ext, "xls" | "xlsm" | "xlsb" | "ods") => {
            format!("{stem}.ratio.xlsx")
        }
        Some((stem, ext)) => format!("{stem}.ratio.{ext}"),
        None => format!("{trimmed}.ratio.csv"),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
