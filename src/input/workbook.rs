use std::path::Path;

use calamine::{Data, DataType, Reader, open_workbook_auto};
use chrono::{NaiveTime, TimeDelta};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::input::{InputError, Table};
use crate::model::Cell;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Reads one worksheet (the first one unless `sheet` names another). The
/// first row of the used range is the header.
pub fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<Table, InputError> {
    let workbook_err = |message: String| InputError::Workbook {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_err(e.to_string()))?;
    let range = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                return Err(InputError::MissingSheet {
                    path: path.to_path_buf(),
                    sheet: name.to_string(),
                });
            }
            workbook
                .worksheet_range(name)
                .map_err(|e| workbook_err(e.to_string()))?
        }
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| InputError::EmptyTable {
                path: path.to_path_buf(),
            })?
            .map_err(|e| workbook_err(e.to_string()))?,
    };

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };
    let columns = header
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            let name = data_to_cell(value).to_string().trim().to_string();
            if name.is_empty() {
                format!("Unnamed: {idx}")
            } else {
                name
            }
        })
        .collect();

    let mut table = Table::new(columns);
    for row in rows {
        table.push_row(row.iter().map(data_to_cell).collect());
    }
    Ok(table)
}

pub fn data_to_cell(value: &Data) -> Cell {
    match value {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(v) => Cell::Int(*v),
        Data::Float(v) => Cell::Float(*v),
        Data::Bool(v) => Cell::Bool(*v),
        Data::DateTime(dt) if dt.is_duration() => duration_cell(value),
        Data::DateTime(_) | Data::DateTimeIso(_) => value
            .as_datetime()
            .map_or_else(|| Cell::Text(value.to_string()), Cell::DateTime),
        Data::DurationIso(_) => duration_cell(value),
    }
}

fn duration_cell(value: &Data) -> Cell {
    value
        .as_duration()
        .map_or_else(|| Cell::Text(value.to_string()), Cell::Duration)
}

pub fn write_workbook(path: &Path, table: &Table) -> Result<(), InputError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    fill_workbook(table)
        .and_then(|mut workbook| workbook.save(path))
        .map_err(|e| InputError::Workbook {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

fn fill_workbook(table: &Table) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header = Format::new().set_bold();
    let date = Format::new().set_num_format("yyyy-mm-dd");
    let date_time = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
    let duration = Format::new().set_num_format("[h]:mm:ss");

    for (col, name) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, sheet_col(col)?, name, &header)?;
    }
    for (idx, row) in table.rows.iter().enumerate() {
        let r = sheet_row(idx + 1)?;
        for (col, cell) in row.iter().enumerate() {
            let c = sheet_col(col)?;
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    worksheet.write_string(r, c, s)?;
                }
                Cell::Int(v) => {
                    worksheet.write_number(r, c, *v as f64)?;
                }
                Cell::Float(v) if v.is_finite() => {
                    worksheet.write_number(r, c, *v)?;
                }
                Cell::Float(_) => {}
                Cell::Bool(v) => {
                    worksheet.write_boolean(r, c, *v)?;
                }
                Cell::DateTime(v) => {
                    let format = if v.time() == NaiveTime::MIN {
                        &date
                    } else {
                        &date_time
                    };
                    worksheet.write_datetime_with_format(r, c, v, format)?;
                }
                Cell::Duration(v) => {
                    worksheet.write_number_with_format(r, c, duration_days(v), &duration)?;
                }
            }
        }
    }
    Ok(workbook)
}

fn duration_days(v: &TimeDelta) -> f64 {
    v.num_milliseconds() as f64 / MILLIS_PER_DAY
}

fn sheet_row(idx: usize) -> Result<u32, XlsxError> {
    u32::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)
}

fn sheet_col(idx: usize) -> Result<u16, XlsxError> {
    u16::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)
}
