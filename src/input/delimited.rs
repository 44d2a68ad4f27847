use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

use crate::input::{InputError, Table};
use crate::model::Cell;

pub fn open_maybe_gz(path: &Path, gzip: bool) -> Result<Box<dyn Read>, InputError> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = BufReader::new(File::open(path)?);
    if gzip {
        Ok(Box::new(MultiGzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

/// Delimited text is untyped: every non-empty field becomes `Cell::Text`.
pub fn read_delimited(path: &Path, delimiter: u8, gzip: bool) -> Result<Table, InputError> {
    let reader = open_maybe_gz(path, gzip)?;
    read_delimited_from(reader, delimiter).map_err(|source| InputError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_delimited_from<R: Read>(reader: R, delimiter: u8) -> Result<Table, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect::<Vec<_>>();
    let mut table = Table::new(columns);

    for record in rdr.records() {
        let record = record?;
        let row = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(field.to_string())
                }
            })
            .collect();
        table.push_row(row);
    }
    Ok(table)
}

pub fn write_delimited(
    path: &Path,
    table: &Table,
    delimiter: u8,
    gzip: bool,
) -> Result<(), InputError> {
    let sink: Box<dyn Write> = if path.as_os_str() == "-" {
        Box::new(io::stdout().lock())
    } else {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = BufWriter::new(File::create(path)?);
        if gzip {
            Box::new(GzEncoder::new(file, Compression::default()))
        } else {
            Box::new(file)
        }
    };
    write_delimited_to(sink, table, delimiter).map_err(|source| InputError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_delimited_to<W: Write>(
    writer: W,
    table: &Table,
    delimiter: u8,
) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    wtr.write_record(&table.columns)?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(ToString::to_string))?;
    }
    wtr.flush()?;
    Ok(())
}
