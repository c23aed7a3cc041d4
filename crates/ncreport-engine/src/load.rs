use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use csv::ByteRecord;
use encoding_rs::WINDOWS_1252;
use thiserror::Error;

use crate::records::{ColumnTable, RecordSetKind, RecordSets};

/// Errors raised while reading record-set sources.
///
/// These are the only fail-fast errors in the pipeline: a record set that
/// cannot be read or parsed aborts the run, everything downstream degrades to
/// diagnostics.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("csv input was empty")]
    EmptyInput,
    #[error("csv parse error at row {row}, column {column}: {reason}")]
    Parse { row: u64, column: u64, reason: String },
    #[error("failed to load {}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<LoadError>,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Read one record set from CSV.
///
/// The first row is the header; short data rows are padded with empty cells
/// and rows wider than the header grow synthetic `ColumnN` headers. Fields
/// decode as UTF-8 with a Windows-1252 fallback, matching how spreadsheet
/// hosts commonly export CSV on Windows.
pub fn load_record_set<R: BufRead>(reader: R) -> Result<ColumnTable, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        // Headers are handled manually so row numbers in errors stay 1-based
        // from the top of the file.
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut record = ByteRecord::new();
    let mut record_index: u64 = 0;

    let has_header = csv_reader
        .read_byte_record(&mut record)
        .map_err(|e| map_csv_error(e, record_index + 1))?;
    if !has_header {
        return Err(LoadError::EmptyInput);
    }
    record_index += 1;
    let mut headers = decode_record_to_strings(&record, record_index)?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    loop {
        record.clear();
        match csv_reader.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                record_index += 1;
                rows.push(decode_record_to_strings(&record, record_index)?);
            }
            Err(e) => return Err(map_csv_error(e, record_index + 1)),
        }
    }

    let width = rows
        .iter()
        .map(Vec::len)
        .max()
        .unwrap_or(0)
        .max(headers.len());
    if headers.len() < width {
        headers.extend((headers.len()..width).map(|i| format!("Column{}", i + 1)));
    }

    Ok(ColumnTable::from_rows(&headers, &rows))
}

/// Load every recognized `<Kind>.csv` in `dir` into a [`RecordSets`].
///
/// Returns the sets plus the names of `.csv` files that matched no recognized
/// record-set kind — reported to the caller, never fatal. Missing files are
/// simply absent sets.
pub fn load_record_sets_from_dir(
    dir: impl AsRef<Path>,
) -> Result<(RecordSets, Vec<String>), LoadError> {
    let dir = dir.as_ref();
    let mut sets = RecordSets::new();
    let mut unrecognized = Vec::new();

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    paths.sort();

    for path in paths {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let Some(kind) = RecordSetKind::from_name(&stem) else {
            unrecognized.push(stem);
            continue;
        };

        let file = File::open(&path).map_err(|e| LoadError::File {
            path: path.clone(),
            source: Box::new(LoadError::Io(e)),
        })?;
        let table = load_record_set(BufReader::new(file)).map_err(|e| LoadError::File {
            path: path.clone(),
            source: Box::new(e),
        })?;
        sets.insert(kind, table);
    }

    Ok((sets, unrecognized))
}

fn decode_record_to_strings(record: &ByteRecord, row: u64) -> Result<Vec<String>, LoadError> {
    if record.len() == 0 {
        return Ok(vec![String::new()]);
    }

    let mut out = Vec::with_capacity(record.len());
    for (idx, field) in record.iter().enumerate() {
        let s = decode_field(field, row, idx as u64 + 1)?;
        out.push(s.into_owned());
    }
    Ok(out)
}

fn decode_field(field: &[u8], row: u64, column: u64) -> Result<Cow<'_, str>, LoadError> {
    // Strip a UTF-8 BOM at the very start of the file; Excel-exported CSVs
    // commonly carry one.
    let field = if row == 1 && column == 1 && field.starts_with(&[0xEF, 0xBB, 0xBF]) {
        &field[3..]
    } else {
        field
    };

    match std::str::from_utf8(field) {
        Ok(s) => Ok(Cow::Borrowed(s)),
        Err(_) => {
            let (cow, _, _) = WINDOWS_1252.decode(field);
            Ok(Cow::Owned(cow.into_owned()))
        }
    }
}

fn map_csv_error(err: csv::Error, fallback_row: u64) -> LoadError {
    let reason = err.to_string();
    let pos = err.position().cloned();

    match err.into_kind() {
        csv::ErrorKind::Io(e) => LoadError::Io(e),
        _ => {
            let row = pos
                .map(|p| p.record())
                .filter(|r| *r > 0)
                .unwrap_or(fallback_row);
            LoadError::Parse {
                row,
                column: 0,
                reason,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_header_and_rows() {
        let csv = "Condition Number,Status\nC1,New\nC2,Closed\n";
        let table = load_record_set(csv.as_bytes()).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.text("Status", 1), "Closed");
    }

    #[test]
    fn header_only_file_is_an_empty_set() {
        let table = load_record_set("Condition Number,Status\n".as_bytes()).unwrap();
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            load_record_set("".as_bytes()),
            Err(LoadError::EmptyInput)
        ));
    }

    #[test]
    fn wide_rows_grow_synthetic_headers() {
        let table = load_record_set("A\n1,2\n".as_bytes()).unwrap();
        assert_eq!(table.text("A", 0), "1");
        assert_eq!(table.text("Column2", 0), "2");
    }

    #[test]
    fn bom_is_stripped_from_first_header() {
        let bytes = b"\xEF\xBB\xBFCondition Number\nC1\n";
        let table = load_record_set(&bytes[..]).unwrap();
        assert_eq!(table.text("Condition Number", 0), "C1");
    }

    #[test]
    fn non_utf8_fields_fall_back_to_windows_1252() {
        // 0xE9 is `é` in Windows-1252.
        let bytes = b"Author\nRen\xE9e\n";
        let table = load_record_set(&bytes[..]).unwrap();
        assert_eq!(table.text("Author", 0), "Ren\u{e9}e");
    }
}
