//! Delimited-text loading into immutable datasets
//!
//! The loader is tolerant: a bad record is skipped and written to the
//! [`LoadReport`], it never aborts the load. Only header problems are fatal.

use crate::error::{Result, SchemaError, TabreconError};
use crate::model::{Dataset, Field, KeyColumns, Row, Schema, Side};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// How a source should be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub delimiter: u8,
    /// WHATWG encoding label, e.g. `utf-8`, `windows-1252`, `latin1`
    pub encoding: String,
    /// Read empty cells as missing rather than explicitly blank
    pub empty_as_missing: bool,
    /// Trim surrounding whitespace from header names and values
    pub trim: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            encoding: "utf-8".to_string(),
            empty_as_missing: true,
            trim: false,
        }
    }
}

/// Why a record was excluded from its dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MalformedReason {
    FieldCount { expected: usize, found: usize },
    Encoding { encoding: String },
    Parse { message: String },
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldCount { expected, found } => {
                write!(f, "expected {} fields, found {}", expected, found)
            }
            Self::Encoding { encoding } => write!(f, "bytes not valid {}", encoding),
            Self::Parse { message } => write!(f, "parse error: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedRow {
    pub line: u64,
    pub raw: String,
    pub reason: MalformedReason,
}

/// Everything recovered from while loading one input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub input: String,
    pub side: Side,
    pub rows_loaded: usize,
    pub malformed_rows: Vec<MalformedRow>,
}

impl LoadReport {
    pub fn has_issues(&self) -> bool {
        !self.malformed_rows.is_empty()
    }
}

/// Resolve an encoding label. UTF-16 is rejected because records are split
/// on single-byte delimiters before decoding.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    let encoding = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
        TabreconError::invalid_input(format!("Unknown encoding label: '{}'", label))
    })?;
    if encoding == encoding_rs::UTF_16LE || encoding == encoding_rs::UTF_16BE {
        return Err(TabreconError::invalid_input(format!(
            "Encoding '{}' is not supported for delimited input",
            encoding.name()
        )));
    }
    Ok(encoding)
}

/// Load a file from disk. The path is used as the input label.
pub fn load_path(
    path: &Path,
    side: Side,
    key_columns: &KeyColumns,
    options: &LoadOptions,
) -> Result<(Dataset, LoadReport)> {
    if !path.is_file() {
        return Err(TabreconError::invalid_input(format!(
            "File not found: {}",
            path.display()
        )));
    }
    let file = File::open(path)?;
    load(
        BufReader::new(file),
        &path.display().to_string(),
        side,
        key_columns,
        options,
    )
}

/// Load a delimited source with a header row
pub fn load<R: Read>(
    source: R,
    label: &str,
    side: Side,
    key_columns: &KeyColumns,
    options: &LoadOptions,
) -> Result<(Dataset, LoadReport)> {
    let encoding = resolve_encoding(&options.encoding)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(source);

    let mut record = csv::ByteRecord::new();

    if !reader.read_byte_record(&mut record)? {
        return Err(SchemaError::EmptyInput {
            input: label.to_string(),
        }
        .into());
    }
    let schema = read_header(&record, encoding, label, options)?;

    for column in key_columns.iter() {
        if !schema.contains(column) {
            return Err(TabreconError::missing_key_column(column, label));
        }
    }

    let mut rows = Vec::new();
    let mut malformed_rows = Vec::new();
    let mut records_seen: u64 = 1;

    loop {
        match reader.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                records_seen += 1;
                let line = record
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(records_seen);
                match decode_record(&record, schema.len(), encoding, options) {
                    Ok(fields) => rows.push(Row::new(side, line, fields)),
                    Err(reason) => {
                        log::warn!("{}: skipping line {}: {}", label, line, reason);
                        malformed_rows.push(MalformedRow {
                            line,
                            raw: raw_content(&record, options.delimiter),
                            reason,
                        });
                    }
                }
            }
            Err(e) => {
                if matches!(e.kind(), csv::ErrorKind::Io(_)) {
                    return Err(e.into());
                }
                records_seen += 1;
                let line = e
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(records_seen);
                log::warn!("{}: skipping line {}: {}", label, line, e);
                malformed_rows.push(unparsed_row(line, &record, options.delimiter, e.to_string()));
            }
        }
    }

    log::info!(
        "Loaded {} rows from {} ({} malformed)",
        rows.len(),
        label,
        malformed_rows.len()
    );

    let report = LoadReport {
        input: label.to_string(),
        side,
        rows_loaded: rows.len(),
        malformed_rows,
    };

    Ok((Dataset::new(label, side, schema, rows), report))
}

fn read_header(
    record: &csv::ByteRecord,
    encoding: &'static Encoding,
    label: &str,
    options: &LoadOptions,
) -> Result<Schema> {
    let mut names = Vec::with_capacity(record.len());
    for (i, bytes) in record.iter().enumerate() {
        let mut name = decode_field(bytes, encoding).ok_or_else(|| {
            TabreconError::invalid_input(format!(
                "Header of {} is not valid {}",
                label,
                encoding.name()
            ))
        })?;
        if i == 0 {
            if let Some(stripped) = name.strip_prefix('\u{feff}') {
                name = stripped.to_string();
            }
        }
        if options.trim {
            name = name.trim().to_string();
        }
        names.push(name);
    }

    if names.iter().all(|n| n.is_empty()) {
        return Err(SchemaError::EmptyInput {
            input: label.to_string(),
        }
        .into());
    }

    // Spreadsheet exports often leave trailing columns unnamed
    for (i, name) in names.iter_mut().enumerate() {
        if name.is_empty() {
            *name = blank_column_name(i);
            log::warn!("{}: header column {} is blank, using '{}'", label, i + 1, name);
        }
    }

    Schema::from_columns(names).map_err(|column| {
        SchemaError::DuplicateColumn {
            column,
            input: label.to_string(),
        }
        .into()
    })
}

fn decode_record(
    record: &csv::ByteRecord,
    expected: usize,
    encoding: &'static Encoding,
    options: &LoadOptions,
) -> std::result::Result<Vec<Field>, MalformedReason> {
    if record.len() != expected {
        return Err(MalformedReason::FieldCount {
            expected,
            found: record.len(),
        });
    }

    record
        .iter()
        .map(|bytes| -> std::result::Result<Field, MalformedReason> {
            let mut value = decode_field(bytes, encoding).ok_or_else(|| MalformedReason::Encoding {
                encoding: encoding.name().to_string(),
            })?;
            if options.trim {
                value = value.trim().to_string();
            }
            if value.is_empty() && options.empty_as_missing {
                Ok(Field::missing())
            } else {
                Ok(Field::new(Some(value)))
            }
        })
        .collect()
}

fn decode_field(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|cow| cow.into_owned())
}

/// Placeholder for a blank header name at zero-based `index`
fn blank_column_name(index: usize) -> String {
    format!("unnamed_{}", index + 1)
}

/// A record the csv reader gave up on. Keeps whatever fields were read
/// before the failure.
fn unparsed_row(line: u64, partial: &csv::ByteRecord, delimiter: u8, message: String) -> MalformedRow {
    let raw = raw_content(partial, delimiter);
    let message = if raw.is_empty() {
        format!("{} (raw text unavailable)", message)
    } else {
        message
    };
    MalformedRow {
        line,
        raw,
        reason: MalformedReason::Parse { message },
    }
}

fn raw_content(record: &csv::ByteRecord, delimiter: u8) -> String {
    let delimiter = (delimiter as char).to_string();
    record
        .iter()
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .collect::<Vec<_>>()
        .join(&delimiter)
}
