use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::model::{Row, Table, Value};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Table format
// ---------------------------------------------------------------------------

/// Field separator of a delimited text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    /// Single-byte separator handled by the `csv` reader.
    Char(char),
    /// One or more spaces or tabs, as written by ns-3 trace sinks.
    Whitespace,
    #[default]
    Comma,
}

/// How a source file is laid out.
///
/// When `columns` is set the file has no header row and every line is data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableFormat {
    #[serde(default)]
    pub delimiter: Delimiter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
}

impl TableFormat {
    pub fn csv() -> Self {
        Self::default()
    }

    pub fn whitespace(columns: Vec<String>) -> Self {
        TableFormat {
            delimiter: Delimiter::Whitespace,
            columns: Some(columns),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a table from a delimited text file.
pub fn load_table(path: &Path, format: &TableFormat) -> Result<Table, LoadError> {
    if !path.is_file() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|e| LoadError::Malformed {
        path: path.to_path_buf(),
        line: line_of_offset(e.as_bytes(), e.utf8_error().valid_up_to()),
        reason: "invalid UTF-8".to_string(),
    })?;

    let table = match format.delimiter {
        Delimiter::Whitespace => parse_whitespace(path, &text, format.columns.as_deref())?,
        Delimiter::Comma => parse_delimited(path, &text, b',', format.columns.as_deref())?,
        Delimiter::Char(c) => {
            let byte = u8::try_from(c).map_err(|_| LoadError::Malformed {
                path: path.to_path_buf(),
                line: 0,
                reason: format!("delimiter '{c}' is not a single byte"),
            })?;
            parse_delimited(path, &text, byte, format.columns.as_deref())?
        }
    };

    if table.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    log::debug!(
        "Loaded {} rows from {} (columns: {:?})",
        table.len(),
        path.display(),
        table.columns()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV-style loader
// ---------------------------------------------------------------------------

fn parse_delimited(
    path: &Path,
    text: &str,
    delimiter: u8,
    columns: Option<&[String]>,
) -> Result<Table, LoadError> {
    let malformed = |line: usize, reason: String| LoadError::Malformed {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(columns.is_none())
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match columns {
        Some(names) => names.to_vec(),
        None => {
            if text.trim().is_empty() {
                return Err(LoadError::Empty {
                    path: path.to_path_buf(),
                });
            }
            reader
                .headers()
                .map_err(|e| malformed(1, e.to_string()))?
                .iter()
                .map(|h| h.to_string())
                .collect()
        }
    };

    let mut table = Table::new(headers.clone());
    for result in reader.records() {
        let record = result.map_err(|e| {
            let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
            malformed(line, e.to_string())
        })?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        if record.len() > headers.len() {
            return Err(malformed(
                line,
                format!("expected {} fields, found {}", headers.len(), record.len()),
            ));
        }

        let mut row = Row::new();
        for (col_idx, value) in record.iter().enumerate() {
            row.set(headers[col_idx].clone(), guess_value_type(value));
        }
        table.push(row);
    }

    Ok(table)
}

// ---------------------------------------------------------------------------
// Whitespace-separated loader
// ---------------------------------------------------------------------------

/// Lines split on runs of whitespace. Without explicit column names the first
/// non-blank line is the header. Short rows are padded with nulls.
fn parse_whitespace(
    path: &Path,
    text: &str,
    columns: Option<&[String]>,
) -> Result<Table, LoadError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let headers: Vec<String> = match columns {
        Some(names) => names.to_vec(),
        None => match lines.next() {
            Some((_, header)) => header.split_whitespace().map(str::to_string).collect(),
            None => {
                return Err(LoadError::Empty {
                    path: path.to_path_buf(),
                })
            }
        },
    };

    let mut table = Table::new(headers.clone());
    for (line_no, line) in lines {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() > headers.len() {
            return Err(LoadError::Malformed {
                path: path.to_path_buf(),
                line: line_no,
                reason: format!("expected {} fields, found {}", headers.len(), fields.len()),
            });
        }

        let mut row = Row::new();
        for (col_idx, name) in headers.iter().enumerate() {
            let value = fields
                .get(col_idx)
                .map(|s| guess_value_type(s))
                .unwrap_or(Value::Null);
            row.set(name.clone(), value);
        }
        table.push(row);
    }

    Ok(table)
}

fn guess_value_type(s: &str) -> Value {
    if s.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    if s == "true" || s == "false" {
        return Value::Bool(s == "true");
    }
    Value::String(s.to_string())
}

fn line_of_offset(bytes: &[u8], offset: usize) -> usize {
    bytes[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}
