//! Yearly quota archive ingestion: ZIP extraction and payload shape handling.

use std::io::{Cursor, Read};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::expense::ExpenseRecord;
use crate::field_map::FieldMap;

/// Errors that make the archive unusable. Any of these aborts the run.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Not a readable ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Failed to read archive entry: {0}")]
    Read(#[from] std::io::Error),
    #[error("Archive contains no .json entry")]
    NoJsonEntry,
    #[error("Archive entry {name} declares {size} bytes, more than the {limit} byte limit")]
    EntryTooLarge { name: String, size: u64, limit: u64 },
    #[error("Archive entry {0} is not valid UTF-8")]
    NotUtf8(String),
    #[error("Archive payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Unexpected archive payload shape: {0}")]
    UnexpectedShape(String),
}

/// Raw expense objects pulled out of an archive payload.
#[derive(Debug, Default)]
pub struct RawBatch {
    pub records: Vec<Map<String, Value>>,
    /// Entries that were neither objects nor strings decoding to objects.
    pub malformed: usize,
}

/// Largest archive entry accepted. Sizes in ZIP headers are not trusted for
/// allocation.
pub const MAX_ENTRY_BYTES: u64 = 2 << 30;

const INITIAL_BUFFER_BYTES: u64 = 64 << 20;

/// Returns the text of the first `.json` entry (case-insensitive) of a ZIP archive.
pub fn extract_archive_json(bytes: &[u8]) -> Result<String, IngestError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();
        if !entry.is_file() || !name.to_ascii_lowercase().ends_with(".json") {
            continue;
        }

        let declared = entry.size();
        if declared > MAX_ENTRY_BYTES {
            return Err(IngestError::EntryTooLarge {
                name,
                size: declared,
                limit: MAX_ENTRY_BYTES,
            });
        }

        let mut buf = Vec::with_capacity(declared.min(INITIAL_BUFFER_BYTES) as usize);
        entry.by_ref().take(MAX_ENTRY_BYTES + 1).read_to_end(&mut buf)?;
        if buf.len() as u64 > MAX_ENTRY_BYTES {
            return Err(IngestError::EntryTooLarge {
                name,
                size: buf.len() as u64,
                limit: MAX_ENTRY_BYTES,
            });
        }
        let text = String::from_utf8(buf).map_err(|_| IngestError::NotUtf8(name.clone()))?;
        tracing::debug!("Extracted {} ({} bytes) from archive", name, text.len());

        // Some dumps are written with a byte order mark.
        return Ok(match text.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => text,
        });
    }

    Err(IngestError::NoJsonEntry)
}

/// Decodes the archive payload. Three layouts are accepted:
/// `{"dados": [...]}`, a bare list of objects, or a list of JSON-encoded
/// strings (mixing both kinds of element is fine).
pub fn parse_expense_payload(text: &str) -> Result<RawBatch, IngestError> {
    let payload: Value = serde_json::from_str(text)?;

    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("dados") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(IngestError::UnexpectedShape(format!(
                    "\"dados\" is {}, expected a list",
                    kind(&other)
                )))
            }
            None => {
                return Err(IngestError::UnexpectedShape(
                    "object without a \"dados\" list".to_string(),
                ))
            }
        },
        other => return Err(IngestError::UnexpectedShape(kind(&other).to_string())),
    };

    let mut batch = RawBatch {
        records: Vec::with_capacity(items.len()),
        malformed: 0,
    };
    for item in items {
        match item {
            Value::Object(map) => batch.records.push(map),
            Value::String(encoded) => match serde_json::from_str::<Value>(&encoded) {
                Ok(Value::Object(map)) => batch.records.push(map),
                _ => batch.malformed += 1,
            },
            _ => batch.malformed += 1,
        }
    }

    if batch.malformed > 0 {
        tracing::warn!("Skipped {} malformed archive entries", batch.malformed);
    }
    Ok(batch)
}

/// Normalizes every raw object through the field map, keeping archive order.
pub fn normalize(batch: &RawBatch, fields: &FieldMap) -> Vec<ExpenseRecord> {
    batch
        .records
        .iter()
        .map(|raw| ExpenseRecord::from_raw(raw, fields))
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
