//! Normalized expense records.
//!
//! Each extraction step returns a typed result instead of swallowing errors;
//! degradations are recorded on the record as [`FieldIssue`]s and later
//! counted into the run warnings.

use serde_json::{Map, Value};

use crate::field_map::{is_empty_value, CanonicalField, FieldMap};

/// One identifier candidate found on a record: the source field and its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegislatorRef {
    pub field: String,
    pub id: i64,
}

/// A degradation applied while normalizing a record. None of these are fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldIssue {
    /// No amount field carried a value; amount defaulted to 0.
    AmountMissing,
    /// The amount could not be parsed; amount defaulted to 0.
    AmountUnparseable(String),
    /// An id field was present but not an all-digit value.
    MalformedId { field: String, raw: String },
    /// No category field; the uncategorized sentinel was used.
    CategoryDefaulted,
}

/// An expense record with every field coalesced to a single value.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    /// Identifier candidates in mapping-table priority order.
    pub legislator_refs: Vec<LegislatorRef>,
    /// Raw document date, usually `YYYY-MM-DD[THH:MM:SS]`; may be empty.
    pub date: String,
    pub amount: f64,
    pub category: String,
    pub supplier: String,
    pub document_url: String,
    pub issues: Vec<FieldIssue>,
}

impl ExpenseRecord {
    /// Normalizes a raw archive object through the field map.
    pub fn from_raw(raw: &Map<String, Value>, fields: &FieldMap) -> Self {
        let mut issues = Vec::new();

        let legislator_refs = extract_refs(raw, fields, &mut issues);

        let amount = match fields.coalesce(raw, CanonicalField::Amount) {
            None => {
                issues.push(FieldIssue::AmountMissing);
                0.0
            }
            Some((_, value)) => match parse_amount(value) {
                Ok(amount) => amount,
                Err(raw) => {
                    issues.push(FieldIssue::AmountUnparseable(raw));
                    0.0
                }
            },
        };

        let category = match text_field(raw, fields, CanonicalField::Category) {
            Some(category) => category,
            None => {
                issues.push(FieldIssue::CategoryDefaulted);
                fields.uncategorized().to_string()
            }
        };

        Self {
            legislator_refs,
            date: text_field(raw, fields, CanonicalField::Date).unwrap_or_default(),
            amount,
            category,
            supplier: text_field(raw, fields, CanonicalField::Supplier).unwrap_or_default(),
            document_url: text_field(raw, fields, CanonicalField::DocumentUrl)
                .unwrap_or_default(),
            issues,
        }
    }

    /// Two-digit month taken from characters 5..7 of the date, when the date
    /// is at least 7 characters long. No calendar parsing is attempted.
    pub fn month(&self) -> Option<String> {
        month_of(&self.date)
    }
}

fn extract_refs(
    raw: &Map<String, Value>,
    fields: &FieldMap,
    issues: &mut Vec<FieldIssue>,
) -> Vec<LegislatorRef> {
    let mut refs = Vec::new();
    for field in fields.sources(CanonicalField::LegislatorId) {
        let Some(value) = raw.get(field) else {
            continue;
        };
        if is_empty_value(value) {
            continue;
        }
        match parse_id(value) {
            Some(id) => refs.push(LegislatorRef {
                field: field.clone(),
                id,
            }),
            None => issues.push(FieldIssue::MalformedId {
                field: field.clone(),
                raw: value_text(value),
            }),
        }
    }
    refs
}

/// Accepts a non-negative integer, or a string made only of ASCII digits.
/// Signs, decimals, whitespace and empty strings are rejected.
pub fn parse_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| i64::try_from(n).ok()),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse::<i64>().ok()
        }
        _ => None,
    }
}

/// Parses an amount. Numbers are taken as-is; strings are trimmed and every
/// comma is turned into a dot before parsing. Thousands separators are not
/// understood, so `"1.234,56"` fails. Errors carry the raw text.
pub fn parse_amount(value: &Value) -> Result<f64, String> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| value_text(value))
}

/// See [`ExpenseRecord::month`].
pub fn month_of(date: &str) -> Option<String> {
    if date.chars().count() < 7 {
        return None;
    }
    Some(date.chars().skip(5).take(2).collect())
}

fn text_field(raw: &Map<String, Value>, fields: &FieldMap, field: CanonicalField) -> Option<String> {
    fields
        .coalesce(raw, field)
        .map(|(_, value)| value_text(value))
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
