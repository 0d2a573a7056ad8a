//! Versioned source-field mapping for the quota archive.
//!
//! The archive has changed field names across years. Instead of chains of
//! fallbacks in the ingest code, every alternate name is listed once in
//! `seed_data/field_map.yml` together with the canonical field it feeds and
//! its priority. Follows the compile-time `include_str!` pattern used for the
//! other seed data, and can be overridden with a file at runtime.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Error types for field map operations.
#[derive(Error, Debug)]
pub enum FieldMapError {
    #[error("Failed to parse field map YAML: {0}")]
    YamlParse(#[from] serde_yml::Error),
    #[error("Failed to read field map file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source '{0}' mapped twice to {1}")]
    DuplicateSource(String, CanonicalField),
    #[error("Priority {1} used twice for {0}")]
    DuplicatePriority(CanonicalField, u32),
    #[error("No source mapped to required field {0}")]
    MissingField(CanonicalField),
}

/// Fields the pipeline understands, independent of how the archive names them.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    LegislatorId,
    Amount,
    Date,
    Category,
    Supplier,
    DocumentUrl,
    /// Legacy registration id, read from deputy detail records.
    LegacyId,
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CanonicalField::LegislatorId => "legislator_id",
            CanonicalField::Amount => "amount",
            CanonicalField::Date => "date",
            CanonicalField::Category => "category",
            CanonicalField::Supplier => "supplier",
            CanonicalField::DocumentUrl => "document_url",
            CanonicalField::LegacyId => "legacy_id",
        })
    }
}

/// Top-level structure of the field map YAML file.
#[derive(Deserialize, Debug)]
pub struct FieldMapFile {
    pub version: u32,
    #[serde(default)]
    pub uncategorized: Option<String>,
    pub mappings: Vec<FieldMapping>,
}

/// A single `source -> field` entry.
#[derive(Deserialize, Debug, Clone)]
pub struct FieldMapping {
    pub source: String,
    pub field: CanonicalField,
    pub priority: u32,
}

/// Sentinel category used when no category field is present.
pub const DEFAULT_UNCATEGORIZED: &str = "Sem categoria";

/// Validated mapping table: for each canonical field, its source names in
/// priority order.
#[derive(Debug, Clone)]
pub struct FieldMap {
    version: u32,
    uncategorized: String,
    sources: BTreeMap<CanonicalField, Vec<String>>,
}

impl FieldMap {
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn uncategorized(&self) -> &str {
        &self.uncategorized
    }

    /// Source names for `field`, highest priority first. Empty if unmapped.
    pub fn sources(&self, field: CanonicalField) -> &[String] {
        self.sources.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the first non-empty value among the sources of `field`,
    /// together with the source name it came from.
    pub fn coalesce<'a>(
        &'a self,
        record: &'a Map<String, Value>,
        field: CanonicalField,
    ) -> Option<(&'a str, &'a Value)> {
        self.sources(field).iter().find_map(|source| {
            record
                .get(source)
                .filter(|value| !is_empty_value(value))
                .map(|value| (source.as_str(), value))
        })
    }
}

/// Emptiness as the archive uses it: absent, `null`, `""`, `false`, `0`,
/// or an empty array/object all mean "no value here, try the next field".
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Parse and validate a field map from YAML content.
///
/// # Returns
/// * `Ok(FieldMap)` - sources grouped per canonical field, sorted by priority
/// * `Err(FieldMapError)` - parse error, duplicate entry, or missing required field
pub fn parse_field_map(yaml_content: &str) -> Result<FieldMap, FieldMapError> {
    let file: FieldMapFile = serde_yml::from_str(yaml_content)?;

    let mut seen_sources = HashSet::new();
    let mut seen_priorities = HashSet::new();
    let mut grouped: BTreeMap<CanonicalField, Vec<FieldMapping>> = BTreeMap::new();

    for mapping in file.mappings {
        if !seen_sources.insert((mapping.source.clone(), mapping.field)) {
            return Err(FieldMapError::DuplicateSource(mapping.source, mapping.field));
        }
        if !seen_priorities.insert((mapping.field, mapping.priority)) {
            return Err(FieldMapError::DuplicatePriority(mapping.field, mapping.priority));
        }
        grouped.entry(mapping.field).or_default().push(mapping);
    }

    for required in [CanonicalField::LegislatorId, CanonicalField::Amount] {
        if !grouped.contains_key(&required) {
            return Err(FieldMapError::MissingField(required));
        }
    }

    let sources = grouped
        .into_iter()
        .map(|(field, mut mappings)| {
            mappings.sort_by_key(|m| m.priority);
            (field, mappings.into_iter().map(|m| m.source).collect())
        })
        .collect();

    Ok(FieldMap {
        version: file.version,
        uncategorized: file
            .uncategorized
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_UNCATEGORIZED.to_string()),
        sources,
    })
}

/// Load the field map embedded at compile time.
pub fn load_field_map() -> Result<FieldMap, FieldMapError> {
    let yaml_content = include_str!("../../seed_data/field_map.yml");
    parse_field_map(yaml_content)
}

/// Load a field map from a YAML file on disk.
pub fn load_field_map_file(path: &Path) -> Result<FieldMap, FieldMapError> {
    let yaml_content = std::fs::read_to_string(path)?;
    parse_field_map(&yaml_content)
}
