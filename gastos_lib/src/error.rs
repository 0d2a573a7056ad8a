//! Error types for the library layer.

use std::fmt;

use crate::field_map::FieldMapError;
use crate::ingest::IngestError;

/// Errors that abort a refresh run. Per-record and per-deputy problems never
/// surface here; they are counted in [`crate::aggregate::RunWarnings`].
#[derive(Debug)]
pub enum GastosError {
    /// An error from the underlying open-data client.
    Api(camara_api::Error),
    /// The yearly archive could not be opened or decoded.
    Ingest(IngestError),
    /// The field mapping table is invalid.
    FieldMap(FieldMapError),
    /// No legislative term could be resolved for the run date.
    NoLegislature,
    /// The roster for the resolved term came back empty.
    EmptyRoster(i64),
    /// Writing an output file failed.
    Io(std::io::Error),
    /// JSON serialization failed.
    Serialization(serde_json::Error),
    /// User-provided input failed validation.
    InvalidInput(String),
}

impl fmt::Display for GastosError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "API error: {}", e),
            Self::Ingest(e) => write!(f, "Archive error: {}", e),
            Self::FieldMap(e) => write!(f, "Field map error: {}", e),
            Self::NoLegislature => write!(f, "No legislative term could be resolved"),
            Self::EmptyRoster(id) => write!(f, "Roster for legislature {} is empty", id),
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for GastosError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::Ingest(e) => Some(e),
            Self::FieldMap(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<camara_api::Error> for GastosError {
    fn from(e: camara_api::Error) -> Self {
        Self::Api(e)
    }
}

impl From<IngestError> for GastosError {
    fn from(e: IngestError) -> Self {
        Self::Ingest(e)
    }
}

impl From<FieldMapError> for GastosError {
    fn from(e: FieldMapError) -> Self {
        Self::FieldMap(e)
    }
}

impl From<std::io::Error> for GastosError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for GastosError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}
