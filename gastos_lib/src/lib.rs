//! Library layer for the expense refresh: term resolution, roster, archive
//! ingestion, identifier reconciliation, aggregation, and static output.
//!
//! Wraps the `camara_api` client crate; [`pipeline::run`] chains the stages.

pub mod aggregate;
pub mod error;
pub mod expense;
pub mod field_map;
pub mod ingest;
pub mod pipeline;
pub mod publish;
pub mod reconcile;
pub mod report;
pub mod roster;
pub mod term;
pub mod validation;

pub use camara_api;
pub use camara_api::types;
pub use camara_api::{Client, Endpoints};

pub use aggregate::{aggregate, Aggregation, LedgerEntry, LegislatorAggregate, RunWarnings};
pub use error::GastosError;
pub use expense::{ExpenseRecord, FieldIssue, LegislatorRef};
pub use field_map::{load_field_map, load_field_map_file, CanonicalField, FieldMap, FieldMapError};
pub use ingest::IngestError;
pub use pipeline::{run, RunOptions};
pub use publish::write_outputs;
pub use reconcile::{LegacyIndex, LookupProgress, MatchPolicy, NoProgress, Reconciler};
pub use report::{DeputyDetailPayload, DeputySummary, Report, RunMetadata};
pub use roster::{Legislator, Roster};
pub use term::{resolve_term, LegislativeTerm};
