//! One refresh run, stage by stage.

use camara_api::Client;
use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::aggregate::aggregate;
use crate::error::GastosError;
use crate::field_map::FieldMap;
use crate::ingest::{extract_archive_json, normalize, parse_expense_payload};
use crate::reconcile::{fetch_legacy_index, LegacyIndex, LookupProgress, MatchPolicy, Reconciler};
use crate::report::{Report, ReportContext};
use crate::roster::{fetch_roster, DEFAULT_PAGE_SIZE};
use crate::term::resolve_term;

/// Everything that parameterizes a run. The clock is an input, so two runs
/// with the same options against the same data produce identical output.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Archive year to ingest.
    pub year: i32,
    /// Date used to resolve the term and pick `mes_atual`.
    pub today: NaiveDate,
    /// Timestamp written to the metadata.
    pub now: DateTime<Utc>,
    pub policy: MatchPolicy,
    pub field_map: FieldMap,
    pub page_size: i64,
}

impl RunOptions {
    /// Options for a run at `now`: current year, default policy and page size.
    pub fn new(now: DateTime<Utc>, field_map: FieldMap) -> Self {
        let today = now.date_naive();
        Self {
            year: today.year(),
            today,
            now,
            policy: MatchPolicy::default(),
            field_map,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Runs the whole refresh and returns the report to publish. Only the fatal
/// conditions abort; dropped and degraded records end up in the report's
/// warning counters.
pub async fn run(
    client: &Client,
    options: &RunOptions,
    progress: &mut dyn LookupProgress,
) -> Result<Report, GastosError> {
    let legislatures = client.get_legislatures().await?.dados;
    let term = resolve_term(&legislatures, options.today)?;
    tracing::info!("Legislature {} (run date {})", term.id, options.today);

    let mut roster = fetch_roster(client, term.id, options.page_size).await?;
    tracing::info!("Roster: {} deputies", roster.len());

    let (legacy, lookups_failed) = if options.policy.needs_legacy_index() {
        fetch_legacy_index(client, &mut roster, &options.field_map, progress).await
    } else {
        (LegacyIndex::default(), 0)
    };

    let archive_url = client.expense_archive_url(options.year);
    tracing::info!("Downloading {}", archive_url);
    let bytes = client.download_expense_archive(options.year).await?;
    let text = extract_archive_json(&bytes)?;
    let batch = parse_expense_payload(&text)?;
    let records = normalize(&batch, &options.field_map);
    tracing::info!(
        "Archive {}: {} records (field map v{})",
        options.year,
        records.len(),
        options.field_map.version()
    );

    let reconciler = Reconciler::new(&roster, &legacy, options.policy);
    let aggregation = aggregate(&records, &reconciler);

    let mut warnings = aggregation.warnings.clone();
    warnings.malformed_entries = batch.malformed;
    warnings.legacy_lookups_failed = lookups_failed;
    if !warnings.is_clean() {
        tracing::warn!("Run finished with warnings: {:?}", warnings);
    }

    let ctx = ReportContext {
        year: options.year,
        term_id: term.id,
        today: options.today,
        now: options.now,
        archive_url: &archive_url,
    };
    Ok(Report::build(&ctx, &roster, &aggregation, warnings))
}
