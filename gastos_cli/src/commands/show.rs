//! The `show` subcommand: inspect the summary file written by `refresh`.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Args;
use gastos_lib::publish::{METADATA_FILE, SUMMARY_FILE};
use gastos_lib::{validation, DeputySummary};

use crate::output::{
    print_json, print_summaries_csv, print_summaries_markdown, print_summaries_table,
    OutputFormat,
};

#[derive(Args)]
pub struct ShowArgs {
    /// Directory a previous refresh wrote to
    #[arg(long, default_value = "docs/data")]
    pub data: PathBuf,

    /// Output format: table, json, csv, markdown
    #[arg(long, default_value = "table")]
    pub output: String,

    /// Filter by party acronym (e.g. PT, PL, PSOL)
    #[arg(long)]
    pub party: Option<String>,

    /// Filter by state code (e.g. SP, BA, DF)
    #[arg(long)]
    pub state: Option<String>,

    /// Only the N biggest spenders
    #[arg(long)]
    pub top: Option<usize>,
}

pub fn run(args: &ShowArgs) -> Result<()> {
    let format: OutputFormat = args.output.parse().map_err(|e: String| anyhow!(e))?;
    let party = args
        .party
        .as_deref()
        .map(validation::validate_party)
        .transpose()?;
    let state = args
        .state
        .as_deref()
        .map(validation::validate_state)
        .transpose()?;

    let summaries = load_summaries(&args.data)?;
    let selected = select(summaries, party.as_deref(), state.as_deref(), args.top);

    if let Some(header) = metadata_header(&args.data) {
        eprintln!("{}", header);
    }
    eprintln!("{} deputies", selected.len());

    match format {
        OutputFormat::Table => print_summaries_table(&selected),
        OutputFormat::Json => print_json(&selected),
        OutputFormat::Csv => print_summaries_csv(&selected)?,
        OutputFormat::Markdown => print_summaries_markdown(&selected),
    }

    Ok(())
}

fn load_summaries(dir: &Path) -> Result<Vec<DeputySummary>> {
    let path = dir.join(SUMMARY_FILE);
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {} (run `gastos refresh` first?)", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// Filters, then orders by year total, biggest first. Ties keep file order.
fn select(
    mut summaries: Vec<DeputySummary>,
    party: Option<&str>,
    state: Option<&str>,
    top: Option<usize>,
) -> Vec<DeputySummary> {
    summaries.retain(|s| {
        party.map_or(true, |p| s.sigla_partido.eq_ignore_ascii_case(p))
            && state.map_or(true, |uf| s.uf.eq_ignore_ascii_case(uf))
    });
    summaries.sort_by(|a, b| b.gasto_ano.total_cmp(&a.gasto_ano));
    if let Some(n) = top {
        summaries.truncate(n);
    }
    summaries
}

fn metadata_header(dir: &Path) -> Option<String> {
    let text = std::fs::read_to_string(dir.join(METADATA_FILE)).ok()?;
    let meta: serde_json::Value = serde_json::from_str(&text).ok()?;
    Some(format!(
        "Year {} | legislature {} | updated {}",
        meta.get("ano")?,
        meta.get("id_legislatura")?,
        meta.get("updated_at")?.as_str()?
    ))
}
