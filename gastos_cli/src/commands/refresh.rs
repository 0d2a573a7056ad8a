//! The `refresh` subcommand: rebuild the static data files from the open-data portal.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::{Datelike, Utc};
use clap::Args;
use gastos_lib::{
    load_field_map, load_field_map_file, pipeline, validation, write_outputs, Client, Endpoints,
    LookupProgress, MatchPolicy, RunOptions,
};
use indicatif::{ProgressBar, ProgressStyle};

/// Arguments for the `refresh` subcommand.
#[derive(Args)]
pub struct RefreshArgs {
    /// Directory receiving deputados.json, metadata.json and detalhes/
    #[arg(long, default_value = "docs/data")]
    pub out: PathBuf,

    /// Archive year (defaults to the year of the run date)
    #[arg(long)]
    pub year: Option<i32>,

    /// Run date used to resolve the legislature and the current month (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    /// Identifier matching: direct, registration, direct-then-legacy
    #[arg(long, default_value = "direct-then-legacy")]
    pub policy: String,

    /// YAML field map replacing the built-in one
    #[arg(long)]
    pub field_map: Option<PathBuf>,

    /// Roster page size (1-1000)
    #[arg(long, default_value = "1000")]
    pub page_size: i64,

    /// Serve every endpoint from one host (mirrors, testing). Also GASTOS_BASE_URL.
    #[arg(long)]
    pub base_url: Option<String>,
}

pub async fn run(args: &RefreshArgs) -> Result<()> {
    let now = Utc::now();
    let today = match args.date {
        Some(ref date) => validation::validate_run_date(date)?,
        None => now.date_naive(),
    };
    let year = match args.year {
        Some(year) => validation::validate_year(year, today)?,
        None => today.year(),
    };
    let policy: MatchPolicy = args.policy.parse().map_err(|e: String| anyhow!(e))?;
    let page_size = validation::validate_page_size(args.page_size)?;

    let field_map = match args.field_map {
        Some(ref path) => load_field_map_file(path)?,
        None => load_field_map()?,
    };

    let mut options = RunOptions::new(now, field_map);
    options.today = today;
    options.year = year;
    options.policy = policy;
    options.page_size = page_size;

    let client = Client::with_endpoints(resolve_endpoints(args.base_url.as_deref()));
    eprintln!(
        "Refreshing {} expenses into {} (policy {})",
        year,
        args.out.display(),
        policy
    );

    let mut progress = BarProgress::default();
    let report = pipeline::run(&client, &options, &mut progress).await?;
    write_outputs(&args.out, &report)?;

    let w = &report.metadata.avisos;
    eprintln!(
        "Refresh complete: {} deputies, {} of {} records matched ({} unmatched, {} without id)",
        report.summaries.len(),
        w.records_matched,
        w.records_total,
        w.unmatched,
        w.without_id
    );
    Ok(())
}

/// Endpoint roots: `--base-url`, then `GASTOS_BASE_URL`, then production.
/// `GASTOS_API_URL`, `GASTOS_FILES_URL` and `GASTOS_COTAS_URL` override
/// individual roots on top of that.
fn resolve_endpoints(base_url: Option<&str>) -> Endpoints {
    endpoints_from(base_url, |key| std::env::var(key).ok())
}

fn endpoints_from(base_url: Option<&str>, lookup: impl Fn(&str) -> Option<String>) -> Endpoints {
    let env_string = |key: &str| clean_url(lookup(key));

    let mut endpoints = match base_url
        .map(|s| s.to_string())
        .or_else(|| env_string("GASTOS_BASE_URL"))
    {
        Some(url) => Endpoints::rooted_at(&url),
        None => Endpoints::default(),
    };
    if let Some(api) = env_string("GASTOS_API_URL") {
        endpoints.api = api;
    }
    if let Some(files) = env_string("GASTOS_FILES_URL") {
        endpoints.files = files;
    }
    if let Some(cotas) = env_string("GASTOS_COTAS_URL") {
        endpoints.cotas = cotas;
    }
    endpoints
}

fn clean_url(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
}

/// Progress bar over the per-deputy detail lookups.
#[derive(Default)]
struct BarProgress {
    bar: Option<ProgressBar>,
}

impl LookupProgress for BarProgress {
    fn start(&mut self, total: u64) {
        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::with_template(
            "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>4}/{len:4} ({eta}) {msg}",
        ) {
            pb.set_style(style);
        }
        pb.set_message("fetching deputy details...");
        self.bar = Some(pb);
    }

    fn advance(&mut self) {
        if let Some(ref pb) = self.bar {
            pb.inc(1);
        }
    }

    fn finish(&mut self) {
        if let Some(pb) = self.bar.take() {
            pb.finish_with_message("details fetched");
        }
    }
}
