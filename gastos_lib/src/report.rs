//! Assembly of the static files consumed by the site.
//!
//! Key names are part of the site's contract and stay in Portuguese.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{round2, Aggregation, LedgerEntry, LegislatorAggregate, RunWarnings};
use crate::roster::{Legislator, Roster};

pub const PORTAL_URL: &str = "https://dadosabertos.camara.leg.br/";
pub const SWAGGER_URL: &str = "https://dadosabertos.camara.leg.br/swagger/api.html";

/// Entry of `deputados.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeputySummary {
    pub id: i64,
    pub nome: String,
    #[serde(rename = "nomeCivil")]
    pub nome_civil: String,
    #[serde(rename = "siglaPartido")]
    pub sigla_partido: String,
    pub partido: String,
    pub uf: String,
    pub foto: String,
    pub gasto_ano: f64,
    pub gasto_mes: f64,
}

/// Content of `detalhes/<id>.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeputyDetailPayload {
    pub id: i64,
    pub ano: i32,
    pub mes_atual: String,
    pub gasto_ano: f64,
    pub gasto_mes: f64,
    pub por_mes: BTreeMap<String, f64>,
    pub por_categoria: BTreeMap<String, f64>,
    pub por_fornecedor: BTreeMap<String, f64>,
    pub lancamentos: Vec<LedgerEntry>,
}

/// Content of `metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetadata {
    pub updated_at: String,
    pub ano: i32,
    pub id_legislatura: i64,
    pub sources: Vec<String>,
    pub avisos: RunWarnings,
}

/// Everything a run publishes, ready to be written.
#[derive(Debug, Clone)]
pub struct Report {
    pub summaries: Vec<DeputySummary>,
    pub details: Vec<DeputyDetailPayload>,
    pub metadata: RunMetadata,
}

/// Inputs that are fixed for a whole run.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub year: i32,
    pub term_id: i64,
    /// Decides `mes_atual`.
    pub today: NaiveDate,
    pub now: DateTime<Utc>,
    pub archive_url: &'a str,
}

impl Report {
    /// One summary and one detail per roster deputy, in roster order.
    /// Deputies without expenses get zeros.
    pub fn build(
        ctx: &ReportContext<'_>,
        roster: &Roster,
        aggregation: &Aggregation,
        warnings: RunWarnings,
    ) -> Self {
        let current_month = format!("{:02}", ctx.today.month());
        let empty = LegislatorAggregate::default();

        let mut summaries = Vec::with_capacity(roster.len());
        let mut details = Vec::with_capacity(roster.len());
        for legislator in roster.iter() {
            let agg = aggregation.get(legislator.canonical_id).unwrap_or(&empty);
            summaries.push(summary(legislator, agg, &current_month));
            details.push(detail(legislator.canonical_id, agg, ctx.year, &current_month));
        }

        Self {
            summaries,
            details,
            metadata: RunMetadata {
                updated_at: ctx.now.format("%Y-%m-%d %H:%M UTC").to_string(),
                ano: ctx.year,
                id_legislatura: ctx.term_id,
                sources: vec![
                    PORTAL_URL.to_string(),
                    SWAGGER_URL.to_string(),
                    ctx.archive_url.to_string(),
                ],
                avisos: warnings,
            },
        }
    }
}

fn month_total(agg: &LegislatorAggregate, month: &str) -> f64 {
    agg.by_month.get(month).copied().unwrap_or(0.0)
}

fn summary(legislator: &Legislator, agg: &LegislatorAggregate, month: &str) -> DeputySummary {
    DeputySummary {
        id: legislator.canonical_id,
        nome: legislator.name.clone(),
        nome_civil: legislator.legal_name.clone(),
        sigla_partido: legislator.party.clone(),
        partido: legislator.party.clone(),
        uf: legislator.state.clone(),
        foto: legislator.photo_url.clone(),
        gasto_ano: round2(agg.total_year),
        gasto_mes: round2(month_total(agg, month)),
    }
}

fn detail(id: i64, agg: &LegislatorAggregate, year: i32, month: &str) -> DeputyDetailPayload {
    DeputyDetailPayload {
        id,
        ano: year,
        mes_atual: month.to_string(),
        gasto_ano: round2(agg.total_year),
        gasto_mes: round2(month_total(agg, month)),
        por_mes: rounded(&agg.by_month),
        por_categoria: rounded(&agg.by_category),
        por_fornecedor: rounded(&agg.by_supplier),
        lancamentos: agg.ledger.clone(),
    }
}

fn rounded(map: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    map.iter().map(|(k, v)| (k.clone(), round2(*v))).collect()
}
