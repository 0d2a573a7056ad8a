use std::str::FromStr;

use anyhow::Result;
use gastos_lib::DeputySummary;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!(
                "unknown output format '{}'. Valid values: table, json, csv, markdown",
                other
            )),
        }
    }
}

#[derive(Tabled, Serialize)]
struct SummaryRow {
    #[tabled(rename = "ID")]
    #[serde(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Party")]
    #[serde(rename = "Party")]
    party: String,
    #[tabled(rename = "State")]
    #[serde(rename = "State")]
    state: String,
    #[tabled(rename = "Year")]
    #[serde(rename = "Year")]
    year_total: String,
    #[tabled(rename = "Month")]
    #[serde(rename = "Month")]
    month_total: String,
}

// -- Row builders --

fn build_summary_rows(summaries: &[DeputySummary]) -> Vec<SummaryRow> {
    summaries
        .iter()
        .map(|s| SummaryRow {
            id: s.id,
            name: s.nome.clone(),
            party: s.sigla_partido.clone(),
            state: s.uf.clone(),
            year_total: format_brl(s.gasto_ano),
            month_total: format_brl(s.gasto_mes),
        })
        .collect()
}

// -- Table output --

pub fn print_summaries_table(summaries: &[DeputySummary]) {
    println!("{}", Table::new(build_summary_rows(summaries)));
}

// -- Markdown output --

pub fn print_summaries_markdown(summaries: &[DeputySummary]) {
    let mut table = Table::new(build_summary_rows(summaries));
    table.with(Style::markdown());
    println!("{}", table);
}

// -- CSV output --

pub fn print_summaries_csv(summaries: &[DeputySummary]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for mut row in build_summary_rows(summaries) {
        row.name = sanitize_csv_field(&row.name);
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Prefix cells that a spreadsheet would read as a formula.
fn sanitize_csv_field(value: &str) -> String {
    if value.starts_with(['=', '+', '-', '@']) {
        format!("\t{}", value)
    } else {
        value.to_string()
    }
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

/// Brazilian currency notation: `R$ 1.234,56`.
fn format_brl(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    let digits = (cents / 100).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("{}R$ {},{:02}", sign, grouped, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summaries() -> Vec<DeputySummary> {
        serde_json::from_value(serde_json::json!([
            {"id": 204554, "nome": "Ana Costa", "nomeCivil": "ANA MARIA COSTA", "siglaPartido": "PT",
             "partido": "PT", "uf": "BA", "foto": "", "gasto_ano": 199.9, "gasto_mes": 150.0},
            {"id": 160511, "nome": "=Bruno Lima", "nomeCivil": "", "siglaPartido": "PL",
             "partido": "PL", "uf": "SP", "foto": "", "gasto_ano": 1234567.891, "gasto_mes": 0.0}
        ]))
        .unwrap()
    }

    // -- format_brl tests --

    #[test]
    fn test_format_brl_thousands() {
        assert_eq!(format_brl(1234.56), "R$ 1.234,56");
    }

    #[test]
    fn test_format_brl_millions() {
        assert_eq!(format_brl(1_000_000.0), "R$ 1.000.000,00");
    }

    #[test]
    fn test_format_brl_small_and_zero() {
        assert_eq!(format_brl(0.0), "R$ 0,00");
        assert_eq!(format_brl(7.5), "R$ 7,50");
        assert_eq!(format_brl(999.999), "R$ 1.000,00");
    }

    #[test]
    fn test_format_brl_negative() {
        assert_eq!(format_brl(-35.1), "-R$ 35,10");
    }

    // -- Output format parsing --

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    // -- Row builder tests --

    #[test]
    fn test_build_summary_rows_mapping() {
        let rows = build_summary_rows(&summaries());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Ana Costa");
        assert_eq!(rows[0].party, "PT");
        assert_eq!(rows[0].state, "BA");
        assert_eq!(rows[0].year_total, "R$ 199,90");
        assert_eq!(rows[1].year_total, "R$ 1.234.567,89");
    }

    #[test]
    fn test_build_summary_rows_empty() {
        assert!(build_summary_rows(&[]).is_empty());
    }

    // -- CSV output tests --

    #[test]
    fn test_csv_headers() {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        for row in build_summary_rows(&summaries()) {
            wtr.serialize(row).unwrap();
        }
        let csv = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert_eq!(csv.lines().next().unwrap(), "ID,Name,Party,State,Year,Month");
    }

    #[test]
    fn test_sanitize_csv_field() {
        assert_eq!(sanitize_csv_field("=SUM(A1)"), "\t=SUM(A1)");
        assert_eq!(sanitize_csv_field("@cmd"), "\t@cmd");
        assert_eq!(sanitize_csv_field("Ana Costa"), "Ana Costa");
        assert_eq!(sanitize_csv_field(""), "");
    }

    // -- Markdown output tests --

    #[test]
    fn test_markdown_structure() {
        let mut table = Table::new(build_summary_rows(&summaries()));
        table.with(Style::markdown());
        let md = table.to_string();
        assert!(md.contains("---"));
        let header = md.lines().next().unwrap();
        assert!(header.contains("Name"));
        assert!(header.contains("Year"));
    }
}
