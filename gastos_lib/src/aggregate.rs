//! Per-deputy rollups of the year's expense records.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::expense::{ExpenseRecord, FieldIssue};
use crate::reconcile::Reconciler;

/// One line of a deputy's ledger, keyed the way the site reads it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub data: String,
    pub categoria: String,
    pub fornecedor: String,
    /// Rounded to two decimals.
    pub valor: f64,
    pub documento_url: String,
}

/// Running totals for one deputy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegislatorAggregate {
    /// Includes records whose date yields no month.
    pub total_year: f64,
    pub by_month: BTreeMap<String, f64>,
    pub by_category: BTreeMap<String, f64>,
    pub by_supplier: BTreeMap<String, f64>,
    /// Newest first once aggregation finishes.
    pub ledger: Vec<LedgerEntry>,
}

/// Counts of records that were dropped or degraded during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunWarnings {
    pub records_total: usize,
    pub records_matched: usize,
    /// Had an id, but nobody on the roster matched it.
    pub unmatched: usize,
    /// Carried no usable id at all.
    pub without_id: usize,
    pub malformed_ids: usize,
    pub amounts_missing: usize,
    pub amounts_unparseable: usize,
    pub dates_without_month: usize,
    pub categories_defaulted: usize,
    pub malformed_entries: usize,
    pub legacy_lookups_failed: usize,
}

impl RunWarnings {
    /// True when nothing was dropped or degraded.
    pub fn is_clean(&self) -> bool {
        let counted = RunWarnings {
            records_total: self.records_total,
            records_matched: self.records_matched,
            ..Default::default()
        };
        *self == counted
    }
}

/// Result of folding a year of records.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub by_legislator: BTreeMap<i64, LegislatorAggregate>,
    pub warnings: RunWarnings,
}

impl Aggregation {
    pub fn get(&self, id: i64) -> Option<&LegislatorAggregate> {
        self.by_legislator.get(&id)
    }
}

/// Rounds half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Folds `records` into fresh per-deputy aggregates. Records that resolve to
/// nobody are counted and contribute nowhere. Never fails on a record.
pub fn aggregate(records: &[ExpenseRecord], reconciler: &Reconciler<'_>) -> Aggregation {
    let mut aggregation = records
        .iter()
        .fold(Aggregation::default(), |mut acc, record| {
            accumulate(&mut acc, record, reconciler);
            acc
        });

    for entry in aggregation.by_legislator.values_mut() {
        // Stable, so same-date entries keep archive order.
        entry.ledger.sort_by(|a, b| b.data.cmp(&a.data));
    }

    let w = &aggregation.warnings;
    tracing::info!(
        "Aggregated {} of {} records into {} deputies ({} unmatched, {} without id)",
        w.records_matched,
        w.records_total,
        aggregation.by_legislator.len(),
        w.unmatched,
        w.without_id
    );
    aggregation
}

fn accumulate(acc: &mut Aggregation, record: &ExpenseRecord, reconciler: &Reconciler<'_>) {
    let warnings = &mut acc.warnings;
    warnings.records_total += 1;
    for issue in &record.issues {
        match issue {
            FieldIssue::AmountMissing => warnings.amounts_missing += 1,
            FieldIssue::AmountUnparseable(_) => warnings.amounts_unparseable += 1,
            FieldIssue::MalformedId { .. } => warnings.malformed_ids += 1,
            FieldIssue::CategoryDefaulted => warnings.categories_defaulted += 1,
        }
    }

    let Some(id) = reconciler.resolve(record) else {
        if record.legislator_refs.is_empty() {
            warnings.without_id += 1;
            tracing::debug!("Dropped record without a usable id ({})", record.date);
        } else {
            warnings.unmatched += 1;
            tracing::debug!(
                "Dropped record for unknown id {} ({})",
                record.legislator_refs[0].id,
                record.date
            );
        }
        return;
    };
    warnings.records_matched += 1;

    let entry = acc.by_legislator.entry(id).or_default();
    let amount = record.amount;
    entry.total_year += amount;
    match record.month() {
        Some(month) => *entry.by_month.entry(month).or_insert(0.0) += amount,
        None => warnings.dates_without_month += 1,
    }
    *entry.by_category.entry(record.category.clone()).or_insert(0.0) += amount;
    if !record.supplier.is_empty() {
        *entry.by_supplier.entry(record.supplier.clone()).or_insert(0.0) += amount;
    }
    entry.ledger.push(LedgerEntry {
        data: record.date.clone(),
        categoria: record.category.clone(),
        fornecedor: record.supplier.clone(),
        valor: round2(amount),
        documento_url: record.document_url.clone(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_map::load_field_map;
    use crate::reconcile::{LegacyIndex, MatchPolicy};
    use crate::roster::{Legislator, Roster};
    use serde_json::{json, Value};

    fn roster(ids: &[i64]) -> Roster {
        Roster::from_legislators(ids.iter().map(|&id| Legislator {
            canonical_id: id,
            name: format!("Deputado {}", id),
            legal_name: String::new(),
            party: "PL".to_string(),
            state: "SP".to_string(),
            photo_url: String::new(),
        }))
    }

    fn records(raw: Value) -> Vec<ExpenseRecord> {
        let fields = load_field_map().unwrap();
        raw.as_array()
            .unwrap()
            .iter()
            .map(|r| ExpenseRecord::from_raw(r.as_object().unwrap(), &fields))
            .collect()
    }

    fn run(raw: Value, ids: &[i64]) -> Aggregation {
        let roster = roster(ids);
        let legacy = LegacyIndex::default();
        let reconciler = Reconciler::new(&roster, &legacy, MatchPolicy::DirectThenLegacy);
        aggregate(&records(raw), &reconciler)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn worked_example() {
        let agg = run(
            json!([{
                "idDeputado": 1,
                "valorLiquido": "150,00",
                "dataDocumento": "2024-03-15",
                "tipoDespesa": "Combustível",
                "nomeFornecedor": "Posto A"
            }]),
            &[1],
        );
        let dep = agg.get(1).unwrap();
        assert!(close(dep.total_year, 150.0));
        assert!(close(dep.by_month["03"], 150.0));
        assert!(close(dep.by_category["Combustível"], 150.0));
        assert!(close(dep.by_supplier["Posto A"], 150.0));
        assert_eq!(dep.ledger.len(), 1);
        assert_eq!(dep.ledger[0].valor, 150.0);
        assert!(agg.warnings.is_clean());
    }

    #[test]
    fn category_sum_equals_total_and_month_sum_is_bounded() {
        let agg = run(
            json!([
                {"idDeputado": 1, "valor": "10,10", "data": "2024-01-05", "tipoDespesa": "A"},
                {"idDeputado": 1, "valor": "20,20", "data": "2024-02-05", "tipoDespesa": "B"},
                {"idDeputado": 1, "valor": "5", "data": "", "tipoDespesa": "A"},
                {"idDeputado": 1, "valor": "7", "data": "2024"},
            ]),
            &[1],
        );
        let dep = agg.get(1).unwrap();
        let by_category: f64 = dep.by_category.values().sum();
        let by_month: f64 = dep.by_month.values().sum();
        assert!(close(by_category, dep.total_year));
        assert!(by_month <= dep.total_year + 1e-9);
        assert!(close(dep.total_year - by_month, 12.0));
        assert_eq!(agg.warnings.dates_without_month, 2);
        assert!(close(dep.by_category["Sem categoria"], 7.0));
    }

    #[test]
    fn unmatched_records_contribute_nowhere() {
        let agg = run(
            json!([
                {"idDeputado": 1, "valor": 10},
                {"idDeputado": 2, "valor": 99},
                {"valor": 50},
                {"idDeputado": "abc", "valor": 50},
            ]),
            &[1],
        );
        assert_eq!(agg.by_legislator.len(), 1);
        assert!(close(agg.get(1).unwrap().total_year, 10.0));
        assert_eq!(agg.warnings.unmatched, 1);
        assert_eq!(agg.warnings.without_id, 2);
        assert_eq!(agg.warnings.malformed_ids, 1);
        assert_eq!(agg.warnings.records_total, 4);
        assert_eq!(agg.warnings.records_matched, 1);
    }

    #[test]
    fn thousands_separator_counts_as_zero_with_warning() {
        let agg = run(json!([{"idDeputado": 1, "valorLiquido": "1.234,56", "tipoDespesa": "A"}]), &[1]);
        assert_eq!(agg.get(1).unwrap().total_year, 0.0);
        assert_eq!(agg.warnings.amounts_unparseable, 1);
        assert!(!agg.warnings.is_clean());
    }

    #[test]
    fn ledger_is_newest_first_and_stable() {
        let agg = run(
            json!([
                {"idDeputado": 1, "valor": 1, "data": "2024-01-10", "nomeFornecedor": "first"},
                {"idDeputado": 1, "valor": 2, "data": "2024-03-01"},
                {"idDeputado": 1, "valor": 3, "data": "2024-01-10", "nomeFornecedor": "second"},
                {"idDeputado": 1, "valor": 4, "data": ""},
            ]),
            &[1],
        );
        let ledger = &agg.get(1).unwrap().ledger;
        let dates: Vec<&str> = ledger.iter().map(|e| e.data.as_str()).collect();
        assert_eq!(dates, vec!["2024-03-01", "2024-01-10", "2024-01-10", ""]);
        assert_eq!(ledger[1].fornecedor, "first");
        assert_eq!(ledger[2].fornecedor, "second");
    }

    #[test]
    fn empty_supplier_is_not_a_bucket() {
        let agg = run(json!([{"idDeputado": 1, "valor": 3}]), &[1]);
        assert!(agg.get(1).unwrap().by_supplier.is_empty());
    }

    #[test]
    fn ledger_amounts_are_rounded() {
        let agg = run(json!([{"idDeputado": 1, "valor": "10,005"}, {"idDeputado": 1, "valor": 0.1234}]), &[1]);
        let ledger = &agg.get(1).unwrap().ledger;
        assert_eq!(ledger[1].valor, 0.12);
    }

    #[test]
    fn round2_behaviour() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(-35.104), -35.1);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn legacy_ids_reach_the_canonical_deputy() {
        let roster = roster(&[204554]);
        let mut legacy = LegacyIndex::default();
        legacy.insert(5830, 204554);
        let reconciler = Reconciler::new(&roster, &legacy, MatchPolicy::DirectThenLegacy);
        let agg = aggregate(&records(json!([{"ideCadastro": "5830", "valor": 12}])), &reconciler);
        assert!(close(agg.get(204554).unwrap().total_year, 12.0));
    }
}
