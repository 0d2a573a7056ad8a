//! Resolution of the legislative term active on a given date.

use camara_api::types::Legislature;
use chrono::NaiveDate;
use serde::Serialize;

use crate::error::GastosError;

/// The term a refresh run reports on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegislativeTerm {
    pub id: i64,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Picks the first term (in list order) whose `[start, end]` contains `today`.
/// Entries with a missing or unparseable date are skipped for containment but
/// still count for the fallback, which is the highest id in the list.
pub fn resolve_term(
    legislatures: &[Legislature],
    today: NaiveDate,
) -> Result<LegislativeTerm, GastosError> {
    for legislature in legislatures {
        let Some(id) = legislature.id else {
            continue;
        };
        let start = parse_date(legislature.data_inicio.as_deref());
        let end = parse_date(legislature.data_fim.as_deref());
        if let (Some(start), Some(end)) = (start, end) {
            if start <= today && today <= end {
                tracing::debug!("Legislature {} contains {}", id, today);
                return Ok(LegislativeTerm {
                    id,
                    start: Some(start),
                    end: Some(end),
                });
            }
        }
    }

    let latest = legislatures
        .iter()
        .filter(|l| l.id.is_some())
        .max_by_key(|l| l.id)
        .ok_or(GastosError::NoLegislature)?;
    let id = latest.id.ok_or(GastosError::NoLegislature)?;

    tracing::warn!(
        "No legislature contains {}; falling back to the latest one ({})",
        today,
        id
    );
    Ok(LegislativeTerm {
        id,
        start: parse_date(latest.data_inicio.as_deref()),
        end: parse_date(latest.data_fim.as_deref()),
    })
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    // Dumps sometimes carry a time part.
    let date = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(id: Option<i64>, start: Option<&str>, end: Option<&str>) -> Legislature {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "dataInicio": start,
            "dataFim": end,
        }))
        .unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn containment_wins() {
        let list = vec![
            leg(Some(56), Some("2019-02-01"), Some("2023-01-31")),
            leg(Some(57), Some("2023-02-01"), Some("2027-01-31")),
        ];
        let term = resolve_term(&list, day("2024-06-10")).unwrap();
        assert_eq!(term.id, 57);
        assert_eq!(term.start, Some(day("2023-02-01")));
    }

    #[test]
    fn bounds_are_inclusive() {
        let list = vec![
            leg(Some(56), Some("2019-02-01"), Some("2023-01-31")),
            leg(Some(57), Some("2023-02-01"), Some("2027-01-31")),
        ];
        assert_eq!(resolve_term(&list, day("2023-01-31")).unwrap().id, 56);
        assert_eq!(resolve_term(&list, day("2023-02-01")).unwrap().id, 57);
    }

    #[test]
    fn first_containing_entry_in_list_order() {
        let list = vec![
            leg(Some(58), Some("2024-01-01"), Some("2024-12-31")),
            leg(Some(57), Some("2023-02-01"), Some("2027-01-31")),
        ];
        assert_eq!(resolve_term(&list, day("2024-06-10")).unwrap().id, 58);
    }

    #[test]
    fn falls_back_to_highest_id() {
        let list = vec![
            leg(Some(57), Some("2023-02-01"), Some("2027-01-31")),
            leg(Some(55), Some("2015-02-01"), Some("2019-01-31")),
        ];
        let term = resolve_term(&list, day("2030-01-01")).unwrap();
        assert_eq!(term.id, 57);
    }

    #[test]
    fn bad_dates_skip_containment_but_keep_fallback() {
        let list = vec![
            leg(Some(55), Some("2015-02-01"), Some("2019-01-31")),
            leg(Some(60), Some("not a date"), None),
        ];
        assert_eq!(resolve_term(&list, day("2024-06-10")).unwrap().id, 60);
    }

    #[test]
    fn datetime_strings_are_accepted() {
        let list = vec![leg(Some(57), Some("2023-02-01T00:00:00"), Some("2027-01-31T23:59:59"))];
        let term = resolve_term(&list, day("2024-06-10")).unwrap();
        assert_eq!(term.end, Some(day("2027-01-31")));
    }

    #[test]
    fn no_ids_is_fatal() {
        assert!(matches!(
            resolve_term(&[], day("2024-06-10")),
            Err(GastosError::NoLegislature)
        ));
        let list = vec![leg(None, Some("2023-02-01"), Some("2027-01-31"))];
        assert!(matches!(
            resolve_term(&list, day("2024-06-10")),
            Err(GastosError::NoLegislature)
        ));
    }
}
