use chrono::{Datelike, NaiveDate};

use crate::error::GastosError;

pub const MAX_PARTY_LENGTH: usize = 20;

/// First year the quota archive is published for.
pub const FIRST_ARCHIVE_YEAR: i32 = 2008;

/// Largest page the `/deputados` listing serves.
pub const MAX_PAGE_SIZE: i64 = 1000;

pub const VALID_STATES: &[&str] = &[
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB",
    "PR", "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

/// Cleans a `show` filter value: control characters are dropped, surrounding
/// blanks trimmed, and at most `max_len` bytes accepted. `label` names the
/// filter in error messages.
pub fn clean_filter_value(label: &str, input: &str, max_len: usize) -> Result<String, GastosError> {
    if input.len() > max_len {
        return Err(GastosError::InvalidInput(format!(
            "{} filter is longer than {} bytes",
            label, max_len
        )));
    }
    let cleaned: String = input.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(GastosError::InvalidInput(format!("{} filter is blank", label)));
    }
    Ok(cleaned.to_string())
}

/// Validate a federative unit code: uppercase, check against the 26 states + DF.
pub fn validate_state(input: &str) -> Result<String, GastosError> {
    let upper = input.trim().to_uppercase();
    if VALID_STATES.contains(&upper.as_str()) {
        Ok(upper)
    } else {
        Err(GastosError::InvalidInput(format!(
            "unknown state code '{}'. Valid codes: AC, AL, AP, ... SP, SE, TO (26 states + DF)",
            input
        )))
    }
}

/// Validate a party acronym. Parties come and go, so only the shape is checked.
pub fn validate_party(input: &str) -> Result<String, GastosError> {
    let party = clean_filter_value("party", input, MAX_PARTY_LENGTH)?.to_uppercase();
    if party
        .chars()
        .all(|c| c.is_alphanumeric() || c == ' ' || c == '-')
    {
        Ok(party)
    } else {
        Err(GastosError::InvalidInput(format!(
            "invalid party acronym '{}'",
            input
        )))
    }
}

/// Validate an archive year: from the first published year up to the year of `today`.
pub fn validate_year(year: i32, today: NaiveDate) -> Result<i32, GastosError> {
    if !(FIRST_ARCHIVE_YEAR..=today.year()).contains(&year) {
        return Err(GastosError::InvalidInput(format!(
            "year must be between {} and {}, got {}",
            FIRST_ARCHIVE_YEAR,
            today.year(),
            year
        )));
    }
    Ok(year)
}

/// Validate page size (must be 1..=1000).
pub fn validate_page_size(page_size: i64) -> Result<i64, GastosError> {
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(GastosError::InvalidInput(format!(
            "page_size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }
    Ok(page_size)
}

/// Parses the `--date` run date. It picks the legislature and the current
/// month, so only full ISO dates are taken.
pub fn validate_run_date(input: &str) -> Result<NaiveDate, GastosError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        GastosError::InvalidInput(format!(
            "run date '{}' is not a YYYY-MM-DD calendar date",
            trimmed
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // -- State validation --

    #[test]
    fn state_valid_uppercase() {
        assert_eq!(validate_state("SP").unwrap(), "SP");
    }

    #[test]
    fn state_valid_lowercase() {
        assert_eq!(validate_state(" ba ").unwrap(), "BA");
    }

    #[test]
    fn state_federal_district() {
        assert_eq!(validate_state("df").unwrap(), "DF");
    }

    #[test]
    fn state_invalid() {
        assert!(validate_state("CA").is_err());
        assert!(validate_state("").is_err());
        assert!(validate_state("BAHIA").is_err());
    }

    // -- Party validation --

    #[test]
    fn party_uppercased() {
        assert_eq!(validate_party("psol").unwrap(), "PSOL");
        assert_eq!(validate_party("PCdoB").unwrap(), "PCDOB");
    }

    #[test]
    fn party_rejects_garbage() {
        assert!(validate_party("").is_err());
        assert!(validate_party("PT;DROP").is_err());
        assert!(validate_party(&"X".repeat(MAX_PARTY_LENGTH + 1)).is_err());
    }

    #[test]
    fn filter_value_strips_control_chars() {
        assert_eq!(clean_filter_value("party", "\tPL\n", 10).unwrap(), "PL");
    }

    #[test]
    fn filter_value_errors_name_the_filter() {
        let err = clean_filter_value("party", " \n ", 10).unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: party filter is blank");
    }

    // -- Year --

    #[test]
    fn year_bounds() {
        let today = day(2024, 6, 1);
        assert_eq!(validate_year(2024, today).unwrap(), 2024);
        assert_eq!(validate_year(FIRST_ARCHIVE_YEAR, today).unwrap(), 2008);
        assert!(validate_year(2007, today).is_err());
        assert!(validate_year(2025, today).is_err());
    }

    // -- Page size --

    #[test]
    fn page_size_bounds() {
        assert_eq!(validate_page_size(1).unwrap(), 1);
        assert_eq!(validate_page_size(1000).unwrap(), 1000);
        assert!(validate_page_size(0).is_err());
        assert!(validate_page_size(1001).is_err());
    }

    // -- Date --

    #[test]
    fn date_valid() {
        assert_eq!(validate_run_date("2024-03-15").unwrap(), day(2024, 3, 15));
    }

    #[test]
    fn date_invalid() {
        assert!(validate_run_date("15/03/2024").is_err());
        assert!(validate_run_date("2024-13-01").is_err());
        assert!(validate_run_date("2024-02-30").is_err());
    }
}
