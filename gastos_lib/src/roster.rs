//! The roster of deputies serving in a legislative term.

use std::collections::HashMap;

use camara_api::types::Deputy;
use camara_api::{Client, DeputyQuery, DeputySortBy, Query, SortDirection};
use serde::Serialize;

use crate::error::GastosError;

/// Page size used when none is configured. The endpoint caps pages at 1000.
pub const DEFAULT_PAGE_SIZE: i64 = 1000;

/// Safety bound on the number of pages followed.
const MAX_PAGES: i64 = 50;

/// A deputy as published in the site outputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legislator {
    pub canonical_id: i64,
    pub name: String,
    /// Civil name; only known after a detail lookup.
    pub legal_name: String,
    pub party: String,
    pub state: String,
    pub photo_url: String,
}

impl From<Deputy> for Legislator {
    fn from(deputy: Deputy) -> Self {
        Self {
            canonical_id: deputy.id,
            name: deputy.name,
            legal_name: String::new(),
            party: deputy.party,
            state: deputy.state,
            photo_url: deputy.photo_url,
        }
    }
}

/// Ordered roster with an id index. Order is the API order (by name).
#[derive(Debug, Clone, Default)]
pub struct Roster {
    legislators: Vec<Legislator>,
    index: HashMap<i64, usize>,
}

impl Roster {
    /// Builds a roster, keeping the first occurrence of a duplicated id.
    pub fn from_legislators(legislators: impl IntoIterator<Item = Legislator>) -> Self {
        let mut roster = Self::default();
        for legislator in legislators {
            if roster.index.contains_key(&legislator.canonical_id) {
                tracing::debug!("Duplicate roster entry {} ignored", legislator.canonical_id);
                continue;
            }
            roster
                .index
                .insert(legislator.canonical_id, roster.legislators.len());
            roster.legislators.push(legislator);
        }
        roster
    }

    pub fn contains(&self, id: i64) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: i64) -> Option<&Legislator> {
        self.index.get(&id).map(|&i| &self.legislators[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Legislator> {
        self.legislators.iter()
    }

    pub fn len(&self) -> usize {
        self.legislators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legislators.is_empty()
    }

    /// Records the civil name found in a detail record. Unknown ids are ignored.
    pub fn set_legal_name(&mut self, id: i64, legal_name: &str) {
        if let Some(&i) = self.index.get(&id) {
            self.legislators[i].legal_name = legal_name.to_string();
        }
    }
}

/// Fetches every deputy of `term_id`, ascending by name, following `next`
/// links until the server stops advertising one.
pub async fn fetch_roster(
    client: &Client,
    term_id: i64,
    page_size: i64,
) -> Result<Roster, GastosError> {
    if page_size <= 0 {
        return Err(GastosError::InvalidInput(format!(
            "page size must be positive, got {}",
            page_size
        )));
    }

    let mut deputies = Vec::new();
    let mut page = 1;
    loop {
        let query = DeputyQuery::default()
            .with_legislature_id(term_id)
            .with_sort_by(DeputySortBy::Name)
            .with_sort_direction(SortDirection::Asc)
            .with_page_size(page_size)
            .with_page(page);
        let resp = client.get_deputies(&query).await?;
        tracing::debug!("Roster page {}: {} deputies", page, resp.dados.len());

        let has_next = resp.next_page().is_some();
        let page_was_empty = resp.dados.is_empty();
        deputies.extend(resp.dados);

        if !has_next || page_was_empty {
            break;
        }
        if page >= MAX_PAGES {
            tracing::warn!("Stopped following roster pages after {}", MAX_PAGES);
            break;
        }
        page += 1;
    }

    let roster = Roster::from_legislators(deputies.into_iter().map(Legislator::from));
    if roster.is_empty() {
        return Err(GastosError::EmptyRoster(term_id));
    }
    Ok(roster)
}
