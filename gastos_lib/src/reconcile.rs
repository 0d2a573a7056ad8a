//! Identifier reconciliation: maps the ids found on an expense record to a
//! canonical roster id.
//!
//! The archive has used both the canonical v2 id and a legacy registration
//! id over the years. Which of them a record is matched by is controlled by
//! [`MatchPolicy`]; the legacy side goes through a [`LegacyIndex`] built from
//! per-deputy detail records.

use std::collections::HashMap;
use std::str::FromStr;

use camara_api::types::DeputyDetail;
use camara_api::Client;

use crate::expense::{parse_id, ExpenseRecord};
use crate::field_map::{is_empty_value, CanonicalField, FieldMap};
use crate::roster::Roster;

/// How expense records are matched to deputies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Only the highest-priority id field counts, and it must be a canonical id.
    Direct,
    /// Ids are resolved through the legacy registration index only.
    Registration,
    /// Each id in priority order: canonical id first, then legacy index.
    #[default]
    DirectThenLegacy,
}

impl MatchPolicy {
    /// Whether this policy needs per-deputy detail lookups.
    pub fn needs_legacy_index(self) -> bool {
        !matches!(self, MatchPolicy::Direct)
    }
}

impl std::fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            MatchPolicy::Direct => "direct",
            MatchPolicy::Registration => "registration",
            MatchPolicy::DirectThenLegacy => "direct-then-legacy",
        })
    }
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(MatchPolicy::Direct),
            "registration" => Ok(MatchPolicy::Registration),
            "direct-then-legacy" => Ok(MatchPolicy::DirectThenLegacy),
            other => Err(format!(
                "unknown match policy '{}' (expected direct, registration or direct-then-legacy)",
                other
            )),
        }
    }
}

/// Legacy registration id -> canonical id.
#[derive(Debug, Clone, Default)]
pub struct LegacyIndex {
    map: HashMap<i64, i64>,
}

impl LegacyIndex {
    /// Adds every legacy id carried by `detail`. A legacy id already claimed
    /// by another deputy keeps its first owner.
    pub fn insert_detail(&mut self, detail: &DeputyDetail, fields: &FieldMap) {
        for source in fields.sources(CanonicalField::LegacyId) {
            let Some(value) = detail.field(source) else {
                continue;
            };
            if is_empty_value(value) {
                continue;
            }
            let Some(legacy) = parse_id(value) else {
                tracing::debug!("Deputy {}: {} = {} is not an id", detail.id, source, value);
                continue;
            };
            match self.map.get(&legacy) {
                Some(&owner) if owner != detail.id => {
                    tracing::warn!(
                        "Legacy id {} claimed by both {} and {}; keeping {}",
                        legacy,
                        owner,
                        detail.id,
                        owner
                    );
                }
                _ => {
                    self.map.insert(legacy, detail.id);
                }
            }
        }
    }

    pub fn insert(&mut self, legacy: i64, canonical: i64) {
        self.map.entry(legacy).or_insert(canonical);
    }

    pub fn get(&self, legacy: i64) -> Option<i64> {
        self.map.get(&legacy).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Progress sink for the per-deputy detail lookups.
pub trait LookupProgress {
    fn start(&mut self, _total: u64) {}
    fn advance(&mut self) {}
    fn finish(&mut self) {}
}

/// Progress sink that reports nothing.
pub struct NoProgress;

impl LookupProgress for NoProgress {}

/// Fetches the detail record of every roster deputy, one at a time, and
/// builds the legacy index. Civil names found along the way are written back
/// into the roster. Returns the index and the number of failed lookups; a
/// failure only makes that deputy unreachable by legacy id.
pub async fn fetch_legacy_index(
    client: &Client,
    roster: &mut Roster,
    fields: &FieldMap,
    progress: &mut dyn LookupProgress,
) -> (LegacyIndex, usize) {
    let ids: Vec<i64> = roster.iter().map(|l| l.canonical_id).collect();
    let mut index = LegacyIndex::default();
    let mut failed = 0;

    progress.start(ids.len() as u64);
    for id in ids {
        match client.get_deputy(id).await {
            Ok(resp) => {
                let detail = resp.dados;
                if let Some(name) = detail.nome_civil.as_deref().filter(|n| !n.is_empty()) {
                    roster.set_legal_name(id, name);
                }
                index.insert_detail(&detail, fields);
            }
            Err(e) => {
                failed += 1;
                tracing::warn!("Detail lookup for deputy {} failed: {}", id, e);
            }
        }
        progress.advance();
    }
    progress.finish();

    tracing::info!(
        "Legacy index: {} ids from {} deputies ({} lookups failed)",
        index.len(),
        roster.len(),
        failed
    );
    (index, failed)
}

/// Resolves expense records against a roster under a [`MatchPolicy`].
pub struct Reconciler<'a> {
    roster: &'a Roster,
    legacy: &'a LegacyIndex,
    policy: MatchPolicy,
}

impl<'a> Reconciler<'a> {
    pub fn new(roster: &'a Roster, legacy: &'a LegacyIndex, policy: MatchPolicy) -> Self {
        Self {
            roster,
            legacy,
            policy,
        }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Canonical id of the deputy a record belongs to, if any.
    pub fn resolve(&self, record: &ExpenseRecord) -> Option<i64> {
        let mut refs = record.legislator_refs.iter();
        match self.policy {
            MatchPolicy::Direct => refs
                .next()
                .map(|r| r.id)
                .filter(|&id| self.roster.contains(id)),
            MatchPolicy::Registration => refs
                .filter_map(|r| self.legacy.get(r.id))
                .find(|&id| self.roster.contains(id)),
            MatchPolicy::DirectThenLegacy => refs.find_map(|r| {
                if self.roster.contains(r.id) {
                    Some(r.id)
                } else {
                    self.legacy.get(r.id).filter(|&id| self.roster.contains(id))
                }
            }),
        }
    }
}
