//! Legislative terms, as published in the daily `legislaturas.json` dump.

use serde::{Deserialize, Deserializer, Serialize};

/// Numeric legislature identifier (e.g. 57 for 2023-2027).
pub type LegislatureID = i64;

/// One legislative term. Dates are kept as the raw `YYYY-MM-DD` strings;
/// parsing is left to the caller so that a single bad entry does not reject
/// the whole file.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Legislature {
    /// Term id. The file dump names it `idLegislatura`, the API `id`; both
    /// numbers and numeric strings are accepted.
    #[serde(alias = "idLegislatura", default, deserialize_with = "flexible_id")]
    pub id: Option<LegislatureID>,

    /// First day of the term.
    #[serde(default)]
    pub data_inicio: Option<String>,

    /// Last day of the term.
    #[serde(default)]
    pub data_fim: Option<String>,

    #[serde(default)]
    ano_eleicao: Option<serde_json::Value>,
}

/// Accepts `57`, `"57"` or `null`. Anything else deserializes to `None`.
pub(crate) fn flexible_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}
