//! Deputy-related types returned by the API.

use serde::{Deserialize, Serialize};

/// Canonical deputy identifier used by the v2 API (e.g. 204554).
pub type DeputyID = i64;

/// Roster entry returned by the `/deputados` listing.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Deputy {
    /// Canonical deputy id.
    pub id: DeputyID,

    uri: Option<String>,

    /// Parliamentary (ballot) name.
    #[serde(rename = "nome", default)]
    pub name: String,

    /// Party acronym (e.g. "PT", "PL").
    #[serde(rename = "siglaPartido", default)]
    pub party: String,

    uri_partido: Option<String>,

    /// Two-letter state code.
    #[serde(rename = "siglaUf", default)]
    pub state: String,

    /// Term the listing was filtered by.
    #[serde(rename = "idLegislatura", default)]
    pub legislature_id: Option<i64>,

    /// Official portrait URL.
    #[serde(rename = "urlFoto", default)]
    pub photo_url: String,

    email: Option<String>,
}

/// Full deputy record returned by `/deputados/{id}`.
///
/// Only the fields the refresh needs are typed; everything else is kept in
/// `extra` so that identifier fields can be read by name from a mapping table.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DeputyDetail {
    /// Canonical deputy id.
    pub id: DeputyID,

    /// Legal (civil) name.
    #[serde(default)]
    pub nome_civil: Option<String>,

    /// Most recent status block.
    #[serde(default)]
    pub ultimo_status: Option<DeputyStatus>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DeputyDetail {
    /// Looks up an untyped field of the detail record by its source name.
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.extra.get(name)
    }
}

/// The `ultimoStatus` block of a deputy detail record.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeputyStatus {
    pub nome: Option<String>,
    pub nome_eleitoral: Option<String>,
    pub sigla_partido: Option<String>,
    pub sigla_uf: Option<String>,
    pub url_foto: Option<String>,
    /// e.g. "Exercício", "Licença", "Afastado".
    pub situacao: Option<String>,
}
