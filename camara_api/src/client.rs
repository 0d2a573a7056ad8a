//! HTTP client for the Chamber of Deputies open-data endpoints.

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    query::{DeputyQuery, Query},
    types::{Deputy, DeputyDetail, DeputyID, Legislature, Response},
    user_agent::get_user_agent,
    Error,
};

const JSON_TIMEOUT: Duration = Duration::from_secs(60);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Base URLs of the three hosts the refresh talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// REST API v2 root, e.g. `https://dadosabertos.camara.leg.br/api/v2`.
    pub api: String,
    /// Static file dumps root, e.g. `https://dadosabertos.camara.leg.br/arquivos`.
    pub files: String,
    /// Yearly quota archives root, e.g. `https://www.camara.leg.br/cotas`.
    pub cotas: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api: "https://dadosabertos.camara.leg.br/api/v2".to_string(),
            files: "https://dadosabertos.camara.leg.br/arquivos".to_string(),
            cotas: "https://www.camara.leg.br/cotas".to_string(),
        }
    }
}

impl Endpoints {
    /// Serves all three roots from a single host, keeping the production path
    /// layout (`/api/v2`, `/arquivos`, `/cotas`). Used with mirrors and wiremock.
    pub fn rooted_at(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            api: format!("{}/api/v2", base),
            files: format!("{}/arquivos", base),
            cotas: format!("{}/cotas", base),
        }
    }
}

/// HTTP client for the open-data endpoints.
///
/// Every call is a single attempt; failures are reported to the caller, who
/// decides whether the run can continue. Each request builds a fresh
/// `reqwest::Client` with its own timeout.
pub struct Client {
    endpoints: Endpoints,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Creates a new client pointing at the production hosts.
    pub fn new() -> Self {
        Self {
            endpoints: Endpoints::default(),
        }
    }

    /// Creates a new client serving every endpoint from one base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            endpoints: Endpoints::rooted_at(base_url),
        }
    }

    /// Creates a new client with explicit endpoint roots.
    pub fn with_endpoints(endpoints: Endpoints) -> Self {
        Self { endpoints }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn parse_url(raw: &str) -> Result<Url, Error> {
        Url::parse(raw).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::RequestFailed
        })
    }

    fn http(timeout: Duration) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .user_agent(get_user_agent())
            .timeout(timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed
            })
    }

    async fn fetch(&self, url: Url, accept: &str, timeout: Duration) -> Result<Vec<u8>, Error> {
        let client = Self::http(timeout)?;
        let resp = client
            .get(url.clone())
            .header("accept", accept)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to get {}: {}", url, e);
                Error::RequestFailed
            })?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::RequestFailed
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&String::from_utf8_lossy(&body));
            tracing::error!("Request to {} failed with status {}: {}", url, status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        Ok(body.to_vec())
    }

    async fn get<T>(&self, url: Url) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let body = self.fetch(url, "application/json", JSON_TIMEOUT).await?;
        serde_json::from_slice::<T>(&body).map_err(|e| {
            let snippet = truncate_body(&String::from_utf8_lossy(&body));
            tracing::error!("Failed to parse resource: {} | body: {}", e, snippet);
            Error::RequestFailed
        })
    }

    /// Fetches the full list of legislative terms from the daily file dump.
    pub async fn get_legislatures(&self) -> Result<Response<Vec<Legislature>>, Error> {
        let url = Self::parse_url(&format!(
            "{}/legislaturas/json/legislaturas.json",
            self.endpoints.files
        ))?;
        self.get(url).await
    }

    /// Fetches one page of deputies matching the given query.
    pub async fn get_deputies(&self, query: &DeputyQuery) -> Result<Response<Vec<Deputy>>, Error> {
        let url = Self::parse_url(&format!("{}/deputados", self.endpoints.api))?;
        self.get(query.add_to_url(&url)).await
    }

    /// Fetches the detail record of a single deputy.
    pub async fn get_deputy(&self, deputy_id: DeputyID) -> Result<Response<DeputyDetail>, Error> {
        let url = Self::parse_url(&format!("{}/deputados/{}", self.endpoints.api, deputy_id))?;
        self.get(url).await
    }

    /// URL of the yearly parliamentary-quota archive.
    pub fn expense_archive_url(&self, year: i32) -> String {
        format!("{}/Ano-{}.json.zip", self.endpoints.cotas, year)
    }

    /// Downloads the yearly parliamentary-quota archive (a ZIP holding one JSON file).
    pub async fn download_expense_archive(&self, year: i32) -> Result<Vec<u8>, Error> {
        let url = Self::parse_url(&self.expense_archive_url(year))?;
        self.fetch(url, "*/*", DOWNLOAD_TIMEOUT).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}
