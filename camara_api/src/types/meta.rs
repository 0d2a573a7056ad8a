use serde::{Deserialize, Serialize};

/// Hypermedia link attached to list responses (`self`, `next`, `last`, ...).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

/// Envelope used by every open-data endpoint: the payload lives under `dados`.
#[derive(Serialize, Deserialize, Debug)]
pub struct Response<T> {
    pub dados: T,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl<T> Response<T> {
    /// Returns the `href` of the `next` link, if the server advertised one.
    pub fn next_page(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.rel == "next")
            .map(|link| link.href.as_str())
    }
}
