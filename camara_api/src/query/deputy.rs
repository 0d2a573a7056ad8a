use std::str::FromStr;

use url::Url;

use crate::types::LegislatureID;

use super::{common::QueryCommon, Query};

/// Filters for the `/deputados` listing.
#[derive(Default, Debug, Clone)]
pub struct DeputyQuery {
    pub common: QueryCommon,
    pub legislature_ids: Vec<LegislatureID>,
    pub states: Vec<String>,
    pub parties: Vec<String>,
    pub name: Option<String>,
    pub sort_by: DeputySortBy,
}

impl Query for DeputyQuery {
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        for legislature_id in self.legislature_ids.iter() {
            url.query_pairs_mut()
                .append_pair("idLegislatura", &legislature_id.to_string());
        }
        for state in self.states.iter() {
            url.query_pairs_mut().append_pair("siglaUf", state);
        }
        for party in self.parties.iter() {
            url.query_pairs_mut().append_pair("siglaPartido", party);
        }
        if let Some(name) = &self.name {
            url.query_pairs_mut().append_pair("nome", name.as_str());
        };

        let mut url = self.common.add_to_url(&url);
        url.query_pairs_mut()
            .append_pair("ordem", &self.common.sort_direction.to_string())
            .append_pair("ordenarPor", &self.sort_by.to_string());

        url
    }
}

impl DeputyQuery {
    pub fn with_legislature_id(mut self, legislature_id: LegislatureID) -> Self {
        self.legislature_ids.push(legislature_id);
        self
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.states.push(state.to_uppercase());
        self
    }

    pub fn with_party(mut self, party: &str) -> Self {
        self.parties.push(party.to_string());
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_sort_by(mut self, sort_by: DeputySortBy) -> Self {
        self.sort_by = sort_by;
        self
    }
}

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub enum DeputySortBy {
    #[default]
    Name,
    Id,
    State,
    Party,
}
impl std::fmt::Display for DeputySortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DeputySortBy::Name => "nome",
                DeputySortBy::Id => "id",
                DeputySortBy::State => "siglaUF",
                DeputySortBy::Party => "siglaPartido",
            }
        )
    }
}
impl FromStr for DeputySortBy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nome" | "name" => Ok(DeputySortBy::Name),
            "id" => Ok(DeputySortBy::Id),
            "siglaUF" | "state" => Ok(DeputySortBy::State),
            "siglaPartido" | "party" => Ok(DeputySortBy::Party),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use crate::query::{common::SortDirection, deputy::DeputySortBy, DeputyQuery, Query};

    #[test]
    fn test_deputy_query() {
        let url = Url::parse("https://example.com/deputados").unwrap();

        insta::assert_snapshot!(
            DeputyQuery::default().add_to_url(&url).to_string(),
            @"https://example.com/deputados?pagina=1&ordem=ASC&ordenarPor=nome"
        );

        insta::assert_snapshot!(
            DeputyQuery::default()
                .with_legislature_id(57)
                .with_page_size(1000)
                .add_to_url(&url)
                .to_string(),
            @"https://example.com/deputados?idLegislatura=57&pagina=1&itens=1000&ordem=ASC&ordenarPor=nome"
        );

        insta::assert_snapshot!(
            DeputyQuery::default()
                .with_state("sp")
                .with_party("PT")
                .with_name("Silva")
                .with_page(3)
                .add_to_url(&url)
                .to_string(),
            @"https://example.com/deputados?siglaUf=SP&siglaPartido=PT&nome=Silva&pagina=3&ordem=ASC&ordenarPor=nome"
        );

        insta::assert_snapshot!(
            DeputyQuery::default()
                .with_sort_direction(SortDirection::Desc)
                .with_sort_by(DeputySortBy::State)
                .add_to_url(&url)
                .to_string(),
            @"https://example.com/deputados?pagina=1&ordem=DESC&ordenarPor=siglaUF"
        );
    }

    #[test]
    fn sort_by_from_str() {
        assert_eq!("name".parse::<DeputySortBy>(), Ok(DeputySortBy::Name));
        assert_eq!("siglaPartido".parse::<DeputySortBy>(), Ok(DeputySortBy::Party));
        assert!("volume".parse::<DeputySortBy>().is_err());
    }
}
