mod client;
mod errors;
mod query;
pub mod types;
mod user_agent;
pub use self::client::{Client, Endpoints};
pub use self::errors::Error;
pub use self::query::{DeputyQuery, DeputySortBy, Query, SortDirection};
