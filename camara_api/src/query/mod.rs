mod common;
pub use self::common::{Query, SortDirection};

mod deputy;
pub use self::deputy::{DeputyQuery, DeputySortBy};
