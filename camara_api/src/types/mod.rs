mod meta;
pub use self::meta::{Link, Response};

mod legislature;
pub use self::legislature::{Legislature, LegislatureID};

mod deputy;
pub use self::deputy::{Deputy, DeputyDetail, DeputyID, DeputyStatus};
