pub(crate) mod conn;

pub use self::conn::{Connection, ConnectionInfo, Transport};
pub(crate) use self::conn::{next_request_id, Command};
