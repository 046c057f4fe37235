mod connection;
mod mysql;

pub use connection::{Connection, ConnectionProvider, Row, SqlValue};
pub use mysql::{MySqlProvider, MySqlSession};
