pub mod db;
pub mod migrations;
pub mod testing;

pub use db::{Connection, ConnectionProvider, MySqlProvider, Row, SqlValue};
pub use migrations::{GateDecision, MigrationOutcome, MigrationScript};
