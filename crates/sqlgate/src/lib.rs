//! sqlgate: build MySQL/MariaDB schemas in code and apply them behind a
//! schema-version gate.
//!
//! ```ignore
//! use sqlgate::prelude::*;
//!
//! let outcome = MigrationScript::new(ConnectionConfig::from_url(url), 0)
//!     .use_database(Database::new("shop").set_charset("utf8"))
//!     .create_table(
//!         Table::new("users")
//!             .add_column(Column::char("id", 12).not_null())
//!             .define_primary("id"),
//!     )?
//!     .execute(true)
//!     .await?;
//! ```

pub mod plan;

pub use sqlgate_core::{config, error, log, schema};
pub use sqlgate_runtime::{db, migrations, testing};

pub use plan::MigrationPlan;

/// Everything needed to write a migration script.
pub mod prelude {
    pub use sqlgate_core::{
        Column, ColumnType, ConnectionConfig, Database, GateError, LogChannel, LogTarget, Result,
        Table,
    };
    pub use sqlgate_runtime::{MigrationOutcome, MigrationScript};
}
