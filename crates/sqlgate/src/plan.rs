//! TOML description of one migration unit.
//!
//! ```toml
//! schema_version = 1
//!
//! [database]
//! name = "shop"
//! collation = "utf8"
//!
//! [[tables]]
//! name = "users"
//! primary_key = "id"
//!
//! [[tables.columns]]
//! name = "id"
//! type = "char"
//! length = 12
//! ```
//!
//! Statements are queued in file order: the database, each table, then
//! `raw_sql` entries.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use sqlgate_core::config::ConnectionConfig;
use sqlgate_core::error::{GateError, Result};
use sqlgate_core::schema::{Column, ColumnType, Database, Table};
use sqlgate_runtime::{ConnectionProvider, MigrationScript};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationPlan {
    /// Target schema version of this unit.
    pub schema_version: i64,

    pub database: DatabasePlan,

    #[serde(default)]
    pub tables: Vec<TablePlan>,

    /// Statements queued verbatim after the tables.
    #[serde(default)]
    pub raw_sql: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabasePlan {
    pub name: String,
    pub collation: Option<String>,
    /// Skip the creation statement.
    #[serde(default)]
    pub existing: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TablePlan {
    pub name: String,
    pub collation: Option<String>,
    pub primary_key: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnPlan>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnPlan {
    pub name: String,
    #[serde(rename = "type")]
    pub sql_type: Option<String>,
    pub length: Option<u32>,
    /// Raw column body, exclusive with `type`.
    pub custom: Option<String>,
    #[serde(default)]
    pub nullable: bool,
    /// SQL literal, emitted verbatim.
    pub default: Option<String>,
    #[serde(default)]
    pub default_null: bool,
}

impl MigrationPlan {
    /// Load a plan from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GateError::Plan(format!("Failed to read plan {}: {}", path.display(), e))
        })?;
        Self::parse_toml(&content)
    }

    pub fn parse_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| GateError::Plan(format!("Failed to parse plan: {}", e)))
    }

    /// Build the script this plan describes.
    pub fn into_script(
        self,
        config: ConnectionConfig,
        provider: Arc<dyn ConnectionProvider>,
    ) -> Result<MigrationScript> {
        debug!(
            database = %self.database.name,
            tables = self.tables.len(),
            raw = self.raw_sql.len(),
            "Building migration script from plan"
        );
        let mut script = MigrationScript::with_provider(config, self.schema_version, provider)
            .use_database(self.database.into_database());

        for table in self.tables {
            script = script.create_table(table.into_table()?)?;
        }
        for sql in self.raw_sql {
            script = script.add_raw_sql(sql);
        }
        Ok(script)
    }
}

impl DatabasePlan {
    fn into_database(self) -> Database {
        let mut database = Database::new(self.name).from_existing(self.existing);
        if let Some(collation) = self.collation {
            database = database.set_charset(collation);
        }
        database
    }
}

impl TablePlan {
    fn into_table(self) -> Result<Table> {
        let mut table = Table::new(&self.name);
        if let Some(collation) = self.collation {
            table = table.set_collation(collation);
        }
        for column in self.columns {
            table = table.add_column(column.into_column(&self.name)?);
        }
        if let Some(primary) = self.primary_key {
            table = table.define_primary(primary);
        }
        Ok(table)
    }
}

impl ColumnPlan {
    fn into_column(self, table: &str) -> Result<Column> {
        let invalid =
            |msg: &str| GateError::Plan(format!("table '{}', column '{}': {}", table, self.name, msg));

        if self.default.is_some() && self.default_null {
            return Err(invalid("`default` and `default_null` are mutually exclusive"));
        }

        let column = match (&self.sql_type, &self.custom) {
            (Some(sql_type), None) => {
                Column::typed(&self.name, ColumnType::from_name(sql_type), self.length)
            }
            (None, Some(fragment)) => {
                if self.length.is_some() {
                    return Err(invalid("`length` only applies to typed columns"));
                }
                Column::custom(&self.name, fragment)
            }
            (Some(_), Some(_)) => return Err(invalid("set either `type` or `custom`, not both")),
            (None, None) => return Err(invalid("one of `type` or `custom` is required")),
        };

        let column = column.set_nullable(self.nullable);
        Ok(match self.default {
            Some(value) => column.set_default_value(value),
            None if self.default_null => column.set_default_null(),
            None => column,
        })
    }
}
