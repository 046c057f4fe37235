use std::str::FromStr;

use futures::future::BoxFuture;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column as _, ConnectOptions, Executor as _, Row as _};
use tracing::debug;

use sqlgate_core::config::ConnectionConfig;
use sqlgate_core::error::{GateError, Result};

use super::connection::{Connection, ConnectionProvider, Row, SqlValue};

/// Opens a single MySQL/MariaDB connection per script. No pooling.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlProvider;

impl MySqlProvider {
    pub fn new() -> Self {
        Self
    }

    async fn connect(config: &ConnectionConfig) -> Result<MySqlSession> {
        config.validate()?;

        let mut options = MySqlConnectOptions::from_str(&config.url)
            .map_err(|e| GateError::Config(format!("Invalid database url: {}", e)))?;
        if !config.log_statements {
            options = options.disable_statement_logging();
        }

        let conn = options
            .connect()
            .await
            .map_err(|e| GateError::Connection(format!("Failed to connect: {}", e)))?;
        debug!("Connection established");

        Ok(MySqlSession { conn })
    }
}

impl ConnectionProvider for MySqlProvider {
    fn acquire<'a>(
        &'a self,
        config: &'a ConnectionConfig,
    ) -> BoxFuture<'a, Result<Box<dyn Connection>>> {
        Box::pin(async move {
            let session = Self::connect(config).await?;
            Ok(Box::new(session) as Box<dyn Connection>)
        })
    }
}

/// A live MySQL connection.
pub struct MySqlSession {
    conn: MySqlConnection,
}

impl Connection for MySqlSession {
    fn query<'a>(&'a mut self, sql: &'a str) -> BoxFuture<'a, Result<Vec<Row>>> {
        Box::pin(async move {
            // Text protocol: DDL and SHOW statements are not all preparable.
            let rows = self.conn.fetch_all(sqlx::raw_sql(sql)).await?;
            Ok(rows.iter().map(convert_row).collect())
        })
    }
}

fn convert_row(row: &MySqlRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .fold(Row::new(), |out, (index, column)| {
            out.with(column.name(), decode_value(row, index))
        })
}

/// Decode a column into the narrow value set the gate needs. Types with no
/// integer or string representation read as NULL.
fn decode_value(row: &MySqlRow, index: usize) -> SqlValue {
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map_or(SqlValue::Null, SqlValue::Int);
    }
    if let Ok(v) = row.try_get::<Option<u64>, _>(index) {
        return match v {
            None => SqlValue::Null,
            Some(v) => i64::try_from(v)
                .map(SqlValue::Int)
                .unwrap_or_else(|_| SqlValue::Text(v.to_string())),
        };
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map_or(SqlValue::Null, SqlValue::Text);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return v.map_or(SqlValue::Null, |bytes| {
            SqlValue::Text(String::from_utf8_lossy(&bytes).into_owned())
        });
    }
    SqlValue::Null
}
