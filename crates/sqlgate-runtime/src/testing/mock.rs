//! In-memory connection provider for testing migration scripts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::BoxFuture;

use sqlgate_core::config::ConnectionConfig;
use sqlgate_core::error::{GateError, Result};

use crate::db::{Connection, ConnectionProvider, Row};

const SHOW_DATABASES: &str = "SHOW DATABASES LIKE '";
const SELECT_VERSION: &str = "SELECT `value` FROM `";
const CREATE_DATABASE: &str = "CREATE DATABASE IF NOT EXISTS `";

#[derive(Debug, Default)]
struct MockState {
    /// Database name to stored schema version.
    databases: HashMap<String, Option<i64>>,
    queries: Vec<String>,
    acquisitions: usize,
    fail_on: Vec<String>,
    refuse_connections: bool,
}

/// A fake MySQL server.
///
/// Answers the gate's introspection queries from its configured databases,
/// records every query it receives, and creates a database (without a
/// version) when it sees `CREATE DATABASE IF NOT EXISTS`.
#[derive(Debug, Clone, Default)]
pub struct MockDatabase {
    state: Arc<Mutex<MockState>>,
}

impl MockDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a database with an optional stored schema version.
    pub fn with_database(self, name: &str, version: Option<i64>) -> Self {
        self.lock().databases.insert(name.to_string(), version);
        self
    }

    /// Fail any query containing `fragment`.
    pub fn fail_on(self, fragment: &str) -> Self {
        self.lock().fail_on.push(fragment.to_string());
        self
    }

    /// Refuse to hand out connections.
    pub fn refuse_connections(self) -> Self {
        self.lock().refuse_connections = true;
        self
    }

    /// This mock as a provider for `MigrationScript::with_provider`.
    pub fn provider(&self) -> Arc<dyn ConnectionProvider> {
        Arc::new(self.clone())
    }

    /// Every query received, in order.
    pub fn queries(&self) -> Vec<String> {
        self.lock().queries.clone()
    }

    /// Received queries other than the gate's introspection queries.
    pub fn statements(&self) -> Vec<String> {
        self.lock()
            .queries
            .iter()
            .filter(|q| !is_introspection(q))
            .cloned()
            .collect()
    }

    pub fn acquisitions(&self) -> usize {
        self.lock().acquisitions
    }

    pub fn has_database(&self, name: &str) -> bool {
        self.lock().databases.contains_key(name)
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ConnectionProvider for MockDatabase {
    fn acquire<'a>(
        &'a self,
        _config: &'a ConnectionConfig,
    ) -> BoxFuture<'a, Result<Box<dyn Connection>>> {
        let result = {
            let mut state = self.lock();
            if state.refuse_connections {
                Err(GateError::Connection(
                    "Failed to connect: mock refused connection".to_string(),
                ))
            } else {
                state.acquisitions += 1;
                Ok(Box::new(MockConnection {
                    state: Arc::clone(&self.state),
                }) as Box<dyn Connection>)
            }
        };
        Box::pin(async move { result })
    }
}

struct MockConnection {
    state: Arc<Mutex<MockState>>,
}

impl Connection for MockConnection {
    fn query<'a>(&'a mut self, sql: &'a str) -> BoxFuture<'a, Result<Vec<Row>>> {
        let result = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            answer(&mut state, sql)
        };
        Box::pin(async move { result })
    }
}

fn answer(state: &mut MockState, sql: &str) -> Result<Vec<Row>> {
    state.queries.push(sql.to_string());

    if state.fail_on.iter().any(|fragment| sql.contains(fragment)) {
        return Err(GateError::Sql(sqlx::Error::Protocol(format!(
            "mock failure for: {}",
            sql
        ))));
    }

    if let Some(name) = quoted_after(sql, SHOW_DATABASES, "'") {
        let name = name.replace("''", "'").replace(r"\\\\", r"\");
        let rows = if state.databases.contains_key(&name) {
            vec![Row::new().with(format!("Database ({})", name), name.as_str())]
        } else {
            Vec::new()
        };
        return Ok(rows);
    }

    if let Some(name) = quoted_after(sql, SELECT_VERSION, "`") {
        return match state.databases.get(name) {
            Some(Some(version)) => Ok(vec![Row::new().with("value", *version)]),
            Some(None) => Ok(Vec::new()),
            None => Err(GateError::Sql(sqlx::Error::Protocol(format!(
                "Unknown database '{}'",
                name
            )))),
        };
    }

    if let Some(name) = quoted_after(sql, CREATE_DATABASE, "`") {
        state.databases.entry(name.to_string()).or_insert(None);
    }

    Ok(Vec::new())
}

/// The text between `prefix` and the next `close`, when `sql` starts with `prefix`.
fn quoted_after<'a>(sql: &'a str, prefix: &str, close: &str) -> Option<&'a str> {
    let rest = sql.strip_prefix(prefix)?;
    // Skip doubled quotes inside the name.
    let mut offset = 0;
    loop {
        let end = offset + rest[offset..].find(close)?;
        if rest[end + close.len()..].starts_with(close) {
            offset = end + 2 * close.len();
            continue;
        }
        return Some(&rest[..end]);
    }
}

fn is_introspection(sql: &str) -> bool {
    sql.starts_with(SHOW_DATABASES) || sql.starts_with(SELECT_VERSION)
}
