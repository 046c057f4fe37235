//! Version-gated migration script.
//!
//! A script collects rendered statements eagerly and transmits them only
//! when the gate authorizes it:
//!
//! 1. fail if no database was selected,
//! 2. check whether the database exists,
//! 3. if it does, read its stored schema version ([`MISSING_VERSION`] when
//!    no version row exists),
//! 4. skip when the target version is at or above the stored one, run otherwise,
//! 5. on run, send every queued statement in order on the gate's connection.
//!
//! Running a script against a database it already skipped is a no-op, which
//! makes repeated execution safe.

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use sqlgate_core::config::ConnectionConfig;
use sqlgate_core::error::{GateError, Result};
use sqlgate_core::log::{LogChannel, LogEmitter, LogTarget};
use sqlgate_core::schema::{Database, Table};

use super::introspection::{self, MISSING_VERSION};
use crate::db::{Connection, ConnectionProvider, MySqlProvider};

/// Result of the gate comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Run,
    Skip,
}

impl GateDecision {
    /// Compare the target version with the stored one. `None` means the
    /// database does not exist yet, which is older than any real version.
    pub fn decide(target: i64, current: Option<i64>) -> Self {
        match current {
            Some(current) if target >= current => GateDecision::Skip,
            _ => GateDecision::Run,
        }
    }
}

/// What `execute` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// All queued statements were sent.
    Applied {
        from: Option<i64>,
        to: i64,
        statements: usize,
    },
    /// The gate declined; nothing was sent.
    Skipped { current: i64, target: i64 },
}

impl MigrationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MigrationOutcome::Applied { .. })
    }

    pub fn statements_sent(&self) -> usize {
        match self {
            MigrationOutcome::Applied { statements, .. } => *statements,
            MigrationOutcome::Skipped { .. } => 0,
        }
    }
}

/// One migration unit: a target schema version and its queued statements.
pub struct MigrationScript {
    config: ConnectionConfig,
    provider: Arc<dyn ConnectionProvider>,
    schema_version: i64,
    statements: Vec<String>,
    database: Option<Database>,
    logger: Option<LogEmitter>,
}

impl MigrationScript {
    /// Create a script that connects to MySQL/MariaDB with `config`.
    pub fn new(config: ConnectionConfig, schema_version: i64) -> Self {
        Self::with_provider(config, schema_version, Arc::new(MySqlProvider::new()))
    }

    /// Create a script that obtains its connection from `provider`.
    pub fn with_provider(
        config: ConnectionConfig,
        schema_version: i64,
        provider: Arc<dyn ConnectionProvider>,
    ) -> Self {
        Self {
            config,
            provider,
            schema_version,
            statements: Vec::new(),
            database: None,
            logger: None,
        }
    }

    /// Attach a callback to one log channel, or to every channel with
    /// [`LogTarget::All`]. The emitter is created on first attach.
    pub fn attach_logger<F>(mut self, target: impl Into<LogTarget>, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let target = target.into();
        self.logger
            .get_or_insert_with(LogEmitter::new)
            .subscribe(target, Arc::new(callback));

        let channel = match target {
            LogTarget::Channel(channel) => channel,
            LogTarget::All => LogChannel::Debug,
        };
        self.emit(
            channel,
            &format!("Logging {} events to custom logger.", target),
        );
        self
    }

    /// Select the database for this script and queue its creation, unless
    /// it is marked as pre-existing. Selecting again replaces the selection
    /// but keeps statements already queued.
    pub fn use_database(mut self, database: Database) -> Self {
        if database.already_exists() {
            debug!(database = database.name(), "Using existing database");
        } else {
            self.enqueue(database.sqlify());
        }
        self.database = Some(database);
        self
    }

    /// Queue creation of `table` in the selected database.
    ///
    /// Fails with [`GateError::Usage`] when no database is selected. The
    /// script is consumed either way, so the queue is lost on that error;
    /// check [`database`](Self::database) first when it must survive.
    pub fn create_table(mut self, table: Table) -> Result<Self> {
        let Some(database) = self.database.as_ref() else {
            return Err(GateError::Usage(format!(
                "Please define a database to use before creating table '{}'",
                table.name()
            )));
        };

        if !table.primary_is_declared() {
            warn!(
                table = table.name(),
                primary = table.primary().unwrap_or_default(),
                "Primary key does not name a column of the table"
            );
        }

        let sql = table.sqlify(database.name());
        self.enqueue(sql);
        Ok(self)
    }

    /// Queue a statement verbatim.
    pub fn add_raw_sql(mut self, sql: impl Into<String>) -> Self {
        self.enqueue(sql.into());
        self
    }

    /// Statements queued so far, in transmission order.
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn schema_version(&self) -> i64 {
        self.schema_version
    }

    pub fn database(&self) -> Option<&Database> {
        self.database.as_ref()
    }

    /// Run the version gate and, if it passes, send the queued statements.
    ///
    /// `increase_version` is accepted but not persisted: the stored
    /// schema version is never written by this method.
    pub async fn execute(self, increase_version: bool) -> Result<MigrationOutcome> {
        let Some(database) = self.database.as_ref() else {
            return Err(GateError::Usage("Please define a database to use!".to_string()));
        };
        let name = database.name().to_string();

        let mut conn = self.provider.acquire(&self.config).await?;

        let exists = introspection::database_exists(conn.as_mut(), &name)
            .await
            .map_err(|e| {
                GateError::Query(format!("Failed to check database '{}': {}", name, e))
            })?;
        self.emit(
            LogChannel::Trace,
            &format!("Database '{}' exists: {}", name, exists),
        );

        let current = if exists {
            let version = introspection::schema_version(conn.as_mut(), &name)
                .await
                .map_err(|e| {
                    GateError::Query(format!(
                        "Failed to read schema version of '{}': {}",
                        name, e
                    ))
                })?
                .unwrap_or(MISSING_VERSION);
            self.emit(
                LogChannel::Trace,
                &format!("Stored schema version of '{}': {}", name, version),
            );
            Some(version)
        } else {
            None
        };

        if increase_version {
            debug!("Version increase requested; the stored version is left unchanged");
        }

        match (GateDecision::decide(self.schema_version, current), current) {
            (GateDecision::Skip, Some(current)) => {
                let message = format!(
                    "Not executing migration script to version '{}', database '{}' is at version '{}'.",
                    self.schema_version, name, current
                );
                info!("{}", message);
                self.emit(LogChannel::Debug, &message);
                Ok(MigrationOutcome::Skipped {
                    current,
                    target: self.schema_version,
                })
            }
            _ => {
                let message = format!(
                    "Starting database migration of '{}' from version '{}' to version '{}'.",
                    name,
                    describe(current),
                    self.schema_version
                );
                info!("{}", message);
                self.emit(LogChannel::Debug, &message);

                let sent = self.run_statements(conn.as_mut()).await?;
                info!(statements = sent, "Migration applied");
                Ok(MigrationOutcome::Applied {
                    from: current,
                    to: self.schema_version,
                    statements: sent,
                })
            }
        }
    }

    /// Send every queued statement, stopping at the first failure. Statements
    /// already sent stay applied.
    async fn run_statements(&self, conn: &mut dyn Connection) -> Result<usize> {
        for (index, sql) in self.statements.iter().enumerate() {
            trace!(index, sql = %sql, "Sending statement");
            let rows = conn
                .query(sql)
                .await
                .map_err(|e| GateError::Statement {
                    index,
                    sql: sql.clone(),
                    message: e.to_string(),
                })?;
            if !rows.is_empty() {
                self.emit(
                    LogChannel::Trace,
                    &format!("Statement {} returned {} row(s)", index, rows.len()),
                );
            }
        }
        Ok(self.statements.len())
    }

    fn enqueue(&mut self, sql: String) {
        trace!(sql = %sql, "Queueing statement");
        self.emit(
            LogChannel::Trace,
            &format!("Adding SQL statement to queue: {}", sql),
        );
        self.statements.push(sql);
    }

    /// Forward to the attached sink, if any.
    fn emit(&self, channel: LogChannel, message: &str) {
        if let Some(ref logger) = self.logger {
            logger.emit(channel, message);
        }
    }
}

impl std::fmt::Debug for MigrationScript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationScript")
            .field("schema_version", &self.schema_version)
            .field("database", &self.database.as_ref().map(Database::name))
            .field("statements", &self.statements.len())
            .field("logger", &self.logger)
            .finish()
    }
}

fn describe(version: Option<i64>) -> String {
    version.map_or_else(|| "none".to_string(), |v| v.to_string())
}
