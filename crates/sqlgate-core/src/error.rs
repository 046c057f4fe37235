use thiserror::Error;

/// Core error type for sqlgate operations.
#[derive(Error, Debug)]
pub enum GateError {
    /// The DSL was driven in an order it does not support.
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Plan error: {0}")]
    Plan(String),

    /// Acquiring the connection failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// An introspection query (existence or version lookup) failed.
    #[error("Query error: {0}")]
    Query(String),

    /// A queued statement failed during the run phase. Statements after
    /// `index` were not sent; statements before it were not rolled back.
    #[error("Statement {index} failed: {message} (sql: {sql})")]
    Statement {
        index: usize,
        sql: String,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

impl GateError {
    /// Whether the error was raised before any connection was touched.
    pub fn is_usage(&self) -> bool {
        matches!(self, GateError::Usage(_))
    }
}

/// Result type alias using GateError.
pub type Result<T> = std::result::Result<T, GateError>;
