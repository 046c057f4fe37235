pub mod config;
pub mod error;
pub mod log;
pub mod schema;

pub use config::{ConnectionConfig, GateConfig, LoggingConfig};
pub use error::{GateError, Result};
pub use log::{LogCallback, LogChannel, LogEmitter, LogTarget};
pub use schema::{Column, ColumnSpec, ColumnType, Database, DefaultValue, Table};
