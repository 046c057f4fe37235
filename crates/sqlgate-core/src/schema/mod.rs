mod column;
mod database;
mod table;
mod types;

pub use column::{Column, ColumnSpec, DefaultValue};
pub use database::Database;
pub use table::Table;
pub use types::ColumnType;

/// Collation used by tables and databases unless overridden.
pub const DEFAULT_COLLATION: &str = "utf8_general_ci";

/// Quote an identifier with backticks, doubling any embedded backtick.
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}
