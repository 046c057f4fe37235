/// MySQL/MariaDB column types understood by typed columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    /// Fixed-length string
    Char,
    /// Variable-length string
    Varchar,
    /// 8-bit integer
    TinyInt,
    /// 32-bit integer
    Int,
    /// 64-bit integer
    BigInt,
    /// Unlimited text
    Text,
    /// Date and time without timezone
    DateTime,
    /// Any other type keyword, emitted verbatim
    Other(String),
}

impl ColumnType {
    /// Parse a type keyword, case-insensitively. Unknown keywords are kept
    /// verbatim as `Other`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "char" => ColumnType::Char,
            "varchar" => ColumnType::Varchar,
            "tinyint" => ColumnType::TinyInt,
            "int" | "integer" => ColumnType::Int,
            "bigint" => ColumnType::BigInt,
            "text" => ColumnType::Text,
            "datetime" => ColumnType::DateTime,
            _ => ColumnType::Other(name.trim().to_string()),
        }
    }

    /// The SQL type keyword.
    pub fn to_sql(&self) -> &str {
        match self {
            ColumnType::Char => "CHAR",
            ColumnType::Varchar => "VARCHAR",
            ColumnType::TinyInt => "TINYINT",
            ColumnType::Int => "INT",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Text => "TEXT",
            ColumnType::DateTime => "DATETIME",
            ColumnType::Other(keyword) => keyword,
        }
    }

    /// Render the type with an optional length, e.g. `CHAR(12)`.
    pub fn with_length(&self, length: Option<u32>) -> String {
        match length {
            Some(len) => format!("{}({})", self.to_sql(), len),
            None => self.to_sql().to_string(),
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_sql())
    }
}
