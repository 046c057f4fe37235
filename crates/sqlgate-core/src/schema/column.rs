use super::quote_ident;
use super::types::ColumnType;

/// Default value of a column.
///
/// `Unset` and `Null` are distinct: the former renders no clause at all,
/// the latter renders `DEFAULT NULL`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DefaultValue {
    #[default]
    Unset,
    Null,
    /// SQL literal, interpolated verbatim.
    Value(String),
}

impl DefaultValue {
    fn to_sql(&self) -> Option<String> {
        match self {
            DefaultValue::Unset => None,
            DefaultValue::Null => Some("DEFAULT NULL".to_string()),
            DefaultValue::Value(v) => Some(format!("DEFAULT {}", v)),
        }
    }
}

/// How a column body is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSpec {
    /// Declared type with an optional length.
    Typed {
        sql_type: ColumnType,
        length: Option<u32>,
    },
    /// Raw fragment emitted after the column name. Type, length,
    /// nullability and default are not rendered for this variant.
    Custom(String),
}

/// Definition of a table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    spec: ColumnSpec,
    default: DefaultValue,
    nullable: bool,
}

impl Column {
    /// Create a typed column. Columns are `NOT NULL` until made nullable.
    pub fn typed(name: impl Into<String>, sql_type: ColumnType, length: Option<u32>) -> Self {
        Self {
            name: name.into(),
            spec: ColumnSpec::Typed { sql_type, length },
            default: DefaultValue::Unset,
            nullable: false,
        }
    }

    /// Create a fixed-length `CHAR(length)` column.
    pub fn char(name: impl Into<String>, length: u32) -> Self {
        Self::typed(name, ColumnType::Char, Some(length))
    }

    /// Create a column whose body is the given SQL fragment.
    pub fn custom(name: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spec: ColumnSpec::Custom(fragment.into()),
            default: DefaultValue::Unset,
            nullable: false,
        }
    }

    /// Set an explicit default. The value is not quoted or escaped; pass a
    /// SQL literal (`"'abc'"`, `"0"`, `"CURRENT_TIMESTAMP"`).
    pub fn set_default_value(mut self, value: impl Into<String>) -> Self {
        self.default = DefaultValue::Value(value.into());
        self
    }

    /// Set the default to `NULL`.
    pub fn set_default_null(mut self) -> Self {
        self.default = DefaultValue::Null;
        self
    }

    /// Remove any default, explicit `NULL` included.
    pub fn unset_default(mut self) -> Self {
        self.default = DefaultValue::Unset;
        self
    }

    pub fn not_null(self) -> Self {
        self.set_nullable(false)
    }

    pub fn nullable(self) -> Self {
        self.set_nullable(true)
    }

    pub fn set_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spec(&self) -> &ColumnSpec {
        &self.spec
    }

    pub fn default_value(&self) -> &DefaultValue {
        &self.default
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Render the column definition fragment used inside `CREATE TABLE`.
    pub fn sqlify(&self) -> String {
        let name = quote_ident(&self.name);
        match &self.spec {
            ColumnSpec::Custom(fragment) => format!("{} {}", name, fragment),
            ColumnSpec::Typed { sql_type, length } => {
                let mut parts = vec![name, sql_type.with_length(*length)];
                parts.push(if self.nullable { "NULL" } else { "NOT NULL" }.to_string());
                if let Some(default) = self.default.to_sql() {
                    parts.push(default);
                }
                parts.join(" ")
            }
        }
    }
}
