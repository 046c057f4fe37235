use super::column::Column;
use super::{quote_ident, DEFAULT_COLLATION};

/// Definition of a table to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    collation: String,
    primary: Option<String>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            collation: DEFAULT_COLLATION.to_string(),
            primary: None,
        }
    }

    /// Append a column. Render order follows insertion order; duplicate
    /// names are accepted.
    pub fn add_column(mut self, column: impl Into<Column>) -> Self {
        self.columns.push(column.into());
        self
    }

    /// Declare the single primary key column. The name is not checked
    /// against the added columns.
    pub fn define_primary(mut self, column_name: impl Into<String>) -> Self {
        self.primary = Some(column_name.into());
        self
    }

    pub fn set_collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = collation.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn collation(&self) -> &str {
        &self.collation
    }

    pub fn primary(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    /// Whether the primary key, if any, names one of the added columns.
    pub fn primary_is_declared(&self) -> bool {
        match &self.primary {
            Some(primary) => self.columns.iter().any(|c| c.name() == primary),
            None => true,
        }
    }

    /// Render the column list, with the primary key clause last.
    pub fn sqlify_columns(&self) -> String {
        let mut parts: Vec<String> = self.columns.iter().map(Column::sqlify).collect();
        if let Some(ref primary) = self.primary {
            parts.push(format!("PRIMARY KEY ({})", quote_ident(primary)));
        }
        parts.join(", ")
    }

    /// Render the `CREATE TABLE` statement inside `database`.
    pub fn sqlify(&self, database: &str) -> String {
        format!(
            "CREATE TABLE {}.{} ( {} ) COLLATE='{}';",
            quote_ident(database),
            quote_ident(&self.name),
            self.sqlify_columns(),
            self.collation
        )
    }
}
