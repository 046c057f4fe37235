use super::{quote_ident, DEFAULT_COLLATION};

/// A database (schema) to create or reuse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    name: String,
    collation: String,
    already_exists: bool,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collation: DEFAULT_COLLATION.to_string(),
            already_exists: false,
        }
    }

    /// Mark the database as pre-existing. A script selecting it will not
    /// enqueue a creation statement.
    pub fn from_existing(mut self, already_exists: bool) -> Self {
        self.already_exists = already_exists;
        self
    }

    /// Set the collation used when creating the database.
    pub fn set_charset(mut self, collation: impl Into<String>) -> Self {
        self.collation = collation.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn collation(&self) -> &str {
        &self.collation
    }

    pub fn already_exists(&self) -> bool {
        self.already_exists
    }

    /// Render the `CREATE DATABASE IF NOT EXISTS` statement. The output does
    /// not depend on `already_exists`.
    pub fn sqlify(&self) -> String {
        format!(
            "CREATE DATABASE IF NOT EXISTS {} /*!40100 COLLATE '{}' */;",
            quote_ident(&self.name),
            self.collation
        )
    }
}
