//! Read-only queries backing the version gate.
//!
//! Both functions expect an established connection. A missing database or a
//! missing version record is a normal answer (`false` / `None`); only a
//! failed query is an error.

use tracing::trace;

use sqlgate_core::error::{GateError, Result};
use sqlgate_core::schema::quote_ident;

use crate::db::{Connection, Row, SqlValue};

/// Table holding key/value settings of a managed database.
pub const CONFIG_TABLE: &str = "config";

/// Key of the stored schema version in [`CONFIG_TABLE`].
pub const SCHEMA_VERSION_KEY: &str = "schemaVersion";

/// Version assumed for an existing database without a version row. Any
/// non-negative target is at or above it, so such databases are skipped.
pub const MISSING_VERSION: i64 = -1;

/// Statement used to look up a database by name.
pub fn database_exists_query(name: &str) -> String {
    // Backslash escapes both the string literal and the LIKE pattern.
    format!(
        "SHOW DATABASES LIKE '{}'",
        name.replace('\\', r"\\\\").replace('\'', "''")
    )
}

/// Statement used to read the stored schema version of `database`.
pub fn schema_version_query(database: &str) -> String {
    format!(
        "SELECT `value` FROM {}.{} WHERE `key`=\"{}\";",
        quote_ident(database),
        quote_ident(CONFIG_TABLE),
        SCHEMA_VERSION_KEY
    )
}

/// Check whether a database named exactly `name` exists.
pub async fn database_exists(conn: &mut dyn Connection, name: &str) -> Result<bool> {
    let rows = conn.query(&database_exists_query(name)).await?;
    trace!(rows = rows.len(), "SHOW DATABASES result");

    // LIKE treats `_` and `%` as wildcards, so compare the returned names.
    Ok(rows
        .iter()
        .filter_map(Row::first)
        .filter_map(SqlValue::as_str)
        .any(|found| found == name))
}

/// Read the stored schema version, `None` when no version row exists.
pub async fn schema_version(conn: &mut dyn Connection, database: &str) -> Result<Option<i64>> {
    let rows = conn.query(&schema_version_query(database)).await?;
    let Some(row) = rows.first() else {
        trace!(database, "no schema version row");
        return Ok(None);
    };
    trace!(database, %row, "schema version row");

    match row.get("value").or_else(|| row.first()) {
        None | Some(SqlValue::Null) => Ok(None),
        Some(value) => value.as_i64().map(Some).ok_or_else(|| {
            GateError::Query(format!(
                "Stored {} of '{}' is not an integer: {}",
                SCHEMA_VERSION_KEY, database, value
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;

    /// Answers every query with the same rows.
    struct FixedRows(Vec<Row>);

    impl Connection for FixedRows {
        fn query<'a>(&'a mut self, _sql: &'a str) -> BoxFuture<'a, Result<Vec<Row>>> {
            let rows = self.0.clone();
            Box::pin(async move { Ok(rows) })
        }
    }

    #[test]
    fn test_queries() {
        assert_eq!(database_exists_query("shop"), "SHOW DATABASES LIKE 'shop'");
        assert_eq!(database_exists_query("o'brien"), "SHOW DATABASES LIKE 'o''brien'");
        assert_eq!(database_exists_query(r"a\"), r"SHOW DATABASES LIKE 'a\\\\'");
        assert_eq!(
            database_exists_query(r"o'b\"),
            r"SHOW DATABASES LIKE 'o''b\\\\'"
        );
        assert_eq!(
            schema_version_query("shop"),
            "SELECT `value` FROM `shop`.`config` WHERE `key`=\"schemaVersion\";"
        );
    }

    #[test]
    fn test_database_exists_exact_match() {
        let mut conn = FixedRows(vec![
            Row::new().with("Database (my_db)", "myxdb"),
            Row::new().with("Database (my_db)", "my_db"),
        ]);
        assert!(tokio_test::block_on(database_exists(&mut conn, "my_db")).unwrap());

        let mut wildcard_only = FixedRows(vec![Row::new().with("Database (my_db)", "myxdb")]);
        assert!(!tokio_test::block_on(database_exists(&mut wildcard_only, "my_db")).unwrap());
    }

    #[test]
    fn test_database_missing() {
        let mut conn = FixedRows(Vec::new());
        assert!(!tokio_test::block_on(database_exists(&mut conn, "shop")).unwrap());
    }

    #[test]
    fn test_schema_version_absent() {
        let mut conn = FixedRows(Vec::new());
        assert_eq!(
            tokio_test::block_on(schema_version(&mut conn, "shop")).unwrap(),
            None
        );

        let mut null = FixedRows(vec![Row::new().with("value", SqlValue::Null)]);
        assert_eq!(
            tokio_test::block_on(schema_version(&mut null, "shop")).unwrap(),
            None
        );
    }

    #[test]
    fn test_schema_version_int_and_text() {
        let mut int = FixedRows(vec![Row::new().with("value", 4i64)]);
        assert_eq!(
            tokio_test::block_on(schema_version(&mut int, "shop")).unwrap(),
            Some(4)
        );

        let mut text = FixedRows(vec![Row::new().with("value", "12")]);
        assert_eq!(
            tokio_test::block_on(schema_version(&mut text, "shop")).unwrap(),
            Some(12)
        );
    }

    #[test]
    fn test_schema_version_not_an_integer() {
        let mut conn = FixedRows(vec![Row::new().with("value", "v2")]);
        let err = tokio_test::block_on(schema_version(&mut conn, "shop")).unwrap_err();
        assert!(matches!(err, GateError::Query(_)));
    }
}
