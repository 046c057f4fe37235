use std::sync::{Arc, Mutex};

use sqlgate_core::config::ConnectionConfig;
use sqlgate_core::error::GateError;
use sqlgate_core::log::{LogChannel, LogTarget};
use sqlgate_core::schema::{Column, Database, Table};
use sqlgate_runtime::migrations::introspection::MISSING_VERSION;
use sqlgate_runtime::testing::MockDatabase;
use sqlgate_runtime::{MigrationOutcome, MigrationScript};

fn shop_script(mock: &MockDatabase, version: i64) -> MigrationScript {
    MigrationScript::with_provider(ConnectionConfig::default(), version, mock.provider())
        .use_database(Database::new("shop").set_charset("utf8"))
        .create_table(
            Table::new("users")
                .add_column(Column::char("id", 12).not_null())
                .define_primary("id"),
        )
        .unwrap()
}

#[test]
fn test_shop_scenario_enqueues_two_statements() {
    let mock = MockDatabase::new();
    let script = shop_script(&mock, 0);

    assert_eq!(
        script.statements(),
        [
            "CREATE DATABASE IF NOT EXISTS `shop` /*!40100 COLLATE 'utf8' */;",
            "CREATE TABLE `shop`.`users` ( `id` CHAR(12) NOT NULL, PRIMARY KEY (`id`) ) COLLATE='utf8_general_ci';",
        ]
    );
    // Building a script never touches the connection.
    assert_eq!(mock.acquisitions(), 0);
    assert!(mock.queries().is_empty());
}

#[tokio::test]
async fn test_missing_database_runs_everything() {
    let mock = MockDatabase::new();
    let outcome = shop_script(&mock, 1).execute(true).await.unwrap();

    assert_eq!(
        outcome,
        MigrationOutcome::Applied {
            from: None,
            to: 1,
            statements: 2
        }
    );
    assert_eq!(
        mock.queries(),
        vec![
            "SHOW DATABASES LIKE 'shop'".to_string(),
            "CREATE DATABASE IF NOT EXISTS `shop` /*!40100 COLLATE 'utf8' */;".to_string(),
            "CREATE TABLE `shop`.`users` ( `id` CHAR(12) NOT NULL, PRIMARY KEY (`id`) ) COLLATE='utf8_general_ci';".to_string(),
        ]
    );
    assert_eq!(mock.acquisitions(), 1);
    assert!(mock.has_database("shop"));
}

#[tokio::test]
async fn test_repeated_execution_is_idempotent() {
    let mock = MockDatabase::new().with_database("shop", Some(5));

    for _ in 0..2 {
        let outcome = shop_script(&mock, 5).execute(true).await.unwrap();
        assert_eq!(
            outcome,
            MigrationOutcome::Skipped {
                current: 5,
                target: 5
            }
        );
    }
    assert!(mock.statements().is_empty());
}

#[tokio::test]
async fn test_statements_transmit_only_below_stored_version() {
    for stored in 0..=3 {
        for target in 0..=3 {
            let mock = MockDatabase::new().with_database("shop", Some(stored));
            let outcome = shop_script(&mock, target).execute(false).await.unwrap();

            let sent = mock.statements().len();
            if target < stored {
                assert!(outcome.is_applied());
                assert_eq!(sent, 2, "t={} s={}", target, stored);
            } else {
                assert!(!outcome.is_applied());
                assert_eq!(sent, 0, "t={} s={}", target, stored);
            }
            assert_eq!(outcome.statements_sent(), sent);
        }
    }
}

#[tokio::test]
async fn test_existing_database_without_version_row_is_skipped() {
    let mock = MockDatabase::new().with_database("shop", None);
    let outcome = shop_script(&mock, 0).execute(true).await.unwrap();

    assert_eq!(
        outcome,
        MigrationOutcome::Skipped {
            current: MISSING_VERSION,
            target: 0
        }
    );
    assert_eq!(mock.queries().len(), 2);
    assert!(mock.queries()[1].starts_with("SELECT `value` FROM `shop`.`config`"));
    assert!(mock.statements().is_empty());
}

#[tokio::test]
async fn test_missing_version_row_compares_like_a_stored_version() {
    let mock = MockDatabase::new().with_database("shop", None);
    let outcome = shop_script(&mock, MISSING_VERSION - 1)
        .execute(true)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        MigrationOutcome::Applied {
            from: Some(MISSING_VERSION),
            to: MISSING_VERSION - 1,
            statements: 2
        }
    );
    assert_eq!(mock.statements().len(), 2);
}

#[tokio::test]
async fn test_escaped_database_name_round_trips() {
    let mock = MockDatabase::new().with_database(r"a\", Some(3));
    let outcome = MigrationScript::with_provider(ConnectionConfig::default(), 3, mock.provider())
        .use_database(Database::new(r"a\"))
        .execute(true)
        .await
        .unwrap();

    assert!(!outcome.is_applied());
    assert_eq!(mock.queries()[0], r"SHOW DATABASES LIKE 'a\\\\'");
}

#[tokio::test]
async fn test_first_failure_aborts_remaining_statements() {
    let mock = MockDatabase::new().fail_on("CREATE TABLE `shop`.`users`");
    let err = shop_script(&mock, 0)
        .add_raw_sql("INSERT INTO `shop`.`users` (`id`) VALUES ('a');")
        .execute(true)
        .await
        .unwrap_err();

    match err {
        GateError::Statement { index, sql, .. } => {
            assert_eq!(index, 1);
            assert!(sql.starts_with("CREATE TABLE"));
        }
        other => panic!("unexpected error: {}", other),
    }
    // The database statement stays applied, the insert is never sent.
    assert_eq!(mock.statements().len(), 2);
    assert!(mock.has_database("shop"));
    assert!(!mock.queries().iter().any(|q| q.starts_with("INSERT")));
}

#[tokio::test]
async fn test_connection_failure_propagates() {
    let mock = MockDatabase::new().refuse_connections();
    let err = shop_script(&mock, 0).execute(true).await.unwrap_err();
    assert!(matches!(err, GateError::Connection(_)));
    assert!(mock.queries().is_empty());
}

#[tokio::test]
async fn test_existence_query_failure_is_not_absence() {
    let mock = MockDatabase::new().fail_on("SHOW DATABASES");
    let err = shop_script(&mock, 0).execute(true).await.unwrap_err();
    assert!(matches!(err, GateError::Query(_)));
    assert!(mock.statements().is_empty());
}

#[tokio::test]
async fn test_version_query_failure_propagates() {
    let mock = MockDatabase::new()
        .with_database("shop", Some(1))
        .fail_on("`config`");
    let err = shop_script(&mock, 0).execute(true).await.unwrap_err();
    assert!(err.to_string().contains("Failed to read schema version of 'shop'"));
    assert!(mock.statements().is_empty());
}

#[tokio::test]
async fn test_increase_version_does_not_write() {
    let mock = MockDatabase::new().with_database("shop", Some(2));
    shop_script(&mock, 1).execute(true).await.unwrap();

    assert!(!mock
        .queries()
        .iter()
        .any(|q| q.contains("`config`") && !q.starts_with("SELECT")));
}

#[tokio::test]
async fn test_logger_observes_gate_decisions() {
    let messages = Arc::new(Mutex::new(Vec::new()));
    let m = Arc::clone(&messages);

    let mock = MockDatabase::new().with_database("shop", Some(3));
    let outcome = MigrationScript::with_provider(ConnectionConfig::default(), 3, mock.provider())
        .attach_logger(LogChannel::Debug, move |msg| {
            m.lock().unwrap().push(msg.to_string())
        })
        .use_database(Database::new("shop"))
        .execute(true)
        .await
        .unwrap();

    assert!(!outcome.is_applied());
    let messages = messages.lock().unwrap();
    assert_eq!(messages.len(), 2);
    assert!(messages[1].starts_with("Not executing migration script to version '3'"));
}

#[tokio::test]
async fn test_panicking_logger_does_not_fail_execute() {
    let mock = MockDatabase::new();
    let outcome = MigrationScript::with_provider(ConnectionConfig::default(), 0, mock.provider())
        .attach_logger(LogTarget::All, |msg| {
            if msg.starts_with("Starting") {
                panic!("sink is broken");
            }
        })
        .use_database(Database::new("shop"))
        .execute(true)
        .await
        .unwrap();

    assert!(outcome.is_applied());
    assert_eq!(mock.statements().len(), 1);
}
