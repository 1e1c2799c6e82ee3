use super::*;
use crate::testing::MockDatabase;
use dock_core::migration::Probe;
use dock_db::DuckDbBackend;
use std::path::PathBuf;

const LEDGER: &str = "dockhand_migrations";

fn migration(id: &str, sql: &str, probes: Vec<Probe>) -> Migration {
    Migration {
        id: MigrationId::new(id),
        path: PathBuf::from(format!("{}.sql", id)),
        sql: sql.to_string(),
        description: None,
        probes,
    }
}

#[tokio::test]
async fn test_apply_executes_and_records() {
    let db = DuckDbBackend::in_memory().unwrap();
    let executor = MigrationExecutor::new(&db, LEDGER);

    let m = migration(
        "0001_users",
        "CREATE TABLE users (id INT); INSERT INTO users VALUES (1);",
        vec![Probe::Table("users".to_string())],
    );

    let outcome = executor.apply(&m).await.unwrap();
    assert_eq!(outcome.status, MigrationStatus::Applied);
    assert_eq!(outcome.warnings().count(), 0);

    assert!(db.table_exists("users").await.unwrap());
    assert!(executor.ledger().has_applied("0001_users").await.unwrap());
}

#[tokio::test]
async fn test_second_apply_is_a_noop() {
    let db = DuckDbBackend::in_memory().unwrap();
    let executor = MigrationExecutor::new(&db, LEDGER);

    let m = migration(
        "0001_users",
        "CREATE TABLE users (id INT); INSERT INTO users VALUES (1);",
        vec![],
    );

    let first = executor.apply(&m).await.unwrap();
    assert_eq!(first.status, MigrationStatus::Applied);

    let second = executor.apply(&m).await.unwrap();
    assert_eq!(second.status, MigrationStatus::Skipped);

    // payload ran once: one row, one ledger entry
    assert_eq!(db.count_rows("users").await.unwrap(), 1);
    assert_eq!(executor.ledger().entries().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_failure_records_and_retry_succeeds() {
    let db = DuckDbBackend::in_memory().unwrap();
    let executor = MigrationExecutor::new(&db, LEDGER);

    let broken = migration("0001_users", "CREATE TABEL users (id INT);", vec![]);
    let result = executor.apply(&broken).await;
    match result {
        Err(RunError::Migration { id, .. }) => assert_eq!(id, "0001_users"),
        other => panic!("expected Migration error, got {:?}", other.map(|_| ())),
    }

    let entries = executor.ledger().entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].outcome, "failed");
    assert!(entries[0].error.is_some());

    // operator fixes the script and re-invokes with the same identifier
    let fixed = migration("0001_users", "CREATE TABLE users (id INT);", vec![]);
    let outcome = executor.apply(&fixed).await.unwrap();
    assert_eq!(outcome.status, MigrationStatus::Applied);

    let entries = executor.ledger().entries().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert!(executor.ledger().has_applied("0001_users").await.unwrap());
}

#[tokio::test]
async fn test_failed_payload_rolls_back_with_ledger_write() {
    let db = DuckDbBackend::in_memory().unwrap();
    let executor = MigrationExecutor::new(&db, LEDGER);

    // first statement would succeed, second fails: both must vanish
    let m = migration(
        "0001_bad",
        "CREATE TABLE half_done (id INT); INSERT INTO missing_table VALUES (1);",
        vec![],
    );

    assert!(executor.apply(&m).await.is_err());
    assert!(!db.table_exists("half_done").await.unwrap());
    assert!(!executor.ledger().has_applied("0001_bad").await.unwrap());
}

#[tokio::test]
async fn test_failed_probe_is_a_warning_not_an_error() {
    let db = DuckDbBackend::in_memory().unwrap();
    let executor = MigrationExecutor::new(&db, LEDGER);

    let m = migration(
        "0001_users",
        "CREATE TABLE users (id INT);",
        vec![Probe::Table("some_other_table".to_string())],
    );

    // the migration committed; the broken probe only warns
    let outcome = executor.apply(&m).await.unwrap();
    assert_eq!(outcome.status, MigrationStatus::Applied);
    assert_eq!(outcome.warnings().count(), 1);
    assert!(db.table_exists("users").await.unwrap());
    assert!(executor.ledger().has_applied("0001_users").await.unwrap());
}

#[tokio::test]
async fn test_apply_all_stops_at_first_failure() {
    let db = DuckDbBackend::in_memory().unwrap();
    let executor = MigrationExecutor::new(&db, LEDGER);

    let migrations = vec![
        migration("0001_a", "CREATE TABLE a (id INT);", vec![]),
        migration("0002_b", "CREATE TABEL b (id INT);", vec![]),
        migration("0003_c", "CREATE TABLE c (id INT);", vec![]),
    ];

    let report = executor.apply_all(&migrations).await.unwrap();

    assert!(report.stopped_early);
    assert_eq!(report.applied(), 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.outcomes.len(), 2);
    // the third migration never ran
    assert!(!db.table_exists("c").await.unwrap());
}

#[tokio::test]
async fn test_no_transactional_ddl_repairs_ledger_from_probes() {
    // the migration was applied earlier but its ledger write was lost
    let db = MockDatabase::without_transactional_ddl().with_table("users", 0);
    let executor = MigrationExecutor::new(&db, LEDGER);

    let payload = "CREATE TABLE users (id INT)";
    let m = migration(
        "0001_users",
        payload,
        vec![Probe::Table("users".to_string())],
    );

    let outcome = executor.apply(&m).await.unwrap();
    assert_eq!(outcome.status, MigrationStatus::Skipped);

    // the payload never re-executed; only the ledger repair was written
    let calls = db.calls();
    assert!(!calls.iter().any(|c| c.contains(payload)));
    assert!(calls
        .iter()
        .any(|c| c.starts_with("execute: INSERT INTO") && c.contains("success")));
}

#[tokio::test]
async fn test_no_transactional_ddl_executes_then_records() {
    let db = MockDatabase::without_transactional_ddl();
    let executor = MigrationExecutor::new(&db, LEDGER);

    let payload = "CREATE TABLE trips (id INT)";
    let m = migration("0002_trips", payload, vec![]);

    let outcome = executor.apply(&m).await.unwrap();
    assert_eq!(outcome.status, MigrationStatus::Applied);

    let calls = db.calls();
    let payload_pos = calls
        .iter()
        .position(|c| c.starts_with("execute_batch") && c.contains(payload))
        .expect("payload executed");
    let record_pos = calls
        .iter()
        .position(|c| c.starts_with("execute: INSERT INTO") && c.contains("success"))
        .expect("ledger recorded");
    assert!(payload_pos < record_pos);
}
