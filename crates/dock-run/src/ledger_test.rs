use super::*;
use dock_db::DuckDbBackend;

#[tokio::test]
async fn test_ensure_table_is_idempotent() {
    let db = DuckDbBackend::in_memory().unwrap();
    let ledger = Ledger::new(&db, "dockhand_migrations");

    ledger.ensure_table().await.unwrap();
    ledger.ensure_table().await.unwrap();

    assert!(db.table_exists("dockhand_migrations").await.unwrap());
}

#[tokio::test]
async fn test_record_and_has_applied() {
    let db = DuckDbBackend::in_memory().unwrap();
    let ledger = Ledger::new(&db, "dockhand_migrations");
    ledger.ensure_table().await.unwrap();

    assert!(!ledger.has_applied("0001_init").await.unwrap());

    ledger
        .record("0001_init", LedgerOutcome::Success, None)
        .await
        .unwrap();

    assert!(ledger.has_applied("0001_init").await.unwrap());
    assert!(!ledger.has_applied("0002_other").await.unwrap());
}

#[tokio::test]
async fn test_failed_entry_does_not_count_as_applied() {
    let db = DuckDbBackend::in_memory().unwrap();
    let ledger = Ledger::new(&db, "dockhand_migrations");
    ledger.ensure_table().await.unwrap();

    ledger
        .record("0001_init", LedgerOutcome::Failed, Some("syntax error"))
        .await
        .unwrap();

    assert!(!ledger.has_applied("0001_init").await.unwrap());
}

#[tokio::test]
async fn test_retry_appends_instead_of_mutating() {
    let db = DuckDbBackend::in_memory().unwrap();
    let ledger = Ledger::new(&db, "dockhand_migrations");
    ledger.ensure_table().await.unwrap();

    ledger
        .record("0001_init", LedgerOutcome::Failed, Some("first attempt"))
        .await
        .unwrap();
    ledger
        .record("0001_init", LedgerOutcome::Success, None)
        .await
        .unwrap();

    let entries = ledger.entries().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert!(ledger.has_applied("0001_init").await.unwrap());

    let failed = entries.iter().find(|e| e.outcome == "failed").unwrap();
    assert_eq!(failed.error.as_deref(), Some("first attempt"));
    let success = entries.iter().find(|e| e.outcome == "success").unwrap();
    assert!(success.error.is_none());
}

#[tokio::test]
async fn test_applied_ids_deduplicates() {
    let db = DuckDbBackend::in_memory().unwrap();
    let ledger = Ledger::new(&db, "dockhand_migrations");
    ledger.ensure_table().await.unwrap();

    ledger
        .record("0002_b", LedgerOutcome::Success, None)
        .await
        .unwrap();
    ledger
        .record("0001_a", LedgerOutcome::Success, None)
        .await
        .unwrap();
    ledger
        .record("0001_a", LedgerOutcome::Success, None)
        .await
        .unwrap();
    ledger
        .record("0003_c", LedgerOutcome::Failed, Some("nope"))
        .await
        .unwrap();

    let ids = ledger.applied_ids().await.unwrap();
    assert_eq!(ids, vec!["0001_a".to_string(), "0002_b".to_string()]);
}

#[tokio::test]
async fn test_record_sql_escapes_quotes() {
    let db = DuckDbBackend::in_memory().unwrap();
    let ledger = Ledger::new(&db, "dockhand_migrations");
    ledger.ensure_table().await.unwrap();

    // error detail containing quotes must survive the round trip
    ledger
        .record(
            "0001_init",
            LedgerOutcome::Failed,
            Some("syntax error near 'users'"),
        )
        .await
        .unwrap();

    let entries = ledger.entries().await.unwrap();
    assert_eq!(
        entries[0].error.as_deref(),
        Some("syntax error near 'users'")
    );
}
