use super::*;
use crate::testing::MockDatabase;
use dock_core::TableName;
use dock_db::DuckDbBackend;
use serde_json::json;

fn table_config(name: &str, deps: &[&str]) -> TableConfig {
    TableConfig {
        name: TableName::new(name),
        depends_on: deps.iter().map(|d| TableName::new(*d)).collect(),
    }
}

fn dump_with(tables: &[(&str, usize)]) -> Dump {
    let mut dump = Dump::new("mock");
    for (name, rows) in tables {
        dump.insert_table(
            *name,
            TableDump {
                columns: vec!["id".to_string()],
                rows: (0..*rows).map(|i| vec![json!(i as i64)]).collect(),
            },
        );
    }
    dump
}

#[tokio::test]
async fn test_round_trip_preserves_counts_and_foreign_keys() {
    let schema = "
        CREATE TABLE users (id INTEGER PRIMARY KEY, name VARCHAR);
        CREATE TABLE trips (id INTEGER PRIMARY KEY, user_id INTEGER REFERENCES users(id));
        CREATE TABLE tags (id INTEGER PRIMARY KEY, label VARCHAR);
    ";

    let source = DuckDbBackend::in_memory().unwrap();
    source.execute_batch(schema).await.unwrap();
    source
        .execute_batch(
            "INSERT INTO users VALUES (1, 'alice'), (2, 'bob');
             INSERT INTO trips VALUES (10, 1), (11, 1), (12, 2), (13, 2), (14, 1);",
        )
        .await
        .unwrap();

    let tables = vec![
        table_config("users", &[]),
        table_config("trips", &["users"]),
        table_config("tags", &[]),
    ];
    let plan = TransferPlan::from_tables(&tables).unwrap();

    let dump = export(&source, &plan).await.unwrap();
    assert_eq!(dump.table("users").unwrap().row_count(), 2);
    assert_eq!(dump.table("trips").unwrap().row_count(), 5);
    assert_eq!(dump.table("tags").unwrap().row_count(), 0);

    // import into an empty target with real foreign-key constraints: the
    // insert order itself is what keeps the constraints satisfied
    let target = DuckDbBackend::in_memory().unwrap();
    target.execute_batch(schema).await.unwrap();

    let report = import(&target, &plan, &dump, &ImportOptions::default())
        .await
        .unwrap();

    assert!(report.is_clean());
    assert_eq!(report.total_inserted(), 7);
    assert_eq!(target.count_rows("users").await.unwrap(), 2);
    assert_eq!(target.count_rows("trips").await.unwrap(), 5);
    assert_eq!(target.count_rows("tags").await.unwrap(), 0);

    let orphans = target
        .query_count(
            "SELECT * FROM trips t LEFT JOIN users u ON t.user_id = u.id WHERE u.id IS NULL",
        )
        .await
        .unwrap();
    assert_eq!(orphans, 0);
}

#[tokio::test]
async fn test_delete_children_first_insert_parents_first() {
    let db = MockDatabase::new()
        .with_table("users", 1)
        .with_table("trips", 1);
    let tables = vec![table_config("users", &[]), table_config("trips", &["users"])];
    let dump = dump_with(&[("users", 2), ("trips", 3)]);

    replace(&db, &tables, &dump, &ImportOptions::default())
        .await
        .unwrap();

    let calls = db.destructive_calls();
    let pos = |needle: &str| {
        calls
            .iter()
            .position(|c| c.starts_with(needle))
            .unwrap_or_else(|| panic!("call '{}' not found in {:?}", needle, calls))
    };

    assert!(pos("delete_all: trips") < pos("delete_all: users"));
    assert!(pos("delete_all: users") < pos("insert_rows: users"));
    assert!(pos("insert_rows: users") < pos("insert_rows: trips"));
}

#[tokio::test]
async fn test_cycle_detected_before_any_database_call() {
    let db = MockDatabase::new();
    let tables = vec![table_config("a", &["b"]), table_config("b", &["a"])];
    let dump = dump_with(&[("a", 1), ("b", 1)]);

    let result = replace(&db, &tables, &dump, &ImportOptions::default()).await;

    assert!(matches!(
        result,
        Err(RunError::Core(
            dock_core::CoreError::CircularDependency { .. }
        ))
    ));
    assert!(db.calls().is_empty());
}

#[tokio::test]
async fn test_missing_table_fails_before_deletes() {
    let db = MockDatabase::new().with_table("users", 3);
    let tables = vec![table_config("users", &[]), table_config("trips", &["users"])];
    let dump = dump_with(&[("users", 1)]); // trips missing

    let result = replace(&db, &tables, &dump, &ImportOptions::default()).await;

    match result {
        Err(RunError::MissingData { table }) => assert_eq!(table, "trips"),
        other => panic!("expected MissingData, got {:?}", other.map(|_| ())),
    }
    assert!(db.destructive_calls().is_empty());
}

#[tokio::test]
async fn test_allow_missing_treats_table_as_empty() {
    let db = MockDatabase::new().with_table("users", 3).with_table("trips", 4);
    let tables = vec![table_config("users", &[]), table_config("trips", &["users"])];
    let dump = dump_with(&[("users", 1)]); // trips missing

    let options = ImportOptions {
        allow_missing: true,
        ..ImportOptions::default()
    };
    let report = replace(&db, &tables, &dump, &options).await.unwrap();

    // trips still got its delete unit, then stayed empty
    let trips = report.tables.iter().find(|t| t.table == "trips").unwrap();
    assert_eq!(trips.deleted, 4);
    assert_eq!(trips.inserted, 0);
    assert_eq!(trips.expected, 0);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_zero_row_table_is_skipped_not_an_error() {
    let db = MockDatabase::new();
    let tables = vec![table_config("tags", &[])];
    let dump = dump_with(&[("tags", 0)]);

    let report = replace(&db, &tables, &dump, &ImportOptions::default())
        .await
        .unwrap();

    assert!(report.is_clean());
    assert!(!db
        .destructive_calls()
        .iter()
        .any(|c| c.starts_with("insert_rows")));
}

#[tokio::test]
async fn test_count_mismatch_reported_without_rollback() {
    // 10 declared rows, one rejected by a constraint: 9 land
    let db = MockDatabase::new().with_insert_cap("trips", 9);
    let tables = vec![table_config("trips", &[])];
    let dump = dump_with(&[("trips", 10)]);

    let report = replace(&db, &tables, &dump, &ImportOptions::default())
        .await
        .unwrap();

    assert_eq!(
        report.discrepancies,
        vec![Discrepancy {
            table: "trips".to_string(),
            expected: 10,
            actual: 9,
        }]
    );
    // the 9 inserted rows stand: exactly one delete (the replace phase) and
    // one insert ran, nothing was unwound afterwards
    let destructive = db.destructive_calls();
    assert_eq!(destructive.len(), 2);
    assert!(destructive[0].starts_with("delete_all: trips"));
    assert!(destructive[1].starts_with("insert_rows: trips"));
}

#[tokio::test]
async fn test_delete_failure_is_fatal_with_position() {
    let db = MockDatabase::new().with_failing_delete("users");
    let tables = vec![table_config("users", &[]), table_config("trips", &["users"])];
    let dump = dump_with(&[("users", 1), ("trips", 1)]);

    let result = replace(&db, &tables, &dump, &ImportOptions::default()).await;

    match result {
        Err(RunError::Transfer { phase, table, .. }) => {
            assert_eq!(phase, "delete");
            assert_eq!(table, "users");
        }
        other => panic!("expected Transfer error, got {:?}", other.map(|_| ())),
    }
    // no insert ever ran
    assert!(!db
        .destructive_calls()
        .iter()
        .any(|c| c.starts_with("insert_rows")));
}

#[tokio::test]
async fn test_failed_run_leaves_state_file_for_resumption() {
    use dock_core::run_state::{TransferState, TransferStatus};

    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("transfer_state.json");

    let db = MockDatabase::new().with_failing_delete("trips");
    let tables = vec![table_config("users", &[]), table_config("trips", &["users"])];
    let dump = dump_with(&[("users", 1), ("trips", 1)]);

    let options = ImportOptions {
        allow_missing: false,
        state_path: Some(state_path.clone()),
    };
    let result = replace(&db, &tables, &dump, &options).await;
    assert!(result.is_err());

    let state = TransferState::load(&state_path).unwrap().unwrap();
    assert_eq!(state.status, TransferStatus::Failed);
    assert_eq!(state.current_table.as_deref(), Some("trips"));
    assert!(state.error.is_some());
}

#[tokio::test]
async fn test_clean_run_removes_state_file() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("transfer_state.json");

    let db = MockDatabase::new();
    let tables = vec![table_config("users", &[])];
    let dump = dump_with(&[("users", 2)]);

    let options = ImportOptions {
        allow_missing: false,
        state_path: Some(state_path.clone()),
    };
    let report = replace(&db, &tables, &dump, &options).await.unwrap();

    assert!(report.is_clean());
    assert!(!state_path.exists());
}
