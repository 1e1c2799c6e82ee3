use super::*;
use serde_json::json;
use tempfile::tempdir;

fn sample_dump() -> Dump {
    let mut dump = Dump::new("duckdb");
    dump.insert_table(
        "users",
        TableDump {
            columns: vec!["id".to_string(), "name".to_string()],
            rows: vec![vec![json!(1), json!("alice")], vec![json!(2), json!("bob")]],
        },
    );
    dump.insert_table(
        "trips",
        TableDump {
            columns: vec!["id".to_string(), "user_id".to_string()],
            rows: vec![],
        },
    );
    dump
}

#[test]
fn test_row_counts() {
    let dump = sample_dump();
    assert_eq!(dump.table("users").unwrap().row_count(), 2);
    assert_eq!(dump.table("trips").unwrap().row_count(), 0);
    assert_eq!(dump.total_rows(), 2);
    assert!(dump.table("nonexistent").is_none());
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dump.json");

    let dump = sample_dump();
    dump.save(&path).unwrap();

    let loaded = Dump::load(&path).unwrap();
    assert_eq!(loaded.format_version, DUMP_FORMAT_VERSION);
    assert_eq!(loaded.source, "duckdb");
    assert_eq!(loaded.tables.len(), 2);
    assert_eq!(loaded.table("users"), dump.table("users"));
}

#[test]
fn test_load_rejects_unknown_format_version() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dump.json");

    let mut dump = sample_dump();
    dump.format_version = 99;
    // bypass save() so the bad version reaches disk
    std::fs::write(&path, serde_json::to_string(&dump).unwrap()).unwrap();

    let result = Dump::load(&path);
    assert!(matches!(result, Err(CoreError::DumpFormat { .. })));
}

#[test]
fn test_load_rejects_malformed_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dump.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = Dump::load(&path);
    assert!(matches!(result, Err(CoreError::DumpFormat { .. })));
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested/out/dump.json");

    sample_dump().save(&path).unwrap();
    assert!(path.exists());
}
