use super::*;
use tempfile::tempdir;

#[test]
fn test_find_latest_by_filename_timestamp() {
    let dir = tempdir().unwrap();
    for name in [
        "kgay_backup_2025-01-01.sql",
        "kgay_backup_2025-03-15.sql",
        "kgay_backup_2024-12-01.sql",
    ] {
        std::fs::write(dir.path().join(name), "-- dump").unwrap();
    }

    let artifact = find_latest(dir.path(), "*_backup_*.sql").unwrap();
    assert!(artifact
        .path
        .to_string_lossy()
        .ends_with("kgay_backup_2025-03-15.sql"));
    assert_eq!(artifact.size, "-- dump".len() as u64);
}

#[test]
fn test_time_component_orders_same_day_backups() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("db_backup_2025-03-15_08-00-00.sql"), "a").unwrap();
    std::fs::write(dir.path().join("db_backup_2025-03-15_17-30-00.sql"), "b").unwrap();

    let artifact = find_latest(dir.path(), "*_backup_*.sql").unwrap();
    assert!(artifact
        .path
        .to_string_lossy()
        .ends_with("db_backup_2025-03-15_17-30-00.sql"));
}

#[test]
fn test_empty_directory_is_no_backup_found() {
    let dir = tempdir().unwrap();
    let result = find_latest(dir.path(), "*_backup_*.sql");
    assert!(matches!(result, Err(CoreError::NoBackupFound { .. })));
}

#[test]
fn test_no_match_is_no_backup_found() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("unrelated.txt"), "x").unwrap();

    let result = find_latest(dir.path(), "*_backup_*.sql");
    assert!(matches!(result, Err(CoreError::NoBackupFound { .. })));
}

#[test]
fn test_timestamp_from_name_variants() {
    assert_eq!(
        timestamp_from_name("kgay_backup_2025-03-15.sql"),
        Some(
            NaiveDate::from_ymd_opt(2025, 3, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                .and_utc()
        )
    );
    assert_eq!(
        timestamp_from_name("db_2025-03-15_14-30-00.sql"),
        Some(
            NaiveDate::from_ymd_opt(2025, 3, 15)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap()
                .and_utc()
        )
    );
    assert_eq!(timestamp_from_name("no_timestamp_here.sql"), None);
    // malformed date falls through to None rather than panicking
    assert_eq!(timestamp_from_name("backup_2025-13-99.sql"), None);
}
