use super::*;
use serde_json::json;

#[tokio::test]
async fn test_in_memory() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert_eq!(db.backend_name(), "duckdb");
    assert!(db.supports_transactional_ddl());
}

#[tokio::test]
async fn test_execute_and_query_count() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE nums AS SELECT * FROM range(10) t(n)")
        .await
        .unwrap();

    let count = db.query_count("SELECT * FROM nums").await.unwrap();
    assert_eq!(count, 10);
    assert_eq!(db.count_rows("nums").await.unwrap(), 10);
}

#[tokio::test]
async fn test_table_exists() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE users (id INT)").await.unwrap();

    assert!(db.table_exists("users").await.unwrap());
    assert!(!db.table_exists("nonexistent").await.unwrap());
}

#[tokio::test]
async fn test_function_exists() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE MACRO double_it(x) AS x * 2")
        .await
        .unwrap();

    assert!(db.function_exists("double_it").await.unwrap());
    assert!(!db.function_exists("no_such_function").await.unwrap());
}

#[tokio::test]
async fn test_transaction_commits() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE t (id INT)").await.unwrap();

    db.execute_transaction(&[
        "INSERT INTO t VALUES (1)".to_string(),
        "INSERT INTO t VALUES (2)".to_string(),
    ])
    .await
    .unwrap();

    assert_eq!(db.count_rows("t").await.unwrap(), 2);
}

#[tokio::test]
async fn test_transaction_rolls_back_on_failure() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE t (id INT)").await.unwrap();

    let result = db
        .execute_transaction(&[
            "INSERT INTO t VALUES (1)".to_string(),
            "INSERT INTO nonexistent VALUES (2)".to_string(),
        ])
        .await;

    assert!(result.is_err());
    // the first insert must not have survived
    assert_eq!(db.count_rows("t").await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_all_returns_count() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE t AS SELECT * FROM range(5) r(n)")
        .await
        .unwrap();

    let deleted = db.delete_all("t").await.unwrap();
    assert_eq!(deleted, 5);
    assert_eq!(db.count_rows("t").await.unwrap(), 0);
}

#[tokio::test]
async fn test_insert_rows_and_fetch_table() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE users (id INT, name VARCHAR, active BOOLEAN)")
        .await
        .unwrap();

    let columns = vec!["id".to_string(), "name".to_string(), "active".to_string()];
    let rows = vec![
        vec![json!(1), json!("alice"), json!(true)],
        vec![json!(2), json!("o'brien"), json!(false)],
        vec![json!(3), json!(null), json!(true)],
    ];

    let inserted = db.insert_rows("users", &columns, &rows).await.unwrap();
    assert_eq!(inserted, 3);

    let (fetched_columns, fetched_rows) = db.fetch_table("users").await.unwrap();
    assert_eq!(fetched_columns, columns);
    assert_eq!(fetched_rows.len(), 3);
    assert_eq!(fetched_rows[1][1], json!("o'brien"));
    assert_eq!(fetched_rows[2][1], json!(null));
}

#[tokio::test]
async fn test_insert_rows_empty_is_noop() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE t (id INT)").await.unwrap();

    let inserted = db
        .insert_rows("t", &["id".to_string()], &[])
        .await
        .unwrap();
    assert_eq!(inserted, 0);
}

#[tokio::test]
async fn test_insert_rows_rejects_bad_shape() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE t (id INT, name VARCHAR)")
        .await
        .unwrap();

    let result = db
        .insert_rows(
            "t",
            &["id".to_string(), "name".to_string()],
            &[vec![json!(1)]],
        )
        .await;

    assert!(matches!(result, Err(DbError::RowShape { .. })));
}

#[tokio::test]
async fn test_fetch_empty_table_keeps_columns() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE empty_t (id INT, label VARCHAR)")
        .await
        .unwrap();

    let (columns, rows) = db.fetch_table("empty_t").await.unwrap();
    assert_eq!(columns, vec!["id".to_string(), "label".to_string()]);
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_fetch_missing_table_is_an_error() {
    let db = DuckDbBackend::in_memory().unwrap();
    let result = db.fetch_table("nonexistent").await;
    assert!(result.is_err());
}
