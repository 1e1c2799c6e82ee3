//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::{Database, TableRows};
use async_trait::async_trait;
use dock_core::sql_utils::{json_literal, quote_ident, quote_qualified};
use duckdb::types::{TimeUnit, Value};
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Rows per INSERT statement during bulk loads
const INSERT_BATCH_SIZE: usize = 500;

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn execute_sync(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        conn.execute(sql, [])
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))
    }

    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    fn execute_transaction_sync(&self, statements: &[String]) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;

        for sql in statements {
            if let Err(e) = conn.execute_batch(sql) {
                if let Err(rollback_err) = conn.execute_batch("ROLLBACK") {
                    log::warn!("Rollback after failed statement also failed: {}", rollback_err);
                }
                return Err(DbError::from(e));
            }
        }

        conn.execute_batch("COMMIT")
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    fn query_count_sync(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM ({})", sql), [], |row| {
                row.get(0)
            })
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;
        Ok(count as usize)
    }

    fn table_exists_sync(&self, name: &str) -> DbResult<bool> {
        let conn = self.lock()?;

        // Handle schema-qualified names
        let (schema, table) = match name.rfind('.') {
            Some(pos) => (&name[..pos], &name[pos + 1..]),
            None => ("main", name),
        };

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema = ? AND table_name = ?",
                duckdb::params![schema, table],
                |row| row.get(0),
            )
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;

        Ok(count > 0)
    }

    fn function_exists_sync(&self, name: &str) -> DbResult<bool> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM duckdb_functions() WHERE function_name = ?",
                duckdb::params![name],
                |row| row.get(0),
            )
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;
        Ok(count > 0)
    }

    fn insert_rows_sync(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<serde_json::Value>],
    ) -> DbResult<usize> {
        if rows.is_empty() {
            return Ok(0);
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(DbError::RowShape {
                    table: table.to_string(),
                    row: i,
                    expected: columns.len(),
                    actual: row.len(),
                });
            }
        }

        let conn = self.lock()?;
        let column_list = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");

        let mut inserted = 0;
        for chunk in rows.chunks(INSERT_BATCH_SIZE) {
            let values = chunk
                .iter()
                .map(|row| {
                    let literals = row.iter().map(json_literal).collect::<Vec<_>>().join(", ");
                    format!("({})", literals)
                })
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "INSERT INTO {} ({}) VALUES {}",
                quote_qualified(table),
                column_list,
                values
            );
            inserted += conn.execute(&sql, []).map_err(DbError::from)?;
        }

        Ok(inserted)
    }

    fn fetch_table_sync(&self, table: &str) -> DbResult<TableRows> {
        let conn = self.lock()?;

        // Column names come from the catalog so empty tables keep their
        // header in the dump.
        let columns = table_columns(&conn, table)?;
        if columns.is_empty() {
            return Err(DbError::TableNotFound(table.to_string()));
        }

        let select_list = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {} FROM {}", select_list, quote_qualified(table));
        let mut stmt = conn.prepare(&sql).map_err(DbError::from)?;

        let mut out: Vec<Vec<serde_json::Value>> = Vec::new();
        let mut rows = stmt.query([]).map_err(DbError::from)?;
        while let Some(row) = rows.next().map_err(DbError::from)? {
            let mut record = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                let value: Value = row.get(i).map_err(DbError::from)?;
                record.push(value_to_json(value));
            }
            out.push(record);
        }

        Ok((columns, out))
    }
}

/// Column names of a table in declaration order, from the catalog
fn table_columns(conn: &Connection, table: &str) -> DbResult<Vec<String>> {
    let (schema, name) = match table.rfind('.') {
        Some(pos) => (&table[..pos], &table[pos + 1..]),
        None => ("main", table),
    };

    let mut stmt = conn
        .prepare(
            "SELECT column_name FROM information_schema.columns \
             WHERE table_schema = ? AND table_name = ? ORDER BY ordinal_position",
        )
        .map_err(DbError::from)?;
    let mut rows = stmt
        .query(duckdb::params![schema, name])
        .map_err(DbError::from)?;

    let mut columns = Vec::new();
    while let Some(row) = rows.next().map_err(DbError::from)? {
        columns.push(row.get::<_, String>(0).map_err(DbError::from)?);
    }
    Ok(columns)
}

/// Convert a DuckDB value into its JSON representation for the dump format.
fn value_to_json(value: Value) -> serde_json::Value {
    use serde_json::{json, Value as Json};

    match value {
        Value::Null => Json::Null,
        Value::Boolean(b) => json!(b),
        Value::TinyInt(v) => json!(v),
        Value::SmallInt(v) => json!(v),
        Value::Int(v) => json!(v),
        Value::BigInt(v) => json!(v),
        Value::HugeInt(v) => match i64::try_from(v) {
            Ok(small) => json!(small),
            Err(_) => json!(v.to_string()),
        },
        Value::UTinyInt(v) => json!(v),
        Value::USmallInt(v) => json!(v),
        Value::UInt(v) => json!(v),
        Value::UBigInt(v) => json!(v),
        Value::Float(v) => serde_json::Number::from_f64(v as f64)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Value::Double(v) => serde_json::Number::from_f64(v)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Value::Decimal(d) => json!(d.to_string()),
        Value::Text(s) => json!(s),
        Value::Enum(s) => json!(s),
        Value::Blob(bytes) => json!(String::from_utf8_lossy(&bytes)),
        Value::Date32(days) => match chrono::DateTime::from_timestamp(days as i64 * 86_400, 0) {
            Some(dt) => json!(dt.date_naive().to_string()),
            None => json!(days),
        },
        Value::Time64(unit, v) => {
            let micros = time_unit_to_micros(unit, v);
            let secs = (micros / 1_000_000) as u32;
            let nanos = ((micros % 1_000_000) * 1_000) as u32;
            match chrono::NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos) {
                Some(t) => json!(t.to_string()),
                None => json!(v),
            }
        }
        Value::Timestamp(unit, v) => {
            let micros = time_unit_to_micros(unit, v);
            match chrono::DateTime::from_timestamp_micros(micros) {
                Some(dt) => json!(dt.naive_utc().to_string()),
                None => json!(v),
            }
        }
        Value::List(values) => Json::Array(values.into_iter().map(value_to_json).collect()),
        other => json!(format!("{:?}", other)),
    }
}

fn time_unit_to_micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value.saturating_mul(1_000_000),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        self.execute_sync(sql)
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_sync(sql)
    }

    async fn execute_transaction(&self, statements: &[String]) -> DbResult<()> {
        self.execute_transaction_sync(statements)
    }

    async fn query_count(&self, sql: &str) -> DbResult<usize> {
        self.query_count_sync(sql)
    }

    async fn table_exists(&self, name: &str) -> DbResult<bool> {
        self.table_exists_sync(name)
    }

    async fn function_exists(&self, name: &str) -> DbResult<bool> {
        self.function_exists_sync(name)
    }

    async fn count_rows(&self, table: &str) -> DbResult<usize> {
        self.query_count_sync(&format!("SELECT * FROM {}", quote_qualified(table)))
    }

    async fn delete_all(&self, table: &str) -> DbResult<usize> {
        self.execute_sync(&format!("DELETE FROM {}", quote_qualified(table)))
    }

    async fn insert_rows(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<serde_json::Value>],
    ) -> DbResult<usize> {
        self.insert_rows_sync(table, columns, rows)
    }

    async fn fetch_table(&self, table: &str) -> DbResult<TableRows> {
        self.fetch_table_sync(table)
    }

    fn supports_transactional_ddl(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
