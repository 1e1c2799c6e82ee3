//! Test support: an in-memory spy implementation of `Database`
//!
//! Records every call so tests can assert that destructive operations
//! never ran, and simulates per-table behaviors (row counts, insert caps
//! for constraint-rejected rows, failing deletes).

use async_trait::async_trait;
use dock_db::{Database, DbError, DbResult, TableRows};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Spy database for orchestration tests
#[derive(Default)]
pub struct MockDatabase {
    calls: Mutex<Vec<String>>,
    tables: Mutex<HashMap<String, usize>>,
    functions: HashSet<String>,
    insert_caps: HashMap<String, usize>,
    fail_delete_on: Option<String>,
    transactional_ddl: bool,
}

impl MockDatabase {
    /// New mock with transactional DDL support
    pub fn new() -> Self {
        Self {
            transactional_ddl: true,
            ..Self::default()
        }
    }

    /// New mock without transactional DDL (forces the re-verify path)
    pub fn without_transactional_ddl() -> Self {
        Self {
            transactional_ddl: false,
            ..Self::default()
        }
    }

    /// Seed a table with a row count
    pub fn with_table(self, name: &str, rows: usize) -> Self {
        self.tables
            .lock()
            .expect("mock lock")
            .insert(name.to_string(), rows);
        self
    }

    /// Seed an existing function
    pub fn with_function(mut self, name: &str) -> Self {
        self.functions.insert(name.to_string());
        self
    }

    /// Cap accepted inserts for a table (simulates constraint rejections)
    pub fn with_insert_cap(mut self, table: &str, cap: usize) -> Self {
        self.insert_caps.insert(table.to_string(), cap);
        self
    }

    /// Make delete_all fail for a table
    pub fn with_failing_delete(mut self, table: &str) -> Self {
        self.fail_delete_on = Some(table.to_string());
        self
    }

    /// All recorded calls, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("mock lock").clone()
    }

    /// Recorded calls that mutate the database
    pub fn destructive_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| {
                c.starts_with("execute")
                    || c.starts_with("delete_all")
                    || c.starts_with("insert_rows")
            })
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("mock lock").push(call);
    }
}

#[async_trait]
impl Database for MockDatabase {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        self.record(format!("execute: {}", sql));
        Ok(0)
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.record(format!("execute_batch: {}", sql));
        Ok(())
    }

    async fn execute_transaction(&self, statements: &[String]) -> DbResult<()> {
        self.record(format!("execute_transaction: {}", statements.join(" | ")));
        Ok(())
    }

    async fn query_count(&self, sql: &str) -> DbResult<usize> {
        self.record(format!("query_count: {}", sql));
        Ok(0)
    }

    async fn table_exists(&self, name: &str) -> DbResult<bool> {
        self.record(format!("table_exists: {}", name));
        Ok(self.tables.lock().expect("mock lock").contains_key(name))
    }

    async fn function_exists(&self, name: &str) -> DbResult<bool> {
        self.record(format!("function_exists: {}", name));
        Ok(self.functions.contains(name))
    }

    async fn count_rows(&self, table: &str) -> DbResult<usize> {
        self.record(format!("count_rows: {}", table));
        Ok(self
            .tables
            .lock()
            .expect("mock lock")
            .get(table)
            .copied()
            .unwrap_or(0))
    }

    async fn delete_all(&self, table: &str) -> DbResult<usize> {
        self.record(format!("delete_all: {}", table));
        if self.fail_delete_on.as_deref() == Some(table) {
            return Err(DbError::ExecutionError(format!(
                "simulated delete failure on {}",
                table
            )));
        }
        let mut tables = self.tables.lock().expect("mock lock");
        let deleted = tables.get(table).copied().unwrap_or(0);
        tables.insert(table.to_string(), 0);
        Ok(deleted)
    }

    async fn insert_rows(
        &self,
        table: &str,
        _columns: &[String],
        rows: &[Vec<serde_json::Value>],
    ) -> DbResult<usize> {
        self.record(format!("insert_rows: {} ({} rows)", table, rows.len()));
        let accepted = self
            .insert_caps
            .get(table)
            .copied()
            .unwrap_or(rows.len())
            .min(rows.len());
        let mut tables = self.tables.lock().expect("mock lock");
        *tables.entry(table.to_string()).or_insert(0) += accepted;
        Ok(accepted)
    }

    async fn fetch_table(&self, table: &str) -> DbResult<TableRows> {
        self.record(format!("fetch_table: {}", table));
        Ok((Vec::new(), Vec::new()))
    }

    fn supports_transactional_ddl(&self) -> bool {
        self.transactional_ddl
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}
