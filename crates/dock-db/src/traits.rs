//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;

/// Column names and row records of one table
pub type TableRows = (Vec<String>, Vec<Vec<serde_json::Value>>);

/// Database abstraction trait for Dockhand
///
/// Implementations must be Send + Sync for async operation. All
/// side-effecting calls are awaited in sequence by the orchestrators;
/// nothing here may reorder statements.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute a single SQL statement, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute a multi-statement SQL script
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Execute statements as one transaction: all succeed or all roll back
    async fn execute_transaction(&self, statements: &[String]) -> DbResult<()>;

    /// Execute a query and return its row count
    async fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// Check if a table or view exists
    async fn table_exists(&self, name: &str) -> DbResult<bool>;

    /// Check if a function with the given name exists
    async fn function_exists(&self, name: &str) -> DbResult<bool>;

    /// Count rows in a table
    async fn count_rows(&self, table: &str) -> DbResult<usize>;

    /// Delete all rows from a table, returns deleted count
    async fn delete_all(&self, table: &str) -> DbResult<usize>;

    /// Bulk-insert rows into a table, returns inserted count.
    ///
    /// Every row must have one value per column. Implementations may batch
    /// the insert into several statements but must preserve row order.
    async fn insert_rows(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<serde_json::Value>],
    ) -> DbResult<usize>;

    /// Read a whole table: column names plus all rows
    async fn fetch_table(&self, table: &str) -> DbResult<TableRows>;

    /// Whether DDL participates in transactions on this backend.
    ///
    /// When false, callers cannot couple a schema change and its ledger
    /// write atomically and must re-verify applied state instead.
    fn supports_transactional_ddl(&self) -> bool;

    /// Backend identifier for logging
    fn backend_name(&self) -> &'static str;
}
