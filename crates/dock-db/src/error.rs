//! Error types for dock-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Table not found (D003)
    #[error("[D003] Table not found: {0}")]
    TableNotFound(String),

    /// Row shape mismatch during bulk insert (D004)
    #[error("[D004] Row {row} of table '{table}' has {actual} values, expected {expected}")]
    RowShape {
        table: String,
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Remote endpoint returned a non-success status (D005)
    #[error("[D005] Remote execution failed with {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    /// Remote endpoint returned a malformed response (D006)
    #[error("[D006] Malformed remote response: {0}")]
    RemoteResponse(String),

    /// Mutex poisoned (D007)
    #[error("[D007] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Internal error (D008)
    #[error("[D008] Internal database error: {0}")]
    Internal(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error does not expose structured variants, so narrow
        // string matching is the only way to classify missing relations.
        let msg = err.to_string();
        if msg.contains("Table with name")
            || msg.contains("Table or view with name")
            || (msg.contains("Catalog Error") && msg.contains("Table") && msg.contains("not found"))
        {
            DbError::TableNotFound(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}

impl From<reqwest::Error> for DbError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            DbError::ConnectionError(err.to_string())
        } else {
            DbError::ExecutionError(err.to_string())
        }
    }
}
