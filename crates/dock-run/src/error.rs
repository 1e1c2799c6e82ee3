//! Error types for dock-run

use dock_core::CoreError;
use dock_db::DbError;
use thiserror::Error;

/// Orchestration errors
#[derive(Error, Debug)]
pub enum RunError {
    /// R001: Migration script failed. Fatal to the run; the operator fixes
    /// the script and re-invokes, which is safe because applied migrations
    /// are skipped.
    #[error("[R001] Migration '{id}' failed: {cause}")]
    Migration { id: String, cause: String },

    /// R002: Transfer failed mid-phase. The target is in a documented
    /// partial state; the transfer state file records the position.
    #[error("[R002] Transfer failed during {phase} of '{table}': {cause}")]
    Transfer {
        phase: String,
        table: String,
        cause: String,
    },

    /// R003: A planned table is missing from the dump payload
    #[error(
        "[R003] Table '{table}' is in the transfer plan but missing from the dump \
         (re-export, or pass --allow-missing to treat it as empty)"
    )]
    MissingData { table: String },

    /// R004: Restore failed partway through the backup script
    #[error("[R004] Restore of '{path}' failed at statement {statement} of {total}: {cause}")]
    Restore {
        path: String,
        statement: usize,
        total: usize,
        cause: String,
    },

    /// Core error (config, planning, artifacts)
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Database error
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result type alias for RunError
pub type RunResult<T> = Result<T, RunError>;
