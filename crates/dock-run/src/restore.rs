//! Backup restore
//!
//! Applies a discovered backup artifact statement by statement so a
//! mid-restore failure can report how far it got. No partial-restore
//! rollback is attempted: dump scripts are conventionally idempotent
//! ("create if not exists" style), so the recovery path is fixing the
//! artifact and re-running.

use crate::error::{RunError, RunResult};
use dock_core::backup::BackupArtifact;
use dock_core::CoreError;
use dock_db::Database;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

/// Summary of a restore run
#[derive(Debug, Clone)]
pub struct RestoreReport {
    /// Path of the restored artifact
    pub path: String,

    /// Statements executed
    pub statements: usize,
}

/// Split a dump script into individual statements.
///
/// Parses with sqlparser when possible; dumps full of engine-specific
/// syntax fall back to naive semicolon splitting, which is how such
/// scripts are conventionally structured anyway.
pub fn split_statements(script: &str) -> Vec<String> {
    match Parser::parse_sql(&GenericDialect {}, script) {
        Ok(statements) => statements.iter().map(|s| format!("{};", s)).collect(),
        Err(e) => {
            log::warn!("SQL parse failed, splitting on semicolons: {}", e);
            script
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| format!("{};", s))
                .collect()
        }
    }
}

/// Execute a backup artifact against the target.
///
/// Failure reports the 1-based statement position so the operator knows
/// how much of the dump landed.
pub async fn restore(db: &dyn Database, artifact: &BackupArtifact) -> RunResult<RestoreReport> {
    let script =
        std::fs::read_to_string(&artifact.path).map_err(|e| CoreError::IoWithPath {
            path: artifact.path.display().to_string(),
            source: e,
        })?;

    let statements = split_statements(&script);
    let total = statements.len();

    for (index, statement) in statements.iter().enumerate() {
        db.execute_batch(statement)
            .await
            .map_err(|e| RunError::Restore {
                path: artifact.path.display().to_string(),
                statement: index + 1,
                total,
                cause: e.to_string(),
            })?;
        log::debug!("Restore statement {}/{} done", index + 1, total);
    }

    Ok(RestoreReport {
        path: artifact.path.display().to_string(),
        statements: total,
    })
}
