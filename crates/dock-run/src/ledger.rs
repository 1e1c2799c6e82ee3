//! Migration ledger: durable record of applied migrations
//!
//! One row per apply attempt. Rows are append-only: a retry after a failed
//! attempt appends a new row, and nothing is ever updated or deleted. A
//! migration counts as applied when a `success` row exists for its
//! identifier.

use crate::error::RunResult;
use chrono::Utc;
use dock_core::sql_utils::{quote_ident, string_literal};
use dock_db::Database;

/// Outcome of one apply attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOutcome {
    /// The migration payload and ledger write committed
    Success,
    /// The attempt failed; the error column holds the cause
    Failed,
}

impl std::fmt::Display for LedgerOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerOutcome::Success => write!(f, "success"),
            LedgerOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// One ledger row
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    /// Migration identifier
    pub id: String,

    /// When the attempt was recorded
    pub applied_at: String,

    /// Attempt outcome, `success` or `failed`
    pub outcome: String,

    /// Error detail for failed attempts
    pub error: Option<String>,
}

/// Ledger over the configured tracking table
pub struct Ledger<'a> {
    db: &'a dyn Database,
    table: String,
}

impl<'a> Ledger<'a> {
    /// Create a ledger over the given tracking table
    pub fn new(db: &'a dyn Database, table: impl Into<String>) -> Self {
        Self {
            db,
            table: table.into(),
        }
    }

    /// Tracking table name
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the tracking table when it does not exist yet.
    ///
    /// No primary key on id: retries append additional rows.
    pub async fn ensure_table(&self) -> RunResult<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (\
             id VARCHAR NOT NULL, \
             applied_at TIMESTAMP NOT NULL, \
             outcome VARCHAR NOT NULL, \
             error VARCHAR)",
            quote_ident(&self.table)
        );
        self.db.execute_batch(&sql).await?;
        Ok(())
    }

    /// Whether a success row exists for the identifier
    pub async fn has_applied(&self, id: &str) -> RunResult<bool> {
        let sql = format!(
            "SELECT * FROM {} WHERE id = {} AND outcome = 'success'",
            quote_ident(&self.table),
            string_literal(id)
        );
        Ok(self.db.query_count(&sql).await? > 0)
    }

    /// SQL for recording an attempt.
    ///
    /// Exposed so the executor can couple the success row to the migration
    /// payload inside one transaction.
    pub fn record_sql(&self, id: &str, outcome: LedgerOutcome, error: Option<&str>) -> String {
        let error_literal = match error {
            Some(e) => string_literal(e),
            None => "NULL".to_string(),
        };
        format!(
            "INSERT INTO {} (id, applied_at, outcome, error) VALUES ({}, {}, {}, {})",
            quote_ident(&self.table),
            string_literal(id),
            string_literal(&Utc::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string()),
            string_literal(&outcome.to_string()),
            error_literal
        )
    }

    /// Append an attempt row outside any transaction
    pub async fn record(
        &self,
        id: &str,
        outcome: LedgerOutcome,
        error: Option<&str>,
    ) -> RunResult<()> {
        self.db
            .execute(&self.record_sql(id, outcome, error))
            .await?;
        Ok(())
    }

    /// All ledger rows, oldest first
    pub async fn entries(&self) -> RunResult<Vec<LedgerEntry>> {
        let (columns, rows) = self.db.fetch_table(&self.table).await?;
        let col = |name: &str| columns.iter().position(|c| c == name);
        let (Some(id_col), Some(at_col), Some(outcome_col)) =
            (col("id"), col("applied_at"), col("outcome"))
        else {
            return Ok(Vec::new());
        };
        let error_col = col("error");

        let as_text = |value: &serde_json::Value| match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(LedgerEntry {
                id: as_text(&row[id_col]),
                applied_at: as_text(&row[at_col]),
                outcome: as_text(&row[outcome_col]),
                error: error_col.and_then(|i| match &row[i] {
                    serde_json::Value::Null => None,
                    other => Some(as_text(other)),
                }),
            });
        }
        entries.sort_by(|a, b| a.applied_at.cmp(&b.applied_at));
        Ok(entries)
    }

    /// Identifiers with a success row
    pub async fn applied_ids(&self) -> RunResult<Vec<String>> {
        let mut ids: Vec<String> = self
            .entries()
            .await?
            .into_iter()
            .filter(|e| e.outcome == "success")
            .map(|e| e.id)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
