//! Migration executor
//!
//! Applies one migration payload as a single unit and records the attempt
//! in the ledger. On engines with transactional DDL the payload and the
//! success row commit together, so a failure rolls both back. On engines
//! without it, the executor re-verifies actual applied state through the
//! migration's probes instead of trusting the ledger alone: a migration
//! whose probes already hold is recorded and skipped, not re-executed.

use crate::error::{RunError, RunResult};
use crate::ledger::{Ledger, LedgerOutcome};
use crate::verify::{all_passed, ProbeResult, SchemaVerifier};
use dock_core::migration::{Migration, MigrationId};
use dock_db::Database;
use std::time::Instant;

/// How a migration ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationStatus {
    /// Payload executed and recorded in this run
    Applied,
    /// Already applied; nothing executed
    Skipped,
    /// Attempt failed; ledger holds a failed row
    Failed,
}

impl std::fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationStatus::Applied => write!(f, "applied"),
            MigrationStatus::Skipped => write!(f, "skipped"),
            MigrationStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of one migration
#[derive(Debug, Clone)]
pub struct MigrationOutcome {
    /// Migration identifier
    pub id: MigrationId,

    /// Final status
    pub status: MigrationStatus,

    /// Wall-clock duration
    pub duration_secs: f64,

    /// Error message for failed attempts
    pub error: Option<String>,

    /// Post-commit probe results; failures are warnings, not errors
    pub probe_results: Vec<ProbeResult>,
}

impl MigrationOutcome {
    /// Probes that did not hold after commit
    pub fn warnings(&self) -> impl Iterator<Item = &ProbeResult> {
        self.probe_results.iter().filter(|r| !r.passed)
    }
}

/// Summary of a migration run
#[derive(Debug, Clone, Default)]
pub struct MigrationRunReport {
    /// Per-migration outcomes in apply order
    pub outcomes: Vec<MigrationOutcome>,

    /// True when the run stopped at a failed migration
    pub stopped_early: bool,
}

impl MigrationRunReport {
    /// Count of migrations applied in this run
    pub fn applied(&self) -> usize {
        self.count(MigrationStatus::Applied)
    }

    /// Count of migrations skipped as already applied
    pub fn skipped(&self) -> usize {
        self.count(MigrationStatus::Skipped)
    }

    /// Count of failed migrations (0 or 1; the run stops at the first)
    pub fn failed(&self) -> usize {
        self.count(MigrationStatus::Failed)
    }

    /// Count of verification warnings across all outcomes
    pub fn warning_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.warnings().count()).sum()
    }

    fn count(&self, status: MigrationStatus) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == status)
            .count()
    }
}

/// Executor applying migrations against one database
pub struct MigrationExecutor<'a> {
    db: &'a dyn Database,
    ledger: Ledger<'a>,
}

impl<'a> MigrationExecutor<'a> {
    /// Create an executor recording into the given ledger table
    pub fn new(db: &'a dyn Database, ledger_table: &str) -> Self {
        Self {
            db,
            ledger: Ledger::new(db, ledger_table),
        }
    }

    /// The executor's ledger
    pub fn ledger(&self) -> &Ledger<'a> {
        &self.ledger
    }

    /// Apply one migration.
    ///
    /// Returns the outcome on success or skip; fails with
    /// `RunError::Migration` when the payload (or its ledger coupling)
    /// fails. No automatic retry: re-invocation after a fix is the
    /// recovery path.
    pub async fn apply(&self, migration: &Migration) -> RunResult<MigrationOutcome> {
        self.ledger.ensure_table().await?;

        let id = migration.id.as_str();
        if self.ledger.has_applied(id).await? {
            log::info!("Migration '{}' already applied, skipping", id);
            return Ok(MigrationOutcome {
                id: migration.id.clone(),
                status: MigrationStatus::Skipped,
                duration_secs: 0.0,
                error: None,
                probe_results: Vec::new(),
            });
        }

        // Without transactional DDL the ledger may have missed a write for
        // an applied migration. When the probes already hold, repair the
        // ledger instead of re-executing the payload.
        if !self.db.supports_transactional_ddl() && !migration.probes.is_empty() {
            let verifier = SchemaVerifier::new(self.db);
            let results = verifier.verify(&migration.probes).await;
            if all_passed(&results) {
                log::info!(
                    "Migration '{}' verified as applied but unrecorded; repairing ledger",
                    id
                );
                self.ledger.record(id, LedgerOutcome::Success, None).await?;
                return Ok(MigrationOutcome {
                    id: migration.id.clone(),
                    status: MigrationStatus::Skipped,
                    duration_secs: 0.0,
                    error: None,
                    probe_results: results,
                });
            }
        }

        let start = Instant::now();
        let execution = if self.db.supports_transactional_ddl() {
            let statements = vec![
                migration.sql.clone(),
                self.ledger.record_sql(id, LedgerOutcome::Success, None),
            ];
            self.db.execute_transaction(&statements).await
        } else {
            match self.db.execute_batch(&migration.sql).await {
                Ok(()) => self
                    .ledger
                    .record(id, LedgerOutcome::Success, None)
                    .await
                    .map_err(|e| {
                        dock_db::DbError::Internal(format!(
                            "payload applied but ledger write failed: {}",
                            e
                        ))
                    }),
                Err(e) => Err(e),
            }
        };

        if let Err(cause) = execution {
            let detail = cause.to_string();
            if let Err(record_err) = self
                .ledger
                .record(id, LedgerOutcome::Failed, Some(&detail))
                .await
            {
                log::warn!(
                    "Could not record failed attempt for '{}': {}",
                    id,
                    record_err
                );
            }
            return Err(RunError::Migration {
                id: id.to_string(),
                cause: detail,
            });
        }

        // Post-commit verification: failures are warnings, never rollbacks
        let verifier = SchemaVerifier::new(self.db);
        let probe_results = verifier.verify(&migration.probes).await;
        for result in probe_results.iter().filter(|r| !r.passed) {
            log::warn!(
                "Verification warning for '{}': {} ({})",
                id,
                result.describe(),
                result.detail.as_deref().unwrap_or("no detail")
            );
        }

        Ok(MigrationOutcome {
            id: migration.id.clone(),
            status: MigrationStatus::Applied,
            duration_secs: start.elapsed().as_secs_f64(),
            error: None,
            probe_results,
        })
    }

    /// Apply migrations in order, stopping at the first failure.
    ///
    /// The failure is captured in the report rather than propagated so
    /// callers can present every outcome of the run.
    pub async fn apply_all(&self, migrations: &[Migration]) -> RunResult<MigrationRunReport> {
        let mut report = MigrationRunReport::default();

        for migration in migrations {
            let start = Instant::now();
            match self.apply(migration).await {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(e) => {
                    report.outcomes.push(MigrationOutcome {
                        id: migration.id.clone(),
                        status: MigrationStatus::Failed,
                        duration_secs: start.elapsed().as_secs_f64(),
                        error: Some(e.to_string()),
                        probe_results: Vec::new(),
                    });
                    report.stopped_early = true;
                    break;
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
