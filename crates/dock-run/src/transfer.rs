//! Transfer runner: export, import/replace, and count verification
//!
//! Export is read-only and streams every planned table into a dump
//! artifact. Import is destructive and strictly sequential: all rows are
//! deleted children-first, then inserted parents-first, each table its own
//! unit of work. There is no cross-table rollback, so a failure mid-phase
//! leaves the target in a partial state, which is why progress is
//! persisted to the transfer state file before and after every unit.

use crate::error::{RunError, RunResult};
use dock_core::dump::{Dump, TableDump};
use dock_core::plan::TransferPlan;
use dock_core::run_state::{TransferPhase, TransferState};
use dock_core::TableConfig;
use dock_db::Database;
use std::path::{Path, PathBuf};

/// Options for an import run
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Treat planned tables missing from the dump as empty instead of
    /// failing before the delete phase
    pub allow_missing: bool,

    /// Where to persist transfer run state; no persistence when unset
    pub state_path: Option<PathBuf>,
}

/// Per-table result of an import
#[derive(Debug, Clone)]
pub struct TableTransfer {
    /// Table name
    pub table: String,

    /// Rows deleted from the target
    pub deleted: usize,

    /// Rows inserted from the dump
    pub inserted: usize,

    /// Rows the dump declared for this table
    pub expected: usize,
}

/// A count mismatch found during post-import verification.
///
/// The inserted data is already committed; a discrepancy is reported for
/// operator action, never rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discrepancy {
    /// Table name
    pub table: String,

    /// Declared row count from the dump
    pub expected: usize,

    /// Actual row count in the target after import
    pub actual: usize,
}

impl std::fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "table '{}': expected {} rows, found {}",
            self.table, self.expected, self.actual
        )
    }
}

/// Summary of an import run
#[derive(Debug, Clone, Default)]
pub struct TransferReport {
    /// Per-table results in insert order
    pub tables: Vec<TableTransfer>,

    /// Count mismatches found by verification
    pub discrepancies: Vec<Discrepancy>,
}

impl TransferReport {
    /// Total rows inserted
    pub fn total_inserted(&self) -> usize {
        self.tables.iter().map(|t| t.inserted).sum()
    }

    /// Total rows deleted
    pub fn total_deleted(&self) -> usize {
        self.tables.iter().map(|t| t.deleted).sum()
    }

    /// True when verification found no mismatches
    pub fn is_clean(&self) -> bool {
        self.discrepancies.is_empty()
    }
}

/// Export every planned table into a dump artifact.
///
/// Read-only; plan order is used only so repeated exports of the same
/// database produce identical artifacts. Zero-row tables are written as
/// empty entries so the importer can tell "empty" from "missing".
pub async fn export(db: &dyn Database, plan: &TransferPlan) -> RunResult<Dump> {
    let mut dump = Dump::new(db.backend_name());

    for table in plan.insert_order() {
        let (columns, rows) =
            db.fetch_table(table.as_str())
                .await
                .map_err(|e| RunError::Transfer {
                    phase: "export".to_string(),
                    table: table.to_string(),
                    cause: e.to_string(),
                })?;
        log::debug!("Exported {} rows from '{}'", rows.len(), table);
        dump.insert_table(table.as_str(), TableDump { columns, rows });
    }

    Ok(dump)
}

/// Validate the plan against the table configuration and import a dump.
///
/// Plan construction (and therefore cycle detection) happens before any
/// statement reaches the database.
pub async fn replace(
    db: &dyn Database,
    tables: &[TableConfig],
    dump: &Dump,
    options: &ImportOptions,
) -> RunResult<TransferReport> {
    let plan = TransferPlan::from_tables(tables)?;
    import(db, &plan, dump, options).await
}

/// Import a dump into the target: delete all rows children-first, insert
/// parents-first, then verify counts.
pub async fn import(
    db: &dyn Database,
    plan: &TransferPlan,
    dump: &Dump,
    options: &ImportOptions,
) -> RunResult<TransferReport> {
    // A planned table missing from the dump means the dump was produced
    // against a different table set. Checked before the first delete.
    if !options.allow_missing {
        for table in plan.insert_order() {
            if dump.table(table.as_str()).is_none() {
                return Err(RunError::MissingData {
                    table: table.to_string(),
                });
            }
        }
    }

    let mut state = TransferState::new();
    let mut report = TransferReport::default();
    let mut deleted_counts: Vec<(String, usize)> = Vec::new();

    // delete phase: children first, each table its own unit of work
    for table in plan.delete_order() {
        state.begin_table(TransferPhase::Delete, table.as_str());
        persist_state(&state, options.state_path.as_deref());

        match db.delete_all(table.as_str()).await {
            Ok(deleted) => {
                log::debug!("Deleted {} rows from '{}'", deleted, table);
                state.complete_table(TransferPhase::Delete, table.as_str(), deleted);
                persist_state(&state, options.state_path.as_deref());
                deleted_counts.push((table.to_string(), deleted));
            }
            Err(e) => {
                state.mark_failed(&e.to_string());
                persist_state(&state, options.state_path.as_deref());
                return Err(RunError::Transfer {
                    phase: TransferPhase::Delete.to_string(),
                    table: table.to_string(),
                    cause: e.to_string(),
                });
            }
        }
    }

    // insert phase: parents first
    for table in plan.insert_order() {
        let deleted = deleted_counts
            .iter()
            .find(|(name, _)| name == table.as_str())
            .map(|(_, n)| *n)
            .unwrap_or(0);

        let Some(table_dump) = dump.table(table.as_str()) else {
            // allowed-missing table: left empty after the delete phase
            report.tables.push(TableTransfer {
                table: table.to_string(),
                deleted,
                inserted: 0,
                expected: 0,
            });
            continue;
        };

        let expected = table_dump.row_count();
        if table_dump.rows.is_empty() {
            // zero rows is valid, skip without touching the database
            report.tables.push(TableTransfer {
                table: table.to_string(),
                deleted,
                inserted: 0,
                expected,
            });
            continue;
        }

        state.begin_table(TransferPhase::Insert, table.as_str());
        persist_state(&state, options.state_path.as_deref());

        match db
            .insert_rows(table.as_str(), &table_dump.columns, &table_dump.rows)
            .await
        {
            Ok(inserted) => {
                log::debug!("Inserted {} rows into '{}'", inserted, table);
                state.complete_table(TransferPhase::Insert, table.as_str(), inserted);
                persist_state(&state, options.state_path.as_deref());
                report.tables.push(TableTransfer {
                    table: table.to_string(),
                    deleted,
                    inserted,
                    expected,
                });
            }
            Err(e) => {
                state.mark_failed(&e.to_string());
                persist_state(&state, options.state_path.as_deref());
                return Err(RunError::Transfer {
                    phase: TransferPhase::Insert.to_string(),
                    table: table.to_string(),
                    cause: e.to_string(),
                });
            }
        }
    }

    // verify phase: compare actual counts against declared counts. Data is
    // committed either way; mismatches are reported, not rolled back.
    for table in plan.insert_order() {
        state.begin_table(TransferPhase::Verify, table.as_str());
        let expected = dump
            .table(table.as_str())
            .map(|t| t.row_count())
            .unwrap_or(0);
        let actual = db
            .count_rows(table.as_str())
            .await
            .map_err(|e| RunError::Transfer {
                phase: TransferPhase::Verify.to_string(),
                table: table.to_string(),
                cause: e.to_string(),
            })?;
        if actual != expected {
            report.discrepancies.push(Discrepancy {
                table: table.to_string(),
                expected,
                actual,
            });
        }
    }

    state.mark_completed();
    if let Some(path) = options.state_path.as_deref() {
        if report.is_clean() {
            if let Err(e) = TransferState::remove(path) {
                log::warn!("Could not remove transfer state file: {}", e);
            }
        } else {
            persist_state(&state, Some(path));
        }
    }

    Ok(report)
}

/// Best-effort state persistence; losing the state file must not fail the run.
fn persist_state(state: &TransferState, path: Option<&Path>) {
    if let Some(path) = path {
        if let Err(e) = state.save(path) {
            log::warn!("Could not save transfer state: {}", e);
        }
    }
}

#[cfg(test)]
#[path = "transfer_test.rs"]
mod tests;
