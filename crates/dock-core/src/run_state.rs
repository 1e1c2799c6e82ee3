//! Transfer run state for partial-progress recovery
//!
//! The import path is destructive across many tables with no cross-table
//! rollback, so the runner persists its position (phase, current table,
//! per-table counts) before and after each unit of work. An operator
//! interrupt or failure mid-phase leaves a state file describing exactly
//! where the run stopped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::CoreResult;

/// Destructive phase the run is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferPhase {
    /// Deleting rows, children first
    Delete,
    /// Inserting rows, parents first
    Insert,
    /// Comparing row counts against declared counts
    Verify,
}

impl std::fmt::Display for TransferPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferPhase::Delete => write!(f, "delete"),
            TransferPhase::Insert => write!(f, "insert"),
            TransferPhase::Verify => write!(f, "verify"),
        }
    }
}

/// Status of a transfer run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    /// Run in progress
    Running,
    /// Run completed
    Completed,
    /// Run failed; `error` holds the cause
    Failed,
}

/// Per-table progress record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableProgress {
    /// Table name
    pub table: String,

    /// Rows affected (deleted or inserted)
    pub rows: usize,

    /// When the table finished
    pub completed_at: DateTime<Utc>,
}

/// State of a transfer run in progress or just finished
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferState {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the state was last updated
    pub last_updated_at: DateTime<Utc>,

    /// Current status
    pub status: TransferStatus,

    /// Current phase
    pub phase: TransferPhase,

    /// Table currently being worked on, if any
    pub current_table: Option<String>,

    /// Tables whose delete unit completed
    pub deleted: Vec<TableProgress>,

    /// Tables whose insert unit completed
    pub inserted: Vec<TableProgress>,

    /// Error message when the run failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransferState {
    /// Create a new running state, starting in the delete phase
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            last_updated_at: Utc::now(),
            status: TransferStatus::Running,
            phase: TransferPhase::Delete,
            current_table: None,
            deleted: Vec::new(),
            inserted: Vec::new(),
            error: None,
        }
    }

    /// Record that work on a table is starting in the given phase
    pub fn begin_table(&mut self, phase: TransferPhase, table: &str) {
        self.phase = phase;
        self.current_table = Some(table.to_string());
        self.last_updated_at = Utc::now();
    }

    /// Record a completed per-table unit of work
    pub fn complete_table(&mut self, phase: TransferPhase, table: &str, rows: usize) {
        let progress = TableProgress {
            table: table.to_string(),
            rows,
            completed_at: Utc::now(),
        };
        match phase {
            TransferPhase::Delete => self.deleted.push(progress),
            TransferPhase::Insert => self.inserted.push(progress),
            TransferPhase::Verify => {}
        }
        self.current_table = None;
        self.last_updated_at = Utc::now();
    }

    /// Mark the run failed with its cause
    pub fn mark_failed(&mut self, error: &str) {
        self.status = TransferStatus::Failed;
        self.error = Some(error.to_string());
        self.last_updated_at = Utc::now();
    }

    /// Mark the run completed
    pub fn mark_completed(&mut self) {
        self.status = TransferStatus::Completed;
        self.current_table = None;
        self.last_updated_at = Utc::now();
    }

    /// Load state from a file path
    pub fn load(path: &Path) -> CoreResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)?;
        let state: TransferState = serde_json::from_str(&content)?;
        Ok(Some(state))
    }

    /// Save state to a file path atomically (write-temp-then-rename)
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Remove the state file after a clean completion
    pub fn remove(path: &Path) -> CoreResult<()> {
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

impl Default for TransferState {
    fn default() -> Self {
        Self::new()
    }
}
