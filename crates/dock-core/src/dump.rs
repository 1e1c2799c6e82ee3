//! Dump artifact: the export/import interchange format
//!
//! A dump is a single self-describing JSON document: metadata plus a
//! top-level mapping from table name to column header and row records.
//! Every table in the transfer plan appears as a key, zero-row tables
//! included, so a missing key on import means the dump was produced
//! against a different table set.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Current dump format version
pub const DUMP_FORMAT_VERSION: u32 = 1;

/// All rows of one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDump {
    /// Column names, in the order row values are stored
    pub columns: Vec<String>,

    /// Row records; each row has one value per column
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl TableDump {
    /// Declared row count for post-import verification
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// A whole-database dump artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dump {
    /// Format version for forward compatibility
    pub format_version: u32,

    /// When the dump was produced
    pub created_at: DateTime<Utc>,

    /// Backend the dump was read from
    pub source: String,

    /// Table name -> contents
    pub tables: BTreeMap<String, TableDump>,
}

impl Dump {
    /// Create an empty dump for the given source backend
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            format_version: DUMP_FORMAT_VERSION,
            created_at: Utc::now(),
            source: source.into(),
            tables: BTreeMap::new(),
        }
    }

    /// Add one table's contents
    pub fn insert_table(&mut self, name: impl Into<String>, table: TableDump) {
        self.tables.insert(name.into(), table);
    }

    /// Look up a table by name
    pub fn table(&self, name: &str) -> Option<&TableDump> {
        self.tables.get(name)
    }

    /// Total declared row count across all tables
    pub fn total_rows(&self) -> usize {
        self.tables.values().map(|t| t.row_count()).sum()
    }

    /// Load a dump from a JSON file
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let dump: Dump = serde_json::from_str(&content).map_err(|e| CoreError::DumpFormat {
            message: format!("{}: {}", path.display(), e),
        })?;

        if dump.format_version != DUMP_FORMAT_VERSION {
            return Err(CoreError::DumpFormat {
                message: format!(
                    "unsupported format version {} (expected {})",
                    dump.format_version, DUMP_FORMAT_VERSION
                ),
            });
        }
        Ok(dump)
    }

    /// Save the dump to a JSON file atomically.
    ///
    /// Writes to a temp file then renames, so a crash never leaves a
    /// half-written artifact in place of a good one.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&temp_path, json)?;
        std::fs::rename(&temp_path, path)?;

        Ok(())
    }
}

#[cfg(test)]
#[path = "dump_test.rs"]
mod tests;
