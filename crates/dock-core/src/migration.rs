//! Migration discovery and sidecar metadata
//!
//! A migration is a SQL file in the configured migrations directory. The
//! file stem is its identifier; identifiers sort lexicographically, so the
//! conventional `NNNN_description.sql` naming gives apply order for free.
//! An optional YAML sidecar with the same stem declares post-apply
//! verification probes.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Unique, sortable migration identifier (the SQL file stem)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MigrationId(String);

impl MigrationId {
    /// Create a new identifier, panicking in debug builds if empty
    pub fn new(id: impl Into<String>) -> Self {
        let s = id.into();
        debug_assert!(!s.is_empty(), "MigrationId must not be empty");
        Self(s)
    }

    /// Return the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MigrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MigrationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A post-apply verification probe, declared in the migration's sidecar.
///
/// Sidecar syntax (externally tagged):
/// ```yaml
/// verify:
///   - table: users
///   - function: update_trip_counts
///   - query: "SELECT 1 FROM users LIMIT 1"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Probe {
    /// The named table (or view) must exist
    Table(String),
    /// The named function must exist
    Function(String),
    /// The query must return at least one row
    Query(String),
}

/// Sidecar metadata file (`<id>.yml` next to `<id>.sql`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationSidecar {
    /// Human description of the change
    #[serde(default)]
    pub description: Option<String>,

    /// Post-apply verification probes
    #[serde(default)]
    pub verify: Vec<Probe>,
}

/// A discovered migration: identifier, payload, and probes
#[derive(Debug, Clone)]
pub struct Migration {
    /// Unique identifier (file stem)
    pub id: MigrationId,

    /// Absolute path of the SQL file
    pub path: PathBuf,

    /// Opaque payload text
    pub sql: String,

    /// Human description from the sidecar, if any
    pub description: Option<String>,

    /// Post-apply probes from the sidecar
    pub probes: Vec<Probe>,
}

/// Discover all migrations in a directory, sorted by identifier.
pub fn discover_migrations(dir: &Path) -> CoreResult<Vec<Migration>> {
    if !dir.is_dir() {
        return Err(CoreError::MigrationsDirNotFound {
            path: dir.display().to_string(),
        });
    }

    let mut migrations = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.extension().is_some_and(|e| e == "sql") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let sql = std::fs::read_to_string(&path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let sidecar = load_sidecar(&path)?;

        migrations.push(Migration {
            id: MigrationId::new(stem),
            path: path.clone(),
            sql,
            description: sidecar.description,
            probes: sidecar.verify,
        });
    }

    migrations.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(migrations)
}

/// Find one migration by identifier.
pub fn find_migration(dir: &Path, id: &str) -> CoreResult<Migration> {
    discover_migrations(dir)?
        .into_iter()
        .find(|m| m.id.as_str() == id)
        .ok_or_else(|| CoreError::MigrationNotFound { id: id.to_string() })
}

/// Load the sidecar for a migration SQL file, defaulting to empty.
fn load_sidecar(sql_path: &Path) -> CoreResult<MigrationSidecar> {
    for ext in ["yml", "yaml"] {
        let candidate = sql_path.with_extension(ext);
        if candidate.exists() {
            let content =
                std::fs::read_to_string(&candidate).map_err(|e| CoreError::IoWithPath {
                    path: candidate.display().to_string(),
                    source: e,
                })?;
            return Ok(serde_yaml::from_str(&content)?);
        }
    }
    Ok(MigrationSidecar::default())
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
