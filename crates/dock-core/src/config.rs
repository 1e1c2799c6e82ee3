//! Configuration types and parsing for dockhand.yml

use crate::error::{CoreError, CoreResult};
use crate::table_name::TableName;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Main project configuration from dockhand.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Database connection configuration
    pub database: DatabaseConfig,

    /// Migration discovery and ledger settings
    #[serde(default)]
    pub migrations: MigrationsConfig,

    /// Backup discovery settings
    #[serde(default)]
    pub backups: BackupsConfig,

    /// Configured tables in declaration order.
    ///
    /// Declaration order is the tie-break for tables with no dependency
    /// relationship, so transfer plans are deterministic.
    #[serde(default)]
    pub tables: Vec<TableConfig>,

    /// Output directory for dump artifacts and run state
    #[serde(default = "default_target_path")]
    pub target_path: String,

    /// Named target configurations (e.g., staging, prod).
    /// Each target can override the database connection.
    #[serde(default)]
    pub targets: HashMap<String, TargetConfig>,
}

/// Target-specific configuration overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TargetConfig {
    /// Database configuration override
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
}

/// Database backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Embedded DuckDB (default)
    #[default]
    DuckDb,
    /// Remote SQL-execution endpoint over HTTP
    Http,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::DuckDb => write!(f, "duckdb"),
            BackendKind::Http => write!(f, "http"),
        }
    }
}

/// Database connection configuration.
///
/// There is deliberately no default connection string: a run with no
/// configured target is a configuration error, caught before any
/// connection attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Backend type (duckdb or http)
    #[serde(rename = "type", default)]
    pub backend: BackendKind,

    /// Database path for DuckDB (file path or `:memory:`)
    #[serde(default)]
    pub path: Option<String>,

    /// Endpoint URL for the http backend
    #[serde(default)]
    pub url: Option<String>,

    /// Environment variable holding the API key for the http backend
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Request timeout for the http backend, seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl DatabaseConfig {
    fn validate(&self, context: &str) -> CoreResult<()> {
        match self.backend {
            BackendKind::DuckDb => {
                if self.path.as_deref().unwrap_or("").is_empty() {
                    return Err(CoreError::ConfigInvalid {
                        message: format!("{}: duckdb backend requires a non-empty 'path'", context),
                    });
                }
            }
            BackendKind::Http => {
                if self.url.as_deref().unwrap_or("").is_empty() {
                    return Err(CoreError::ConfigInvalid {
                        message: format!("{}: http backend requires a non-empty 'url'", context),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Migration discovery and ledger settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationsConfig {
    /// Directory containing migration SQL files
    #[serde(default = "default_migrations_path")]
    pub path: String,

    /// Name of the ledger table tracking applied migrations
    #[serde(default = "default_ledger_table")]
    pub table: String,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            path: default_migrations_path(),
            table: default_ledger_table(),
        }
    }
}

/// Backup discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupsConfig {
    /// Directory containing backup dump files
    #[serde(default = "default_backups_dir")]
    pub dir: String,

    /// Filename glob pattern for backup artifacts
    #[serde(default = "default_backup_pattern")]
    pub pattern: String,
}

impl Default for BackupsConfig {
    fn default() -> Self {
        Self {
            dir: default_backups_dir(),
            pattern: default_backup_pattern(),
        }
    }
}

/// A configured table and the tables it references via foreign key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Table name
    pub name: TableName,

    /// Tables this table references (its parents)
    #[serde(default)]
    pub depends_on: Vec<TableName>,
}

fn default_target_path() -> String {
    "target".to_string()
}

fn default_migrations_path() -> String {
    "migrations".to_string()
}

fn default_ledger_table() -> String {
    "dockhand_migrations".to_string()
}

fn default_backups_dir() -> String {
    "backups".to_string()
}

fn default_backup_pattern() -> String {
    "*_backup_*.sql".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory.
    /// Looks for dockhand.yml or dockhand.yaml.
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("dockhand.yml");
        let yaml_path = dir.join("dockhand.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: dir.join("dockhand.yml").display().to_string(),
            })
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        self.database.validate("database")?;
        for (name, target) in &self.targets {
            if let Some(db) = &target.database {
                db.validate(&format!("targets.{}.database", name))?;
            }
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for table in &self.tables {
            if !seen.insert(table.name.as_str()) {
                return Err(CoreError::DuplicateTable {
                    name: table.name.to_string(),
                });
            }
        }
        for table in &self.tables {
            for dep in &table.depends_on {
                if dep != &table.name && !seen.contains(dep.as_str()) {
                    return Err(CoreError::UnknownDependency {
                        table: table.name.to_string(),
                        dependency: dep.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Get database configuration, optionally applying target overrides.
    ///
    /// If target is specified and exists, its database override (when set)
    /// replaces the base database config.
    pub fn get_database_config(&self, target: Option<&str>) -> CoreResult<DatabaseConfig> {
        match target {
            Some(name) => {
                let target_config =
                    self.targets
                        .get(name)
                        .ok_or_else(|| CoreError::ConfigInvalid {
                            message: format!(
                                "Target '{}' not found. Available targets: {}",
                                name,
                                self.available_targets().join(", ")
                            ),
                        })?;

                Ok(target_config
                    .database
                    .clone()
                    .unwrap_or_else(|| self.database.clone()))
            }
            None => Ok(self.database.clone()),
        }
    }

    /// Get the list of available target names
    pub fn available_targets(&self) -> Vec<&str> {
        self.targets.keys().map(|s| s.as_str()).collect()
    }

    /// Resolve target from CLI flag or DOCKHAND_TARGET environment variable.
    ///
    /// Priority: CLI flag > DOCKHAND_TARGET env var > None
    pub fn resolve_target(cli_target: Option<&str>) -> Option<String> {
        cli_target
            .map(String::from)
            .or_else(|| std::env::var("DOCKHAND_TARGET").ok())
    }

    /// Absolute migrations directory relative to a project root
    pub fn migrations_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations.path)
    }

    /// Absolute backups directory relative to a project root
    pub fn backups_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.backups.dir)
    }

    /// Absolute target path relative to a project root
    pub fn target_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.target_path)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
