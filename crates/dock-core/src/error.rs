//! Error types for dock-core

use thiserror::Error;

/// Core error type for Dockhand
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Invalid configuration value
    #[error("[E002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E003: Duplicate table in the configured table list
    #[error("[E003] Duplicate table in config: {name}")]
    DuplicateTable { name: String },

    /// E004: Dependency on a table that is not in the configured set
    #[error("[E004] Table '{table}' depends on '{dependency}', which is not a configured table")]
    UnknownDependency { table: String, dependency: String },

    /// E005: Circular dependency among configured tables
    #[error("[E005] Circular table dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// E006: Migrations directory not found
    #[error("[E006] Migrations directory not found: {path}")]
    MigrationsDirNotFound { path: String },

    /// E007: Named migration not found in the migrations directory
    #[error("[E007] Migration not found: {id}")]
    MigrationNotFound { id: String },

    /// E008: Dump file is malformed or has an unsupported format version
    #[error("[E008] Invalid dump file: {message}")]
    DumpFormat { message: String },

    /// E009: No backup artifact matched the naming pattern
    #[error("[E009] No backup matching '{pattern}' found in {dir}")]
    NoBackupFound { dir: String, pattern: String },

    /// E010: IO error
    #[error("[E010] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E011: IO error with file path context
    #[error("[E011] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E012: Empty name where a non-empty identifier is required
    #[error("[E012] Empty name: {context}")]
    EmptyName { context: String },

    /// E013: YAML parse error
    #[error("[E013] YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// E014: JSON serialization/deserialization error
    #[error("[E014] JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
