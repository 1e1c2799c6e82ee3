//! dock-core - Core library for Dockhand
//!
//! This crate provides shared types, configuration parsing, the table
//! dependency graph and transfer planning, migration discovery, the dump
//! interchange format, and backup artifact location used across all
//! Dockhand components.

pub mod backup;
pub mod config;
pub mod dump;
pub mod error;
pub mod graph;
pub mod migration;
pub mod plan;
pub mod run_state;
pub mod sql_utils;
pub mod table_name;

pub use backup::{find_latest, BackupArtifact};
pub use config::{BackendKind, BackupsConfig, Config, DatabaseConfig, MigrationsConfig, TableConfig};
pub use dump::{Dump, TableDump, DUMP_FORMAT_VERSION};
pub use error::{CoreError, CoreResult};
pub use graph::TableGraph;
pub use migration::{discover_migrations, find_migration, Migration, MigrationId, Probe};
pub use plan::TransferPlan;
pub use run_state::{TableProgress, TransferPhase, TransferState, TransferStatus};
pub use table_name::TableName;
