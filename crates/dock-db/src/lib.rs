//! dock-db - Database abstraction layer for Dockhand
//!
//! This crate provides the `Database` trait and implementations for
//! embedded DuckDB and for a remote SQL-execution endpoint over HTTP.

pub mod duckdb;
pub mod error;
pub mod http;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use http::HttpBackend;
pub use traits::{Database, TableRows};

use dock_core::config::{BackendKind, DatabaseConfig};
use std::sync::Arc;
use std::time::Duration;

/// Build a backend from a validated database configuration.
///
/// Configuration completeness (path/url presence) is checked by
/// `Config::validate` before this is called; here the remaining failure
/// modes are connection-level.
pub fn connect(config: &DatabaseConfig) -> DbResult<Arc<dyn Database>> {
    match config.backend {
        BackendKind::DuckDb => {
            let path = config
                .path
                .as_deref()
                .ok_or_else(|| DbError::ConnectionError("duckdb path not configured".into()))?;
            Ok(Arc::new(DuckDbBackend::new(path)?))
        }
        BackendKind::Http => {
            let url = config
                .url
                .as_deref()
                .ok_or_else(|| DbError::ConnectionError("http url not configured".into()))?;
            let api_key = match &config.api_key_env {
                Some(var) => Some(std::env::var(var).map_err(|_| {
                    DbError::ConnectionError(format!(
                        "API key environment variable '{}' is not set",
                        var
                    ))
                })?),
                None => None,
            };
            Ok(Arc::new(HttpBackend::new(
                url,
                api_key,
                Duration::from_secs(config.timeout_secs),
            )?))
        }
    }
}
