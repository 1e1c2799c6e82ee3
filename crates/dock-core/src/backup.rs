//! Backup artifact discovery
//!
//! Backup dumps are produced by an external process and named by
//! convention, e.g. `kgay_backup_2025-03-15.sql`. The locator lists files
//! matching a glob pattern and picks the newest by the timestamp embedded
//! in the filename, falling back to filesystem mtime when no timestamp
//! parses.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::path::{Path, PathBuf};

/// A discovered backup dump file. Read-only; consumed once by a restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupArtifact {
    /// Path of the dump file
    pub path: PathBuf,

    /// Creation time, from the filename timestamp or filesystem metadata
    pub created_at: DateTime<Utc>,

    /// File size in bytes
    pub size: u64,
}

/// Find the most recent backup artifact in `dir` matching `pattern`.
///
/// `pattern` is a filename glob (e.g. `*_backup_*.sql`). Ties on timestamp
/// break on filename, descending, so repeated runs pick the same artifact.
pub fn find_latest(dir: &Path, pattern: &str) -> CoreResult<BackupArtifact> {
    let full_pattern = dir.join(pattern).display().to_string();
    let entries = glob::glob(&full_pattern).map_err(|e| CoreError::ConfigInvalid {
        message: format!("invalid backup pattern '{}': {}", pattern, e),
    })?;

    let mut artifacts = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(p) => p,
            Err(e) => {
                log::warn!("Skipping unreadable backup candidate: {}", e);
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }

        let metadata = std::fs::metadata(&path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let created_at = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(timestamp_from_name)
            .or_else(|| metadata.modified().ok().map(DateTime::<Utc>::from))
            .unwrap_or_else(|| DateTime::<Utc>::from_timestamp(0, 0).unwrap_or_default());

        artifacts.push(BackupArtifact {
            path,
            created_at,
            size: metadata.len(),
        });
    }

    artifacts
        .into_iter()
        .max_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.path.cmp(&b.path))
        })
        .ok_or_else(|| CoreError::NoBackupFound {
            dir: dir.display().to_string(),
            pattern: pattern.to_string(),
        })
}

/// Extract a `YYYY-MM-DD` timestamp (optionally `_HH-MM-SS`) from a filename.
fn timestamp_from_name(name: &str) -> Option<DateTime<Utc>> {
    for start in 0..name.len().saturating_sub(9) {
        let Some(window) = name.get(start..start + 10) else {
            continue;
        };
        let Ok(date) = NaiveDate::parse_from_str(window, "%Y-%m-%d") else {
            continue;
        };

        // optional time component right after the date, e.g. _14-30-00
        let time = name
            .get(start + 10..start + 19)
            .filter(|rest| rest.starts_with('_') || rest.starts_with('T'))
            .and_then(|rest| NaiveTime::parse_from_str(&rest[1..], "%H-%M-%S").ok())
            .unwrap_or_else(|| NaiveTime::from_hms_opt(0, 0, 0).expect("midnight is valid"));

        return Some(NaiveDateTime::new(date, time).and_utc());
    }

    None
}

#[cfg(test)]
#[path = "backup_test.rs"]
mod tests;
