//! Shared command helpers and exit codes
//!
//! Fatal error classes get distinct exit codes so wrapper scripts can tell
//! a configuration bug from an unreachable target. Code 8 is special: the
//! destructive action committed, only verification flagged it.

/// Unclassified error
pub(crate) const EXIT_GENERAL: i32 = 1;

/// Missing or invalid configuration
pub(crate) const EXIT_CONFIG: i32 = 1;

/// Target database unreachable
pub(crate) const EXIT_CONNECTION: i32 = 2;

/// Migration script failed (rolled back where the engine allows)
pub(crate) const EXIT_MIGRATION: i32 = 3;

/// Cyclic table dependency; nothing was touched
pub(crate) const EXIT_PLANNING: i32 = 4;

/// Planned table missing from the dump; nothing was touched
pub(crate) const EXIT_MISSING_DATA: i32 = 5;

/// No backup artifact matched the configured pattern
pub(crate) const EXIT_NO_BACKUP: i32 = 6;

/// Transfer or restore failed mid-phase; target is in a partial state
pub(crate) const EXIT_TRANSFER: i32 = 7;

/// The change is committed but verification found problems
pub(crate) const EXIT_COMMITTED_WITH_WARNINGS: i32 = 8;

/// Milliseconds for progress lines
pub(crate) fn millis(duration_secs: f64) -> u64 {
    (duration_secs * 1000.0) as u64
}
