//! Post-migration schema verification
//!
//! Probes run after a migration commits. A failing probe never unwinds the
//! migration: the schema change already stands, and the probe itself may
//! be the broken part. Results are reported as warnings, kept apart
//! from migration errors.

use dock_core::migration::Probe;
use dock_db::Database;

/// Result of one probe
#[derive(Debug, Clone)]
pub struct ProbeResult {
    /// The probe that ran
    pub probe: Probe,

    /// Whether the expected post-condition held
    pub passed: bool,

    /// Failure or execution-error detail
    pub detail: Option<String>,
}

impl ProbeResult {
    /// Human-readable description of the probe
    pub fn describe(&self) -> String {
        match &self.probe {
            Probe::Table(t) => format!("table '{}' exists", t),
            Probe::Function(f) => format!("function '{}' exists", f),
            Probe::Query(q) => format!("query returns rows: {}", q),
        }
    }
}

/// Schema verifier running read-only probes against a database
pub struct SchemaVerifier<'a> {
    db: &'a dyn Database,
}

impl<'a> SchemaVerifier<'a> {
    /// Create a new verifier
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    /// Run a single probe.
    ///
    /// A database error during the probe marks it failed with the error as
    /// detail rather than propagating: verification must never be mistaken
    /// for a failed migration.
    pub async fn run_probe(&self, probe: &Probe) -> ProbeResult {
        let outcome = match probe {
            Probe::Table(table) => self.db.table_exists(table).await,
            Probe::Function(function) => self.db.function_exists(function).await,
            Probe::Query(query) => self.db.query_count(query).await.map(|n| n > 0),
        };

        match outcome {
            Ok(true) => ProbeResult {
                probe: probe.clone(),
                passed: true,
                detail: None,
            },
            Ok(false) => ProbeResult {
                probe: probe.clone(),
                passed: false,
                detail: Some("expected post-condition does not hold".to_string()),
            },
            Err(e) => ProbeResult {
                probe: probe.clone(),
                passed: false,
                detail: Some(format!("probe execution failed: {}", e)),
            },
        }
    }

    /// Run all probes in order
    pub async fn verify(&self, probes: &[Probe]) -> Vec<ProbeResult> {
        let mut results = Vec::with_capacity(probes.len());
        for probe in probes {
            results.push(self.run_probe(probe).await);
        }
        results
    }
}

/// True when every probe passed (vacuously true for no probes)
pub fn all_passed(results: &[ProbeResult]) -> bool {
    results.iter().all(|r| r.passed)
}

#[cfg(test)]
#[path = "verify_test.rs"]
mod tests;
