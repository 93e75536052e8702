//! Per-record outcomes and the run tally built from them.

use serde::Serialize;

/// Terminal result of migrating one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOutcome {
    /// The organization was created remotely.
    Migrated,
    /// The identity platform reported the organization already exists.
    AlreadyExists,
    /// Validation, remote or transport failure; see the failure log.
    Failed,
}

impl RecordOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Migrated => "migrated",
            Self::AlreadyExists => "already_exists",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RecordOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters accumulated over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationTally {
    pub migrated: usize,
    pub already_exists: usize,
    pub failed: usize,
}

impl MigrationTally {
    /// Count one terminal outcome.
    pub fn record(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Migrated => self.migrated += 1,
            RecordOutcome::AlreadyExists => self.already_exists += 1,
            RecordOutcome::Failed => self.failed += 1,
        }
    }

    /// Number of records that reached a terminal outcome.
    pub fn processed(&self) -> usize {
        self.migrated + self.already_exists + self.failed
    }
}
