//! The migration driver loop.
//!
//! Records are handled strictly one after another: flat delay, validate,
//! submit (with rate-limit retries), then record the outcome in the tally
//! and, for anything but a success, in the failure log.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;

use orgmigrate_core::{
    validate_record, FailureEntry, FailureKind, MigrationTally, RecordIdentity, RecordOutcome,
    RetryPolicy,
};
use orgmigrate_identity::{IdentityApiError, NewOrganization, OrganizationApi};

use crate::failure_log::FailureLog;
use crate::progress::ProgressLine;
use crate::submit::{submit_with_retry, Submission, SubmitReport};

/// Errors that stop the run midway.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Failed to write failure log {path}: {source}")]
    FailureLog {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationSummary {
    pub total: usize,
    pub tally: MigrationTally,
    /// Set when at least one failure entry was written.
    pub failure_log: Option<PathBuf>,
}

/// Drives records through validation and submission.
pub struct Migrator<A> {
    api: A,
    delay: Duration,
    retry_policy: RetryPolicy,
    failure_log: FailureLog,
    progress: ProgressLine,
}

impl<A: OrganizationApi> Migrator<A> {
    pub fn new(api: A, delay: Duration, retry_policy: RetryPolicy, failure_log: FailureLog) -> Self {
        Self {
            api,
            delay,
            retry_policy,
            failure_log,
            progress: ProgressLine::hidden(),
        }
    }

    /// Show the status line on `progress` instead of discarding it.
    pub fn with_progress(mut self, progress: ProgressLine) -> Self {
        self.progress = progress;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn failure_log(&self) -> &FailureLog {
        &self.failure_log
    }

    /// Migrate every record in order and return the counts.
    pub async fn run(&mut self, records: Vec<Value>) -> Result<MigrationSummary, RunError> {
        let total = records.len();
        let mut tally = MigrationTally::default();

        tracing::info!(total, delay_ms = self.delay.as_millis() as u64, "Starting migration");

        for (index, raw) in records.iter().enumerate() {
            tokio::time::sleep(self.delay).await;
            self.progress.update(index + 1, total);

            let outcome = self.migrate_one(raw).await;
            match outcome {
                Ok(outcome) => tally.record(outcome),
                Err(e) => {
                    self.progress.finish();
                    return Err(e);
                }
            }
        }
        self.progress.finish();

        tracing::info!(
            migrated = tally.migrated,
            already_exists = tally.already_exists,
            failed = tally.failed,
            "Migration finished",
        );

        Ok(MigrationSummary {
            total,
            tally,
            failure_log: (self.failure_log.entries() > 0)
                .then(|| self.failure_log.path().to_path_buf()),
        })
    }

    /// Validate, submit and log a single record. No inter-record delay.
    pub async fn migrate_one(&mut self, raw: &Value) -> Result<RecordOutcome, RunError> {
        let record = match validate_record(raw) {
            Ok(record) => record,
            Err(e) => {
                let identity = RecordIdentity::from_raw(raw);
                tracing::warn!(
                    external_id = identity.external_id.as_deref().unwrap_or("-"),
                    error = %e,
                    "Skipping invalid record",
                );
                self.log_failure(&FailureEntry::invalid(identity, &e)).await?;
                return Ok(RecordOutcome::Failed);
            }
        };

        let organization = NewOrganization::from(&record);
        let SubmitReport {
            attempts,
            submission,
        } = submit_with_retry(&self.api, &organization, &self.retry_policy).await;

        let identity = record.identity();
        match submission {
            Submission::Created(created) => {
                tracing::debug!(
                    org_id = created.id.as_deref().unwrap_or("-"),
                    name = %record.name,
                    attempts,
                    "Organization created",
                );
                Ok(RecordOutcome::Migrated)
            }
            Submission::Conflict(e) => {
                tracing::debug!(name = %record.name, "Organization already exists");
                let entry = api_failure(identity, FailureKind::AlreadyExists, &e, attempts);
                self.log_failure(&entry).await?;
                Ok(RecordOutcome::AlreadyExists)
            }
            Submission::RateLimitExhausted(e) => {
                tracing::error!(name = %record.name, attempts, "Still rate limited, giving up on record");
                let entry = api_failure(identity, FailureKind::RateLimitExhausted, &e, attempts);
                self.log_failure(&entry).await?;
                Ok(RecordOutcome::Failed)
            }
            Submission::Failed(e) => {
                tracing::error!(name = %record.name, error = %e, "Failed to create organization");
                let kind = match e {
                    IdentityApiError::Request(_) => FailureKind::Transport,
                    IdentityApiError::Api { .. } => FailureKind::Rejected,
                };
                let entry = api_failure(identity, kind, &e, attempts);
                self.log_failure(&entry).await?;
                Ok(RecordOutcome::Failed)
            }
        }
    }

    async fn log_failure(&mut self, entry: &FailureEntry) -> Result<(), RunError> {
        self.failure_log
            .append(entry)
            .await
            .map_err(|source| RunError::FailureLog {
                path: self.failure_log.path().to_path_buf(),
                source,
            })
    }
}

fn api_failure(
    identity: RecordIdentity,
    kind: FailureKind,
    error: &IdentityApiError,
    attempts: u32,
) -> FailureEntry {
    let mut entry = FailureEntry::new(identity, kind, error.to_string()).with_attempts(attempts);
    if let Some(status) = error.status() {
        entry = entry.with_status(status);
    }
    if let Some(details) = error.details() {
        entry = entry.with_details(details);
    }
    entry
}
