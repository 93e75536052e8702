//! Entries written to the per-run failure log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::RecordError;
use crate::record::RecordIdentity;

/// Why a record ended up in the failure log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Remote conflict (422); the organization already exists.
    AlreadyExists,
    /// The record failed schema validation and was never submitted.
    InvalidRecord,
    /// Any other non-success HTTP status.
    Rejected,
    /// Still rate limited after the last allowed attempt.
    RateLimitExhausted,
    /// The request never produced an HTTP response.
    Transport,
}

/// One failure-log entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureEntry {
    /// The record's `createdBy`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub kind: FailureKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    pub recorded_at: DateTime<Utc>,
}

impl FailureEntry {
    pub fn new(identity: RecordIdentity, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            user_id: identity.user_id,
            external_id: identity.external_id,
            kind,
            status: None,
            message: message.into(),
            details: None,
            attempts: None,
            recorded_at: Utc::now(),
        }
    }

    /// Entry for a record that failed validation.
    pub fn invalid(identity: RecordIdentity, error: &RecordError) -> Self {
        Self::new(identity, FailureKind::InvalidRecord, error.to_string())
            .with_details(error.details())
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }
}
