//! Domain types for the organization migration: the input record schema,
//! per-record outcomes, the rate-limit retry policy and failure-log
//! entries.
//!
//! Nothing here performs I/O.

pub mod error;
pub mod failure;
pub mod outcome;
pub mod record;
pub mod retry;

pub use error::RecordError;
pub use failure::{FailureEntry, FailureKind};
pub use outcome::{MigrationTally, RecordOutcome};
pub use record::{validate_record, OrgRecord, RecordIdentity};
pub use retry::RetryPolicy;
