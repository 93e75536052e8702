//! Organization migration pipeline.
//!
//! - [`config`] — settings from environment variables.
//! - [`loader`] — reads the input array and applies the offset.
//! - [`submit`] — one create call with rate-limit retries.
//! - [`runner`] — the sequential driver loop ([`Migrator`]).
//! - [`failure_log`] — append-only log of records that did not migrate.
//! - [`progress`] — the `current/total` status line.

pub mod config;
pub mod failure_log;
pub mod loader;
pub mod progress;
pub mod runner;
pub mod submit;

pub use config::{ConfigError, MigrationConfig};
pub use failure_log::FailureLog;
pub use loader::{load_records, LoadError, DEFAULT_INPUT_PATH};
pub use progress::ProgressLine;
pub use runner::{MigrationSummary, Migrator, RunError};
pub use submit::{submit_with_retry, Submission, SubmitReport};
