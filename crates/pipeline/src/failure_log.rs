//! Append-only log of records that did not migrate.
//!
//! Each entry is written as pretty-printed JSON followed by a newline, so
//! the file as a whole is a sequence of documents rather than one array.
//! The file is only created once the first entry is appended.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use orgmigrate_core::FailureEntry;

/// Log of failures for a single run.
#[derive(Debug)]
pub struct FailureLog {
    path: PathBuf,
    file: Option<File>,
    entries: usize,
}

impl FailureLog {
    /// Log at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
            entries: 0,
        }
    }

    /// Log named after the run start time, e.g.
    /// `migration-log-2024-05-01T12:30:00.json`, inside `dir`.
    pub fn for_run(dir: &Path, started_at: DateTime<Utc>) -> Self {
        Self::new(dir.join(file_name(started_at)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries appended during this run.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Append one entry, creating the file on first use.
    pub async fn append(&mut self, entry: &FailureEntry) -> io::Result<()> {
        let mut text = serde_json::to_string_pretty(entry)?;
        text.push('\n');

        if self.file.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await?;
            tracing::debug!(path = %self.path.display(), "Created failure log");
            self.file = Some(file);
        }
        if let Some(file) = self.file.as_mut() {
            file.write_all(text.as_bytes()).await?;
            file.flush().await?;
        }

        self.entries += 1;
        Ok(())
    }
}

fn file_name(started_at: DateTime<Utc>) -> String {
    format!("migration-log-{}.json", started_at.format("%Y-%m-%dT%H:%M:%S"))
}
