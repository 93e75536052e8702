//! Reads the input file of organization records.

use std::path::{Path, PathBuf};

use serde_json::Value;

/// Default input path when none is given on the command line.
pub const DEFAULT_INPUT_PATH: &str = "orgs.json";

/// Fatal input errors; the run does not start.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not a JSON array of records: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Read `path` as a JSON array and return the records from `offset` on,
/// in file order.
///
/// Records are returned undecoded so each one can be validated on its own.
pub async fn load_records(path: &Path, offset: usize) -> Result<Vec<Value>, LoadError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let records: Vec<Value> =
        serde_json::from_str(&contents).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let total = records.len();
    if offset > total {
        tracing::warn!(offset, total, "Offset is past the end of the input");
    }

    tracing::info!(
        path = %path.display(),
        total,
        offset,
        "Loaded input records",
    );

    Ok(records.into_iter().skip(offset).collect())
}
