//! Migration settings loaded from environment variables.

use std::time::Duration;

use orgmigrate_core::RetryPolicy;
use orgmigrate_identity::{SecretKey, DEFAULT_API_URL};

/// Default pause before every record.
const DEFAULT_DELAY_MS: u64 = 1_000;

/// Default first cooldown after a rate-limit response.
const DEFAULT_RETRY_DELAY_MS: u64 = 10_000;

/// Errors that abort the run before any record is processed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API_SECRET_KEY environment variable is required")]
    MissingSecretKey,

    #[error(
        "API_SECRET_KEY is a development key; set IMPORT_TO_DEV_INSTANCE=true to import into a development instance"
    )]
    DevInstanceNotAllowed,

    #[error("{var} has invalid value {value:?}: expected {expected}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Settings for one migration run.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub secret_key: SecretKey,
    /// Management API base URL (default: `https://api.clerk.com/v1`).
    pub api_url: String,
    /// Pause before every record (default: 1000 ms).
    pub delay: Duration,
    /// First rate-limit cooldown (default: 10000 ms).
    pub retry_delay: Duration,
    pub import_to_dev_instance: bool,
    /// Leading input records to skip (default: 0).
    pub offset: usize,
}

impl MigrationConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `API_SECRET_KEY`         | required                   |
    /// | `API_URL`                | `https://api.clerk.com/v1` |
    /// | `DELAY_MS`               | `1000`                     |
    /// | `RETRY_DELAY_MS`         | `10000`                    |
    /// | `IMPORT_TO_DEV_INSTANCE` | `false`                    |
    /// | `OFFSET`                 | `0`                        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_key = lookup("API_SECRET_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(SecretKey::new)
            .ok_or(ConfigError::MissingSecretKey)?;

        let import_to_dev_instance = match lookup("IMPORT_TO_DEV_INSTANCE").as_deref() {
            None | Some("") | Some("false") => false,
            Some("true") => true,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "IMPORT_TO_DEV_INSTANCE",
                    value: other.to_string(),
                    expected: "\"true\" or \"false\"",
                })
            }
        };

        if secret_key.is_development() && !import_to_dev_instance {
            return Err(ConfigError::DevInstanceNotAllowed);
        }

        let api_url = lookup("API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let delay_ms = parse_var(&lookup, "DELAY_MS", DEFAULT_DELAY_MS)?;
        let retry_delay_ms = parse_var(&lookup, "RETRY_DELAY_MS", DEFAULT_RETRY_DELAY_MS)?;
        let offset = parse_var(&lookup, "OFFSET", 0usize)?;

        Ok(Self {
            secret_key,
            api_url,
            delay: Duration::from_millis(delay_ms),
            retry_delay: Duration::from_millis(retry_delay_ms),
            import_to_dev_instance,
            offset,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::with_initial_delay(self.retry_delay)
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) if value.trim().is_empty() => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            value,
            expected: "a non-negative integer",
        }),
    }
}
