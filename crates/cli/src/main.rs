//! `org-migrate` -- batch-migrates organization records from a JSON file
//! into the identity platform.
//!
//! Records are created one at a time with a fixed pause between them.
//! Rate-limited requests are retried with backoff; conflicts and other
//! failures are written to `migration-log-<timestamp>.json` in the
//! working directory.
//!
//! # Environment variables
//!
//! | Variable                 | Required | Default                    | Description                          |
//! |--------------------------|----------|----------------------------|--------------------------------------|
//! | `API_SECRET_KEY`         | yes      | --                         | Management API secret key            |
//! | `IMPORT_TO_DEV_INSTANCE` | no       | `false`                    | Allow a development (`sk_test_`) key |
//! | `DELAY_MS`               | no       | `1000`                     | Pause before every record            |
//! | `RETRY_DELAY_MS`         | no       | `10000`                    | First cooldown after a 429           |
//! | `OFFSET`                 | no       | `0`                        | Leading records to skip              |
//! | `API_URL`                | no       | `https://api.clerk.com/v1` | Management API base URL              |

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orgmigrate_identity::IdentityApi;
use orgmigrate_pipeline::{
    load_records, FailureLog, MigrationConfig, MigrationSummary, Migrator, ProgressLine,
    DEFAULT_INPUT_PATH,
};

#[derive(Debug, Parser)]
#[command(name = "org-migrate", version, about = "Migrate organizations into the identity platform")]
struct Args {
    /// JSON file containing an array of organization records.
    #[arg(default_value = DEFAULT_INPUT_PATH)]
    input: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Log lines share stderr with the status line and end it before printing.
    let progress = ProgressLine::stderr();
    let status_line = progress.clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orgmigrate_cli=info,orgmigrate_pipeline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(move || {
            status_line.finish();
            std::io::stderr()
        }))
        .init();

    let args = Args::parse();

    let config = MigrationConfig::from_env().context("Invalid configuration")?;

    tracing::info!(
        input = %args.input.display(),
        api_url = %config.api_url,
        offset = config.offset,
        dev_instance = config.import_to_dev_instance,
        "Starting org-migrate",
    );

    let records = load_records(&args.input, config.offset).await?;

    let log_dir = std::env::current_dir().context("Cannot resolve working directory")?;
    let failure_log = FailureLog::for_run(&log_dir, Utc::now());

    let api = IdentityApi::new(config.api_url.clone(), config.secret_key.clone());
    let mut migrator = Migrator::new(api, config.delay, config.retry_policy(), failure_log)
        .with_progress(progress);

    let summary = migrator.run(records).await?;
    print_summary(&summary);

    Ok(())
}

fn print_summary(summary: &MigrationSummary) {
    let tally = &summary.tally;
    println!("Migrated {} organizations", tally.migrated);
    println!("{} organizations already existed", tally.already_exists);
    println!("{} organizations failed", tally.failed);
    if let Some(path) = &summary.failure_log {
        println!("Failures logged to {}", path.display());
    }
}
