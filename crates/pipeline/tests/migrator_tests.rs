//! Integration tests for the migration driver loop.
//!
//! The organization endpoint is replaced by [`ScriptedApi`]; tokio's clock
//! is paused so the inter-record delay and rate-limit cooldowns can be
//! measured without actually waiting.

mod common;

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::{json, Value};
use tokio::time::Instant;

use orgmigrate_core::{MigrationTally, RetryPolicy};
use orgmigrate_pipeline::{load_records, FailureLog, Migrator, RunError};

use common::{read_log, ScriptedApi};

const RETRY_DELAY: Duration = Duration::from_millis(100);

fn migrator(api: ScriptedApi, dir: &Path, delay: Duration) -> Migrator<ScriptedApi> {
    Migrator::new(
        api,
        delay,
        RetryPolicy::with_initial_delay(RETRY_DELAY),
        FailureLog::new(dir.join("migration-log.json")),
    )
}

/// Paused-clock timers fire on millisecond ticks, so allow a little slack.
fn assert_elapsed(start: Instant, expected: Duration) {
    let elapsed = start.elapsed();
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(5),
        "expected ~{expected:?}, got {elapsed:?}"
    );
}

// ---------------------------------------------------------------------------
// Test: happy path
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn single_valid_record_is_migrated_without_log() {
    let dir = tempfile::tempdir().unwrap();
    let mut migrator = migrator(ScriptedApi::default(), dir.path(), Duration::ZERO);

    let summary = migrator
        .run(vec![json!({ "createdBy": "u1", "name": "Acme" })])
        .await
        .unwrap();

    assert_eq!(migrator.api().calls(), 1);
    assert_eq!(
        summary.tally,
        MigrationTally {
            migrated: 1,
            already_exists: 0,
            failed: 0,
        }
    );
    assert_eq!(summary.total, 1);
    assert!(summary.failure_log.is_none());
    assert!(!migrator.failure_log().path().exists());
}

#[tokio::test(start_paused = true)]
async fn external_id_is_sent_in_private_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let mut migrator = migrator(ScriptedApi::default(), dir.path(), Duration::ZERO);

    migrator
        .run(vec![json!({
            "createdBy": "u1",
            "name": "Acme",
            "externalId": "ext-1",
            "privateMetadata": { "plan": "pro" },
            "publicMetadata": { "region": "eu" },
        })])
        .await
        .unwrap();

    let requests = migrator.api().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].created_by, "u1");
    assert_eq!(requests[0].private_metadata["externalId"], "ext-1");
    assert_eq!(requests[0].private_metadata["plan"], "pro");
    assert_eq!(requests[0].public_metadata["region"], "eu");
}

// ---------------------------------------------------------------------------
// Test: conflict
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn conflict_is_counted_and_logged_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut migrator = migrator(ScriptedApi::new([422]), dir.path(), Duration::ZERO);

    let summary = migrator
        .run(vec![json!({ "createdBy": "u2", "name": "Beta", "externalId": "ext-2" })])
        .await
        .unwrap();

    assert_eq!(summary.tally.already_exists, 1);
    assert_eq!(summary.tally.migrated, 0);
    assert_eq!(migrator.api().calls(), 1);

    let log_path = summary.failure_log.expect("conflict should be logged");
    let entries = read_log(&log_path);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["externalId"], "ext-2");
    assert_eq!(entries[0]["userId"], "u2");
    assert_eq!(entries[0]["kind"], "already_exists");
    assert_eq!(entries[0]["status"], 422);
    assert_eq!(entries[0]["details"]["errors"][0]["code"], "status_422");
}

// ---------------------------------------------------------------------------
// Test: rate limiting
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn rate_limited_record_is_retried_transparently() {
    let dir = tempfile::tempdir().unwrap();
    let mut migrator = migrator(ScriptedApi::new([429, 429]), dir.path(), Duration::ZERO);

    let start = Instant::now();
    let summary = migrator
        .run(vec![json!({ "createdBy": "u1", "name": "Acme" })])
        .await
        .unwrap();

    // Two cooldowns: 100 ms, then 200 ms.
    assert_elapsed(start, Duration::from_millis(300));
    assert_eq!(migrator.api().calls(), 3);
    assert_eq!(summary.tally.migrated, 1);
    assert_eq!(summary.tally.failed, 0);
    assert!(summary.failure_log.is_none());
}

#[tokio::test(start_paused = true)]
async fn persistent_rate_limit_gives_up_after_max_attempts() {
    let dir = tempfile::tempdir().unwrap();
    let api = ScriptedApi::new([429; 10]);
    let policy = RetryPolicy {
        max_attempts: 3,
        ..RetryPolicy::with_initial_delay(RETRY_DELAY)
    };
    let mut migrator = Migrator::new(
        api,
        Duration::ZERO,
        policy,
        FailureLog::new(dir.path().join("migration-log.json")),
    );

    let summary = migrator
        .run(vec![
            json!({ "createdBy": "u1", "name": "Acme", "externalId": "ext-1" }),
            json!({ "createdBy": "u3", "name": "Gamma" }),
        ])
        .await
        .unwrap();

    // Three attempts for the first record, three for the second
    // (script still has 429s left).
    assert_eq!(migrator.api().calls(), 6);
    assert_eq!(summary.tally.failed, 2);

    let entries = read_log(&summary.failure_log.unwrap());
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["kind"], "rate_limit_exhausted");
    assert_eq!(entries[0]["externalId"], "ext-1");
    assert_eq!(entries[0]["attempts"], 3);
    assert_eq!(entries[0]["status"], 429);
}

// ---------------------------------------------------------------------------
// Test: other failures
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn server_error_is_logged_and_not_retried() {
    let dir = tempfile::tempdir().unwrap();
    let mut migrator = migrator(ScriptedApi::new([500]), dir.path(), Duration::ZERO);

    let summary = migrator
        .run(vec![json!({ "createdBy": "u1", "name": "Acme", "externalId": "ext-1" })])
        .await
        .unwrap();

    assert_eq!(migrator.api().calls(), 1);
    assert_eq!(
        summary.tally,
        MigrationTally {
            migrated: 0,
            already_exists: 0,
            failed: 1,
        }
    );

    let entries = read_log(&summary.failure_log.unwrap());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["kind"], "rejected");
    assert_eq!(entries[0]["externalId"], "ext-1");
    assert_eq!(entries[0]["status"], 500);
}

#[tokio::test(start_paused = true)]
async fn invalid_record_is_never_submitted() {
    let dir = tempfile::tempdir().unwrap();
    let mut migrator = migrator(ScriptedApi::default(), dir.path(), Duration::ZERO);

    let summary = migrator
        .run(vec![json!({ "createdBy": "u1", "externalId": "ext-7" })])
        .await
        .unwrap();

    assert_eq!(migrator.api().calls(), 0);
    assert_eq!(summary.tally.migrated, 0);
    assert_eq!(summary.tally.already_exists, 0);
    assert_eq!(summary.tally.failed, 1);

    let entries = read_log(&summary.failure_log.unwrap());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["kind"], "invalid_record");
    assert_eq!(entries[0]["externalId"], "ext-7");
    assert!(entries[0].get("status").is_none());
}

#[tokio::test(start_paused = true)]
async fn mixed_batch_continues_past_failures() {
    let dir = tempfile::tempdir().unwrap();
    // Record 1 conflicts, record 2 is invalid (no call), record 3 fails,
    // record 4 succeeds.
    let mut migrator = migrator(ScriptedApi::new([422, 400, 201]), dir.path(), Duration::ZERO);

    let summary = migrator
        .run(vec![
            json!({ "createdBy": "u1", "name": "One" }),
            json!({ "createdBy": "u2", "name": "" }),
            json!({ "createdBy": "u3", "name": "Three" }),
            json!({ "createdBy": "u4", "name": "Four" }),
        ])
        .await
        .unwrap();

    assert_eq!(
        summary.tally,
        MigrationTally {
            migrated: 1,
            already_exists: 1,
            failed: 2,
        }
    );
    assert_eq!(summary.tally.processed(), 4);
    assert_eq!(read_log(&summary.failure_log.unwrap()).len(), 3);
}

#[tokio::test(start_paused = true)]
async fn unwritable_failure_log_stops_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut migrator = Migrator::new(
        ScriptedApi::new([500]),
        Duration::ZERO,
        RetryPolicy::with_initial_delay(RETRY_DELAY),
        FailureLog::new(dir.path().join("missing").join("log.json")),
    );

    let result = migrator
        .run(vec![
            json!({ "createdBy": "u1", "name": "Acme" }),
            json!({ "createdBy": "u2", "name": "Beta" }),
        ])
        .await;

    assert_matches!(result, Err(RunError::FailureLog { .. }));
    assert_eq!(migrator.api().calls(), 1);
}

// ---------------------------------------------------------------------------
// Test: pacing and ordering
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn delay_precedes_every_record() {
    let dir = tempfile::tempdir().unwrap();
    let mut migrator = migrator(ScriptedApi::default(), dir.path(), Duration::from_secs(1));

    let start = Instant::now();
    migrator
        .run(vec![
            json!({ "createdBy": "u1", "name": "One" }),
            json!({ "createdBy": "u2", "name": "Two" }),
            json!({ "createdBy": "u3", "name": "Three" }),
        ])
        .await
        .unwrap();

    assert_elapsed(start, Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn offset_records_are_processed_in_file_order() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("orgs.json");
    let records: Vec<Value> = ["A", "B", "C", "D", "E"]
        .iter()
        .map(|name| json!({ "createdBy": "u1", "name": name }))
        .collect();
    let mut file = std::fs::File::create(&input).unwrap();
    file.write_all(serde_json::to_string(&records).unwrap().as_bytes())
        .unwrap();

    let loaded = load_records(&input, 2).await.unwrap();
    let mut migrator = migrator(ScriptedApi::default(), dir.path(), Duration::ZERO);
    let summary = migrator.run(loaded).await.unwrap();

    let names: Vec<String> = migrator
        .api()
        .requests()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["C", "D", "E"]);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.tally.migrated, 3);
}
