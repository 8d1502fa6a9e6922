//! Synchronization run integration tests.
//!
//! Drives the orchestrator with an in-memory stream and a recording
//! persistor, covering the full state machine: flush on lag zero, skip on
//! unknown sites, abort on shutdown, and the fatal error paths.

mod common;

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use common::{
    known_site_payload, presence_payload, unknown_site_payload, RecordingPersistor, ScriptedStream,
};
use gatesync::{RunOutcome, SiteLocationTable, SyncVehicles, VehicleTransformer};

const UUID_A: &str = "11111111-1111-4111-8111-111111111111";
const UUID_B: &str = "22222222-2222-4222-8222-222222222222";
const UUID_C: &str = "33333333-3333-4333-8333-333333333333";

fn transformer() -> VehicleTransformer {
    VehicleTransformer::new(SiteLocationTable::default(), 30)
}

#[tokio::test]
async fn test_flush_fires_once_when_backlog_is_consumed() {
    let (stream, stream_state) = ScriptedStream::new(vec![
        known_site_payload(UUID_A),
        presence_payload(UUID_B, "atam-off-street-parking-mecenate", "G2"),
        known_site_payload(UUID_C),
    ]);
    let (persistor, calls) = RecordingPersistor::new();

    let sync = SyncVehicles::new(stream, persistor, transformer());
    let outcome = sync.execute(CancellationToken::new()).await.unwrap();

    assert_eq!(outcome, RunOutcome::Flushed { written: 3 });

    // Exactly one persistence call, carrying the full batch in order.
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let ids: Vec<String> = calls[0].iter().map(|v| v.id.clone()).collect();
    assert_eq!(
        ids,
        vec![
            format!("urn:ngsi-ld:vehicle:{}", UUID_A),
            format!("urn:ngsi-ld:vehicle:{}", UUID_B),
            format!("urn:ngsi-ld:vehicle:{}", UUID_C),
        ]
    );

    let state = stream_state.lock().unwrap();
    assert!(state.committed, "offsets must be committed after a flush");
    assert!(state.closed, "stream must be closed after a flush");
    assert!(state.seeked_to.is_none(), "a clean run never rewinds");
}

#[tokio::test]
async fn test_unknown_site_mid_run_is_skipped() {
    let (stream, _) = ScriptedStream::new(vec![
        unknown_site_payload(UUID_A),
        known_site_payload(UUID_B),
    ]);
    let (persistor, calls) = RecordingPersistor::new();

    let sync = SyncVehicles::new(stream, persistor, transformer());
    let outcome = sync.execute(CancellationToken::new()).await.unwrap();

    assert_eq!(outcome, RunOutcome::Flushed { written: 1 });

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), 1);
    assert_eq!(calls[0][0].id, format!("urn:ngsi-ld:vehicle:{}", UUID_B));
}

#[tokio::test]
async fn test_unknown_site_on_last_message_still_flushes_remainder() {
    let (stream, _) = ScriptedStream::new(vec![
        known_site_payload(UUID_A),
        unknown_site_payload(UUID_B),
    ]);
    let (persistor, calls) = RecordingPersistor::new();

    let sync = SyncVehicles::new(stream, persistor, transformer());
    let outcome = sync.execute(CancellationToken::new()).await.unwrap();

    assert_eq!(outcome, RunOutcome::Flushed { written: 1 });
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_site_as_only_message_flushes_empty_batch() {
    let (stream, stream_state) = ScriptedStream::new(vec![unknown_site_payload(UUID_A)]);
    let (persistor, calls) = RecordingPersistor::new();

    let sync = SyncVehicles::new(stream, persistor, transformer());
    let outcome = sync.execute(CancellationToken::new()).await.unwrap();

    // The run reaches the flush transition with nothing to persist: no
    // call is made, but the consumed backlog is still committed.
    assert_eq!(outcome, RunOutcome::Flushed { written: 0 });
    assert!(calls.lock().unwrap().is_empty());

    let state = stream_state.lock().unwrap();
    assert!(state.committed);
    assert!(state.closed);
}

#[tokio::test]
async fn test_malformed_payload_aborts_the_run() {
    let (stream, stream_state) = ScriptedStream::new(vec![b"{not json".to_vec()]);
    let (persistor, calls) = RecordingPersistor::new();

    let sync = SyncVehicles::new(stream, persistor, transformer());
    let result = sync.execute(CancellationToken::new()).await;

    assert!(result.is_err());
    assert!(calls.lock().unwrap().is_empty());

    let state = stream_state.lock().unwrap();
    assert!(!state.committed, "nothing may be committed on a fatal error");
    assert!(state.closed, "stream must be closed on error paths too");
}

#[tokio::test]
async fn test_shutdown_discards_partial_batch_and_rewinds() {
    // Two messages are consumed but the backlog never reaches zero, so the
    // run is still reading when the signal arrives.
    let (stream, stream_state) = ScriptedStream::new(vec![
        known_site_payload(UUID_A),
        known_site_payload(UUID_B),
    ]);
    let start_snapshot = stream.start_snapshot();
    let stream = stream.with_lag_floor(5);
    let (persistor, calls) = RecordingPersistor::new();

    let shutdown = CancellationToken::new();
    let sync = SyncVehicles::new(stream, persistor, transformer());
    let handle = tokio::spawn(sync.execute(shutdown.clone()));

    // Let the run consume the scripted messages and block on the next read.
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.cancel();

    let outcome = handle.await.unwrap().unwrap();
    assert_eq!(outcome, RunOutcome::Aborted);
    assert!(calls.lock().unwrap().is_empty(), "no persistence on shutdown");

    let state = stream_state.lock().unwrap();
    assert_eq!(
        state.seeked_to.as_ref(),
        Some(&start_snapshot),
        "offsets must rewind to the run-start snapshot"
    );
    assert!(!state.committed);
    assert!(state.closed);
}

#[tokio::test]
async fn test_shutdown_before_first_read_aborts_immediately() {
    let (stream, stream_state) = ScriptedStream::new(vec![known_site_payload(UUID_A)]);
    let (persistor, calls) = RecordingPersistor::new();

    let shutdown = CancellationToken::new();
    shutdown.cancel();

    let sync = SyncVehicles::new(stream, persistor, transformer());
    let outcome = sync.execute(shutdown).await.unwrap();

    assert_eq!(outcome, RunOutcome::Aborted);
    assert!(calls.lock().unwrap().is_empty());

    let state = stream_state.lock().unwrap();
    assert_eq!(state.messages.len(), 1, "no message may be consumed");
    assert!(state.closed);
}

#[tokio::test]
async fn test_persistence_failure_propagates_without_commit() {
    let (stream, stream_state) = ScriptedStream::new(vec![known_site_payload(UUID_A)]);
    let (persistor, _) = RecordingPersistor::failing();

    let sync = SyncVehicles::new(stream, persistor, transformer());
    let result = sync.execute(CancellationToken::new()).await;

    assert!(result.is_err());

    let state = stream_state.lock().unwrap();
    assert!(
        !state.committed,
        "a failed flush must leave offsets uncommitted so the batch replays"
    );
    assert!(state.closed);
}

#[tokio::test]
async fn test_read_error_propagates() {
    let (stream, stream_state) =
        ScriptedStream::new(vec![known_site_payload(UUID_A)]);
    let stream = stream.with_lag_floor(3).with_read_error_when_empty();
    let (persistor, calls) = RecordingPersistor::new();

    let sync = SyncVehicles::new(stream, persistor, transformer());
    let result = sync.execute(CancellationToken::new()).await;

    assert!(result.is_err());
    assert!(calls.lock().unwrap().is_empty());
    assert!(stream_state.lock().unwrap().closed);
}
