//! Shared fixtures for integration tests: an in-memory event stream, a
//! recording persistor and presence event payload builders.

// Each integration test binary compiles this module separately and uses a
// different subset of it.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use gatesync::broker::ClientError;
use gatesync::entities::VehicleEntity;
use gatesync::stream::{EventStream, OffsetSnapshot, PartitionOffset, StreamError};
use gatesync::VehiclePersistor;

/// Observable state of a [`ScriptedStream`], shared with the test body.
#[derive(Debug, Default)]
pub struct StreamState {
    pub messages: VecDeque<Vec<u8>>,
    pub seeked_to: Option<OffsetSnapshot>,
    pub committed: bool,
    pub closed: bool,
}

/// In-memory event stream that serves a scripted list of payloads.
///
/// Lag is the number of undelivered messages plus an optional floor, so
/// tests can keep a run alive without scripting more messages. When the
/// script is exhausted, `next` either blocks forever (default, so a
/// shutdown signal can be raced against it) or fails with a read error.
pub struct ScriptedStream {
    state: Arc<Mutex<StreamState>>,
    start_offset: i64,
    lag_floor: i64,
    fail_when_empty: bool,
}

impl ScriptedStream {
    pub fn new(messages: Vec<Vec<u8>>) -> (Self, Arc<Mutex<StreamState>>) {
        let state = Arc::new(Mutex::new(StreamState {
            messages: messages.into(),
            ..StreamState::default()
        }));
        let stream = Self {
            state: state.clone(),
            start_offset: 7,
            lag_floor: 0,
            fail_when_empty: false,
        };
        (stream, state)
    }

    /// Keeps reported lag above zero even after every message is delivered.
    #[allow(dead_code)]
    pub fn with_lag_floor(mut self, lag_floor: i64) -> Self {
        self.lag_floor = lag_floor;
        self
    }

    /// Makes `next` fail once the script is exhausted.
    #[allow(dead_code)]
    pub fn with_read_error_when_empty(mut self) -> Self {
        self.fail_when_empty = true;
        self
    }

    /// The snapshot a run records at start.
    pub fn start_snapshot(&self) -> OffsetSnapshot {
        OffsetSnapshot {
            partitions: vec![PartitionOffset {
                topic: "presence-events".to_string(),
                partition: 0,
                offset: self.start_offset,
            }],
        }
    }
}

#[async_trait]
impl EventStream for ScriptedStream {
    async fn next(&mut self) -> Result<Vec<u8>, StreamError> {
        let message = self.state.lock().unwrap().messages.pop_front();
        match message {
            Some(payload) => Ok(payload),
            None if self.fail_when_empty => {
                Err(StreamError::Read("scripted read failure".to_string()))
            }
            None => std::future::pending().await,
        }
    }

    async fn lag(&mut self) -> Result<i64, StreamError> {
        let remaining = self.state.lock().unwrap().messages.len() as i64;
        Ok(remaining + self.lag_floor)
    }

    fn position(&self) -> Result<OffsetSnapshot, StreamError> {
        Ok(self.start_snapshot())
    }

    fn seek_to(&mut self, snapshot: &OffsetSnapshot) -> Result<(), StreamError> {
        self.state.lock().unwrap().seeked_to = Some(snapshot.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StreamError> {
        self.state.lock().unwrap().committed = true;
        Ok(())
    }

    fn close(&mut self) {
        self.state.lock().unwrap().closed = true;
    }
}

/// Persistor that records every batch it receives.
pub struct RecordingPersistor {
    calls: Arc<Mutex<Vec<Vec<VehicleEntity>>>>,
    fail: bool,
}

impl RecordingPersistor {
    pub fn new() -> (Self, Arc<Mutex<Vec<Vec<VehicleEntity>>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                calls: calls.clone(),
                fail: false,
            },
            calls,
        )
    }

    /// Makes every write fail with a broker API error.
    #[allow(dead_code)]
    pub fn failing() -> (Self, Arc<Mutex<Vec<Vec<VehicleEntity>>>>) {
        let (mut persistor, calls) = Self::new();
        persistor.fail = true;
        (persistor, calls)
    }
}

#[async_trait]
impl VehiclePersistor for RecordingPersistor {
    async fn write_vehicles_batch(&self, vehicles: &[VehicleEntity]) -> Result<(), ClientError> {
        if self.fail {
            return Err(ClientError::Api {
                status: 500,
                message: "scripted persistence failure".to_string(),
            });
        }
        self.calls.lock().unwrap().push(vehicles.to_vec());
        Ok(())
    }
}

/// Builds a presence event payload for the given site and gate.
pub fn presence_payload(id: &str, parking_id: &str, gate_id: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "id": id,
        "source": "gate-sensor-1",
        "plateNumber": "AB123CD",
        "country": "ITA",
        "gateId": gate_id,
        "parkingId": parking_id,
        "direction": "in",
        "detectedAt": "2026-03-01T08:30:00Z",
        "receivedAt": "2026-03-01T08:30:02Z",
    }))
    .expect("payload serialization")
}

/// A payload referencing a site present in the default location table.
#[allow(dead_code)]
pub fn known_site_payload(id: &str) -> Vec<u8> {
    presence_payload(id, "atam-off-street-parking-cadorna", "G1")
}

/// A payload referencing a site missing from the default location table.
#[allow(dead_code)]
pub fn unknown_site_payload(id: &str) -> Vec<u8> {
    presence_payload(id, "unknown-site", "G1")
}
