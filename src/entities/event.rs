//! Presence event wire format.
//!
//! A presence event is emitted by a physical gate sensor whenever a vehicle
//! passes through it. Events arrive on the Kafka topic as JSON objects with
//! camelCase field names.
//!
//! # Example
//!
//! ```rust
//! use gatesync::entities::PresenceEvent;
//!
//! let payload = br#"{
//!     "id": "5f2f4c9b-6e1d-4c43-9f9a-6a0a0a33a001",
//!     "source": "gate-sensor-12",
//!     "plateNumber": "EX123AB",
//!     "country": "ITA",
//!     "gateId": "G1",
//!     "parkingId": "atam-off-street-parking-cadorna",
//!     "direction": "in",
//!     "detectedAt": "2026-03-01T08:30:00Z",
//!     "receivedAt": "2026-03-01T08:30:02Z"
//! }"#;
//!
//! let event = PresenceEvent::from_payload(payload).unwrap();
//! assert_eq!(event.gate_id, "G1");
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while decoding a raw message payload.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The payload is not a well-formed presence event.
    #[error("malformed presence event payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A vehicle detection reported by a parking gate.
///
/// Immutable once decoded. `detected_at` is the instant the sensor saw the
/// vehicle; `received_at` is when the upstream pipeline accepted the event.
/// All downstream observation timestamps use `detected_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEvent {
    /// Globally unique event identifier.
    pub id: Uuid,

    /// Label of the sensor that produced the detection.
    pub source: String,

    /// Registered plate of the detected vehicle.
    pub plate_number: String,

    /// Plate country code.
    pub country: String,

    /// Identifier of the gate the vehicle passed through.
    pub gate_id: String,

    /// Identifier of the parking site the gate belongs to.
    pub parking_id: String,

    /// Travel direction through the gate.
    pub direction: String,

    /// When the sensor detected the vehicle.
    pub detected_at: DateTime<Utc>,

    /// When the event entered the pipeline.
    pub received_at: DateTime<Utc>,
}

impl PresenceEvent {
    /// Decodes a raw Kafka payload into a presence event.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Malformed`] when the payload is not valid JSON
    /// or a required field is missing or has the wrong shape. Decode failures
    /// are fatal to a synchronization run: a malformed message on an
    /// at-least-once stream should be investigated, not dropped.
    pub fn from_payload(payload: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(payload)?)
    }
}
