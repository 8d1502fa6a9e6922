//! Stream source boundary.
//!
//! The orchestrator consumes presence events through the [`EventStream`]
//! trait rather than a concrete Kafka client, so that runs are testable with
//! in-memory streams and the connection details stay at the edge of the
//! crate.
//!
//! The contract mirrors what the synchronization loop needs and nothing
//! more: a cancellable blocking read, the consumer lag at the current
//! position, and enough offset control to guarantee that an aborted run
//! leaves nothing "consumed but unprocessed".
//!
//! # Modules
//!
//! - [`config`]: Kafka connection settings
//! - [`kafka`]: `rdkafka`-backed implementation

pub mod config;
pub mod kafka;

use async_trait::async_trait;
use thiserror::Error;

pub use config::{KafkaStreamConfig, SaslMechanism, SecurityProtocol};
pub use kafka::KafkaEventStream;

/// Errors produced by a stream source.
#[derive(Error, Debug)]
pub enum StreamError {
    /// Error from the Kafka client.
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    /// A message arrived without a payload.
    #[error("message has no payload")]
    EmptyPayload,

    /// Read failure from a non-Kafka stream implementation.
    #[error("stream read error: {0}")]
    Read(String),
}

/// Consumer position for one partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionOffset {
    /// Topic the partition belongs to.
    pub topic: String,

    /// Partition number.
    pub partition: i32,

    /// Next offset the consumer would read.
    pub offset: i64,
}

/// Durable cursor over every partition assigned to the consumer.
///
/// Taken at run start and replayed on graceful shutdown, so that an aborted
/// run re-reads everything it consumed but never flushed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OffsetSnapshot {
    /// One entry per assigned partition with a known position.
    pub partitions: Vec<PartitionOffset>,
}

impl OffsetSnapshot {
    /// Whether the snapshot records no positions.
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

/// A stream of raw presence event payloads.
///
/// Implementations must make `next` cancel-safe: the orchestrator races it
/// against the shutdown signal inside `tokio::select!`, and a read that is
/// dropped mid-flight must not lose or corrupt consumer state.
#[async_trait]
pub trait EventStream: Send {
    /// Blocks until the next message payload is available.
    async fn next(&mut self) -> Result<Vec<u8>, StreamError>;

    /// Count of messages available on the stream that this consumer has not
    /// yet read, at the current position.
    async fn lag(&mut self) -> Result<i64, StreamError>;

    /// Snapshot of the consumer's current position.
    fn position(&self) -> Result<OffsetSnapshot, StreamError>;

    /// Moves the consumer back to a previously recorded snapshot.
    fn seek_to(&mut self, snapshot: &OffsetSnapshot) -> Result<(), StreamError>;

    /// Durably stores the current position. Called only after a successful
    /// flush; offsets of an aborted run are never committed.
    fn commit(&mut self) -> Result<(), StreamError>;

    /// Releases the stream connection.
    fn close(&mut self);
}
