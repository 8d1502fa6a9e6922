//! Kafka-backed event stream.
//!
//! Wraps an `rdkafka` [`StreamConsumer`] behind the [`EventStream`] trait.
//! Lag is derived from the partition watermarks against the consumer's
//! current position; offsets are committed manually so the synchronization
//! loop controls exactly when a message counts as processed.

use std::time::Duration;

use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::{Message, Offset};
use tracing::{debug, info};

use super::config::KafkaStreamConfig;
use super::{EventStream, OffsetSnapshot, PartitionOffset, StreamError};

/// Timeout for metadata calls (watermarks, seeks).
const BROKER_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Presence event stream over a Kafka topic.
pub struct KafkaEventStream {
    consumer: StreamConsumer,
    topic: String,
}

impl KafkaEventStream {
    /// Creates the consumer and subscribes to the configured topic.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Kafka`] when the consumer cannot be created or
    /// the subscription fails.
    pub fn connect(config: &KafkaStreamConfig) -> Result<Self, StreamError> {
        let consumer: StreamConsumer = config.client_config().create()?;
        consumer.subscribe(&[&config.topic])?;

        info!(
            brokers = %config.brokers,
            topic = %config.topic,
            group_id = %config.group_id,
            "Kafka stream connected"
        );

        Ok(Self {
            consumer,
            topic: config.topic.clone(),
        })
    }
}

#[async_trait::async_trait]
impl EventStream for KafkaEventStream {
    /// Blocks until the next message arrives on the topic.
    ///
    /// `StreamConsumer::recv` is cancellation safe, so the orchestrator can
    /// race this read against the shutdown signal without losing messages.
    async fn next(&mut self) -> Result<Vec<u8>, StreamError> {
        let message = self.consumer.recv().await?;
        let payload = message.payload().ok_or(StreamError::EmptyPayload)?;

        debug!(
            topic = %self.topic,
            partition = message.partition(),
            offset = message.offset(),
            "message received"
        );

        Ok(payload.to_vec())
    }

    /// Sums `high watermark - position` over every assigned partition.
    ///
    /// A partition without a known position yet contributes its full
    /// watermark range.
    async fn lag(&mut self) -> Result<i64, StreamError> {
        let position = self.consumer.position()?;
        let mut total = 0i64;

        for elem in position.elements() {
            let (low, high) =
                self.consumer
                    .fetch_watermarks(elem.topic(), elem.partition(), BROKER_CALL_TIMEOUT)?;
            let consumed = match elem.offset() {
                Offset::Offset(offset) => offset,
                _ => low,
            };
            total += (high - consumed).max(0);
        }

        Ok(total)
    }

    /// Records the next offset to read on every assigned partition.
    ///
    /// Partitions that have not delivered a message yet have no position and
    /// are left out of the snapshot; there is nothing to rewind for them.
    fn position(&self) -> Result<OffsetSnapshot, StreamError> {
        let position = self.consumer.position()?;
        let mut partitions = Vec::new();

        for elem in position.elements() {
            if let Offset::Offset(offset) = elem.offset() {
                partitions.push(PartitionOffset {
                    topic: elem.topic().to_string(),
                    partition: elem.partition(),
                    offset,
                });
            }
        }

        Ok(OffsetSnapshot { partitions })
    }

    fn seek_to(&mut self, snapshot: &OffsetSnapshot) -> Result<(), StreamError> {
        for po in &snapshot.partitions {
            self.consumer.seek(
                &po.topic,
                po.partition,
                Offset::Offset(po.offset),
                BROKER_CALL_TIMEOUT,
            )?;
            debug!(
                topic = %po.topic,
                partition = po.partition,
                offset = po.offset,
                "consumer position reset"
            );
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StreamError> {
        self.consumer.commit_consumer_state(CommitMode::Sync)?;
        debug!(topic = %self.topic, "consumer offsets committed");
        Ok(())
    }

    fn close(&mut self) {
        // Unsubscribing lets the group rebalance immediately instead of
        // waiting out the session timeout.
        self.consumer.unsubscribe();
        info!(topic = %self.topic, "Kafka stream closed");
    }
}
