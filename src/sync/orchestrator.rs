//! Synchronization run orchestrator.
//!
//! Drives a single bounded run over the presence event backlog:
//!
//! 1. Snapshot the stream position, so a shutdown can rewind.
//! 2. Read, decode, transform, accumulate, one message at a time.
//! 3. When consumer lag reaches zero, flush the batch to the persistor,
//!    commit the offsets, and terminate.
//!
//! A shutdown signal observed at any point between (or during) reads drains
//! the run instead: offsets are reset to the snapshot, the stream is closed,
//! and the partial batch is discarded without a persistence call, so the
//! next run re-reads everything this one consumed.
//!
//! The whole run is one cooperative loop; the shutdown signal source is the
//! only concurrent actor, and it only ever cancels the run-scoped token.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::batch::VehicleBatch;
use crate::broker::ClientError;
use crate::entities::{PresenceEvent, VehicleEntity};
use crate::stream::{EventStream, OffsetSnapshot};
use crate::transform::{TransformError, VehicleTransformer};

/// Persistence boundary for a batch of vehicle entities.
///
/// Implementations must be idempotent: writing the same entity identifier
/// twice leaves the store reflecting the latest values.
#[async_trait]
pub trait VehiclePersistor: Send + Sync {
    /// Writes the whole batch in a single call.
    async fn write_vehicles_batch(&self, vehicles: &[VehicleEntity]) -> Result<(), ClientError>;
}

/// How a synchronization run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The backlog was consumed and the batch was flushed.
    Flushed {
        /// Entities handed to the persistor.
        written: usize,
    },

    /// A shutdown signal drained the run; nothing was persisted and the
    /// stream offsets were reset to the run-start snapshot.
    Aborted,
}

/// Loop state after one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    /// Keep reading.
    Running,
    /// Shutdown requested; rewind and terminate.
    Draining,
    /// Lag reached zero; flush and terminate.
    Flushing,
}

/// Orchestrates one synchronization run.
pub struct SyncVehicles<S, P> {
    stream: S,
    persistor: P,
    transformer: VehicleTransformer,
    batch: VehicleBatch,
}

impl<S, P> SyncVehicles<S, P>
where
    S: EventStream,
    P: VehiclePersistor,
{
    /// Wires the run's collaborators together.
    pub fn new(stream: S, persistor: P, transformer: VehicleTransformer) -> Self {
        Self {
            stream,
            persistor,
            transformer,
            batch: VehicleBatch::new(),
        }
    }

    /// Executes the run to completion.
    ///
    /// The stream is closed on every exit path, error paths included.
    ///
    /// # Errors
    ///
    /// Fatal conditions (a read failure, a malformed payload, a rejected
    /// batch upsert) abort the run with the wrapped cause. An unknown site
    /// is not fatal: the event is skipped and the run continues.
    pub async fn execute(mut self, shutdown: CancellationToken) -> Result<RunOutcome> {
        let outcome = self.run(&shutdown).await;
        self.stream.close();
        outcome
    }

    async fn run(&mut self, shutdown: &CancellationToken) -> Result<RunOutcome> {
        info!("running vehicles synchronization");

        let start_position = self
            .stream
            .position()
            .context("can't snapshot stream position")?;

        loop {
            // Biased toward the shutdown branch so a pending signal is
            // always observed before the next read is started.
            let state = tokio::select! {
                biased;

                _ = shutdown.cancelled() => RunState::Draining,

                message = self.stream.next() => {
                    let payload = message.context("can't read vehicle message")?;
                    self.process(&payload)?;

                    let lag = self.stream.lag().await.context("can't read consumer lag")?;
                    debug!(lag, batch = self.batch.len(), "message processed");

                    if lag == 0 {
                        RunState::Flushing
                    } else {
                        RunState::Running
                    }
                }
            };

            match state {
                RunState::Running => continue,
                RunState::Draining => return self.drain(&start_position),
                RunState::Flushing => return self.flush().await,
            }
        }
    }

    /// Decodes and transforms one payload, appending the result to the
    /// batch. An unknown site skips the event; nothing is appended, so the
    /// batch can never hold an invalid entity.
    fn process(&mut self, payload: &[u8]) -> Result<()> {
        let event =
            PresenceEvent::from_payload(payload).context("can't decode vehicle message")?;
        debug!(event_id = %event.id, parking_id = %event.parking_id, "message received");

        match self.transformer.transform(&event) {
            Ok(vehicle) => self.batch.append(vehicle),
            Err(TransformError::SiteNotFound { parking_id }) => {
                warn!(
                    event_id = %event.id,
                    parking_id = %parking_id,
                    "skipping event for unknown site"
                );
            }
        }

        Ok(())
    }

    /// Shutdown path: rewind to the run-start snapshot and discard the
    /// partial batch. Nothing consumed by this run counts as processed.
    fn drain(&mut self, start_position: &OffsetSnapshot) -> Result<RunOutcome> {
        info!(
            discarded = self.batch.len(),
            "shutdown requested, draining without flush"
        );
        self.stream
            .seek_to(start_position)
            .context("can't reset stream offsets")?;
        Ok(RunOutcome::Aborted)
    }

    /// Flush path: hand the batch to the persistor in one call, then commit
    /// the consumer offsets so the processed backlog is not replayed.
    async fn flush(&mut self) -> Result<RunOutcome> {
        let vehicles = self.batch.drain();
        let written = vehicles.len();

        if vehicles.is_empty() {
            info!("backlog consumed with nothing to persist");
        } else {
            self.persistor
                .write_vehicles_batch(&vehicles)
                .await
                .context("can't write vehicles batch")?;
        }

        self.stream
            .commit()
            .context("can't commit stream offsets")?;

        info!(written, "vehicles synchronized");
        Ok(RunOutcome::Flushed { written })
    }
}
