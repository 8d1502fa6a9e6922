//! Gatesync - vehicle presence synchronization service
//!
//! Gatesync consumes vehicle-presence detection events from a Kafka topic,
//! converts each event into a geolocated NGSI-LD Vehicle entity and upserts
//! the accumulated batch into a context broker in a single call. One
//! invocation processes the pending backlog and exits; it is not a daemon.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `entities`: presence event and vehicle entity data model
//! - `sites`: fixed site-to-coordinate lookup table
//! - `transform`: presence event to vehicle entity mapping
//! - `sync`: batch accumulator and the run orchestrator
//! - `stream`: the event stream boundary and its Kafka implementation
//! - `broker`: NGSI-LD payload mapping and the context broker client
//! - `config`: environment-driven configuration
//! - `logging`: tracing subscriber setup
//! - `cli`: command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use gatesync::broker::{BrokerConfig, ContextBrokerClient};
//! use gatesync::stream::{KafkaEventStream, KafkaStreamConfig};
//! use gatesync::{SiteLocationTable, SyncVehicles, VehicleTransformer};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let stream =
//!         KafkaEventStream::connect(&KafkaStreamConfig::new("localhost:9092", "presence"))?;
//!     let persistor = ContextBrokerClient::new(&BrokerConfig::new("http://localhost:1026"))?;
//!     let transformer = VehicleTransformer::new(SiteLocationTable::default(), 30);
//!
//!     let sync = SyncVehicles::new(stream, persistor, transformer);
//!     let outcome = sync.execute(CancellationToken::new()).await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod broker;
pub mod cli;
pub mod config;
pub mod entities;
pub mod logging;
pub mod sites;
pub mod stream;
pub mod sync;
pub mod transform;

// Re-export commonly used types
pub use config::{ConfigError, SyncConfig};
pub use sites::SiteLocationTable;
pub use sync::{RunOutcome, SyncVehicles, VehiclePersistor};
pub use transform::{TransformError, VehicleTransformer};
