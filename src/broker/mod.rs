//! Context broker boundary.
//!
//! The broker holds the current state of every synchronized vehicle and is
//! updated through NGSI-LD batch upsert, which has insert-or-overwrite
//! semantics: re-submitting an entity identifier replaces its prior state,
//! it never accumulates duplicates.
//!
//! # Modules
//!
//! - [`payload`]: NGSI-LD wire representation of a vehicle entity
//! - [`client`]: HTTP client implementing the persistor boundary

pub mod client;
pub mod payload;

pub use client::{BrokerConfig, ClientError, ContextBrokerClient};
pub use payload::{BrokerVehicle, GeoProperty, Property};
