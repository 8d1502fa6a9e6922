//! HTTP client for the NGSI-LD context broker.
//!
//! Implements the persistor boundary: one batch upsert call per
//! synchronization run, against `POST /ngsi-ld/v1/entityOperations/upsert`
//! in update mode. Upsert is idempotent, so re-running a batch after an
//! at-least-once replay overwrites entity state instead of duplicating it.
//!
//! # Example
//!
//! ```rust,no_run
//! use gatesync::broker::{BrokerConfig, ContextBrokerClient};
//!
//! let config = BrokerConfig::new("http://localhost:1026");
//! let client = ContextBrokerClient::new(&config).unwrap();
//! ```

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tracing::{debug, error};

use super::payload::BrokerVehicle;
use crate::entities::VehicleEntity;
use crate::sync::VehiclePersistor;

/// Batch upsert endpoint, relative to the broker base URL.
const UPSERT_PATH: &str = "/ngsi-ld/v1/entityOperations/upsert";

/// Errors that can occur during broker operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The broker rejected the request.
    #[error("context broker error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body from the broker.
        message: String,
    },

    /// Payload could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Context broker connection settings.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Base URL of the broker, e.g. `http://orion:1026`.
    pub base_url: String,

    /// Request timeout. Bounds the final persistence call of a run.
    pub timeout: Duration,
}

impl BrokerConfig {
    /// Creates a configuration with the default 30 second timeout.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets a custom request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// NGSI-LD context broker client.
pub struct ContextBrokerClient {
    client: Client,
    config: BrokerConfig,
}

impl ContextBrokerClient {
    /// Creates a new broker client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying HTTP client cannot be
    /// built.
    pub fn new(config: &BrokerConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// The broker base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

#[async_trait::async_trait]
impl VehiclePersistor for ContextBrokerClient {
    /// Upserts the whole batch in a single call.
    ///
    /// Entities are sent as JSON-LD with inline `@context`, which requires
    /// the `application/ld+json` content type.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with the broker's status and body on any
    /// non-success response. No retry is attempted here.
    async fn write_vehicles_batch(&self, vehicles: &[VehicleEntity]) -> Result<(), ClientError> {
        let payload: Vec<BrokerVehicle> = vehicles.iter().map(BrokerVehicle::from).collect();
        let body = serde_json::to_vec(&payload)?;
        let url = format!("{}{}", self.config.base_url, UPSERT_PATH);

        let response = self
            .client
            .post(&url)
            .query(&[("options", "update")])
            .header("Content-Type", "application/ld+json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(count = vehicles.len(), "vehicles batch upserted");
            Ok(())
        } else {
            let message = response.text().await.unwrap_or_default();
            error!(
                status = status.as_u16(),
                message = %message,
                "batch upsert rejected"
            );
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
