//! Process configuration.
//!
//! All settings come from `GATESYNC_`-prefixed environment variables,
//! optionally seeded from a `.env` file by the binary before this module is
//! consulted.
//!
//! # Environment Variables
//!
//! * `GATESYNC_BROKER_URL` - Context broker base URL (required)
//! * `GATESYNC_BROKER_TIMEOUT_SECS` - Broker request timeout (default: 30)
//! * `GATESYNC_KAFKA_BROKERS` - Kafka broker addresses (required)
//! * `GATESYNC_KAFKA_TOPIC` - Presence event topic (required)
//! * `GATESYNC_KAFKA_GROUP_ID` - Consumer group (default: gatesync-consumer)
//! * `GATESYNC_KAFKA_AUTO_OFFSET_RESET` - Reset policy (default: earliest)
//! * `GATESYNC_KAFKA_SECURITY_PROTOCOL` - PLAINTEXT, SSL, SASL_PLAINTEXT or
//!   SASL_SSL (default: PLAINTEXT)
//! * `GATESYNC_KAFKA_SASL_MECHANISM` - PLAIN, SCRAM-SHA-256 or SCRAM-SHA-512
//!   (default: SCRAM-SHA-256; only read for SASL protocols)
//! * `GATESYNC_KAFKA_SASL_USERNAME` - SASL username (required for SASL)
//! * `GATESYNC_KAFKA_SASL_PASSWORD` - SASL password (required for SASL)
//! * `GATESYNC_DEFAULT_VEHICLE_SPEED` - Speed reported for every vehicle,
//!   km/h (default: 30)

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::broker::BrokerConfig;
use crate::stream::config::{SaslMechanism, SecurityProtocol};
use crate::stream::KafkaStreamConfig;

/// Speed reported when no override is configured. Gate sensors cannot
/// measure speed, so every entity carries this value.
pub const DEFAULT_VEHICLE_SPEED: u32 = 30;

/// Errors that can occur while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing required configuration: {0}")]
    MissingConfig(String),

    /// An environment variable holds a value that cannot be used.
    #[error("invalid value for {var}: {reason}")]
    InvalidValue {
        /// The offending variable name.
        var: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Full configuration of a synchronization run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Context broker connection.
    pub broker: BrokerConfig,

    /// Presence event stream connection.
    pub kafka: KafkaStreamConfig,

    /// Speed value assigned to every synchronized vehicle.
    pub default_vehicle_speed: u32,
}

impl SyncConfig {
    /// Loads and validates the configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingConfig`] when a required variable is
    /// absent and [`ConfigError::InvalidValue`] when a value does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let broker_url = require("GATESYNC_BROKER_URL")?;
        Url::parse(&broker_url).map_err(|err| ConfigError::InvalidValue {
            var: "GATESYNC_BROKER_URL".to_string(),
            reason: err.to_string(),
        })?;

        let broker_timeout = parse_or("GATESYNC_BROKER_TIMEOUT_SECS", 30u64)?;
        let broker =
            BrokerConfig::new(&broker_url).with_timeout(Duration::from_secs(broker_timeout));

        let kafka = kafka_from_env()?;

        let default_vehicle_speed =
            parse_or("GATESYNC_DEFAULT_VEHICLE_SPEED", DEFAULT_VEHICLE_SPEED)?;

        Ok(Self {
            broker,
            kafka,
            default_vehicle_speed,
        })
    }
}

fn kafka_from_env() -> Result<KafkaStreamConfig, ConfigError> {
    let brokers = require("GATESYNC_KAFKA_BROKERS")?;
    let topic = require("GATESYNC_KAFKA_TOPIC")?;

    let mut config = KafkaStreamConfig::new(&brokers, &topic);

    if let Some(group_id) = optional("GATESYNC_KAFKA_GROUP_ID") {
        config = config.with_group_id(&group_id);
    }
    if let Some(policy) = optional("GATESYNC_KAFKA_AUTO_OFFSET_RESET") {
        config = config.with_auto_offset_reset(&policy);
    }

    let protocol: SecurityProtocol = optional("GATESYNC_KAFKA_SECURITY_PROTOCOL")
        .unwrap_or_else(|| "PLAINTEXT".to_string())
        .parse()
        .map_err(|reason| ConfigError::InvalidValue {
            var: "GATESYNC_KAFKA_SECURITY_PROTOCOL".to_string(),
            reason,
        })?;

    if matches!(
        protocol,
        SecurityProtocol::SaslPlaintext | SecurityProtocol::SaslSsl
    ) {
        let mechanism: SaslMechanism = optional("GATESYNC_KAFKA_SASL_MECHANISM")
            .unwrap_or_else(|| "SCRAM-SHA-256".to_string())
            .parse()
            .map_err(|reason| ConfigError::InvalidValue {
                var: "GATESYNC_KAFKA_SASL_MECHANISM".to_string(),
                reason,
            })?;
        let username = require("GATESYNC_KAFKA_SASL_USERNAME")?;
        let password = require("GATESYNC_KAFKA_SASL_PASSWORD")?;

        config = config.with_sasl(mechanism, &username, &password);
    }
    // with_sasl forces SASL_SSL; restore the requested protocol for the
    // SASL_PLAINTEXT case.
    config.security_protocol = protocol;

    Ok(config)
}

fn require(var: &str) -> Result<String, ConfigError> {
    std::env::var(var).map_err(|_| ConfigError::MissingConfig(var.to_string()))
}

fn optional(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

fn parse_or<T>(var: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional(var) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|err: T::Err| ConfigError::InvalidValue {
                var: var.to_string(),
                reason: err.to_string(),
            }),
    }
}
