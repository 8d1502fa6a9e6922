//! Kafka connection settings for the presence event stream.
//!
//! # Example
//!
//! ```rust
//! use gatesync::stream::KafkaStreamConfig;
//!
//! let config = KafkaStreamConfig::new("localhost:9092", "presence-events")
//!     .with_group_id("custom-group");
//! assert_eq!(config.group_id, "custom-group");
//! ```

use std::str::FromStr;
use std::time::Duration;

use rdkafka::ClientConfig;

/// Default consumer group when none is configured.
pub const DEFAULT_GROUP_ID: &str = "gatesync-consumer";

/// Security protocol for the Kafka connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SecurityProtocol {
    /// No encryption or authentication.
    #[default]
    Plaintext,
    /// TLS encryption without SASL.
    Ssl,
    /// SASL authentication without TLS.
    SaslPlaintext,
    /// SASL authentication with TLS encryption.
    SaslSsl,
}

impl SecurityProtocol {
    /// Kafka configuration string for this protocol.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plaintext => "PLAINTEXT",
            Self::Ssl => "SSL",
            Self::SaslPlaintext => "SASL_PLAINTEXT",
            Self::SaslSsl => "SASL_SSL",
        }
    }
}

impl FromStr for SecurityProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PLAINTEXT" => Ok(Self::Plaintext),
            "SSL" => Ok(Self::Ssl),
            "SASL_PLAINTEXT" => Ok(Self::SaslPlaintext),
            "SASL_SSL" => Ok(Self::SaslSsl),
            other => Err(format!("invalid security protocol: {}", other)),
        }
    }
}

/// SASL authentication mechanism.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SaslMechanism {
    /// PLAIN mechanism (credentials in clear text).
    Plain,
    /// SCRAM-SHA-256 mechanism.
    #[default]
    ScramSha256,
    /// SCRAM-SHA-512 mechanism.
    ScramSha512,
}

impl SaslMechanism {
    /// Kafka configuration string for this mechanism.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "PLAIN",
            Self::ScramSha256 => "SCRAM-SHA-256",
            Self::ScramSha512 => "SCRAM-SHA-512",
        }
    }
}

impl FromStr for SaslMechanism {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PLAIN" => Ok(Self::Plain),
            "SCRAM-SHA-256" => Ok(Self::ScramSha256),
            "SCRAM-SHA-512" => Ok(Self::ScramSha512),
            other => Err(format!("invalid SASL mechanism: {}", other)),
        }
    }
}

/// SASL credentials.
#[derive(Debug, Clone)]
pub struct SaslConfig {
    /// Authentication mechanism to use.
    pub mechanism: SaslMechanism,
    /// SASL username.
    pub username: String,
    /// SASL password.
    pub password: String,
}

/// Connection settings for the presence event topic.
#[derive(Debug, Clone)]
pub struct KafkaStreamConfig {
    /// Broker addresses, comma-separated.
    pub brokers: String,

    /// Topic carrying presence events.
    pub topic: String,

    /// Consumer group identifier.
    pub group_id: String,

    /// Where to start when the group has no committed offset
    /// ("earliest" or "latest").
    pub auto_offset_reset: String,

    /// Session timeout for the consumer group.
    pub session_timeout: Duration,

    /// Security protocol for the connection.
    pub security_protocol: SecurityProtocol,

    /// SASL credentials, required for SASL protocols.
    pub sasl: Option<SaslConfig>,
}

impl KafkaStreamConfig {
    /// Creates a configuration with the default consumer group and an
    /// "earliest" reset policy, so a fresh group replays the full backlog.
    pub fn new(brokers: &str, topic: &str) -> Self {
        Self {
            brokers: brokers.to_string(),
            topic: topic.to_string(),
            group_id: DEFAULT_GROUP_ID.to_string(),
            auto_offset_reset: "earliest".to_string(),
            session_timeout: Duration::from_secs(30),
            security_protocol: SecurityProtocol::default(),
            sasl: None,
        }
    }

    /// Sets a custom consumer group identifier.
    pub fn with_group_id(mut self, group_id: &str) -> Self {
        self.group_id = group_id.to_string();
        self
    }

    /// Sets the auto offset reset policy.
    pub fn with_auto_offset_reset(mut self, policy: &str) -> Self {
        self.auto_offset_reset = policy.to_string();
        self
    }

    /// Configures SASL authentication and switches the protocol to SASL_SSL.
    pub fn with_sasl(mut self, mechanism: SaslMechanism, username: &str, password: &str) -> Self {
        self.security_protocol = SecurityProtocol::SaslSsl;
        self.sasl = Some(SaslConfig {
            mechanism,
            username: username.to_string(),
            password: password.to_string(),
        });
        self
    }

    /// Renders the settings as an `rdkafka` client configuration.
    ///
    /// Auto commit is always disabled: the synchronization loop commits
    /// offsets itself, only after a successful flush, so that an aborted run
    /// replays everything it consumed.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &self.brokers)
            .set("group.id", &self.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", &self.auto_offset_reset)
            .set(
                "session.timeout.ms",
                self.session_timeout.as_millis().to_string(),
            )
            .set("security.protocol", self.security_protocol.as_str());

        if let Some(sasl) = &self.sasl {
            config
                .set("sasl.mechanism", sasl.mechanism.as_str())
                .set("sasl.username", &sasl.username)
                .set("sasl.password", &sasl.password);
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config_defaults() {
        let config = KafkaStreamConfig::new("localhost:9092", "presence-events");

        assert_eq!(config.brokers, "localhost:9092");
        assert_eq!(config.topic, "presence-events");
        assert_eq!(config.group_id, DEFAULT_GROUP_ID);
        assert_eq!(config.auto_offset_reset, "earliest");
        assert_eq!(config.session_timeout, Duration::from_secs(30));
        assert_eq!(config.security_protocol, SecurityProtocol::Plaintext);
        assert!(config.sasl.is_none());
    }

    #[test]
    fn test_builder_chaining() {
        let config = KafkaStreamConfig::new("kafka:9093", "presence-events")
            .with_group_id("custom-group")
            .with_auto_offset_reset("latest")
            .with_sasl(SaslMechanism::ScramSha512, "user", "pass");

        assert_eq!(config.group_id, "custom-group");
        assert_eq!(config.auto_offset_reset, "latest");
        assert_eq!(config.security_protocol, SecurityProtocol::SaslSsl);

        let sasl = config.sasl.unwrap();
        assert_eq!(sasl.mechanism, SaslMechanism::ScramSha512);
        assert_eq!(sasl.username, "user");
        assert_eq!(sasl.password, "pass");
    }

    #[test]
    fn test_client_config_disables_auto_commit() {
        let config = KafkaStreamConfig::new("localhost:9092", "presence-events");
        let client_config = config.client_config();

        assert_eq!(client_config.get("enable.auto.commit"), Some("false"));
        assert_eq!(client_config.get("bootstrap.servers"), Some("localhost:9092"));
        assert_eq!(client_config.get("group.id"), Some(DEFAULT_GROUP_ID));
        assert_eq!(client_config.get("auto.offset.reset"), Some("earliest"));
        assert_eq!(client_config.get("security.protocol"), Some("PLAINTEXT"));
    }

    #[test]
    fn test_client_config_with_sasl() {
        let config = KafkaStreamConfig::new("kafka:9093", "presence-events").with_sasl(
            SaslMechanism::ScramSha256,
            "user",
            "secret",
        );
        let client_config = config.client_config();

        assert_eq!(client_config.get("security.protocol"), Some("SASL_SSL"));
        assert_eq!(client_config.get("sasl.mechanism"), Some("SCRAM-SHA-256"));
        assert_eq!(client_config.get("sasl.username"), Some("user"));
        assert_eq!(client_config.get("sasl.password"), Some("secret"));
    }

    #[test]
    fn test_security_protocol_parsing() {
        assert_eq!(
            "sasl_ssl".parse::<SecurityProtocol>().unwrap(),
            SecurityProtocol::SaslSsl
        );
        assert_eq!(
            "PLAINTEXT".parse::<SecurityProtocol>().unwrap(),
            SecurityProtocol::Plaintext
        );
        assert!("INVALID".parse::<SecurityProtocol>().is_err());
    }

    #[test]
    fn test_sasl_mechanism_parsing() {
        assert_eq!(
            "scram-sha-512".parse::<SaslMechanism>().unwrap(),
            SaslMechanism::ScramSha512
        );
        assert!("KERBEROS".parse::<SaslMechanism>().is_err());
    }
}
