use thiserror::Error;

pub const BROKER_HOST_KEY: &str = "MQTT_HOST";
pub const PREFIX_KEY: &str = "MQTT_PREFIX";
pub const TOPIC_KEY: &str = "MQTT_TOPIC";
pub const REGION_KEY: &str = "BUIENRADAR_REGION";
pub const DEFAULT_PREFIX: &str = "/home.arpa";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("`MQTT_HOST` must be set to a broker address such as `tcp://127.0.0.1:1883`")]
    MissingBrokerHost,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub broker_host: String,
    /// `None` when `MQTT_PREFIX` is unset; see [`Config::prefix`].
    pub prefix: Option<String>,
    pub observation: ObservationSettings,
}

/// Settings the observation loop needs; it stays idle when either is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationSettings {
    pub topic: Option<String>,
    pub region: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// A key counts as set whenever `lookup` returns a value, empty or not.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let broker_host = lookup(BROKER_HOST_KEY).ok_or(ConfigError::MissingBrokerHost)?;
        Ok(Self {
            broker_host,
            prefix: lookup(PREFIX_KEY),
            observation: ObservationSettings {
                topic: lookup(TOPIC_KEY),
                region: lookup(REGION_KEY),
            },
        })
    }

    pub fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or(DEFAULT_PREFIX)
    }
}
