use meshmap_ingest::IngestConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// rumqttc rejects keep-alive intervals below this.
pub const MIN_KEEP_ALIVE_SECS: u64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("mqtt.keep_alive_secs must be at least {MIN_KEEP_ALIVE_SECS}, got {0}")]
    KeepAlive(u64),
    #[error("mqtt.topics must not be empty")]
    NoTopics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub mqtt: MqttConfig,
    pub ingest: IngestConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Generated per process when unset.
    pub client_id: Option<String>,
    pub topics: Vec<String>,
    pub keep_alive_secs: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "mqtt.meshtastic.org".into(),
            port: 1883,
            username: Some("meshdev".into()),
            password: Some("large4cats".into()),
            client_id: None,
            topics: vec!["#".into()],
            keep_alive_secs: 30,
        }
    }
}

impl MqttConfig {
    pub fn client_id(&self) -> String {
        self.client_id.clone().unwrap_or_else(|| format!("meshmapd-{}", std::process::id()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.keep_alive_secs < MIN_KEEP_ALIVE_SECS {
            return Err(ConfigError::KeepAlive(self.keep_alive_secs));
        }
        if self.topics.is_empty() {
            return Err(ConfigError::NoTopics);
        }
        Ok(())
    }
}

impl DaemonConfig {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.mqtt.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }
}
