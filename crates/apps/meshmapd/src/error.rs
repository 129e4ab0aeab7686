use crate::config::ConfigError;
use crate::mqtt::MqttError;

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to open database: {0}")]
    Database(#[from] rusqlite::Error),
    #[error(transparent)]
    Mqtt(#[from] MqttError),
}
