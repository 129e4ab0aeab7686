use std::collections::BTreeSet;

use meshmap_crypt::ChannelKey;
use meshmap_proto::PortNum;
use serde::Deserialize;

use crate::dispatch::Classification;

/// Everything the pipeline needs besides its store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Base64 PSK of the channel to decrypt. Defaults to the public key.
    pub channel_key: ChannelKey,
    pub suppression: SuppressionPolicy,
    /// Log every recognized payload at info level.
    pub log_known_packets: bool,
}

/// Which unmatched packets are dropped without a log line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SuppressionPolicy {
    /// Packets whose payload could not be decrypted or parsed.
    pub undecodable: bool,
    pub ports: BTreeSet<i32>,
}

impl SuppressionPolicy {
    /// Suppress nothing: every unmatched packet is logged.
    pub fn none() -> Self {
        Self { undecodable: false, ports: BTreeSet::new() }
    }

    pub fn suppresses(&self, classification: Classification) -> bool {
        match classification {
            Classification::Undecodable => self.undecodable,
            Classification::Port(port) => self.ports.contains(&port.value()),
        }
    }
}

impl Default for SuppressionPolicy {
    fn default() -> Self {
        Self {
            undecodable: true,
            ports: [
                PortNum::TEXT_MESSAGE_APP,
                PortNum::ROUTING_APP,
                PortNum::PAXCOUNTER_APP,
                PortNum::STORE_FORWARD_APP,
                PortNum::RANGE_TEST_APP,
            ]
            .into_iter()
            .collect(),
        }
    }
}
