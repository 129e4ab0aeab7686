use std::sync::Arc;

use meshmap_crypt::ChannelCipher;
use meshmap_proto::{MeshPacket, Message, PacketPayload, PortNum, ServiceEnvelope};
use tokio::task::JoinHandle;

use crate::config::IngestConfig;
use crate::dispatch::{Classification, PortPayload};
use crate::error::{IngestError, StoreError};
use crate::records::NormalizedRecord;
use crate::store::NodeStore;

/// What happened to one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Envelope or payload bytes were malformed.
    Dropped,
    /// Unmatched and silenced by the suppression policy.
    Suppressed(Classification),
    /// Unmatched and logged.
    Unrecognized(Classification),
    /// Recognized, but carried nothing to persist.
    Skipped(PortNum),
    Persisted(PortNum),
    PersistFailed(PortNum),
}

/// Decode, decrypt and dispatch pipeline over a [`NodeStore`].
pub struct Pipeline {
    cipher: ChannelCipher,
    config: IngestConfig,
    store: Arc<dyn NodeStore>,
}

impl Pipeline {
    pub fn new(config: IngestConfig, store: Arc<dyn NodeStore>) -> Self {
        Self { cipher: ChannelCipher::new(&config.channel_key), config, store }
    }

    /// Process one message on its own task.
    ///
    /// A panic anywhere in the pipeline surfaces as an error on the returned
    /// handle instead of unwinding into the caller.
    pub fn spawn(self: &Arc<Self>, payload: Vec<u8>) -> JoinHandle<Outcome> {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move { pipeline.handle_message(&payload).await })
    }

    /// Process one raw transport payload. Never fails: every error is
    /// turned into an [`Outcome`] here.
    pub async fn handle_message(&self, bytes: &[u8]) -> Outcome {
        match self.process(bytes).await {
            Ok(outcome) => outcome,
            Err(IngestError::Envelope(_) | IngestError::MissingPacket) => Outcome::Dropped,
            Err(IngestError::Payload { .. }) => Outcome::Dropped,
            Err(IngestError::Persist { port, node_id, source }) => {
                log::error!("{} persist failed for node {:08x}: {}", port.name(), node_id, source);
                Outcome::PersistFailed(port)
            }
        }
    }

    async fn process(&self, bytes: &[u8]) -> Result<Outcome, IngestError> {
        let envelope = ServiceEnvelope::decode(bytes).map_err(IngestError::Envelope)?;
        let mut packet = envelope.packet.ok_or(IngestError::MissingPacket)?;
        self.open(&mut packet);

        let Some(data) = packet.decoded() else {
            return Ok(self.unmatched(Classification::Undecodable, &packet));
        };
        let port = PortNum::from(data.portnum);
        let Some(payload) = PortPayload::decode(port, &data.payload)? else {
            return Ok(self.unmatched(Classification::Port(port), &packet));
        };

        if self.config.log_known_packets {
            log::info!("{} from={:08x} {:?}", port.name(), packet.from, payload);
        }

        let Some(record) = payload.normalize(packet.from) else {
            return Ok(Outcome::Skipped(port));
        };
        self.persist(&record).await.map_err(|source| IngestError::Persist {
            port,
            node_id: record.node_id(),
            source,
        })?;
        Ok(Outcome::Persisted(port))
    }

    /// Decrypt an encrypted payload in place. On failure the packet keeps
    /// its ciphertext and classifies as undecodable.
    fn open(&self, packet: &mut MeshPacket) {
        let decrypted = match packet.payload() {
            PacketPayload::Encrypted(ciphertext) => {
                self.cipher.decrypt_data(packet.id, packet.from, ciphertext).ok()
            }
            PacketPayload::Decoded(_) | PacketPayload::Empty => None,
        };
        if let Some(data) = decrypted {
            packet.attach_decoded(data);
        }
    }

    fn unmatched(&self, classification: Classification, packet: &MeshPacket) -> Outcome {
        if self.config.suppression.suppresses(classification) {
            return Outcome::Suppressed(classification);
        }
        match classification {
            Classification::Port(port) => {
                log::info!("unrecognized portnum {}: {:?}", port.value(), packet)
            }
            Classification::Undecodable => log::info!("undecodable packet: {:?}", packet),
        }
        Outcome::Unrecognized(classification)
    }

    async fn persist(&self, record: &NormalizedRecord) -> Result<(), StoreError> {
        match record {
            NormalizedRecord::Node(node) => self.store.upsert_node(node).await,
            NormalizedRecord::Position(update) => {
                if !self.store.update_node_position(update).await? {
                    log::debug!("position for unknown node {:08x} ignored", update.node_id);
                }
                Ok(())
            }
            NormalizedRecord::DeviceMetrics(update) => {
                if !self.store.update_node_metrics(update).await? {
                    log::debug!("device metrics for unknown node {:08x} ignored", update.node_id);
                }
                Ok(())
            }
            NormalizedRecord::TraceRoute(route) => self.store.insert_trace_route(route).await,
            NormalizedRecord::NeighbourInfo(info) => self.store.insert_neighbour_info(info).await,
            NormalizedRecord::MapReport(report) => self.store.insert_map_report(report).await,
        }
    }
}
