//! Outer envelope and packet framing.

/// What a gateway publishes to MQTT: one packet plus the channel it was
/// heard on and the gateway that heard it.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ServiceEnvelope {
    #[prost(message, optional, tag = "1")]
    pub packet: Option<MeshPacket>,
    #[prost(string, tag = "2")]
    pub channel_id: String,
    #[prost(string, tag = "3")]
    pub gateway_id: String,
}

/// A single over-the-air packet.
#[derive(Clone, PartialEq, prost::Message)]
pub struct MeshPacket {
    #[prost(fixed32, tag = "1")]
    pub from: u32,
    #[prost(fixed32, tag = "2")]
    pub to: u32,
    #[prost(uint32, tag = "3")]
    pub channel: u32,
    #[prost(fixed32, tag = "6")]
    pub id: u32,
    #[prost(fixed32, tag = "7")]
    pub rx_time: u32,
    #[prost(float, tag = "8")]
    pub rx_snr: f32,
    #[prost(uint32, tag = "9")]
    pub hop_limit: u32,
    #[prost(bool, tag = "10")]
    pub want_ack: bool,
    #[prost(int32, tag = "12")]
    pub rx_rssi: i32,
    #[prost(bool, tag = "14")]
    pub via_mqtt: bool,
    #[prost(uint32, tag = "15")]
    pub hop_start: u32,
    #[prost(oneof = "mesh_packet::PayloadVariant", tags = "4, 5")]
    pub payload_variant: Option<mesh_packet::PayloadVariant>,
}

pub mod mesh_packet {
    use super::Data;

    /// Exactly one of these is carried on the wire.
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum PayloadVariant {
        #[prost(message, tag = "4")]
        Decoded(Data),
        #[prost(bytes, tag = "5")]
        Encrypted(Vec<u8>),
    }
}

/// Borrowed view over a packet's payload union.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PacketPayload<'a> {
    Decoded(&'a Data),
    Encrypted(&'a [u8]),
    Empty,
}

impl MeshPacket {
    pub fn payload(&self) -> PacketPayload<'_> {
        match &self.payload_variant {
            Some(mesh_packet::PayloadVariant::Decoded(data)) => PacketPayload::Decoded(data),
            Some(mesh_packet::PayloadVariant::Encrypted(bytes)) if !bytes.is_empty() => {
                PacketPayload::Encrypted(bytes)
            }
            _ => PacketPayload::Empty,
        }
    }

    /// Replace the encrypted payload with its decoded form.
    pub fn attach_decoded(&mut self, data: Data) {
        self.payload_variant = Some(mesh_packet::PayloadVariant::Decoded(data));
    }

    pub fn decoded(&self) -> Option<&Data> {
        match &self.payload_variant {
            Some(mesh_packet::PayloadVariant::Decoded(data)) => Some(data),
            _ => None,
        }
    }
}

/// Decoded inner structure: an application tag and its payload bytes.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Data {
    #[prost(int32, tag = "1")]
    pub portnum: i32,
    #[prost(bytes = "vec", tag = "2")]
    pub payload: Vec<u8>,
    #[prost(bool, tag = "3")]
    pub want_response: bool,
    #[prost(fixed32, tag = "4")]
    pub dest: u32,
    #[prost(fixed32, tag = "5")]
    pub source: u32,
    #[prost(fixed32, tag = "6")]
    pub request_id: u32,
    #[prost(fixed32, tag = "7")]
    pub reply_id: u32,
}
