//! # meshmap-proto
//!
//! Protobuf wire schema for packets that mesh radio gateways republish over
//! MQTT.
//!
//! Gateways wrap every packet they hear in a [`ServiceEnvelope`]. The packet
//! carries either an already-decoded [`Data`] payload or the raw channel
//! ciphertext; once decoded, `Data::portnum` selects which application
//! schema the inner `payload` bytes follow.
//!
//! ```text
//! ServiceEnvelope
//!   └─ MeshPacket { from, to, id, ... }
//!        ├─ decoded:   Data { portnum, payload }
//!        └─ encrypted: AES-CTR(Data)
//! ```
//!
//! Field numbers follow the public protocol definitions so that real
//! gateway traffic decodes unchanged. Only the fields this workspace reads
//! are declared; unknown fields are skipped by the decoder.
//!
//! ## Example
//!
//! ```rust
//! use meshmap_proto::{Message, PortNum, Position};
//!
//! let position = Position {
//!     latitude_i: Some(377_749_000),
//!     longitude_i: Some(-1_224_194_000),
//!     ..Default::default()
//! };
//! let decoded = Position::decode(position.encode_to_vec().as_slice()).unwrap();
//! assert_eq!(decoded.latitude_i, Some(377_749_000));
//! assert_eq!(PortNum::from(3), PortNum::Position);
//! ```

pub mod envelope;
pub mod payloads;
pub mod portnum;

pub use envelope::{mesh_packet, Data, MeshPacket, PacketPayload, ServiceEnvelope};
pub use payloads::{
    telemetry, DeviceMetrics, MapReport, Neighbor, NeighborInfo, Position, RouteDiscovery,
    Telemetry, User,
};
pub use portnum::PortNum;

pub use prost::{DecodeError, Message};
