//! # meshmap-ingest
//!
//! Turns raw MQTT payloads published by mesh gateways into node store
//! records.
//!
//! Each message flows through the same steps:
//!
//! 1. decode the [`ServiceEnvelope`](meshmap_proto::ServiceEnvelope)
//! 2. decrypt the packet with the channel key when it is not already decoded
//! 3. classify by port number and decode the matching application payload
//! 4. normalize into a [`NormalizedRecord`] and hand it to a [`NodeStore`]
//!
//! Failures never leave [`Pipeline::handle_message`]: malformed bytes are
//! dropped silently, noisy ports are suppressed, unknown ports are logged
//! and store errors are logged per message. The returned [`Outcome`] says
//! which of these happened.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod memory;
pub mod pipeline;
pub mod records;
pub mod store;

pub use config::{IngestConfig, SuppressionPolicy};
pub use dispatch::{Classification, PortPayload};
pub use error::{IngestError, StoreError};
pub use memory::{MemoryStore, NodeState, StoreCall};
pub use pipeline::{Outcome, Pipeline};
pub use records::{
    DeviceMetricsUpdate, MapReportRecord, NeighbourInfoRecord, NeighbourRecord, NodeRecord,
    NormalizedRecord, PositionUpdate, TraceRouteRecord,
};
pub use store::NodeStore;
