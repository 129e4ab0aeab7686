//! Database-ready shapes, one per persisted payload.
//!
//! `Option` fields are the measured values where zero on the wire means
//! "not reported"; they are stored as NULL.

use serde::{Deserialize, Serialize};

/// Identity of a node, from `NODEINFO_APP`. Upserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub node_id: u32,
    pub long_name: String,
    pub short_name: String,
    pub hardware_model: i32,
    pub is_licensed: bool,
    pub role: i32,
}

/// Applied only to nodes that already exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub node_id: u32,
    pub latitude: i32,
    pub longitude: i32,
    pub altitude: Option<i32>,
}

/// Applied only to nodes that already exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceMetricsUpdate {
    pub node_id: u32,
    pub battery_level: Option<u32>,
    pub voltage: Option<f32>,
    pub channel_utilization: Option<f32>,
    pub air_util_tx: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRouteRecord {
    pub node_id: u32,
    pub route: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighbourInfoRecord {
    pub node_id: u32,
    pub node_broadcast_interval_secs: u32,
    pub neighbours: Vec<NeighbourRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighbourRecord {
    pub node_id: u32,
    pub snr: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapReportRecord {
    pub node_id: u32,
    pub long_name: String,
    pub short_name: String,
    pub role: i32,
    pub hardware_model: i32,
    pub firmware_version: String,
    pub region: i32,
    pub modem_preset: i32,
    pub has_default_channel: bool,
    pub latitude: i32,
    pub longitude: i32,
    pub altitude: Option<i32>,
    pub position_precision: u32,
    pub num_online_local_nodes: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedRecord {
    Node(NodeRecord),
    Position(PositionUpdate),
    DeviceMetrics(DeviceMetricsUpdate),
    TraceRoute(TraceRouteRecord),
    NeighbourInfo(NeighbourInfoRecord),
    MapReport(MapReportRecord),
}

impl NormalizedRecord {
    pub fn node_id(&self) -> u32 {
        match self {
            Self::Node(record) => record.node_id,
            Self::Position(record) => record.node_id,
            Self::DeviceMetrics(record) => record.node_id,
            Self::TraceRoute(record) => record.node_id,
            Self::NeighbourInfo(record) => record.node_id,
            Self::MapReport(record) => record.node_id,
        }
    }
}
