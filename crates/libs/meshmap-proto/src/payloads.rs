//! Application payload schemas, one per recognized port.
//!
//! Enumerated protocol fields (hardware model, role, region, modem preset)
//! are kept as their raw `int32` values; the store persists the numbers.

/// `POSITION_APP`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Position {
    /// Degrees scaled by 1e7.
    #[prost(sfixed32, optional, tag = "1")]
    pub latitude_i: Option<i32>,
    /// Degrees scaled by 1e7.
    #[prost(sfixed32, optional, tag = "2")]
    pub longitude_i: Option<i32>,
    /// Metres above MSL; zero means the device did not report it.
    #[prost(int32, tag = "3")]
    pub altitude: i32,
    #[prost(fixed32, tag = "4")]
    pub time: u32,
    #[prost(uint32, tag = "23")]
    pub precision_bits: u32,
}

/// `NODEINFO_APP`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct User {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub long_name: String,
    #[prost(string, tag = "3")]
    pub short_name: String,
    #[prost(int32, tag = "5")]
    pub hw_model: i32,
    #[prost(bool, tag = "6")]
    pub is_licensed: bool,
    #[prost(int32, tag = "7")]
    pub role: i32,
}

/// `TELEMETRY_APP`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Telemetry {
    #[prost(fixed32, tag = "1")]
    pub time: u32,
    #[prost(oneof = "telemetry::Variant", tags = "2")]
    pub variant: Option<telemetry::Variant>,
}

pub mod telemetry {
    use super::DeviceMetrics;

    /// Only device metrics are consumed; environment, power and air quality
    /// reports decode with `variant == None`.
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Variant {
        #[prost(message, tag = "2")]
        DeviceMetrics(DeviceMetrics),
    }
}

impl Telemetry {
    pub fn device_metrics(&self) -> Option<&DeviceMetrics> {
        match &self.variant {
            Some(telemetry::Variant::DeviceMetrics(metrics)) => Some(metrics),
            None => None,
        }
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct DeviceMetrics {
    /// Percent, 0-100; values above 100 mean external power.
    #[prost(uint32, tag = "1")]
    pub battery_level: u32,
    #[prost(float, tag = "2")]
    pub voltage: f32,
    #[prost(float, tag = "3")]
    pub channel_utilization: f32,
    #[prost(float, tag = "4")]
    pub air_util_tx: f32,
    #[prost(uint32, tag = "5")]
    pub uptime_seconds: u32,
}

/// `TRACEROUTE_APP`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct RouteDiscovery {
    /// Node ids traversed towards the destination, in order.
    #[prost(fixed32, repeated, tag = "1")]
    pub route: Vec<u32>,
    #[prost(int32, repeated, tag = "2")]
    pub snr_towards: Vec<i32>,
    #[prost(fixed32, repeated, tag = "3")]
    pub route_back: Vec<u32>,
    #[prost(int32, repeated, tag = "4")]
    pub snr_back: Vec<i32>,
}

/// `NEIGHBORINFO_APP`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct NeighborInfo {
    #[prost(uint32, tag = "1")]
    pub node_id: u32,
    #[prost(uint32, tag = "2")]
    pub last_sent_by_id: u32,
    #[prost(uint32, tag = "3")]
    pub node_broadcast_interval_secs: u32,
    #[prost(message, repeated, tag = "4")]
    pub neighbors: Vec<Neighbor>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Neighbor {
    #[prost(uint32, tag = "1")]
    pub node_id: u32,
    #[prost(float, tag = "2")]
    pub snr: f32,
    #[prost(fixed32, tag = "3")]
    pub last_rx_time: u32,
    #[prost(uint32, tag = "4")]
    pub node_broadcast_interval_secs: u32,
}

/// `MAP_REPORT_APP`: a node's identity, rough position and radio settings,
/// published by gateways on the map report topic.
#[derive(Clone, PartialEq, prost::Message)]
pub struct MapReport {
    #[prost(string, tag = "1")]
    pub long_name: String,
    #[prost(string, tag = "2")]
    pub short_name: String,
    #[prost(int32, tag = "3")]
    pub role: i32,
    #[prost(int32, tag = "4")]
    pub hw_model: i32,
    #[prost(string, tag = "5")]
    pub firmware_version: String,
    #[prost(int32, tag = "6")]
    pub region: i32,
    #[prost(int32, tag = "7")]
    pub modem_preset: i32,
    #[prost(bool, tag = "8")]
    pub has_default_channel: bool,
    #[prost(sfixed32, tag = "9")]
    pub latitude_i: i32,
    #[prost(sfixed32, tag = "10")]
    pub longitude_i: i32,
    #[prost(int32, tag = "11")]
    pub altitude: i32,
    #[prost(uint32, tag = "12")]
    pub position_precision: u32,
    #[prost(uint32, tag = "13")]
    pub num_online_local_nodes: u32,
}
