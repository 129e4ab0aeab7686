use meshmap_proto::{
    MapReport, Message, NeighborInfo, PortNum, Position, RouteDiscovery, Telemetry, User,
};

use crate::error::IngestError;
use crate::records::{
    DeviceMetricsUpdate, MapReportRecord, NeighbourInfoRecord, NeighbourRecord, NodeRecord,
    NormalizedRecord, PositionUpdate, TraceRouteRecord,
};

/// How a packet is routed once decryption has been attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// No decoded payload: decryption or inner parsing failed, or the
    /// packet carried nothing.
    Undecodable,
    Port(PortNum),
}

/// A decoded application payload for one of the recognized ports.
#[derive(Debug, Clone, PartialEq)]
pub enum PortPayload {
    Position(Position),
    NodeInfo(User),
    Telemetry(Telemetry),
    TraceRoute(RouteDiscovery),
    NeighborInfo(NeighborInfo),
    MapReport(MapReport),
}

impl PortPayload {
    /// Decode `bytes` with the schema selected by `port`.
    ///
    /// Returns `Ok(None)` for ports without a decoder.
    pub fn decode(port: PortNum, bytes: &[u8]) -> Result<Option<Self>, IngestError> {
        let payload = match port {
            PortNum::Position => Self::Position(decode_as(port, bytes)?),
            PortNum::NodeInfo => Self::NodeInfo(decode_as(port, bytes)?),
            PortNum::Telemetry => Self::Telemetry(decode_as(port, bytes)?),
            PortNum::TraceRoute => Self::TraceRoute(decode_as(port, bytes)?),
            PortNum::NeighborInfo => Self::NeighborInfo(decode_as(port, bytes)?),
            PortNum::MapReport => Self::MapReport(decode_as(port, bytes)?),
            PortNum::Other(_) => return Ok(None),
        };
        Ok(Some(payload))
    }

    pub fn port(&self) -> PortNum {
        match self {
            Self::Position(_) => PortNum::Position,
            Self::NodeInfo(_) => PortNum::NodeInfo,
            Self::Telemetry(_) => PortNum::Telemetry,
            Self::TraceRoute(_) => PortNum::TraceRoute,
            Self::NeighborInfo(_) => PortNum::NeighborInfo,
            Self::MapReport(_) => PortNum::MapReport,
        }
    }

    /// Flatten into the record persisted for `node_id`.
    ///
    /// `None` when the payload holds nothing worth storing: a position
    /// without both coordinates, or telemetry other than device metrics.
    pub fn normalize(&self, node_id: u32) -> Option<NormalizedRecord> {
        let record = match self {
            Self::Position(position) => {
                let (latitude, longitude) = position.latitude_i.zip(position.longitude_i)?;
                NormalizedRecord::Position(PositionUpdate {
                    node_id,
                    latitude,
                    longitude,
                    altitude: non_zero_i32(position.altitude),
                })
            }
            Self::NodeInfo(user) => NormalizedRecord::Node(NodeRecord {
                node_id,
                long_name: user.long_name.clone(),
                short_name: user.short_name.clone(),
                hardware_model: user.hw_model,
                is_licensed: user.is_licensed,
                role: user.role,
            }),
            Self::Telemetry(telemetry) => {
                let metrics = telemetry.device_metrics()?;
                NormalizedRecord::DeviceMetrics(DeviceMetricsUpdate {
                    node_id,
                    battery_level: non_zero_u32(metrics.battery_level),
                    voltage: non_zero_f32(metrics.voltage),
                    channel_utilization: non_zero_f32(metrics.channel_utilization),
                    air_util_tx: non_zero_f32(metrics.air_util_tx),
                })
            }
            Self::TraceRoute(route) => NormalizedRecord::TraceRoute(TraceRouteRecord {
                node_id,
                route: route.route.clone(),
            }),
            Self::NeighborInfo(info) => NormalizedRecord::NeighbourInfo(NeighbourInfoRecord {
                node_id,
                node_broadcast_interval_secs: info.node_broadcast_interval_secs,
                neighbours: info
                    .neighbors
                    .iter()
                    .map(|n| NeighbourRecord { node_id: n.node_id, snr: n.snr })
                    .collect(),
            }),
            Self::MapReport(report) => NormalizedRecord::MapReport(MapReportRecord {
                node_id,
                long_name: report.long_name.clone(),
                short_name: report.short_name.clone(),
                role: report.role,
                hardware_model: report.hw_model,
                firmware_version: report.firmware_version.clone(),
                region: report.region,
                modem_preset: report.modem_preset,
                has_default_channel: report.has_default_channel,
                latitude: report.latitude_i,
                longitude: report.longitude_i,
                altitude: non_zero_i32(report.altitude),
                position_precision: report.position_precision,
                num_online_local_nodes: report.num_online_local_nodes,
            }),
        };
        Some(record)
    }
}

fn decode_as<M: Message + Default>(port: PortNum, bytes: &[u8]) -> Result<M, IngestError> {
    M::decode(bytes).map_err(|source| IngestError::Payload { port: port.name(), source })
}

// Zero on the wire means "not reported" for measured values.
fn non_zero_i32(value: i32) -> Option<i32> {
    (value != 0).then_some(value)
}

fn non_zero_u32(value: u32) -> Option<u32> {
    (value != 0).then_some(value)
}

fn non_zero_f32(value: f32) -> Option<f32> {
    (value != 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshmap_proto::{telemetry, DeviceMetrics, Neighbor};

    fn telemetry_with(metrics: DeviceMetrics) -> PortPayload {
        PortPayload::Telemetry(Telemetry {
            time: 0,
            variant: Some(telemetry::Variant::DeviceMetrics(metrics)),
        })
    }

    #[test]
    fn each_recognized_port_selects_its_own_decoder() {
        for value in [3, 4, 67, 70, 71, 73] {
            let port = PortNum::from(value);
            let payload = PortPayload::decode(port, &[]).expect("decode").expect("recognized");
            assert_eq!(payload.port(), port);
        }
    }

    #[test]
    fn other_ports_have_no_decoder() {
        assert_eq!(PortPayload::decode(PortNum::Other(1), &[1, 2, 3]).expect("decode"), None);
    }

    #[test]
    fn malformed_payload_is_a_payload_error() {
        let err =
            PortPayload::decode(PortNum::NodeInfo, &[0x12, 0x10, b'x']).expect_err("truncated");
        assert!(matches!(err, IngestError::Payload { port: "NODEINFO_APP", .. }));
    }

    #[test]
    fn position_altitude_zero_becomes_absent() {
        let payload = PortPayload::Position(Position {
            latitude_i: Some(377_749_000),
            longitude_i: Some(-1_224_194_000),
            altitude: 0,
            ..Default::default()
        });
        assert_eq!(
            payload.normalize(7),
            Some(NormalizedRecord::Position(PositionUpdate {
                node_id: 7,
                latitude: 377_749_000,
                longitude: -1_224_194_000,
                altitude: None,
            }))
        );
    }

    #[test]
    fn position_without_both_coordinates_is_skipped() {
        let payload = PortPayload::Position(Position { latitude_i: Some(1), ..Default::default() });
        assert_eq!(payload.normalize(7), None);
    }

    #[test]
    fn zero_coordinates_pass_through() {
        let payload = PortPayload::Position(Position {
            latitude_i: Some(0),
            longitude_i: Some(0),
            altitude: 12,
            ..Default::default()
        });
        let Some(NormalizedRecord::Position(update)) = payload.normalize(1) else {
            panic!("expected position update");
        };
        assert_eq!((update.latitude, update.longitude, update.altitude), (0, 0, Some(12)));
    }

    #[test]
    fn battery_level_zero_is_absent_and_nonzero_is_kept() {
        for (battery, expected) in [(0, None), (1, Some(1)), (101, Some(101))] {
            let payload = telemetry_with(DeviceMetrics {
                battery_level: battery,
                voltage: 3.7,
                ..Default::default()
            });
            let Some(NormalizedRecord::DeviceMetrics(update)) = payload.normalize(1) else {
                panic!("expected metrics update");
            };
            assert_eq!(update.battery_level, expected);
            assert_eq!(update.voltage, Some(3.7));
            assert_eq!(update.channel_utilization, None);
            assert_eq!(update.air_util_tx, None);
        }
    }

    #[test]
    fn telemetry_without_device_metrics_is_skipped() {
        let payload = PortPayload::Telemetry(Telemetry::default());
        assert_eq!(payload.normalize(1), None);
    }

    #[test]
    fn neighbour_list_keeps_node_and_snr() {
        let payload = PortPayload::NeighborInfo(NeighborInfo {
            node_broadcast_interval_secs: 900,
            neighbors: vec![
                Neighbor { node_id: 10, snr: 6.25, ..Default::default() },
                Neighbor { node_id: 11, snr: -3.5, ..Default::default() },
            ],
            ..Default::default()
        });
        let Some(NormalizedRecord::NeighbourInfo(record)) = payload.normalize(1) else {
            panic!("expected neighbour info");
        };
        assert_eq!(record.node_broadcast_interval_secs, 900);
        assert_eq!(
            record.neighbours,
            vec![
                NeighbourRecord { node_id: 10, snr: 6.25 },
                NeighbourRecord { node_id: 11, snr: -3.5 },
            ]
        );
    }

    #[test]
    fn map_report_altitude_zero_becomes_absent() {
        let payload = PortPayload::MapReport(MapReport {
            long_name: "Ridge Relay".into(),
            latitude_i: 0,
            altitude: 0,
            num_online_local_nodes: 14,
            ..Default::default()
        });
        let Some(NormalizedRecord::MapReport(record)) = payload.normalize(5) else {
            panic!("expected map report");
        };
        assert_eq!(record.altitude, None);
        assert_eq!(record.latitude, 0);
        assert_eq!(record.num_online_local_nodes, 14);
    }
}
