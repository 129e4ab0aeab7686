/// Application tag carried in [`Data::portnum`](crate::Data).
///
/// The six ports this workspace consumes are named variants; everything else
/// is kept as `Other` so classification stays an exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortNum {
    Position,
    NodeInfo,
    Telemetry,
    TraceRoute,
    NeighborInfo,
    MapReport,
    Other(i32),
}

impl PortNum {
    /// Never sent by a real node; a zero tag marks a bad decrypt.
    pub const UNKNOWN_APP: i32 = 0;
    pub const TEXT_MESSAGE_APP: i32 = 1;
    pub const POSITION_APP: i32 = 3;
    pub const NODEINFO_APP: i32 = 4;
    pub const ROUTING_APP: i32 = 5;
    pub const PAXCOUNTER_APP: i32 = 34;
    pub const STORE_FORWARD_APP: i32 = 65;
    pub const RANGE_TEST_APP: i32 = 66;
    pub const TELEMETRY_APP: i32 = 67;
    pub const TRACEROUTE_APP: i32 = 70;
    pub const NEIGHBORINFO_APP: i32 = 71;
    pub const MAP_REPORT_APP: i32 = 73;

    pub fn value(self) -> i32 {
        match self {
            Self::Position => Self::POSITION_APP,
            Self::NodeInfo => Self::NODEINFO_APP,
            Self::Telemetry => Self::TELEMETRY_APP,
            Self::TraceRoute => Self::TRACEROUTE_APP,
            Self::NeighborInfo => Self::NEIGHBORINFO_APP,
            Self::MapReport => Self::MAP_REPORT_APP,
            Self::Other(value) => value,
        }
    }

    /// Protocol name of the port, for log lines.
    pub fn name(self) -> &'static str {
        match self {
            Self::Position => "POSITION_APP",
            Self::NodeInfo => "NODEINFO_APP",
            Self::Telemetry => "TELEMETRY_APP",
            Self::TraceRoute => "TRACEROUTE_APP",
            Self::NeighborInfo => "NEIGHBORINFO_APP",
            Self::MapReport => "MAP_REPORT_APP",
            Self::Other(_) => "UNKNOWN_APP",
        }
    }
}

impl From<i32> for PortNum {
    fn from(value: i32) -> Self {
        match value {
            Self::POSITION_APP => Self::Position,
            Self::NODEINFO_APP => Self::NodeInfo,
            Self::TELEMETRY_APP => Self::Telemetry,
            Self::TRACEROUTE_APP => Self::TraceRoute,
            Self::NEIGHBORINFO_APP => Self::NeighborInfo,
            Self::MAP_REPORT_APP => Self::MapReport,
            other => Self::Other(other),
        }
    }
}
