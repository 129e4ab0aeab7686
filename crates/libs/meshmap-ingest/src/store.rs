use async_trait::async_trait;

use crate::error::StoreError;
use crate::records::{
    DeviceMetricsUpdate, MapReportRecord, NeighbourInfoRecord, NodeRecord, PositionUpdate,
    TraceRouteRecord,
};

/// Persistence boundary of the pipeline.
///
/// Calls are independent and may run concurrently for different messages;
/// racing updates to one node resolve last-write-wins in the backend.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Create the node, or overwrite its identity fields if it exists.
    async fn upsert_node(&self, node: &NodeRecord) -> Result<(), StoreError>;

    /// Set the position of an existing node. Returns `false` if the node is
    /// unknown, in which case nothing is written.
    async fn update_node_position(&self, update: &PositionUpdate) -> Result<bool, StoreError>;

    /// Set the device metrics of an existing node. Returns `false` if the
    /// node is unknown.
    async fn update_node_metrics(&self, update: &DeviceMetricsUpdate) -> Result<bool, StoreError>;

    async fn insert_trace_route(&self, record: &TraceRouteRecord) -> Result<(), StoreError>;

    async fn insert_neighbour_info(&self, record: &NeighbourInfoRecord) -> Result<(), StoreError>;

    async fn insert_map_report(&self, record: &MapReportRecord) -> Result<(), StoreError>;
}
