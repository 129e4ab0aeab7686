//! In-memory [`NodeStore`] for dry runs and tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::StoreError;
use crate::records::{
    DeviceMetricsUpdate, MapReportRecord, NeighbourInfoRecord, NodeRecord, PositionUpdate,
    TraceRouteRecord,
};
use crate::store::NodeStore;

/// One call received by a [`MemoryStore`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    UpsertNode(NodeRecord),
    UpdatePosition(PositionUpdate),
    UpdateMetrics(DeviceMetricsUpdate),
    InsertTraceRoute(TraceRouteRecord),
    InsertNeighbourInfo(NeighbourInfoRecord),
    InsertMapReport(MapReportRecord),
}

/// Latest known state of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeState {
    pub identity: NodeRecord,
    pub position: Option<PositionUpdate>,
    pub metrics: Option<DeviceMetricsUpdate>,
}

#[derive(Default)]
struct MemoryState {
    calls: Vec<StoreCall>,
    nodes: HashMap<u32, NodeState>,
}

/// Keeps the latest state per node. The call log is only kept by stores
/// built with [`MemoryStore::recording`] or [`MemoryStore::failing`].
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    recording: bool,
    failure: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that also logs every call it receives, in order.
    pub fn recording() -> Self {
        Self { recording: true, ..Self::default() }
    }

    /// A store that records every call and then fails it as unavailable.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self { state: Mutex::default(), recording: true, failure: Some(reason.into()) }
    }

    /// Calls received so far; always empty unless recording.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    pub fn node(&self, node_id: u32) -> Option<NodeState> {
        self.lock().nodes.get(&node_id).cloned()
    }

    pub fn node_count(&self) -> usize {
        self.lock().nodes.len()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: StoreCall) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        let mut state = self.lock();
        if self.recording {
            state.calls.push(call);
        }
        match &self.failure {
            Some(reason) => Err(StoreError::unavailable(reason.clone())),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl NodeStore for MemoryStore {
    async fn upsert_node(&self, node: &NodeRecord) -> Result<(), StoreError> {
        let mut state = self.record(StoreCall::UpsertNode(node.clone()))?;
        state
            .nodes
            .entry(node.node_id)
            .and_modify(|existing| existing.identity = node.clone())
            .or_insert_with(|| NodeState { identity: node.clone(), position: None, metrics: None });
        Ok(())
    }

    async fn update_node_position(&self, update: &PositionUpdate) -> Result<bool, StoreError> {
        let mut state = self.record(StoreCall::UpdatePosition(update.clone()))?;
        Ok(match state.nodes.get_mut(&update.node_id) {
            Some(node) => {
                node.position = Some(update.clone());
                true
            }
            None => false,
        })
    }

    async fn update_node_metrics(&self, update: &DeviceMetricsUpdate) -> Result<bool, StoreError> {
        let mut state = self.record(StoreCall::UpdateMetrics(update.clone()))?;
        Ok(match state.nodes.get_mut(&update.node_id) {
            Some(node) => {
                node.metrics = Some(update.clone());
                true
            }
            None => false,
        })
    }

    async fn insert_trace_route(&self, record: &TraceRouteRecord) -> Result<(), StoreError> {
        self.record(StoreCall::InsertTraceRoute(record.clone())).map(drop)
    }

    async fn insert_neighbour_info(&self, record: &NeighbourInfoRecord) -> Result<(), StoreError> {
        self.record(StoreCall::InsertNeighbourInfo(record.clone())).map(drop)
    }

    async fn insert_map_report(&self, record: &MapReportRecord) -> Result<(), StoreError> {
        self.record(StoreCall::InsertMapReport(record.clone())).map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(node_id: u32, long_name: &str) -> NodeRecord {
        NodeRecord {
            node_id,
            long_name: long_name.into(),
            short_name: "N".into(),
            hardware_model: 0,
            is_licensed: false,
            role: 0,
        }
    }

    #[tokio::test]
    async fn updates_only_touch_existing_nodes() {
        let store = MemoryStore::new();
        let update = PositionUpdate { node_id: 1, latitude: 10, longitude: 20, altitude: None };
        assert!(!store.update_node_position(&update).await.expect("update"));
        assert_eq!(store.node_count(), 0);

        store.upsert_node(&node(1, "first")).await.expect("upsert");
        assert!(store.update_node_position(&update).await.expect("update"));
        assert_eq!(store.node(1).and_then(|state| state.position), Some(update));
    }

    #[tokio::test]
    async fn upsert_overwrites_identity_and_keeps_position() {
        let store = MemoryStore::recording();
        store.upsert_node(&node(1, "first")).await.expect("upsert");
        let update = PositionUpdate { node_id: 1, latitude: 1, longitude: 2, altitude: Some(3) };
        store.update_node_position(&update).await.expect("update");
        store.upsert_node(&node(1, "second")).await.expect("upsert");

        let state = store.node(1).expect("node");
        assert_eq!(state.identity.long_name, "second");
        assert_eq!(state.position, Some(update));
        assert_eq!(store.calls().len(), 3);
    }

    #[tokio::test]
    async fn default_store_keeps_node_state_without_a_call_log() {
        let store = MemoryStore::new();
        store.upsert_node(&node(1, "first")).await.expect("upsert");
        let route = TraceRouteRecord { node_id: 1, route: vec![2, 3] };
        for _ in 0..10_000 {
            store.insert_trace_route(&route).await.expect("route");
        }
        let update = PositionUpdate { node_id: 1, latitude: 5, longitude: 6, altitude: None };
        assert!(store.update_node_position(&update).await.expect("update"));

        assert!(store.calls().is_empty());
        assert_eq!(store.lock().calls.capacity(), 0);
        assert_eq!(store.node(1).and_then(|state| state.position), Some(update));
    }

    #[tokio::test]
    async fn failing_store_records_then_errors() {
        let store = MemoryStore::failing("disk full");
        let err = store.upsert_node(&node(1, "n")).await.expect_err("should fail");
        assert!(matches!(err, StoreError::Unavailable { ref reason } if reason == "disk full"));
        assert_eq!(store.calls().len(), 1);
        assert_eq!(store.node_count(), 0);
    }
}
