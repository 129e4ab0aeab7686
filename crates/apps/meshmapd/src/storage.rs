use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use meshmap_ingest::{
    DeviceMetricsUpdate, MapReportRecord, NeighbourInfoRecord, NeighbourRecord, NodeRecord,
    NodeStore, PositionUpdate, StoreError, TraceRouteRecord,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;

/// A row of the `nodes` table.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredNode {
    pub identity: NodeRecord,
    pub latitude: Option<i32>,
    pub longitude: Option<i32>,
    pub altitude: Option<i32>,
    pub battery_level: Option<u32>,
    pub voltage: Option<f32>,
    pub channel_utilization: Option<f32>,
    pub air_util_tx: Option<f32>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// [`NodeStore`] backed by a single SQLite connection.
///
/// Writes run on tokio's blocking pool; reads are synchronous.
pub struct SqliteNodeStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteNodeStore {
    pub fn in_memory() -> rusqlite::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn: Arc::new(Mutex::new(conn)) };
        store.init_schema()?;
        Ok(store)
    }

    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn: Arc::new(Mutex::new(conn)) };
        store.init_schema()?;
        Ok(store)
    }

    pub fn node(&self, node_id: u32) -> rusqlite::Result<Option<StoredNode>> {
        self.conn()
            .query_row(
                "SELECT node_id, long_name, short_name, hardware_model, is_licensed, role, latitude, longitude, altitude, battery_level, voltage, channel_utilization, air_util_tx, created_at, updated_at FROM nodes WHERE node_id = ?1",
                params![node_id],
                |row| {
                    let voltage: Option<f64> = row.get(10)?;
                    let channel_utilization: Option<f64> = row.get(11)?;
                    let air_util_tx: Option<f64> = row.get(12)?;
                    Ok(StoredNode {
                        identity: NodeRecord {
                            node_id: row.get(0)?,
                            long_name: row.get(1)?,
                            short_name: row.get(2)?,
                            hardware_model: row.get(3)?,
                            is_licensed: row.get(4)?,
                            role: row.get(5)?,
                        },
                        latitude: row.get(6)?,
                        longitude: row.get(7)?,
                        altitude: row.get(8)?,
                        battery_level: row.get(9)?,
                        voltage: voltage.map(|value| value as f32),
                        channel_utilization: channel_utilization.map(|value| value as f32),
                        air_util_tx: air_util_tx.map(|value| value as f32),
                        created_at: row.get(13)?,
                        updated_at: row.get(14)?,
                    })
                },
            )
            .optional()
    }

    pub fn trace_routes(&self, node_id: u32) -> rusqlite::Result<Vec<Vec<u32>>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT route FROM trace_routes WHERE node_id = ?1 ORDER BY id")?;
        let mut rows = stmt.query(params![node_id])?;
        let mut routes = Vec::new();
        while let Some(row) = rows.next()? {
            let route_json: String = row.get(0)?;
            routes.push(from_json(0, &route_json)?);
        }
        Ok(routes)
    }

    pub fn neighbour_infos(&self, node_id: u32) -> rusqlite::Result<Vec<NeighbourInfoRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT node_id, node_broadcast_interval_secs, neighbours FROM neighbour_infos WHERE node_id = ?1 ORDER BY id",
        )?;
        let mut rows = stmt.query(params![node_id])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let neighbours_json: String = row.get(2)?;
            let neighbours: Vec<NeighbourRecord> = from_json(2, &neighbours_json)?;
            records.push(NeighbourInfoRecord {
                node_id: row.get(0)?,
                node_broadcast_interval_secs: row.get(1)?,
                neighbours,
            });
        }
        Ok(records)
    }

    pub fn map_reports(&self, node_id: u32) -> rusqlite::Result<Vec<MapReportRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT node_id, long_name, short_name, role, hardware_model, firmware_version, region, modem_preset, has_default_channel, latitude, longitude, altitude, position_precision, num_online_local_nodes FROM map_reports WHERE node_id = ?1 ORDER BY id",
        )?;
        let mut rows = stmt.query(params![node_id])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(MapReportRecord {
                node_id: row.get(0)?,
                long_name: row.get(1)?,
                short_name: row.get(2)?,
                role: row.get(3)?,
                hardware_model: row.get(4)?,
                firmware_version: row.get(5)?,
                region: row.get(6)?,
                modem_preset: row.get(7)?,
                has_default_channel: row.get(8)?,
                latitude: row.get(9)?,
                longitude: row.get(10)?,
                altitude: row.get(11)?,
                position_precision: row.get(12)?,
                num_online_local_nodes: row.get(13)?,
            });
        }
        Ok(records)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `op` against the connection on the blocking pool.
    async fn blocking<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap_or_else(PoisonError::into_inner);
            op(&conn)
        })
        .await
        .map_err(StoreError::backend)?
        .map_err(StoreError::backend)
    }

    fn init_schema(&self) -> rusqlite::Result<()> {
        self.conn().execute_batch(
            "CREATE TABLE IF NOT EXISTS nodes (
                node_id INTEGER PRIMARY KEY,
                long_name TEXT NOT NULL,
                short_name TEXT NOT NULL,
                hardware_model INTEGER NOT NULL,
                is_licensed INTEGER NOT NULL,
                role INTEGER NOT NULL,
                latitude INTEGER,
                longitude INTEGER,
                altitude INTEGER,
                battery_level INTEGER,
                voltage REAL,
                channel_utilization REAL,
                air_util_tx REAL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS trace_routes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                node_id INTEGER NOT NULL,
                route TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS neighbour_infos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                node_id INTEGER NOT NULL,
                node_broadcast_interval_secs INTEGER NOT NULL,
                neighbours TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS map_reports (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                node_id INTEGER NOT NULL,
                long_name TEXT NOT NULL,
                short_name TEXT NOT NULL,
                role INTEGER NOT NULL,
                hardware_model INTEGER NOT NULL,
                firmware_version TEXT NOT NULL,
                region INTEGER NOT NULL,
                modem_preset INTEGER NOT NULL,
                has_default_channel INTEGER NOT NULL,
                latitude INTEGER NOT NULL,
                longitude INTEGER NOT NULL,
                altitude INTEGER,
                position_precision INTEGER NOT NULL,
                num_online_local_nodes INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS trace_routes_node ON trace_routes (node_id);
            CREATE INDEX IF NOT EXISTS neighbour_infos_node ON neighbour_infos (node_id);
            CREATE INDEX IF NOT EXISTS map_reports_node ON map_reports (node_id);",
        )
    }
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(StoreError::backend)
}

fn from_json<T: DeserializeOwned>(column: usize, json: &str) -> rusqlite::Result<T> {
    serde_json::from_str(json)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(err)))
}

#[async_trait]
impl NodeStore for SqliteNodeStore {
    async fn upsert_node(&self, node: &NodeRecord) -> Result<(), StoreError> {
        let node = node.clone();
        self.blocking(move |conn| {
            conn.execute(
                "INSERT INTO nodes (node_id, long_name, short_name, hardware_model, is_licensed, role, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
                 ON CONFLICT(node_id) DO UPDATE SET long_name = excluded.long_name, short_name = excluded.short_name, hardware_model = excluded.hardware_model, is_licensed = excluded.is_licensed, role = excluded.role, updated_at = excluded.updated_at",
                params![
                    node.node_id,
                    &node.long_name,
                    &node.short_name,
                    node.hardware_model,
                    node.is_licensed,
                    node.role,
                    now(),
                ],
            )
        })
        .await?;
        Ok(())
    }

    async fn update_node_position(&self, update: &PositionUpdate) -> Result<bool, StoreError> {
        let update = update.clone();
        let changed = self
            .blocking(move |conn| {
                conn.execute(
                    "UPDATE nodes SET latitude = ?2, longitude = ?3, altitude = ?4, updated_at = ?5 WHERE node_id = ?1",
                    params![update.node_id, update.latitude, update.longitude, update.altitude, now()],
                )
            })
            .await?;
        Ok(changed > 0)
    }

    async fn update_node_metrics(&self, update: &DeviceMetricsUpdate) -> Result<bool, StoreError> {
        let update = update.clone();
        let changed = self
            .blocking(move |conn| {
                conn.execute(
                    "UPDATE nodes SET battery_level = ?2, voltage = ?3, channel_utilization = ?4, air_util_tx = ?5, updated_at = ?6 WHERE node_id = ?1",
                    params![
                        update.node_id,
                        update.battery_level,
                        update.voltage.map(f64::from),
                        update.channel_utilization.map(f64::from),
                        update.air_util_tx.map(f64::from),
                        now(),
                    ],
                )
            })
            .await?;
        Ok(changed > 0)
    }

    async fn insert_trace_route(&self, record: &TraceRouteRecord) -> Result<(), StoreError> {
        let node_id = record.node_id;
        let route = to_json(&record.route)?;
        self.blocking(move |conn| {
            conn.execute(
                "INSERT INTO trace_routes (node_id, route, created_at) VALUES (?1, ?2, ?3)",
                params![node_id, route, now()],
            )
        })
        .await?;
        Ok(())
    }

    async fn insert_neighbour_info(&self, record: &NeighbourInfoRecord) -> Result<(), StoreError> {
        let (node_id, interval) = (record.node_id, record.node_broadcast_interval_secs);
        let neighbours = to_json(&record.neighbours)?;
        self.blocking(move |conn| {
            conn.execute(
                "INSERT INTO neighbour_infos (node_id, node_broadcast_interval_secs, neighbours, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![node_id, interval, neighbours, now()],
            )
        })
        .await?;
        Ok(())
    }

    async fn insert_map_report(&self, record: &MapReportRecord) -> Result<(), StoreError> {
        let record = record.clone();
        self.blocking(move |conn| {
            conn.execute(
                "INSERT INTO map_reports (node_id, long_name, short_name, role, hardware_model, firmware_version, region, modem_preset, has_default_channel, latitude, longitude, altitude, position_precision, num_online_local_nodes, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                params![
                    record.node_id,
                    &record.long_name,
                    &record.short_name,
                    record.role,
                    record.hardware_model,
                    &record.firmware_version,
                    record.region,
                    record.modem_preset,
                    record.has_default_channel,
                    record.latitude,
                    record.longitude,
                    record.altitude,
                    record.position_precision,
                    record.num_online_local_nodes,
                    now(),
                ],
            )
        })
        .await?;
        Ok(())
    }
}
