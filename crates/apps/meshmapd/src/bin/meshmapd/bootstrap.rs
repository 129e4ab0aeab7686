use super::Args;
use meshmap_daemon::config::DaemonConfig;
use meshmap_daemon::mqtt;
use meshmap_daemon::storage::SqliteNodeStore;
use meshmap_daemon::DaemonError;
use meshmap_ingest::{MemoryStore, NodeStore, Pipeline};
use std::sync::Arc;

pub(super) async fn run(args: Args) -> Result<(), DaemonError> {
    let config = match &args.config {
        Some(path) => DaemonConfig::from_path(path)?,
        None => DaemonConfig::default(),
    };
    if config.ingest.channel_key.is_default() {
        log::info!("decrypting with the default channel key");
    }

    let store: Arc<dyn NodeStore> = if args.dry_run {
        log::info!("dry run: records are kept in memory only");
        Arc::new(MemoryStore::new())
    } else {
        log::info!("writing to {}", args.db.display());
        Arc::new(SqliteNodeStore::open(&args.db)?)
    };
    let pipeline = Arc::new(Pipeline::new(config.ingest, store));

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            log::warn!("failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };
    mqtt::run(&config.mqtt, pipeline, shutdown).await?;
    Ok(())
}
