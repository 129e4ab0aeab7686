use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use meshmap_ingest::Pipeline;
use rumqttc::{AsyncClient, ClientError, ConnectionError, Event, MqttOptions, Packet, QoS};

use crate::config::MqttConfig;

// Map reports and neighbour lists can exceed rumqttc's 10 KiB default.
const MAX_PACKET_SIZE: usize = 256 * 1024;
const REQUEST_CAPACITY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    #[error("mqtt subscribe failed: {0}")]
    Subscribe(#[from] ClientError),
    #[error("mqtt connection error: {0}")]
    Connection(#[from] ConnectionError),
}

pub fn mqtt_options(config: &MqttConfig) -> MqttOptions {
    let mut options = MqttOptions::new(config.client_id(), config.host.clone(), config.port);
    options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));
    options.set_clean_session(true);
    options.set_max_packet_size(MAX_PACKET_SIZE, MAX_PACKET_SIZE);
    if let Some(username) = &config.username {
        options.set_credentials(username.clone(), config.password.clone().unwrap_or_default());
    }
    options
}

/// Feed every published payload into `pipeline` until `shutdown` resolves.
///
/// Topics are (re)subscribed on every ConnAck. Any connection error ends
/// the run.
pub async fn run<F>(
    config: &MqttConfig,
    pipeline: Arc<Pipeline>,
    shutdown: F,
) -> Result<(), MqttError>
where
    F: Future<Output = ()>,
{
    let (client, mut eventloop) = AsyncClient::new(mqtt_options(config), REQUEST_CAPACITY);
    log::info!("connecting to mqtt broker {}:{}", config.host, config.port);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                log::info!("shutting down");
                let _ = client.disconnect().await;
                return Ok(());
            }
            event = eventloop.poll() => match event? {
                Event::Incoming(Packet::ConnAck(_)) => {
                    log::info!("connected, subscribing to {:?}", config.topics);
                    for topic in &config.topics {
                        client.subscribe(topic.as_str(), QoS::AtMostOnce).await?;
                    }
                }
                Event::Incoming(Packet::Publish(publish)) => {
                    dispatch(&pipeline, publish.payload.to_vec());
                }
                Event::Incoming(Packet::SubAck(_)) => log::debug!("subscription acknowledged"),
                _ => {}
            },
        }
    }
}

/// Process a payload on its own task and report, without propagating, a
/// panic inside it.
fn dispatch(pipeline: &Arc<Pipeline>, payload: Vec<u8>) {
    let handle = pipeline.spawn(payload);
    tokio::spawn(async move {
        if let Err(err) = handle.await {
            log::error!("message task failed: {err}");
        }
    });
}
