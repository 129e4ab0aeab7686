//! Log output of the suppression policy. Everything runs inside one test so
//! the process-wide logger sees a single pipeline at a time.

use std::sync::{Arc, Mutex, PoisonError};

use log::{Level, LevelFilter, Log, Metadata, Record};
use meshmap_ingest::{
    Classification, IngestConfig, MemoryStore, Outcome, Pipeline, SuppressionPolicy,
};
use meshmap_proto::{
    mesh_packet::PayloadVariant, Data, MeshPacket, Message, PortNum, ServiceEnvelope,
};

struct CaptureLogger {
    lines: Mutex<Vec<(Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        if record.target().starts_with("meshmap_ingest") {
            let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
            lines.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger { lines: Mutex::new(Vec::new()) };

fn take_lines() -> Vec<(Level, String)> {
    std::mem::take(&mut *LOGGER.lines.lock().unwrap_or_else(PoisonError::into_inner))
}

fn message(from: u32, payload_variant: Option<PayloadVariant>) -> Vec<u8> {
    ServiceEnvelope {
        packet: Some(MeshPacket { from, id: 77, payload_variant, ..Default::default() }),
        channel_id: "LongFast".into(),
        gateway_id: "!0000beef".into(),
    }
    .encode_to_vec()
}

fn on_port(portnum: i32, payload: &[u8]) -> Vec<u8> {
    let data = Data { portnum, payload: payload.to_vec(), ..Default::default() };
    message(0x0a0b_0c0d, Some(PayloadVariant::Decoded(data)))
}

#[tokio::test]
async fn suppression_policy_controls_logging() {
    log::set_logger(&LOGGER).expect("logger installed once");
    log::set_max_level(LevelFilter::Trace);

    let store = Arc::new(MemoryStore::recording());
    let pipeline = Pipeline::new(IngestConfig::default(), store.clone());

    // text messages are suppressed: no log line, no store call
    let text = on_port(PortNum::TEXT_MESSAGE_APP, b"hello mesh");
    let outcome = pipeline.handle_message(&text).await;
    assert_eq!(outcome, Outcome::Suppressed(Classification::Port(PortNum::Other(1))));
    assert!(take_lines().is_empty());

    // undecodable packets are suppressed by default
    let garbage = message(0x0a0b_0c0d, Some(PayloadVariant::Encrypted(Vec::new())));
    let outcome = pipeline.handle_message(&garbage).await;
    assert_eq!(outcome, Outcome::Suppressed(Classification::Undecodable));
    assert!(take_lines().is_empty());

    // an unknown port is logged exactly once with the packet
    let outcome = pipeline.handle_message(&on_port(99, &[1, 2, 3])).await;
    assert_eq!(outcome, Outcome::Unrecognized(Classification::Port(PortNum::Other(99))));
    let lines = take_lines();
    assert_eq!(lines.len(), 1, "{lines:?}");
    let (level, line) = &lines[0];
    assert_eq!(*level, Level::Info);
    assert!(line.starts_with("unrecognized portnum 99"), "{line}");
    assert!(line.contains("MeshPacket"), "{line}");
    assert!(line.contains("portnum: 99"), "{line}");

    // malformed envelopes vanish without a trace
    assert_eq!(pipeline.handle_message(&[0xff, 0xff]).await, Outcome::Dropped);
    assert!(take_lines().is_empty());
    assert!(store.calls().is_empty());

    // with nothing suppressed, both text and undecodable packets are logged
    let config = IngestConfig { suppression: SuppressionPolicy::none(), ..Default::default() };
    let verbose = Pipeline::new(config, store.clone());
    verbose.handle_message(&on_port(PortNum::TEXT_MESSAGE_APP, b"hello")).await;
    verbose.handle_message(&garbage).await;
    let lines = take_lines();
    assert_eq!(lines.len(), 2, "{lines:?}");
    assert!(lines[0].1.starts_with("unrecognized portnum 1"));
    assert!(lines[1].1.starts_with("undecodable packet"));

    // known packets are only logged when asked for
    let config = IngestConfig { log_known_packets: true, ..Default::default() };
    let chatty = Pipeline::new(config, store.clone());
    let outcome = chatty.handle_message(&on_port(PortNum::POSITION_APP, &[])).await;
    assert_eq!(outcome, Outcome::Skipped(PortNum::Position));
    let lines = take_lines();
    assert_eq!(lines.len(), 1, "{lines:?}");
    assert!(lines[0].1.starts_with("POSITION_APP from=0a0b0c0d"));
}
