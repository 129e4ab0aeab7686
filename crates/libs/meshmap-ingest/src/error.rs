use meshmap_proto::{DecodeError, PortNum};

/// Failure of one step of the per-message pipeline.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("service envelope decode error: {0}")]
    Envelope(#[source] DecodeError),

    #[error("service envelope carries no packet")]
    MissingPacket,

    #[error("{port} payload decode error: {source}")]
    Payload {
        port: &'static str,
        #[source]
        source: DecodeError,
    },

    #[error("{} persist failed for node {node_id:08x}: {source}", .port.name())]
    Persist {
        port: PortNum,
        node_id: u32,
        #[source]
        source: StoreError,
    },
}

/// Errors returned by a [`NodeStore`](crate::NodeStore) backend.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable { reason: reason.into() }
    }

    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}
