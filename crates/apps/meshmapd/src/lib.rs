pub mod config;
pub mod error;
pub mod mqtt;
pub mod storage;

pub use error::DaemonError;
