//! Minimal Zabbix sender: pushes trapper values over the `ZBXD` protocol.

#[macro_use]
extern crate tracing;

mod agent_config;
mod metric;
mod protocol;
mod sender;

pub use agent_config::parse_server_active;
pub use metric::ZabbixMetric;
pub use protocol::{
    decode_response,
    encode_request,
    read_packet,
    SendResult,
};
pub use sender::{
    MetricSink,
    ZabbixSender,
};
use std::path::PathBuf;

pub const DEFAULT_TRAPPER_PORT: u16 = 10051;

#[derive(thiserror::Error, Debug)]
pub enum SenderError {
    #[error("Failed to connect to Zabbix trapper {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Trapper I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Trapper answered without a ZBXD header")]
    InvalidHeader,
    #[error("Trapper announced a {0} byte payload, over the 1 GiB limit")]
    PayloadTooLarge(u64),
    #[error("Failed to encode or decode trapper payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Trapper rejected the request: {0}")]
    Rejected(String),
    #[error("Failed to read agent configuration {path:?}: {source}")]
    AgentConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No ServerActive entry in {0:?}")]
    NoServerActive(PathBuf),
}
