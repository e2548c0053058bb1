use serde::{
    Deserialize,
    Serialize,
};
use std::path::PathBuf;
use strum::{
    Display,
    EnumString,
};

/// Connection details for the Unisphere REST API, the `[setup]` section of `PyU4V.conf`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UnisphereSettings {
    pub username: String,
    pub password: String,
    pub server_ip: String,
    pub port: u16,
    #[serde(default)]
    pub verify: bool,
    #[serde(default)]
    pub ca_cert: Option<PathBuf>,
    pub api_version: String,
    pub timeout_secs: u64,
}

impl UnisphereSettings {
    pub fn base_url(&self) -> Result<url::Url, url::ParseError> {
        url::Url::parse(&format!("https://{}:{}/univmax/restapi/", self.server_ip, self.port))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ZabbixSettings {
    pub server: String,
    pub port: u16,
    /// Agent configuration whose `ServerActive` entry replaces `server`/`port`.
    #[serde(default)]
    pub agent_config: Option<PathBuf>,
    pub host_template: String,
    pub timeout_secs: u64,
}

impl ZabbixSettings {
    /// Name of the Zabbix host that receives the metrics for `array_id`.
    pub fn host_for(&self, array_id: &str) -> String {
        self.host_template.replace("{arrayid}", array_id)
    }
}

#[derive(Debug, Default, Clone, Copy, Display, EnumString, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MetricSet {
    /// Only the key performance indicators of a category.
    #[default]
    Kpi,
    All,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CollectionSettings {
    pub namespace: String,
    pub recency_minutes: u32,
    #[serde(default)]
    pub metrics: MetricSet,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogSettings {
    pub file: PathBuf,
    pub level: String,
    pub max_bytes: u64,
    pub max_files: usize,
    #[serde(default)]
    pub stderr: bool,
}
