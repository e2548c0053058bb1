use serde::{
    Serialize,
    Serializer,
};

/// One trapper item value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZabbixMetric {
    pub host: String,
    pub key: String,
    #[serde(serialize_with = "value_as_string")]
    pub value: f64,
    /// Unix seconds.
    pub clock: i64,
}

impl ZabbixMetric {
    pub fn new(host: impl Into<String>, key: impl Into<String>, value: f64, clock: i64) -> Self {
        Self {
            host: host.into(),
            key: key.into(),
            value,
            clock,
        }
    }
}

// The trapper expects item values as strings.
fn value_as_string<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
