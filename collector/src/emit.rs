use crate::key::format_key;
use serde_json::Value;
use unisphere_client::{
    Category,
    StatsRow,
};
use zabbix_sender::ZabbixMetric;

/// Unisphere reports milliseconds, the trapper takes whole seconds.
pub fn truncate_timestamp(timestamp_ms: i64) -> i64 {
    timestamp_ms.div_euclid(1000)
}

/// Where the metrics of one statistics row end up.
#[derive(Debug, Clone, Copy)]
pub struct MetricTarget<'a> {
    pub namespace: &'a str,
    pub host: &'a str,
    pub category: Category,
}

impl MetricTarget<'_> {
    /// Every numeric field of `row` as a trapper value at the row's timestamp.
    ///
    /// Fields mentioning `timestamp` are bookkeeping and never become metrics.
    pub fn row_metrics<S: AsRef<str>>(&self, identifier_parts: &[S], row: &StatsRow) -> Vec<ZabbixMetric> {
        let clock = truncate_timestamp(row.timestamp);
        row.fields
            .iter()
            .filter_map(|(name, value)| {
                let metric = name.to_lowercase();
                if metric.contains("timestamp") {
                    return None;
                }
                let Some(value) = numeric(value) else {
                    debug!(category = %self.category, field = %name, %value, "Skipping non-numeric field");
                    return None;
                };
                let key = format_key(self.namespace, self.category, &metric, identifier_parts);
                Some(ZabbixMetric::new(self.host, key, value, clock))
            })
            .collect()
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        _ => None,
    }
}
