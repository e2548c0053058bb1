use crate::{
    Category,
    TopologyItem,
};
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    json,
    Map,
    Value,
};
use std::collections::BTreeMap;

const MILLIS_PER_MINUTE: i64 = 60 * 1000;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;

/// Which statistics a metrics query asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecencyWindow {
    /// The most recent snapshot, as long as it is at most `minutes` old.
    Latest { minutes: u32 },
    /// Every snapshot between two unix millisecond timestamps.
    Range { start: i64, end: i64 },
}

impl RecencyWindow {
    /// `hours` of backfill ending at `now_ms`, or the latest snapshot when no (or zero)
    /// hours were requested.
    pub fn new(hours: Option<u8>, recency_minutes: u32, now_ms: i64) -> Self {
        match hours {
            Some(hours) if hours > 0 => RecencyWindow::Range {
                start: now_ms - i64::from(hours) * MILLIS_PER_HOUR,
                end: now_ms,
            },
            _ => RecencyWindow::Latest {
                minutes: recency_minutes,
            },
        }
    }
}

/// Whether the last available snapshot at `timestamp_ms` is at most `minutes` old.
pub fn is_timestamp_current(timestamp_ms: i64, minutes: u32, now_ms: i64) -> bool {
    now_ms - timestamp_ms <= i64::from(minutes) * MILLIS_PER_MINUTE
}

/// Arguments of a single `performance/<Category>/metrics` query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRequest {
    pub category: Category,
    pub array_id: String,
    pub window: RecencyWindow,
    pub director_id: Option<String>,
    pub port_id: Option<String>,
    /// Id of any non-director, non-port item, e.g. a storage group.
    pub item_id: Option<String>,
}

impl StatsRequest {
    pub fn for_item(item: &TopologyItem, array_id: &str, window: RecencyWindow) -> Self {
        let category = item.category;
        let (director_id, port_id, item_id) = if category.is_port() {
            (item.parent.clone(), Some(item.id.clone()), None)
        } else if category.is_director() {
            (Some(item.id.clone()), None, None)
        } else if category == Category::Array {
            (None, None, None)
        } else {
            (None, None, Some(item.id.clone()))
        };

        Self {
            category,
            array_id: array_id.to_string(),
            window,
            director_id,
            port_id,
            item_id,
        }
    }

    /// Request body for a window already resolved to `start`/`end`.
    pub fn body(&self, start: i64, end: i64, metrics: &[String]) -> Value {
        let mut body = Map::new();
        body.insert("symmetrixId".to_string(), json!(self.array_id));
        body.insert("startDate".to_string(), json!(start));
        body.insert("endDate".to_string(), json!(end));
        body.insert("dataFormat".to_string(), json!("Average"));
        body.insert("metrics".to_string(), json!(metrics));
        if let Some(director_id) = &self.director_id {
            body.insert("directorId".to_string(), json!(director_id));
        }
        if let Some(port_id) = &self.port_id {
            body.insert("portId".to_string(), json!(port_id));
        }
        if let Some(item_id) = &self.item_id {
            body.insert(self.category.key_fields().param.to_string(), json!(item_id));
        }
        Value::Object(body)
    }
}

/// One snapshot of a metrics response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRow {
    /// Snapshot time in unix milliseconds.
    pub timestamp: i64,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub rows: Vec<StatsRow>,
}

impl StatsResponse {
    /// Extracts `resultList.result` of a metrics response. A response without results
    /// yields no rows.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        let rows = match value.pointer("/resultList/result") {
            Some(result) => serde_json::from_value(result.clone())?,
            None => Vec::new(),
        };
        Ok(Self { rows })
    }
}

/// Entry of the `health_score_metric` list of an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    pub metric: String,
    #[serde(default)]
    pub health_score: Option<f64>,
    /// Unix milliseconds, null until the score has been computed once.
    #[serde(default)]
    pub data_date: Option<i64>,
}
