//! In-memory collaborators for collector tests.

use serde_json::{
    json,
    Value,
};
use std::{
    cell::{
        Cell,
        RefCell,
    },
    collections::HashMap,
};
use unisphere_client::{
    ApiError,
    ArrayApi,
    Category,
    HealthScore,
    StatsRequest,
    StatsResponse,
    StatsRow,
    TopologyItem,
};
use zabbix_sender::{
    MetricSink,
    SendResult,
    SenderError,
    ZabbixMetric,
};

pub const ARRAY_ID: &str = "000197900123";
pub const NOW_MS: i64 = 1_700_000_123_456;

enum StatsOutcome {
    Rows(Vec<StatsRow>),
    Stale,
}

#[derive(Default)]
pub struct FakeApi {
    arrays: Vec<String>,
    arrays_missing: bool,
    items: HashMap<(Category, Option<String>), Vec<TopologyItem>>,
    stats: HashMap<(Category, String), StatsOutcome>,
    health: Option<Vec<HealthScore>>,
    fetches: RefCell<Vec<StatsRequest>>,
}

impl FakeApi {
    pub fn with_arrays(mut self, arrays: &[&str]) -> Self {
        self.arrays = arrays.iter().map(|id| id.to_string()).collect();
        self
    }

    /// The array list endpoint answers 404.
    pub fn without_array_list(mut self) -> Self {
        self.arrays_missing = true;
        self
    }

    pub fn with_items(mut self, category: Category, ids: &[&str]) -> Self {
        let items = ids.iter().map(|id| TopologyItem::new(category, *id)).collect();
        self.items.insert((category, None), items);
        self
    }

    pub fn with_ports(mut self, category: Category, director: &str, ids: &[&str]) -> Self {
        let items = ids.iter().map(|id| TopologyItem::with_parent(category, director, *id)).collect();
        self.items.insert((category, Some(director.to_string())), items);
        self
    }

    /// One row at [`NOW_MS`] for the item identified by `id`, `dir-port` for ports.
    pub fn with_row(mut self, category: Category, id: &str, fields: Value) -> Self {
        let row = StatsRow {
            timestamp: NOW_MS,
            fields: serde_json::from_value(fields).unwrap(),
        };
        self.stats.insert((category, id.to_string()), StatsOutcome::Rows(vec![row]));
        self
    }

    /// One row per `(timestamp_ms, fields)` pair, in the given order.
    pub fn with_rows(mut self, category: Category, id: &str, rows: &[(i64, Value)]) -> Self {
        let rows = rows
            .iter()
            .map(|(timestamp, fields)| StatsRow {
                timestamp: *timestamp,
                fields: serde_json::from_value(fields.clone()).unwrap(),
            })
            .collect();
        self.stats.insert((category, id.to_string()), StatsOutcome::Rows(rows));
        self
    }

    pub fn with_stale(mut self, category: Category, id: &str) -> Self {
        self.stats.insert((category, id.to_string()), StatsOutcome::Stale);
        self
    }

    pub fn with_health(mut self, scores: Value) -> Self {
        self.health = Some(serde_json::from_value(scores).unwrap());
        self
    }

    pub fn fetches(&self) -> Vec<StatsRequest> {
        self.fetches.borrow().clone()
    }
}

fn request_id(request: &StatsRequest) -> String {
    let parts: Vec<&str> = [&request.director_id, &request.port_id, &request.item_id]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect();
    if parts.is_empty() {
        request.array_id.clone()
    } else {
        parts.join("-")
    }
}

impl ArrayApi for FakeApi {
    fn array_list(&self) -> Result<Vec<String>, ApiError> {
        if self.arrays_missing {
            return Err(ApiError::NotFound("performance/Array/keys".to_string()));
        }
        Ok(self.arrays.clone())
    }

    fn list_items(
        &self,
        category: Category,
        _array_id: &str,
        director_id: Option<&str>,
    ) -> Result<Vec<TopologyItem>, ApiError> {
        self.items
            .get(&(category, director_id.map(str::to_string)))
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("performance/{category}/keys")))
    }

    fn fetch_stats(&self, request: &StatsRequest) -> Result<StatsResponse, ApiError> {
        self.fetches.borrow_mut().push(request.clone());
        match self.stats.get(&(request.category, request_id(request))) {
            Some(StatsOutcome::Rows(rows)) => Ok(StatsResponse { rows: rows.clone() }),
            Some(StatsOutcome::Stale) => Err(ApiError::RecencyNotMet {
                array_id: request.array_id.clone(),
                minutes: 5,
                last_available: NOW_MS - 3_600_000,
            }),
            None => Ok(StatsResponse::default()),
        }
    }

    fn health(&self, array_id: &str) -> Result<Vec<HealthScore>, ApiError> {
        self.health
            .clone()
            .ok_or_else(|| ApiError::NotFound(format!("system/symmetrix/{array_id}/health")))
    }
}

#[derive(Clone, Copy)]
enum SinkMode {
    Accept,
    Reject(u64),
    Unreachable,
}

pub struct FakeSink {
    mode: SinkMode,
    calls: Cell<usize>,
    sent: RefCell<Vec<ZabbixMetric>>,
}

impl FakeSink {
    fn with_mode(mode: SinkMode) -> Self {
        Self {
            mode,
            calls: Cell::new(0),
            sent: RefCell::new(Vec::new()),
        }
    }

    pub fn accepting() -> Self {
        Self::with_mode(SinkMode::Accept)
    }

    pub fn rejecting(failed: u64) -> Self {
        Self::with_mode(SinkMode::Reject(failed))
    }

    pub fn unreachable() -> Self {
        Self::with_mode(SinkMode::Unreachable)
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn sent(&self) -> Vec<ZabbixMetric> {
        self.sent.borrow().clone()
    }

    pub fn sent_keys(&self) -> Vec<String> {
        self.sent.borrow().iter().map(|metric| metric.key.clone()).collect()
    }
}

impl MetricSink for FakeSink {
    fn send(&self, metrics: &[ZabbixMetric]) -> Result<SendResult, SenderError> {
        self.calls.set(self.calls.get() + 1);
        let total = metrics.len() as u64;
        let failed = match self.mode {
            SinkMode::Accept => 0,
            SinkMode::Reject(failed) => failed.min(total),
            SinkMode::Unreachable => {
                return Err(SenderError::Connect {
                    endpoint: "127.0.0.1:10051".to_string(),
                    source: std::io::ErrorKind::ConnectionRefused.into(),
                })
            }
        };
        self.sent.borrow_mut().extend_from_slice(metrics);
        Ok(SendResult {
            processed: total - failed,
            failed,
            total,
            seconds_spent: 0.0,
        })
    }
}

/// A health score entry as Unisphere reports it.
pub fn health_entry(metric: &str, score: Option<f64>) -> Value {
    json!({ "metric": metric, "health_score": score, "data_date": NOW_MS })
}
