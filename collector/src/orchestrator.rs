use crate::{
    CollectionReport,
    HealthCollector,
    PerfCollector,
};
use eyre::{
    Result,
    WrapErr,
};
use unisphere_client::{
    ArrayApi,
    RecencyWindow,
};
use zabbix_sender::MetricSink;

/// One stage of a collection sweep.
pub trait Collector {
    /// Collect everything this stage knows about for `array_id`
    fn run(&self, array_id: &str, window: RecencyWindow) -> Result<CollectionReport>;

    /// Get the name of this collector
    fn name(&self) -> &'static str;
}

impl Collector for HealthCollector<'_> {
    fn run(&self, array_id: &str, _window: RecencyWindow) -> Result<CollectionReport> {
        self.collect_health(array_id)
    }

    fn name(&self) -> &'static str {
        "health"
    }
}

impl Collector for PerfCollector<'_> {
    fn run(&self, array_id: &str, window: RecencyWindow) -> Result<CollectionReport> {
        self.collect_all(array_id, window)
    }

    fn name(&self) -> &'static str {
        "performance"
    }
}

/// Runs the health stage and then every performance category.
pub struct Orchestrator<'a> {
    collectors: Vec<Box<dyn Collector + 'a>>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(api: &'a dyn ArrayApi, sink: &'a dyn MetricSink, namespace: &str, host: &str) -> Self {
        Self {
            collectors: vec![
                Box::new(HealthCollector::new(api, sink, namespace, host)),
                Box::new(PerfCollector::new(api, sink, namespace, host)),
            ],
        }
    }

    pub fn collect_all(&self, array_id: &str, window: RecencyWindow) -> Result<CollectionReport> {
        let mut report = CollectionReport::default();
        for collector in &self.collectors {
            let stage = collector
                .run(array_id, window)
                .wrap_err_with(|| format!("{} collection failed for array {array_id}", collector.name()))?;
            info!(collector = collector.name(), report = %stage, "Stage finished");
            report.merge(stage);
        }
        Ok(report)
    }
}
