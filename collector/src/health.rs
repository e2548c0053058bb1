use crate::{
    emit::truncate_timestamp,
    key::format_health_key,
    output::deliver,
    CollectionReport,
};
use eyre::Result;
use tracing::Span;
use unisphere_client::{
    ApiError,
    ArrayApi,
};
use zabbix_sender::{
    MetricSink,
    ZabbixMetric,
};

/// Forwards the health scores Unisphere computes for an array.
pub struct HealthCollector<'a> {
    api: &'a dyn ArrayApi,
    sink: &'a dyn MetricSink,
    namespace: String,
    host: String,
    span: Span,
}

impl<'a> HealthCollector<'a> {
    pub fn new(
        api: &'a dyn ArrayApi,
        sink: &'a dyn MetricSink,
        namespace: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        let host = host.into();
        Self {
            api,
            sink,
            namespace: namespace.into(),
            span: info_span!("health", %host),
            host,
        }
    }

    pub fn collect_health(&self, array_id: &str) -> Result<CollectionReport> {
        let _entered = self.span.enter();
        let mut report = CollectionReport::default();

        let scores = match self.api.health(array_id) {
            Ok(scores) => scores,
            Err(ApiError::NotFound(resource)) => {
                info!(%array_id, %resource, "No health scores");
                report.not_found += 1;
                return Ok(report);
            }
            Err(err) => return Err(err.into()),
        };

        let metrics: Vec<_> = scores
            .iter()
            .filter_map(|score| {
                let (Some(value), Some(data_date)) = (score.health_score, score.data_date) else {
                    debug!(metric = %score.metric, "Health score not computed yet");
                    return None;
                };
                Some(ZabbixMetric::new(
                    &self.host,
                    format_health_key(&self.namespace, &score.metric, array_id),
                    value,
                    truncate_timestamp(data_date),
                ))
            })
            .collect();

        report.items_collected += 1;
        deliver(self.sink, &metrics, &mut report);
        debug!(%report, "Health collected");
        Ok(report)
    }
}
