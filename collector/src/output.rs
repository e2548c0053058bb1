use crate::{
    discovery::LabelMap,
    CollectionReport,
};
use serde_json::json;
use zabbix_sender::{
    MetricSink,
    ZabbixMetric,
};

/// Low level discovery document: `{"data": [...]}`, pretty printed.
pub fn lld_json(entries: &[LabelMap]) -> eyre::Result<String> {
    Ok(serde_json::to_string_pretty(&json!({ "data": entries }))?)
}

/// Sends one batch and books the outcome on `report`.
///
/// Refused values are logged and dropped. A trapper that cannot be reached fails only
/// this batch.
pub fn deliver(sink: &dyn MetricSink, metrics: &[ZabbixMetric], report: &mut CollectionReport) {
    if metrics.is_empty() {
        return;
    }
    report.metrics_emitted += metrics.len() as u64;

    match sink.send(metrics) {
        Ok(result) => {
            report.metrics_sent += result.processed;
            report.metrics_rejected += result.failed;
            if result.failed > 0 {
                warn!(
                    processed = result.processed,
                    failed = result.failed,
                    total = result.total,
                    first_key = %metrics[0].key,
                    "Zabbix refused some values"
                );
            } else {
                trace!(processed = result.processed, "Batch delivered");
            }
        }
        Err(err) => {
            report.send_errors += 1;
            error!(error = %err, count = metrics.len(), "Failed to send metrics to Zabbix");
        }
    }
}
