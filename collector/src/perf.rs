use crate::{
    emit::MetricTarget,
    output::deliver,
    registry::{
        lookup,
        CategoryKind,
        DIRECTOR_CATEGORIES,
        ITEM_CATEGORIES,
    },
    CollectionReport,
};
use eyre::Result;
use tracing::Span;
use unisphere_client::{
    ApiError,
    ArrayApi,
    Category,
    RecencyWindow,
    StatsRequest,
    TopologyItem,
};
use zabbix_sender::MetricSink;

/// What a stale statistics snapshot does to the rest of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecencyPolicy {
    /// Stop collecting the category.
    AbortCategory,
    /// Move on to the next item.
    SkipItem,
}

/// Outcome of collecting one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemOutcome {
    Collected,
    Stale(RecencyPolicy),
}

/// Fetches performance statistics per category and forwards them to the sink.
pub struct PerfCollector<'a> {
    api: &'a dyn ArrayApi,
    sink: &'a dyn MetricSink,
    namespace: String,
    host: String,
    span: Span,
}

impl<'a> PerfCollector<'a> {
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
            span: info_span!("perf", %host),
            host,
        }
    }

    /// Directors first, then every other category.
    pub fn collect_all(&self, array_id: &str, window: RecencyWindow) -> Result<CollectionReport> {
        let mut report = CollectionReport::default();
        for category in DIRECTOR_CATEGORIES.into_iter().chain(ITEM_CATEGORIES) {
            report.merge(self.collect(category, array_id, window)?);
        }
        Ok(report)
    }

    pub fn collect(&self, category: Category, array_id: &str, window: RecencyWindow) -> Result<CollectionReport> {
        let _entered = self.span.enter();
        let spec = lookup(category);
        let mut report = CollectionReport::default();

        match spec.kind {
            CategoryKind::Array => {
                let array = TopologyItem::new(Category::Array, array_id);
                self.collect_item(&array, array_id, window, RecencyPolicy::AbortCategory, &mut report)?;
            }
            CategoryKind::Item => self.collect_items(category, array_id, window, &mut report)?,
            CategoryKind::Director => self.collect_directors(category, spec.port, array_id, window, &mut report)?,
            CategoryKind::Port => {
                warn!(%category, "Ports are collected with their director");
            }
        }

        debug!(%category, %report, "Category collected");
        Ok(report)
    }

    fn collect_items(
        &self,
        category: Category,
        array_id: &str,
        window: RecencyWindow,
        report: &mut CollectionReport,
    ) -> Result<()> {
        let Some(items) = self.list(category, array_id, None, report)? else {
            return Ok(());
        };

        for item in &items {
            if self.collect_item(item, array_id, window, RecencyPolicy::AbortCategory, report)?
                == ItemOutcome::Stale(RecencyPolicy::AbortCategory)
            {
                break;
            }
        }
        Ok(())
    }

    fn collect_directors(
        &self,
        category: Category,
        port: Option<Category>,
        array_id: &str,
        window: RecencyWindow,
        report: &mut CollectionReport,
    ) -> Result<()> {
        let Some(directors) = self.list(category, array_id, None, report)? else {
            return Ok(());
        };

        for director in &directors {
            if self.collect_item(director, array_id, window, RecencyPolicy::AbortCategory, report)?
                == ItemOutcome::Stale(RecencyPolicy::AbortCategory)
            {
                break;
            }

            let Some(port) = port else {
                continue;
            };
            let Some(ports) = self.list(port, array_id, Some(&director.id), report)? else {
                continue;
            };
            for port_item in &ports {
                self.collect_item(port_item, array_id, window, RecencyPolicy::SkipItem, report)?;
            }
        }
        Ok(())
    }

    /// Lists keys, `None` when Unisphere has none for this category or director.
    fn list(
        &self,
        category: Category,
        array_id: &str,
        director_id: Option<&str>,
        report: &mut CollectionReport,
    ) -> Result<Option<Vec<TopologyItem>>> {
        match self.api.list_items(category, array_id, director_id) {
            Ok(items) => Ok(Some(items)),
            Err(ApiError::NotFound(resource)) => {
                info!(%category, director = ?director_id, %resource, "No keys, skipping");
                report.not_found += 1;
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn collect_item(
        &self,
        item: &TopologyItem,
        array_id: &str,
        window: RecencyWindow,
        policy: RecencyPolicy,
        report: &mut CollectionReport,
    ) -> Result<ItemOutcome> {
        let request = StatsRequest::for_item(item, array_id, window);
        let response = match self.api.fetch_stats(&request) {
            Ok(response) => response,
            Err(err @ ApiError::RecencyNotMet { .. }) => {
                info!(
                    category = %item.category,
                    item = %item.id,
                    ?policy,
                    reason = %err,
                    "Metrics not read, recency not met"
                );
                report.recency_skips += 1;
                return Ok(ItemOutcome::Stale(policy));
            }
            Err(err) => return Err(err.into()),
        };
        report.items_collected += 1;

        let target = MetricTarget {
            namespace: &self.namespace,
            host: &self.host,
            category: item.category,
        };
        let parts = item.identifier_parts();
        for row in &response.rows {
            let metrics = target.row_metrics(&parts, row);
            trace!(category = %item.category, item = %item.id, count = metrics.len(), "Built metrics");
            deliver(self.sink, &metrics, report);
        }
        Ok(ItemOutcome::Collected)
    }
}
