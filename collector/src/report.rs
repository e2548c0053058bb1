use serde::Serialize;
use std::fmt;

/// Counters of one collection sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollectionReport {
    /// Items whose statistics were fetched.
    pub items_collected: u64,
    /// Fetches refused because the latest snapshot was too old.
    pub recency_skips: u64,
    /// Categories or directors that reported no keys.
    pub not_found: u64,
    pub metrics_emitted: u64,
    /// Values the trapper accepted.
    pub metrics_sent: u64,
    /// Values the trapper refused.
    pub metrics_rejected: u64,
    pub send_errors: u64,
}

impl CollectionReport {
    pub fn merge(&mut self, other: CollectionReport) {
        self.items_collected += other.items_collected;
        self.recency_skips += other.recency_skips;
        self.not_found += other.not_found;
        self.metrics_emitted += other.metrics_emitted;
        self.metrics_sent += other.metrics_sent;
        self.metrics_rejected += other.metrics_rejected;
        self.send_errors += other.send_errors;
    }
}

impl fmt::Display for CollectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "items: {}, recency skips: {}, not found: {}, metrics: {} emitted / {} sent / {} rejected, send errors: {}",
            self.items_collected,
            self.recency_skips,
            self.not_found,
            self.metrics_emitted,
            self.metrics_sent,
            self.metrics_rejected,
            self.send_errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn merge_adds_counters() {
        let mut total = CollectionReport {
            items_collected: 2,
            metrics_emitted: 10,
            ..Default::default()
        };
        total.merge(CollectionReport {
            items_collected: 1,
            recency_skips: 1,
            metrics_emitted: 5,
            metrics_sent: 5,
            ..Default::default()
        });
        assert_eq!(
            total,
            CollectionReport {
                items_collected: 3,
                recency_skips: 1,
                metrics_emitted: 15,
                metrics_sent: 5,
                ..Default::default()
            }
        );
    }
}
