//! Reconciliation phase metrics

use crate::domain::ChangeSummary;
use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct ReconcileMetrics;

impl ReconcileMetrics {
    pub const DURATION: &'static str = phase_metric!(histogram, "reconcile", "duration_seconds");

    pub fn record_pass(summary: &ChangeSummary, collection_size: usize) {
        ::metrics::counter!(phase_metric!(counter, "reconcile", "passes")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "reconcile", "events_added"))
            .increment(summary.added as u64);
        ::metrics::counter!(phase_metric!(counter, "reconcile", "events_updated"))
            .increment(summary.updated as u64);
        ::metrics::counter!(phase_metric!(counter, "reconcile", "events_reclassified"))
            .increment(summary.reclassified as u64);
        ::metrics::counter!(phase_metric!(counter, "reconcile", "candidates_rejected"))
            .increment(summary.rejected.len() as u64);
        ::metrics::gauge!(phase_metric!(gauge, "reconcile", "collection_size"))
            .set(collection_size as f64);
        ::metrics::gauge!(phase_metric!(gauge, "reconcile", "expired_total"))
            .set(summary.expired_total as f64);
    }
}

impl PhaseMetrics for ReconcileMetrics {
    fn register_metrics() {
        use metrics::{counter, gauge, histogram};

        let _ = counter!(phase_metric!(counter, "reconcile", "passes"));
        let _ = counter!(phase_metric!(counter, "reconcile", "events_added"));
        let _ = counter!(phase_metric!(counter, "reconcile", "events_updated"));
        let _ = counter!(phase_metric!(counter, "reconcile", "events_reclassified"));
        let _ = counter!(phase_metric!(counter, "reconcile", "candidates_rejected"));
        let _ = gauge!(phase_metric!(gauge, "reconcile", "collection_size"));
        let _ = gauge!(phase_metric!(gauge, "reconcile", "expired_total"));
        let _ = histogram!(Self::DURATION);
    }

    fn phase_name() -> &'static str {
        "reconcile"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "reconcile", "passes"),
                metric_type: MetricType::Counter,
                help: "Reconciliation passes applied to the collection",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "reconcile", "events_added"),
                metric_type: MetricType::Counter,
                help: "Events seen for the first time",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "reconcile", "events_updated"),
                metric_type: MetricType::Counter,
                help: "Batch matches whose status changed",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "reconcile", "events_reclassified"),
                metric_type: MetricType::Counter,
                help: "Stored events outside the batch whose status moved",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "reconcile", "candidates_rejected"),
                metric_type: MetricType::Counter,
                help: "Candidates skipped because of invalid identity fields or dates",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(gauge, "reconcile", "collection_size"),
                metric_type: MetricType::Gauge,
                help: "Events in the collection after the last pass",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(gauge, "reconcile", "expired_total"),
                metric_type: MetricType::Gauge,
                help: "Expired events in the collection after the last pass",
                labels: vec![],
            },
            MetricDoc {
                name: Self::DURATION,
                metric_type: MetricType::Histogram,
                help: "Wall time of a reconciliation pass",
                labels: vec![],
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_follow_convention() {
        for doc in ReconcileMetrics::metrics_documentation() {
            assert!(doc.name.starts_with("pixie_reconcile_"), "{}", doc.name);
            if doc.metric_type == MetricType::Counter {
                assert!(doc.name.ends_with("_total"), "{}", doc.name);
            }
        }
    }

    #[test]
    fn test_record_without_recorder_is_noop() {
        ReconcileMetrics::record_pass(&ChangeSummary::default(), 0);
    }
}
