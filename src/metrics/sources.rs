//! Discovery source metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct SourcesMetrics;

impl SourcesMetrics {
    pub fn record_fetch_success(source_name: &str, candidates: usize) {
        ::metrics::counter!(
            phase_metric!(counter, "sources", "fetches"),
            "source" => source_name.to_string()
        )
        .increment(1);
        ::metrics::counter!(
            phase_metric!(counter, "sources", "candidates"),
            "source" => source_name.to_string()
        )
        .increment(candidates as u64);
    }

    pub fn record_fetch_error(source_name: &str) {
        ::metrics::counter!(
            phase_metric!(counter, "sources", "errors"),
            "source" => source_name.to_string()
        )
        .increment(1);
    }
}

impl PhaseMetrics for SourcesMetrics {
    fn register_metrics() {
        use metrics::counter;

        let _ = counter!(phase_metric!(counter, "sources", "fetches"));
        let _ = counter!(phase_metric!(counter, "sources", "candidates"));
        let _ = counter!(phase_metric!(counter, "sources", "errors"));
    }

    fn phase_name() -> &'static str {
        "sources"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "sources", "fetches"),
                metric_type: MetricType::Counter,
                help: "Successful candidate fetches per source",
                labels: vec!["source"],
            },
            MetricDoc {
                name: phase_metric!(counter, "sources", "candidates"),
                metric_type: MetricType::Counter,
                help: "Candidate records returned per source",
                labels: vec!["source"],
            },
            MetricDoc {
                name: phase_metric!(counter, "sources", "errors"),
                metric_type: MetricType::Counter,
                help: "Failed candidate fetches per source",
                labels: vec!["source"],
            },
        ]
    }
}
