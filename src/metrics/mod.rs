//! Metrics for the event discovery host.
//!
//! Each phase owns its metric names in a dedicated submodule. The event core
//! (`crate::pipeline`) never records metrics; the store and the refresh loop
//! do, around core calls.

pub mod reconcile;
pub mod registry;
pub mod sources;
pub mod timing;

pub use reconcile::ReconcileMetrics;
pub use sources::SourcesMetrics;

use std::sync::Once;
use tracing::{info, warn};

pub const METRICS_ADDR_ENV: &str = "PIXIE_METRICS_ADDR";

static INIT: Once = Once::new();

/// Initialize the global metrics infrastructure.
///
/// Idempotent. Installs a Prometheus recorder with an HTTP listener only when
/// `PIXIE_METRICS_ADDR` is set; without a recorder every metric call is a
/// no-op. Must run inside a tokio runtime.
pub fn init_metrics() {
    INIT.call_once(|| {
        let addr_str = match std::env::var(METRICS_ADDR_ENV) {
            Ok(v) if !v.trim().is_empty() => v,
            _ => {
                info!("{} not set, metrics exporter disabled", METRICS_ADDR_ENV);
                return;
            }
        };

        let addr = match addr_str.parse::<std::net::SocketAddr>() {
            Ok(addr) => addr,
            Err(e) => {
                warn!("Invalid metrics addr '{}': {}", addr_str, e);
                return;
            }
        };

        match metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
        {
            Ok(()) => {
                info!("Prometheus exporter listening at http://{}/metrics", addr);
                registry::register_all_metrics();
            }
            Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
        }
    });
}

/// Implemented by each phase to pre-register and document its metrics
pub trait PhaseMetrics {
    fn register_metrics();

    fn phase_name() -> &'static str;

    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
    pub labels: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
    Gauge,
}

/// Builds metric names following `pixie_{phase}_{name}[_total]`
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("pixie_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("pixie_", $phase, "_", $name)
    };
    (gauge, $phase:literal, $name:literal) => {
        concat!("pixie_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;
