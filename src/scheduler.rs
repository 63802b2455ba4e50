use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use crate::config::RefreshConfig;
use crate::domain::{CandidateEvent, ChangeSummary};
use crate::error::{EventError, Result};
use crate::metrics::SourcesMetrics;
use crate::sources::EventSource;
use crate::storage::EventStore;

/// Outcome of one refresh: the pass summary plus sources that failed to fetch
#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub summary: ChangeSummary,
    pub fetched_candidates: usize,
    pub failed_sources: Vec<String>,
}

/// Fetches from every source and feeds the combined batch to the store.
pub struct RefreshRunner {
    store: Arc<dyn EventStore>,
    sources: Vec<Arc<dyn EventSource>>,
    city: String,
    fetch_timeout: Duration,
}

impl RefreshRunner {
    pub fn new(
        store: Arc<dyn EventStore>,
        sources: Vec<Arc<dyn EventSource>>,
        city: &str,
        config: &RefreshConfig,
    ) -> Self {
        Self {
            store,
            sources,
            city: city.to_string(),
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
        }
    }

    pub fn store(&self) -> &Arc<dyn EventStore> {
        &self.store
    }

    async fn fetch(&self, source: &dyn EventSource, now: DateTime<Utc>) -> Result<Vec<CandidateEvent>> {
        match tokio::time::timeout(self.fetch_timeout, source.fetch_candidates(&self.city, now)).await {
            Ok(result) => result,
            Err(_) => Err(EventError::Source {
                source_name: source.source_name().to_string(),
                message: format!("timed out after {}s", self.fetch_timeout.as_secs()),
            }),
        }
    }

    /// One refresh at an explicit instant. A failing source is logged and
    /// skipped; the remaining sources still reconcile.
    #[instrument(skip(self), fields(city = %self.city))]
    pub async fn refresh_at(&self, now: DateTime<Utc>) -> Result<RefreshReport> {
        let mut batch = Vec::new();
        let mut failed_sources = Vec::new();

        for source in &self.sources {
            let name = source.source_name().to_string();
            match self.fetch(source.as_ref(), now).await {
                Ok(candidates) => {
                    info!(source = %name, candidates = candidates.len(), "Fetched candidates");
                    SourcesMetrics::record_fetch_success(&name, candidates.len());
                    batch.extend(candidates);
                }
                Err(e) => {
                    warn!(source = %name, "Fetch failed: {}", e);
                    SourcesMetrics::record_fetch_error(&name);
                    self.store
                        .record_activity(format!("Failed to fetch events from {}: {}", name, e), now)
                        .await;
                    failed_sources.push(name);
                }
            }
        }

        let fetched_candidates = batch.len();
        let summary = self.store.apply_batch(&batch, now).await?;

        Ok(RefreshReport {
            summary,
            fetched_candidates,
            failed_sources,
        })
    }

    pub async fn refresh_once(&self) -> Result<RefreshReport> {
        self.refresh_at(Utc::now()).await
    }

    /// Refresh immediately, then every `interval_secs` until `shutdown`
    /// resolves. With `auto_update` off only the first refresh runs.
    pub async fn run<F>(&self, config: &RefreshConfig, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        if !config.auto_update {
            info!("Auto update disabled, running a single refresh");
            self.refresh_once().await?;
            return Ok(());
        }

        let mut ticker = tokio::time::interval(Duration::from_secs(config.interval_secs));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping refresh loop");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    match self.refresh_once().await {
                        Ok(report) if report.summary.has_changes() => info!(
                            added = report.summary.added,
                            updated = report.summary.updated,
                            reclassified = report.summary.reclassified,
                            failed_sources = report.failed_sources.len(),
                            "Refresh complete"
                        ),
                        Ok(report) => debug!(
                            failed_sources = report.failed_sources.len(),
                            "Refresh complete, collection unchanged"
                        ),
                        Err(e) => error!("Refresh failed: {}", e),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MockSource;
    use crate::storage::InMemoryEventStore;
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct FailingSource;

    #[async_trait]
    impl EventSource for FailingSource {
        fn source_name(&self) -> &str {
            "broken"
        }

        async fn fetch_candidates(&self, _city: &str, _now: DateTime<Utc>) -> Result<Vec<CandidateEvent>> {
            Err(EventError::Source {
                source_name: "broken".to_string(),
                message: "HTTP 503".to_string(),
            })
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 10, 6, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_failing_source_does_not_block_others() {
        let store: Arc<dyn EventStore> = Arc::new(InMemoryEventStore::new());
        let sources: Vec<Arc<dyn EventSource>> = vec![
            Arc::new(FailingSource),
            Arc::new(MockSource::new("District", 5, Some(3))),
        ];
        let runner = RefreshRunner::new(store.clone(), sources, "Pune", &RefreshConfig::default());

        let report = runner.refresh_at(now()).await.unwrap();

        assert_eq!(report.failed_sources, vec!["broken".to_string()]);
        assert_eq!(report.fetched_candidates, 5);
        assert!(report.summary.added >= 1);

        let log = store.activity().await;
        assert_eq!(log.len(), 2);
        let messages: Vec<String> = log.entries().map(|e| e.message.clone()).collect();
        assert!(messages[1].starts_with("Failed to fetch events from broken"));
    }

    #[tokio::test]
    async fn test_seeded_refresh_is_idempotent() {
        let store: Arc<dyn EventStore> = Arc::new(InMemoryEventStore::new());
        let sources: Vec<Arc<dyn EventSource>> =
            vec![Arc::new(MockSource::new("BookMyShow", 8, Some(9)))];
        let runner = RefreshRunner::new(store.clone(), sources, "Mumbai", &RefreshConfig::default());

        runner.refresh_at(now()).await.unwrap();
        let second = runner.refresh_at(now()).await.unwrap();

        assert_eq!(second.summary.added, 0);
        assert_eq!(second.summary.updated, 0);
    }

    #[tokio::test]
    async fn test_run_without_auto_update_refreshes_once() {
        let store: Arc<dyn EventStore> = Arc::new(InMemoryEventStore::new());
        let sources: Vec<Arc<dyn EventSource>> =
            vec![Arc::new(MockSource::new("District", 3, Some(5)))];
        let runner = RefreshRunner::new(store.clone(), sources, "Chennai", &RefreshConfig::default());
        let config = RefreshConfig {
            auto_update: false,
            ..Default::default()
        };

        runner.run(&config, std::future::pending()).await.unwrap();

        assert_eq!(store.activity().await.len(), 1);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let store: Arc<dyn EventStore> = Arc::new(InMemoryEventStore::new());
        let runner = RefreshRunner::new(store.clone(), Vec::new(), "Jaipur", &RefreshConfig::default());

        runner
            .run(&RefreshConfig::default(), async {
                tokio::time::sleep(Duration::from_millis(50)).await;
            })
            .await
            .unwrap();

        // The first tick fires immediately, the next one is hours away
        assert_eq!(store.activity().await.len(), 1);
    }
}
