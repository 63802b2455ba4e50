use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{info, info_span, warn, Instrument};

use super::EventStore;
use crate::activity_log::ActivityLog;
use crate::domain::{CandidateEvent, ChangeSummary, EventCollection, EventRecord};
use crate::error::{EventError, Result};
use crate::metrics::timing::time_operation;
use crate::metrics::ReconcileMetrics;
use crate::pipeline::{aggregate, filter, reconcile, FilterCriteria, Stats};

#[derive(Debug, Default)]
struct StoreState {
    collection: EventCollection,
    log: ActivityLog,
    last_pass: Option<DateTime<Utc>>,
}

/// In-memory store for the event collection and its activity log
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    state: RwLock<StoreState>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a previously reconciled collection
    pub fn with_collection(collection: EventCollection) -> Self {
        Self {
            state: RwLock::new(StoreState {
                collection,
                ..Default::default()
            }),
        }
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn apply_batch(&self, batch: &[CandidateEvent], now: DateTime<Utc>) -> Result<ChangeSummary> {
        let span = info_span!("reconcile_pass", candidates = batch.len(), now = %now);
        async move {
            let mut state = self.state.write().await;

            if let Some(last) = state.last_pass {
                if now < last {
                    warn!(last = %last, "Refusing reconciliation with an earlier 'now'");
                    return Err(EventError::Store(format!(
                        "reconciliation time {} is earlier than previous pass at {}",
                        now, last
                    )));
                }
            }

            let timing = time_operation(ReconcileMetrics::DURATION);
            let collection = std::mem::take(&mut state.collection);
            let outcome = reconcile(collection, batch, now);
            timing.finish();

            state.collection = outcome.collection;
            state.last_pass = Some(now);
            state.log.push(outcome.summary.describe(), now);
            ReconcileMetrics::record_pass(&outcome.summary, state.collection.len());

            info!(total = state.collection.len(), "{}", outcome.summary.describe());
            Ok(outcome.summary)
        }
        .instrument(span)
        .await
    }

    async fn record_activity(&self, message: String, timestamp: DateTime<Utc>) {
        self.state.write().await.log.push(message, timestamp);
    }

    async fn snapshot(&self) -> EventCollection {
        self.state.read().await.collection.clone()
    }

    async fn activity(&self) -> ActivityLog {
        self.state.read().await.log.clone()
    }

    async fn filter(&self, criteria: &FilterCriteria) -> Vec<EventRecord> {
        filter(&self.state.read().await.collection, criteria)
    }

    async fn stats(&self) -> Stats {
        aggregate(&self.state.read().await.collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Status;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 10, 8, 0, 0).unwrap()
    }

    fn batch() -> Vec<CandidateEvent> {
        vec![
            CandidateEvent::new("Jazz Night", "2024-12-11", "Hall A").with_source("District"),
            CandidateEvent::new("Tech Conference 2024", "2024-12-15", "Bandra Kurla Complex")
                .with_source("BookMyShow"),
        ]
    }

    #[tokio::test]
    async fn test_apply_batch_logs_summary() {
        let store = InMemoryEventStore::new();
        let summary = store.apply_batch(&batch(), now()).await.unwrap();

        assert_eq!(summary.added, 2);
        let log = store.activity().await;
        assert_eq!(log.len(), 1);
        assert_eq!(log.latest().map(|e| e.message.clone()), Some(summary.describe()));
        assert_eq!(store.snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn test_reads_reflect_latest_pass() {
        let store = InMemoryEventStore::new();
        store.apply_batch(&batch(), now()).await.unwrap();

        let stats = store.stats().await;
        assert_eq!(stats.total, 2);
        assert_eq!(stats.status_count(Status::Ongoing), 1);
        assert_eq!(stats.status_count(Status::Upcoming), 1);

        let ongoing = store
            .filter(&FilterCriteria::default().with_status(Status::Ongoing))
            .await;
        assert_eq!(ongoing.len(), 1);
        assert_eq!(ongoing[0].name, "Jazz Night");
    }

    #[tokio::test]
    async fn test_time_must_not_go_backwards() {
        let store = InMemoryEventStore::new();
        store.apply_batch(&batch(), now()).await.unwrap();

        let err = store
            .apply_batch(&batch(), now() - Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::Store(_)));
        assert_eq!(store.activity().await.len(), 1);

        // Same instant is fine
        let summary = store.apply_batch(&batch(), now()).await.unwrap();
        assert_eq!(summary.added, 0);
        assert_eq!(summary.updated, 0);
    }

    #[tokio::test]
    async fn test_record_activity() {
        let store = InMemoryEventStore::new();
        store
            .record_activity("Failed to fetch from District".to_string(), now())
            .await;
        assert_eq!(
            store.activity().await.latest().map(|e| e.message.clone()),
            Some("Failed to fetch from District".to_string())
        );
    }
}
