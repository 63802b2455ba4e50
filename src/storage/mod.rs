//! Single-writer ownership of the authoritative collection.
//!
//! The event core is pure; this layer is what a host holds on to between
//! refreshes. Every reconciliation pass takes the write half of a lock, so
//! passes never overlap and readers always see a complete snapshot.

pub mod in_memory;

pub use in_memory::InMemoryEventStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::activity_log::ActivityLog;
use crate::domain::{CandidateEvent, ChangeSummary, EventCollection, EventRecord};
use crate::error::Result;
use crate::pipeline::{FilterCriteria, Stats};

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Run one reconciliation pass and record it in the activity log.
    /// `now` must not move backwards between passes.
    async fn apply_batch(&self, batch: &[CandidateEvent], now: DateTime<Utc>) -> Result<ChangeSummary>;

    /// Append a caller-supplied note to the activity log
    async fn record_activity(&self, message: String, timestamp: DateTime<Utc>);

    async fn snapshot(&self) -> EventCollection;

    async fn activity(&self) -> ActivityLog;

    async fn filter(&self, criteria: &FilterCriteria) -> Vec<EventRecord>;

    async fn stats(&self) -> Stats;
}
