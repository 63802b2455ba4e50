//! Discovery collaborators that hand candidate batches to the store.
//!
//! Real HTTP scraping of listing platforms lives outside this crate; the
//! implementations here read a batch from disk or generate mock listings.

pub mod json_file;
pub mod mock;

pub use json_file::JsonFileSource;
pub use mock::MockSource;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::CandidateEvent;
use crate::error::Result;

/// Core trait that every candidate source implements
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Identifier used in logs and metrics
    fn source_name(&self) -> &str;

    /// Fetch the current candidate batch for `city`
    async fn fetch_candidates(&self, city: &str, now: DateTime<Utc>) -> Result<Vec<CandidateEvent>>;
}
