pub mod activity_log;
pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod scheduler;
pub mod sources;
pub mod storage;

pub use activity_log::{ActivityEntry, ActivityLog};
pub use domain::{CandidateEvent, ChangeSummary, EventCollection, EventRecord, RejectedCandidate, Status};
pub use error::{EventError, Result, ValidationError};
pub use pipeline::{aggregate, classify, filter, reconcile, FilterCriteria, ReconcileOutcome, Stats};
