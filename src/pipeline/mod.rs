//! The event core: status classification, identity keys, reconciliation,
//! filtering and aggregate statistics. Everything here is synchronous and
//! free of I/O; callers supply "now" explicitly.

pub mod classify;
pub mod filter;
pub mod key;
pub mod reconcile;
pub mod stats;

pub use classify::classify;
pub use filter::{filter, FilterCriteria};
pub use key::{build_key, IdentityKey};
pub use reconcile::{reconcile, ReconcileOutcome};
pub use stats::{aggregate, Stats};
