use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::constants::STATUS_WINDOW_DAYS;
use crate::domain::Status;

/// Classify an event day relative to "now".
///
/// Both sides are compared at day granularity:
/// - before today: `Expired`
/// - today up to and including today + 2 days: `Ongoing`
/// - later: `Upcoming`
pub fn classify(event_date: NaiveDate, now: DateTime<Utc>) -> Status {
    classify_day(event_date, now.date_naive())
}

pub fn classify_day(event_date: NaiveDate, today: NaiveDate) -> Status {
    if event_date < today {
        return Status::Expired;
    }
    match today.checked_add_signed(Duration::days(STATUS_WINDOW_DAYS)) {
        Some(window_end) if event_date > window_end => Status::Upcoming,
        _ => Status::Ongoing,
    }
}
