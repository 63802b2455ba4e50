/// Listing platform identifiers carried in `EventRecord::source`.
/// These constants keep source naming consistent across sources, filters and stats.
pub const BOOK_MY_SHOW: &str = "BookMyShow";
pub const DISTRICT: &str = "District";

/// Number of days from "now" (inclusive on both ends) classified as ongoing.
pub const STATUS_WINDOW_DAYS: i64 = 2;

/// Maximum number of entries retained by the activity log.
pub const ACTIVITY_LOG_CAPACITY: usize = 50;

/// Default refresh cadence for the host: every 6 hours.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 6 * 60 * 60;

pub const DEFAULT_CITY: &str = "Mumbai";

/// Get all supported listing platforms
pub fn get_supported_sources() -> Vec<&'static str> {
    vec![BOOK_MY_SHOW, DISTRICT]
}

/// Get all cities the discovery tool tracks
pub fn get_supported_cities() -> Vec<&'static str> {
    vec![
        "Mumbai",
        "Delhi",
        "Bangalore",
        "Hyderabad",
        "Chennai",
        "Kolkata",
        "Pune",
        "Ahmedabad",
        "Jaipur",
        "Lucknow",
    ]
}

pub fn is_known_source(source: &str) -> bool {
    get_supported_sources().contains(&source)
}
