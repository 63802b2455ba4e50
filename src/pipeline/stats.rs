use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::{EventRecord, Status};

/// Aggregate counts over a collection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub by_status: BTreeMap<Status, usize>,
    pub by_source: BTreeMap<String, usize>,
    pub by_city: BTreeMap<String, BTreeMap<Status, usize>>,
}

impl Stats {
    pub fn status_count(&self, status: Status) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Events in `city` with `status`, e.g. for per-city tab counters
    pub fn count(&self, city: &str, status: Status) -> usize {
        self.by_city
            .get(city)
            .and_then(|counts| counts.get(&status))
            .copied()
            .unwrap_or(0)
    }
}

fn empty_status_counts() -> BTreeMap<Status, usize> {
    Status::ALL.iter().map(|s| (*s, 0)).collect()
}

/// Single pass over the records. Every status is present in `by_status`,
/// with zero when no record has it.
pub fn aggregate<'a, I>(records: I) -> Stats
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let mut stats = Stats {
        by_status: empty_status_counts(),
        ..Default::default()
    };

    for record in records {
        stats.total += 1;
        *stats.by_status.entry(record.status).or_insert(0) += 1;
        *stats.by_source.entry(record.source.clone()).or_insert(0) += 1;
        *stats
            .by_city
            .entry(record.city.clone())
            .or_insert_with(empty_status_counts)
            .entry(record.status)
            .or_insert(0) += 1;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn record(city: &str, source: &str, status: Status) -> EventRecord {
        EventRecord {
            id: Uuid::new_v4(),
            name: "Event".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 12, 15).unwrap(),
            venue: "Venue".to_string(),
            city: city.to_string(),
            category: "Music".to_string(),
            source: source.to_string(),
            url: String::new(),
            status,
            last_updated: Utc::now(),
            price: None,
            description: None,
            image_url: None,
        }
    }

    #[test]
    fn test_empty_collection() {
        let stats = aggregate(&Vec::<EventRecord>::new());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.by_status.len(), 3);
        assert!(stats.by_status.values().all(|&c| c == 0));
        assert!(stats.by_source.is_empty());
    }

    #[test]
    fn test_counts() {
        let records = vec![
            record("Mumbai", "BookMyShow", Status::Upcoming),
            record("Mumbai", "District", Status::Upcoming),
            record("Mumbai", "District", Status::Expired),
            record("Pune", "District", Status::Ongoing),
        ];
        let stats = aggregate(&records);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.status_count(Status::Upcoming), 2);
        assert_eq!(stats.status_count(Status::Ongoing), 1);
        assert_eq!(stats.status_count(Status::Expired), 1);
        assert_eq!(stats.by_status.values().sum::<usize>(), stats.total);
        assert_eq!(stats.by_source.get("District"), Some(&3));
        assert_eq!(stats.by_source.get("BookMyShow"), Some(&1));
        assert_eq!(stats.count("Mumbai", Status::Upcoming), 2);
        assert_eq!(stats.count("Mumbai", Status::Ongoing), 0);
        assert_eq!(stats.count("Delhi", Status::Expired), 0);
    }
}
