use serde::{Deserialize, Serialize};

use crate::domain::{EventRecord, Status};

/// Independent predicates applied to a collection. Every field is optional;
/// supplied fields are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive substring matched against name, venue and category
    pub text: Option<String>,
    pub status: Option<Status>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub city: Option<String>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.status.is_none()
            && self.category.is_none()
            && self.source.is_none()
            && self.city.is_none()
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    pub fn with_city(mut self, city: &str) -> Self {
        self.city = Some(city.to_string());
        self
    }
}

/// Criteria prepared once per filter call
struct Matcher<'a> {
    text_lower: Option<String>,
    criteria: &'a FilterCriteria,
}

impl<'a> Matcher<'a> {
    fn new(criteria: &'a FilterCriteria) -> Self {
        Self {
            text_lower: criteria.text.as_ref().map(|t| t.to_lowercase()),
            criteria,
        }
    }

    fn matches(&self, record: &EventRecord) -> bool {
        if let Some(query) = &self.text_lower {
            let hit = record.name.to_lowercase().contains(query)
                || record.venue.to_lowercase().contains(query)
                || record.category.to_lowercase().contains(query);
            if !hit {
                return false;
            }
        }
        if let Some(status) = self.criteria.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(category) = &self.criteria.category {
            if &record.category != category {
                return false;
            }
        }
        if let Some(source) = &self.criteria.source {
            if &record.source != source {
                return false;
            }
        }
        if let Some(city) = &self.criteria.city {
            if &record.city != city {
                return false;
            }
        }
        true
    }
}

/// Select the records matching `criteria`, preserving input order.
pub fn filter<'a, I>(records: I, criteria: &FilterCriteria) -> Vec<EventRecord>
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let matcher = Matcher::new(criteria);
    records
        .into_iter()
        .filter(|r| matcher.matches(r))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn record(name: &str, venue: &str, category: &str, source: &str, status: Status) -> EventRecord {
        EventRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 12, 15).unwrap(),
            venue: venue.to_string(),
            city: "Mumbai".to_string(),
            category: category.to_string(),
            source: source.to_string(),
            url: String::new(),
            status,
            last_updated: Utc::now(),
            price: None,
            description: None,
            image_url: None,
        }
    }

    fn sample() -> Vec<EventRecord> {
        vec![
            record("Jazz Night", "Hall A", "Music", "BookMyShow", Status::Ongoing),
            record("Tech Conference 2024", "Bandra Kurla Complex", "Technology", "BookMyShow", Status::Upcoming),
            record("Smooth Sounds", "Blue Frog", "Jazz", "District", Status::Ongoing),
            record("Jazz Brunch", "Jazz Cafe", "Food", "District", Status::Expired),
        ]
    }

    fn names(records: &[EventRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_no_criteria_returns_everything_in_order() {
        let records = sample();
        let result = filter(&records, &FilterCriteria::default());
        assert_eq!(result, records);
    }

    #[test]
    fn test_text_matches_any_of_three_fields() {
        let records = sample();
        let result = filter(&records, &FilterCriteria::default().with_text("JAZZ"));
        assert_eq!(names(&result), vec!["Jazz Night", "Smooth Sounds", "Jazz Brunch"]);
    }

    #[test]
    fn test_text_and_status_combine() {
        let records = sample();
        let criteria = FilterCriteria::default()
            .with_text("jazz")
            .with_status(Status::Ongoing);
        let result = filter(&records, &criteria);
        assert_eq!(names(&result), vec!["Jazz Night", "Smooth Sounds"]);
    }

    #[test]
    fn test_exact_categorical_predicates() {
        let records = sample();

        let by_source = filter(&records, &FilterCriteria::default().with_source("District"));
        assert_eq!(names(&by_source), vec!["Smooth Sounds", "Jazz Brunch"]);

        let by_category = filter(&records, &FilterCriteria::default().with_category("music"));
        assert!(by_category.is_empty());

        let by_city = filter(&records, &FilterCriteria::default().with_city("Delhi"));
        assert!(by_city.is_empty());
    }

    #[test]
    fn test_is_empty() {
        assert!(FilterCriteria::default().is_empty());
        assert!(!FilterCriteria::default().with_city("Pune").is_empty());
    }
}
