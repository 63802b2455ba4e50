use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::pipeline::key::{build_key, IdentityKey};

/// Lifecycle status of an event, always derived from its date and "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Upcoming,
    Ongoing,
    Expired,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Upcoming, Status::Ongoing, Status::Expired];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Upcoming => "upcoming",
            Status::Ongoing => "ongoing",
            Status::Expired => "expired",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "upcoming" => Ok(Status::Upcoming),
            "ongoing" => Ok(Status::Ongoing),
            "expired" => Ok(Status::Expired),
            other => Err(format!(
                "unknown status '{}' (expected upcoming, ongoing or expired)",
                other
            )),
        }
    }
}

/// An event as stored in the collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub venue: String,
    pub city: String,
    pub category: String,
    pub source: String,
    pub url: String,
    pub status: Status,
    pub last_updated: DateTime<Utc>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// A freshly observed event as handed over by a discovery source.
///
/// Identity fields are optional so that incomplete scrapes can be reported
/// per item instead of failing deserialization of the whole batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateEvent {
    pub name: Option<String>,
    pub date: Option<String>,
    pub venue: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, alias = "platform")]
    pub source: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "imageUrl")]
    pub image_url: Option<String>,
}

impl CandidateEvent {
    /// Convenience constructor for the identity fields
    pub fn new(name: &str, date: &str, venue: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            date: Some(date.to_string()),
            venue: Some(venue.to_string()),
            ..Default::default()
        }
    }

    pub fn with_city(mut self, city: &str) -> Self {
        self.city = city.to_string();
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    pub fn with_price(mut self, price: &str) -> Self {
        self.price = Some(price.to_string());
        self
    }
}

/// A candidate that a reconciliation pass skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedCandidate {
    /// Position of the candidate in the incoming batch
    pub index: usize,
    pub name: Option<String>,
    pub error: ValidationError,
}

/// Per-pass report produced by the reconciliation engine
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangeSummary {
    pub added: usize,
    pub updated: usize,
    /// Batch matches whose status did not change
    pub unchanged: usize,
    /// Stored records outside the batch whose status moved with "now"
    pub reclassified: usize,
    /// Expired records across the whole resulting collection
    pub expired_total: usize,
    pub rejected: Vec<RejectedCandidate>,
}

impl ChangeSummary {
    pub fn has_changes(&self) -> bool {
        self.added > 0 || self.updated > 0 || self.reclassified > 0
    }

    /// Human-readable line for the activity log
    pub fn describe(&self) -> String {
        let mut line = format!(
            "Reconciled events: {} added, {} updated, {} expired in total",
            self.added, self.updated, self.expired_total
        );
        if self.reclassified > 0 {
            line.push_str(&format!(", {} reclassified", self.reclassified));
        }
        if !self.rejected.is_empty() {
            line.push_str(&format!(", {} rejected", self.rejected.len()));
        }
        line
    }
}

/// The authoritative set of events.
///
/// Holds at most one record per identity key and iterates in first-insertion
/// order. Only the reconciliation engine mutates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<EventRecord>", into = "Vec<EventRecord>")]
pub struct EventCollection {
    records: Vec<EventRecord>,
    index: HashMap<IdentityKey, usize>,
}

impl EventCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from existing records. When two records share an
    /// identity key the first one wins.
    pub fn from_records(records: Vec<EventRecord>) -> Self {
        let mut collection = Self::new();
        for record in records {
            let key = build_key(&record);
            if !collection.index.contains_key(&key) {
                collection.push(key, record);
            }
        }
        collection
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EventRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn get(&self, key: &IdentityKey) -> Option<&EventRecord> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    pub fn contains_key(&self, key: &IdentityKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn get_by_id(&self, id: Uuid) -> Option<&EventRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub(crate) fn get_mut(&mut self, key: &IdentityKey) -> Option<&mut EventRecord> {
        match self.index.get(key) {
            Some(&i) => self.records.get_mut(i),
            None => None,
        }
    }

    pub(crate) fn records_mut(&mut self) -> std::slice::IterMut<'_, EventRecord> {
        self.records.iter_mut()
    }

    /// Caller guarantees `key` is absent and equals `build_key(&record)`.
    pub(crate) fn push(&mut self, key: IdentityKey, record: EventRecord) {
        self.index.insert(key, self.records.len());
        self.records.push(record);
    }
}

impl From<Vec<EventRecord>> for EventCollection {
    fn from(records: Vec<EventRecord>) -> Self {
        Self::from_records(records)
    }
}

impl From<EventCollection> for Vec<EventRecord> {
    fn from(collection: EventCollection) -> Self {
        collection.records
    }
}

impl<'a> IntoIterator for &'a EventCollection {
    type Item = &'a EventRecord;
    type IntoIter = std::slice::Iter<'a, EventRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
