use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::constants::is_known_source;
use crate::domain::{
    CandidateEvent, ChangeSummary, EventCollection, EventRecord, RejectedCandidate, Status,
};
use crate::error::ValidationError;
use crate::pipeline::classify::classify;
use crate::pipeline::key::build_key_parts;

/// Result of one reconciliation pass
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    pub collection: EventCollection,
    pub summary: ChangeSummary,
}

/// A candidate whose identity fields passed validation
#[derive(Debug)]
struct ValidCandidate<'a> {
    name: &'a str,
    venue: &'a str,
    date: NaiveDate,
    raw: &'a CandidateEvent,
}

/// Parse a candidate date given as `YYYY-MM-DD` or as an RFC 3339 timestamp.
/// Timestamps keep the calendar day as written in their own offset.
pub fn parse_event_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingField("date"));
    }
    if let Ok(day) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(day);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .map_err(|e| ValidationError::InvalidDate {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn required<'a>(
    value: &'a Option<String>,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn validate(candidate: &CandidateEvent) -> Result<ValidCandidate<'_>, ValidationError> {
    let name = required(&candidate.name, "name")?;
    let venue = required(&candidate.venue, "venue")?;
    let date = match candidate.date.as_deref() {
        Some(raw) => parse_event_date(raw)?,
        None => return Err(ValidationError::MissingField("date")),
    };
    Ok(ValidCandidate {
        name,
        venue,
        date,
        raw: candidate,
    })
}

fn new_record(candidate: &ValidCandidate<'_>, status: Status, now: DateTime<Utc>) -> EventRecord {
    let raw = candidate.raw;
    EventRecord {
        id: Uuid::new_v4(),
        name: candidate.name.to_string(),
        date: candidate.date,
        venue: candidate.venue.to_string(),
        city: raw.city.clone(),
        category: raw.category.clone(),
        source: raw.source.clone(),
        url: raw.url.clone(),
        status,
        last_updated: now,
        price: raw.price.clone(),
        description: raw.description.clone(),
        image_url: raw.image_url.clone(),
    }
}

fn merge_text(stored: &mut String, incoming: &str) {
    if !incoming.is_empty() {
        *stored = incoming.to_string();
    }
}

fn merge_optional(stored: &mut Option<String>, incoming: &Option<String>) {
    if incoming.is_some() {
        stored.clone_from(incoming);
    }
}

/// Overwrite the payload fields the candidate carries. Fields it leaves
/// empty keep their stored value; identity and `id` stay put.
fn apply_update(
    stored: &mut EventRecord,
    candidate: &ValidCandidate<'_>,
    status: Status,
    now: DateTime<Utc>,
) {
    let raw = candidate.raw;
    stored.status = status;
    merge_text(&mut stored.city, &raw.city);
    merge_text(&mut stored.category, &raw.category);
    merge_text(&mut stored.source, &raw.source);
    merge_text(&mut stored.url, &raw.url);
    merge_optional(&mut stored.price, &raw.price);
    merge_optional(&mut stored.description, &raw.description);
    merge_optional(&mut stored.image_url, &raw.image_url);
    stored.last_updated = now;
}

/// Merge a freshly observed batch into the collection.
///
/// - unknown identity key: inserted with a fresh id, counted as added
/// - known key with a different computed status: payload refreshed, id kept,
///   counted as updated
/// - known key with the same status: left verbatim
/// - invalid candidates are skipped and listed in `summary.rejected`
///
/// Records absent from the batch are never removed, but their status is
/// recomputed against `now` (counted as reclassified when it moves).
/// `expired_total` is taken over the whole resulting collection.
pub fn reconcile(
    collection: EventCollection,
    batch: &[CandidateEvent],
    now: DateTime<Utc>,
) -> ReconcileOutcome {
    let mut collection = collection;
    let mut summary = ChangeSummary::default();

    for (index, candidate) in batch.iter().enumerate() {
        let valid = match validate(candidate) {
            Ok(valid) => valid,
            Err(error) => {
                debug!(index, name = ?candidate.name, %error, "Rejected candidate");
                summary.rejected.push(RejectedCandidate {
                    index,
                    name: candidate.name.clone(),
                    error,
                });
                continue;
            }
        };

        if !candidate.source.is_empty() && !is_known_source(&candidate.source) {
            debug!(source = %candidate.source, "Candidate from unrecognised source");
        }

        let key = build_key_parts(valid.name, valid.date, valid.venue);
        let status = classify(valid.date, now);

        match collection.get_mut(&key) {
            Some(stored) if stored.status != status => {
                debug!(
                    id = %stored.id,
                    from = %stored.status,
                    to = %status,
                    "Updated event: {}",
                    stored.name
                );
                apply_update(stored, &valid, status, now);
                summary.updated += 1;
            }
            Some(_) => {
                summary.unchanged += 1;
            }
            None => {
                let record = new_record(&valid, status, now);
                debug!(id = %record.id, "Added event: {}", record.name);
                collection.push(key, record);
                summary.added += 1;
            }
        }
    }

    for stored in collection.records_mut() {
        let status = classify(stored.date, now);
        if stored.status != status {
            stored.status = status;
            stored.last_updated = now;
            summary.reclassified += 1;
        }
    }

    summary.expired_total = collection
        .iter()
        .filter(|r| r.status == Status::Expired)
        .count();

    info!(
        added = summary.added,
        updated = summary.updated,
        unchanged = summary.unchanged,
        reclassified = summary.reclassified,
        expired_total = summary.expired_total,
        rejected = summary.rejected.len(),
        total = collection.len(),
        "Reconciliation pass complete"
    );

    ReconcileOutcome {
        collection,
        summary,
    }
}
