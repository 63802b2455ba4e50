//! Identity keys for event deduplication.
//!
//! Two records describe the same logical event iff their `(name, date, venue)`
//! triples are equal (exact, case-sensitive). The key is the hex SHA-256 of
//! the canonical form
//!
//! ```text
//! <len(name)>:<name> 0x1F <YYYY-MM-DD> 0x1F <len(venue)>:<venue>
//! ```
//!
//! Length prefixes keep the canonical form injective even when a field
//! contains the separator, so any string (including the empty string) is a
//! valid component.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::domain::EventRecord;

pub const KEY_FIELD_SEPARATOR: char = '\u{1F}';

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn canonical_form(name: &str, date: NaiveDate, venue: &str) -> String {
    let mut s = String::with_capacity(name.len() + venue.len() + 24);
    s.push_str(&name.len().to_string());
    s.push(':');
    s.push_str(name);
    s.push(KEY_FIELD_SEPARATOR);
    s.push_str(&date.format("%Y-%m-%d").to_string());
    s.push(KEY_FIELD_SEPARATOR);
    s.push_str(&venue.len().to_string());
    s.push(':');
    s.push_str(venue);
    s
}

pub fn build_key_parts(name: &str, date: NaiveDate, venue: &str) -> IdentityKey {
    let mut hasher = Sha256::new();
    hasher.update(canonical_form(name, date, venue).as_bytes());
    IdentityKey(hex::encode(hasher.finalize()))
}

pub fn build_key(record: &EventRecord) -> IdentityKey {
    build_key_parts(&record.name, record.date, &record.venue)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_key_is_stable() {
        let a = build_key_parts("Jazz Night", day(2024, 12, 15), "Hall A");
        let b = build_key_parts("Jazz Night", day(2024, 12, 15), "Hall A");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_key_is_case_sensitive() {
        let a = build_key_parts("Jazz Night", day(2024, 12, 15), "Hall A");
        let b = build_key_parts("jazz night", day(2024, 12, 15), "Hall A");
        assert_ne!(a, b);
    }

    #[test]
    fn test_each_component_matters() {
        let base = build_key_parts("Jazz Night", day(2024, 12, 15), "Hall A");
        assert_ne!(base, build_key_parts("Jazz Night", day(2024, 12, 16), "Hall A"));
        assert_ne!(base, build_key_parts("Jazz Night", day(2024, 12, 15), "Hall B"));
    }

    #[test]
    fn test_separator_inside_fields_does_not_collide() {
        let sep = KEY_FIELD_SEPARATOR;
        let a = build_key_parts(&format!("A{}B", sep), day(2024, 1, 1), "C");
        let b = build_key_parts("A", day(2024, 1, 1), &format!("B{}C", sep));
        assert_ne!(a, b);
        assert_ne!(
            canonical_form(&format!("A{}B", sep), day(2024, 1, 1), "C"),
            canonical_form("A", day(2024, 1, 1), &format!("B{}C", sep))
        );
    }

    #[test]
    fn test_empty_components_are_valid() {
        let a = build_key_parts("", day(2024, 1, 1), "");
        let b = build_key_parts("", day(2024, 1, 1), "x");
        assert_ne!(a, b);
        assert_eq!(canonical_form("", day(2024, 1, 1), ""), "0:\u{1F}2024-01-01\u{1F}0:");
    }
}
