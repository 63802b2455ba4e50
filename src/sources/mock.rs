use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::EventSource;
use crate::constants::{BOOK_MY_SHOW, DISTRICT};
use crate::domain::CandidateEvent;
use crate::error::Result;

const EVENT_TEMPLATES: &[(&str, &str)] = &[
    ("Tech Conference 2024", "Technology"),
    ("Music Festival Winter Edition", "Music"),
    ("Art Exhibition - Modern Masters", "Arts"),
    ("Food & Wine Festival", "Food"),
    ("Jazz Night", "Music"),
    ("Stand-up Comedy Special", "Comedy"),
    ("Startup Founders Meetup", "Technology"),
    ("Classical Dance Recital", "Arts"),
    ("Street Food Carnival", "Food"),
    ("Indie Rock Live", "Music"),
    ("Photography Walk", "Arts"),
    ("Marathon Expo", "Sports"),
];

const VENUE_SUFFIXES: &[&str] = &[
    "Convention Centre",
    "Open Air Grounds",
    "Arts Centre",
    "Stadium",
    "Social",
    "Exhibition Hall",
];

/// Generates plausible listings for one platform.
///
/// With a seed every fetch yields the same batch, which keeps repeated
/// refreshes idempotent.
pub struct MockSource {
    platform: String,
    events_per_fetch: usize,
    seed: Option<u64>,
}

impl MockSource {
    pub fn new(platform: &str, events_per_fetch: usize, seed: Option<u64>) -> Self {
        Self {
            platform: platform.to_string(),
            events_per_fetch,
            seed,
        }
    }

    fn base_url(&self) -> &'static str {
        match self.platform.as_str() {
            BOOK_MY_SHOW => "https://bookmyshow.com/events",
            DISTRICT => "https://district.in/events",
            _ => "https://example.com/events",
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            // Different platforms get different listings under the same seed
            Some(seed) => StdRng::seed_from_u64(seed ^ fnv1a(self.platform.as_bytes())),
            None => StdRng::from_entropy(),
        }
    }

    /// Produce a batch for `city` with dates spread around `now`
    pub fn generate(&self, city: &str, now: DateTime<Utc>) -> Vec<CandidateEvent> {
        let mut rng = self.rng();
        let today = now.date_naive();

        (0..self.events_per_fetch)
            .filter_map(|_| {
                let (name, category) = EVENT_TEMPLATES.choose(&mut rng)?;
                let suffix = VENUE_SUFFIXES.choose(&mut rng)?;
                let date = today + Duration::days(rng.gen_range(-10..=45));
                let price = rng.gen_range(2..=40) * 50;
                let slug = slugify(name);

                Some(CandidateEvent {
                    name: Some(name.to_string()),
                    date: Some(date.format("%Y-%m-%d").to_string()),
                    venue: Some(format!("{} {}", city, suffix)),
                    city: city.to_string(),
                    category: category.to_string(),
                    source: self.platform.clone(),
                    url: format!("{}/{}", self.base_url(), slug),
                    price: Some(format!("₹{}", price)),
                    description: Some(format!("{} in {}", name, city)),
                    image_url: None,
                })
            })
            .collect()
    }
}

#[async_trait]
impl EventSource for MockSource {
    fn source_name(&self) -> &str {
        &self.platform
    }

    async fn fetch_candidates(&self, city: &str, now: DateTime<Utc>) -> Result<Vec<CandidateEvent>> {
        Ok(self.generate(city, now))
    }
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(0x0100_0000_01b3)
    })
}
