use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{debug, instrument};

use super::EventSource;
use crate::domain::CandidateEvent;
use crate::error::{EventError, Result};

/// Reads a JSON array of candidates from a file, e.g. the output of an
/// external scraper run. The whole file is one batch regardless of city.
pub struct JsonFileSource {
    name: String,
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "json_file".to_string());
        Self { name, path }
    }
}

#[async_trait]
impl EventSource for JsonFileSource {
    fn source_name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, _now), fields(path = %self.path.display()))]
    async fn fetch_candidates(&self, _city: &str, _now: DateTime<Utc>) -> Result<Vec<CandidateEvent>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| EventError::Source {
                source_name: self.name.clone(),
                message: format!("failed to read '{}': {}", self.path.display(), e),
            })?;
        let candidates: Vec<CandidateEvent> = serde_json::from_str(&content)?;
        debug!("Read {} candidates", candidates.len());
        Ok(candidates)
    }
}
