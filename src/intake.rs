//! Add-job pipeline: extract, validate, then persist.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::database::JobRepository;
use crate::error::{ExtractionError, IntakeError};
use crate::parsing::{self, ExtractedJob};
use crate::types::Job;

/// Source of structured extractions. `OllamaClient` is the production implementation.
#[async_trait]
pub trait JobExtractor: Send + Sync {
    async fn extract(&self, raw_text: &str) -> Result<ExtractedJob, ExtractionError>;
}

#[derive(Clone)]
pub struct JobIntake {
    extractor: Arc<dyn JobExtractor>,
    repo: JobRepository,
}

impl JobIntake {
    pub fn new(extractor: Arc<dyn JobExtractor>, repo: JobRepository) -> Self {
        Self { extractor, repo }
    }

    /// Parse `raw_text` and store it. Nothing is written unless extraction and validation succeed.
    pub async fn add(&self, raw_text: &str) -> Result<Job, IntakeError> {
        let raw_text = raw_text.trim();
        if raw_text.is_empty() {
            return Err(IntakeError::EmptyInput);
        }

        let extracted = self.extractor.extract(raw_text).await.map_err(|e| {
            warn!("Extraction failed: {}", e);
            e
        })?;
        let new_job = parsing::normalize(extracted, raw_text)?;

        let job = self.repo.insert(&new_job).await.map_err(IntakeError::Storage)?;
        info!("Added job {} '{}' ({})", job.id, job.title, job.category);
        Ok(job)
    }
}
