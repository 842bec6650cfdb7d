use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::llm::{LlmBackend, LlmError};

/// Content shorter than this is not sent to the backend.
pub const MIN_CONTENT_CHARS: usize = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummarizeError {
    #[error("Content too short for summarization")]
    TooShort,

    #[error("Summarization failed: {0}")]
    Failed(LlmError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub summary: String,
    /// Backend label, e.g. `google-gemini-2.5-flash`.
    pub model: String,
}

pub struct Summarizer {
    backend: Arc<dyn LlmBackend>,
}

impl Summarizer {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }

    #[instrument(skip_all, fields(content_chars = content.chars().count()))]
    pub async fn summarize(&self, content: &str) -> Result<Summary, SummarizeError> {
        if content.chars().count() < MIN_CONTENT_CHARS {
            return Err(SummarizeError::TooShort);
        }

        let summary = self.backend.summarize(content).await.map_err(|e| {
            error!(error = %e, "summarization failed");
            SummarizeError::Failed(e)
        })?;

        info!(summary_chars = summary.chars().count(), "summary generated");
        Ok(Summary {
            summary,
            model: self.backend.model_name(),
        })
    }
}
