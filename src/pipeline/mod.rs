//! URL processing pipeline.
//!
//! Stages run strictly in order, each gated on the previous one:
//! URL check, extraction, summarization, summary check, quiz generation and
//! quiz check. Every failure short-circuits except the final quiz check,
//! which only logs a warning.

use anyhow::{Context, anyhow};
use axum::http::StatusCode;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use thiserror::Error;
use tracing::{Instrument, error, info, info_span, warn};
use utoipa::ToSchema;

use crate::config::Config;
use crate::extractor::{ContentSource, ContentType, ExtractionFailure, Extractor};
use crate::guardrails::{Guardrails, Rejection};
use crate::llm::{self, LlmBackend};
use crate::quiz::{QuizError, QuizGenerator, QuizQuestion};
use crate::summarizer::{SummarizeError, Summarizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ValidateUrl,
    Extract,
    Summarize,
    ValidateSummary,
    GenerateQuiz,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stage::ValidateUrl => "validate_url",
            Stage::Extract => "extract",
            Stage::Summarize => "summarize",
            Stage::ValidateSummary => "validate_summary",
            Stage::GenerateQuiz => "generate_quiz",
        })
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("URL is required")]
    MissingUrl,

    #[error("{0}")]
    UnsafeUrl(Rejection),

    #[error("Content type not allowed: {0}")]
    ContentTypeNotAllowed(ContentType),

    #[error("{0}")]
    Extraction(ExtractionFailure),

    #[error("{0}")]
    Summarize(SummarizeError),

    #[error("{0}")]
    SummaryRejected(Rejection),

    #[error("{0}")]
    Quiz(QuizError),

    /// Unexpected fault. The detail is logged, never shown to the caller.
    #[error("Internal server error")]
    Internal(anyhow::Error),
}

impl PipelineError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::MissingUrl
            | PipelineError::UnsafeUrl(_)
            | PipelineError::ContentTypeNotAllowed(_)
            | PipelineError::Extraction(_)
            | PipelineError::SummaryRejected(_) => StatusCode::BAD_REQUEST,
            PipelineError::Summarize(_)
            | PipelineError::Quiz(_)
            | PipelineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// URL echoed back with extraction failures.
    pub fn url(&self) -> Option<&str> {
        match self {
            PipelineError::Extraction(failure) => Some(&failure.url),
            _ => None,
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::MissingUrl | PipelineError::UnsafeUrl(_) => Some(Stage::ValidateUrl),
            PipelineError::ContentTypeNotAllowed(_) | PipelineError::Extraction(_) => {
                Some(Stage::Extract)
            }
            PipelineError::Summarize(_) => Some(Stage::Summarize),
            PipelineError::SummaryRejected(_) => Some(Stage::ValidateSummary),
            PipelineError::Quiz(_) => Some(Stage::GenerateQuiz),
            PipelineError::Internal(_) => None,
        }
    }
}

/// Everything produced for one URL.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProcessedUrl {
    pub title: String,
    pub content_type: ContentType,
    pub summary: String,
    pub quiz: Vec<QuizQuestion>,
    pub url: String,
}

pub struct Pipeline {
    extractor: Arc<dyn ContentSource>,
    summarizer: Summarizer,
    quiz_generator: QuizGenerator,
    guardrails: Guardrails,
    allowed_content_types: Vec<String>,
}

impl Pipeline {
    pub fn new(
        extractor: Arc<dyn ContentSource>,
        backend: Arc<dyn LlmBackend>,
        config: &Config,
    ) -> Self {
        Self {
            extractor,
            summarizer: Summarizer::new(Arc::clone(&backend)),
            quiz_generator: QuizGenerator::new(backend, config.num_quiz_questions),
            guardrails: Guardrails::from_config(config),
            allowed_content_types: config.allowed_content_types.clone(),
        }
    }

    /// Wire the production extractor and the configured LLM backend.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let extractor =
            Extractor::from_config(config).context("failed to build extractor HTTP clients")?;
        let backend = llm::backend_from_config(config)?;
        info!(
            backend = config.llm_backend.as_str(),
            model = %backend.model_name(),
            "pipeline ready"
        );
        Ok(Self::new(Arc::new(extractor), backend, config))
    }

    /// Run the pipeline on its own task so a panicking stage surfaces as
    /// [`PipelineError::Internal`] instead of tearing down the connection.
    pub async fn process(self: Arc<Self>, url: String) -> Result<ProcessedUrl, PipelineError> {
        let span = info_span!("process", url = %url.trim());
        let task = tokio::spawn(async move { self.run(&url).await }.instrument(span));

        match task.await {
            Ok(result) => result,
            Err(join_error) => {
                error!(error = %join_error, "pipeline task aborted");
                Err(PipelineError::Internal(anyhow!(join_error)))
            }
        }
    }

    pub async fn run(&self, url: &str) -> Result<ProcessedUrl, PipelineError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(PipelineError::MissingUrl);
        }
        self.guardrails
            .validate_url(url)
            .map_err(PipelineError::UnsafeUrl)?;

        info!(url = %url, "processing URL");

        let extracted = self.extractor.extract(url).await.map_err(|failure| {
            warn!(url = %failure.url, error = %failure.error, "extraction failed");
            PipelineError::Extraction(failure)
        })?;

        if !self.is_allowed(extracted.content_type) {
            warn!(content_type = %extracted.content_type, "content type not allowed");
            return Err(PipelineError::ContentTypeNotAllowed(extracted.content_type));
        }

        info!(
            content_type = %extracted.content_type,
            chars = extracted.content.chars().count(),
            "content extracted"
        );

        let summary = self
            .summarizer
            .summarize(&extracted.content)
            .await
            .map_err(PipelineError::Summarize)?;

        if let Err(rejection) = self.guardrails.validate_summary(&summary.summary) {
            warn!(reason = %rejection, "summary validation failed");
            return Err(PipelineError::SummaryRejected(rejection));
        }

        info!(
            chars = summary.summary.chars().count(),
            model = %summary.model,
            "summary generated"
        );

        let quiz = self
            .quiz_generator
            .generate(&summary.summary, &extracted.content)
            .await
            .map_err(PipelineError::Quiz)?;

        // Quiz problems are reported but the quiz is still returned.
        if let Err(rejection) = self.guardrails.validate_quiz(&quiz.questions) {
            warn!(reason = %rejection, "quiz validation failed");
        }

        info!(questions = quiz.questions.len(), "quiz generated");

        Ok(ProcessedUrl {
            title: extracted.title,
            content_type: extracted.content_type,
            summary: summary.summary,
            quiz: quiz.questions,
            url: url.to_string(),
        })
    }

    fn is_allowed(&self, content_type: ContentType) -> bool {
        self.allowed_content_types
            .iter()
            .any(|allowed| allowed == content_type.as_str())
    }
}
