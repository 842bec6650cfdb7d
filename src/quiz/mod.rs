//! Quiz generation stage.
//!
//! The backend's free-text answer is parsed into questions without any
//! schema checks; structural validation happens later in the guardrails.

pub mod model;

pub use model::{QuestionType, QuizQuestion};

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::llm::{LlmBackend, LlmError};

const FENCE: &str = "```";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error("Failed to parse quiz format")]
    Parse(String),

    #[error("Quiz generation failed: {0}")]
    Generation(LlmError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quiz {
    pub questions: Vec<QuizQuestion>,
    pub model: String,
}

pub struct QuizGenerator {
    backend: Arc<dyn LlmBackend>,
    num_questions: usize,
}

impl QuizGenerator {
    pub fn new(backend: Arc<dyn LlmBackend>, num_questions: usize) -> Self {
        Self {
            backend,
            num_questions,
        }
    }

    #[instrument(skip_all, fields(num_questions = self.num_questions))]
    pub async fn generate(&self, summary: &str, content: &str) -> Result<Quiz, QuizError> {
        let raw = self
            .backend
            .generate_quiz(summary, content, self.num_questions)
            .await
            .map_err(|e| {
                error!(error = %e, "quiz generation failed");
                QuizError::Generation(e)
            })?;

        let questions = parse_questions(&raw).inspect_err(|e| {
            if let QuizError::Parse(detail) = e {
                error!(detail = %detail, "quiz JSON parse error");
            }
        })?;

        info!(questions = questions.len(), "quiz parsed");
        Ok(Quiz {
            questions,
            model: self.backend.model_name(),
        })
    }
}

/// Drop a surrounding markdown code fence and its `json` tag, if present.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix(FENCE) else {
        return text;
    };
    let inner = rest.split(FENCE).next().unwrap_or_default();
    inner.strip_prefix("json").unwrap_or(inner).trim()
}

/// Parse the `questions` list out of a model answer. A missing key yields an
/// empty list.
pub fn parse_questions(raw: &str) -> Result<Vec<QuizQuestion>, QuizError> {
    let payload: Value = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| QuizError::Parse(e.to_string()))?;

    let Some(object) = payload.as_object() else {
        return Err(QuizError::Parse("quiz payload is not a JSON object".into()));
    };

    match object.get("questions") {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Object(fields) => Ok(QuizQuestion::new(fields.clone())),
                other => Err(QuizError::Parse(format!("question is not an object: {}", other))),
            })
            .collect(),
        Some(_) => Err(QuizError::Parse("'questions' is not a list".into())),
    }
}
