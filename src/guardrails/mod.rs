//! Static safety and quality checks applied between pipeline stages.
//!
//! All checks are pure. A failed check returns [`Rejection`] whose `Display`
//! is the reason shown to the caller.

use thiserror::Error;
use tracing::warn;

use crate::config::Config;
use crate::quiz::QuizQuestion;

/// URL schemes that can execute or embed content instead of linking to it.
pub const DANGEROUS_SCHEMES: [&str; 3] = ["javascript", "data", "vbscript"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("Unsafe URL protocol detected")]
    UnsafeUrl,

    #[error("Summary is empty")]
    EmptySummary,

    #[error("Summary too short (min {min} chars)")]
    SummaryTooShort { min: usize },

    #[error("Summary too long (max {max} chars)")]
    SummaryTooLong { max: usize },

    #[error("Content contains inappropriate material")]
    InappropriateContent { keyword: String },

    #[error("No quiz questions generated")]
    EmptyQuiz,

    #[error("Unknown question type: {0}")]
    UnknownQuestionType(String),

    #[error("Missing field '{0}' in question")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guardrails {
    min_summary_length: usize,
    max_summary_length: usize,
    forbidden_topics: Vec<String>,
}

impl Guardrails {
    pub fn new(
        min_summary_length: usize,
        max_summary_length: usize,
        forbidden_topics: Vec<String>,
    ) -> Self {
        Self {
            min_summary_length,
            max_summary_length,
            forbidden_topics: forbidden_topics
                .into_iter()
                .map(|topic| topic.to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.min_summary_length,
            config.max_summary_length,
            config.forbidden_topics.clone(),
        )
    }

    /// Reject URLs whose scheme is on the deny-list.
    ///
    /// Only the scheme prefix is inspected, so `data:` appearing later in a
    /// query string is fine. Leading whitespace/control characters and
    /// embedded tabs or newlines are ignored, matching how browsers parse the
    /// scheme.
    pub fn validate_url(&self, url: &str) -> Result<(), Rejection> {
        match url_scheme(url) {
            Some(scheme) if DANGEROUS_SCHEMES.contains(&scheme.as_str()) => {
                warn!(scheme = %scheme, "unsafe url scheme rejected");
                Err(Rejection::UnsafeUrl)
            }
            _ => Ok(()),
        }
    }

    /// Length bounds (in characters) plus a lexical topic deny-list.
    pub fn validate_summary(&self, summary: &str) -> Result<(), Rejection> {
        if summary.is_empty() {
            return Err(Rejection::EmptySummary);
        }

        let length = summary.chars().count();
        if length < self.min_summary_length {
            return Err(Rejection::SummaryTooShort {
                min: self.min_summary_length,
            });
        }
        if length > self.max_summary_length {
            return Err(Rejection::SummaryTooLong {
                max: self.max_summary_length,
            });
        }

        let lowered = summary.to_lowercase();
        if let Some(keyword) = self
            .forbidden_topics
            .iter()
            .find(|topic| lowered.contains(topic.as_str()))
        {
            warn!(keyword = %keyword, "potentially harmful content detected");
            return Err(Rejection::InappropriateContent {
                keyword: keyword.clone(),
            });
        }

        Ok(())
    }

    /// Every question must have a known type and that type's required fields.
    ///
    /// Field values are not type-checked.
    pub fn validate_quiz(&self, questions: &[QuizQuestion]) -> Result<(), Rejection> {
        if questions.is_empty() {
            return Err(Rejection::EmptyQuiz);
        }

        for question in questions {
            let question_type = match question.question_type() {
                Some(question_type) => question_type,
                None => {
                    let declared = question.declared_type().unwrap_or("unknown").to_string();
                    return Err(Rejection::UnknownQuestionType(declared));
                }
            };

            if let Some(field) = question_type
                .required_fields()
                .iter()
                .copied()
                .find(|field| !question.has_field(field))
            {
                return Err(Rejection::MissingField(field));
            }
        }

        Ok(())
    }
}

impl Default for Guardrails {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Lowercased scheme of `url`, if it has one.
fn url_scheme(url: &str) -> Option<String> {
    let cleaned: String = url
        .trim_start_matches(|c: char| c.is_whitespace() || c.is_control())
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .collect();

    let (scheme, _) = cleaned.split_once(':')?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

    valid.then(|| scheme.to_ascii_lowercase())
}
