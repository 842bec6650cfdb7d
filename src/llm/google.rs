//! Gemini `generateContent` backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::prompts::{self, GOOGLE_SUMMARY_CONTENT_CHARS};
use super::{LlmBackend, LlmError, send_json};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Result<String, LlmError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }
}

#[derive(Debug, Clone)]
pub struct GoogleBackend {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GoogleBackend {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().build()?,
            api_key: api_key.into(),
            model: model.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.api_base, self.model);
        let body = GenerateContentRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        };

        let response: GenerateContentResponse = send_json(
            self.client
                .post(url)
                .header(API_KEY_HEADER, &self.api_key)
                .json(&body),
        )
        .await?;

        response.into_text()
    }
}

#[async_trait]
impl LlmBackend for GoogleBackend {
    fn model_name(&self) -> String {
        format!("google-{}", self.model)
    }

    #[instrument(skip_all, fields(model = %self.model))]
    async fn summarize(&self, content: &str) -> Result<String, LlmError> {
        let summary = self
            .generate(&prompts::summary_prompt(content, GOOGLE_SUMMARY_CONTENT_CHARS))
            .await?;
        info!("summary generated with Gemini");
        Ok(summary)
    }

    #[instrument(skip_all, fields(model = %self.model))]
    async fn generate_quiz(
        &self,
        summary: &str,
        content: &str,
        num_questions: usize,
    ) -> Result<String, LlmError> {
        let raw = self
            .generate(&prompts::quiz_prompt(summary, content, num_questions))
            .await?;
        info!("quiz generated with Gemini");
        Ok(raw)
    }
}
