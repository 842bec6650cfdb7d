pub mod google;
pub mod openai;
pub mod prompts;

pub use google::GoogleBackend;
pub use openai::OpenAiBackend;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::config::{Config, LlmProvider};

/// Longest slice of a vendor error body kept in [`LlmError::Api`].
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("{provider} API key not configured")]
    MissingApiKey { provider: &'static str },

    #[error("request failed: {0}")]
    Request(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("response contained no text")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Request(err.to_string())
    }
}

/// A language-model provider able to write summaries and quizzes.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Label reported alongside generated output, e.g. `google-gemini-2.5-flash`.
    fn model_name(&self) -> String;

    async fn summarize(&self, content: &str) -> Result<String, LlmError>;

    /// Raw model output, expected to hold a JSON object with a `questions` list.
    async fn generate_quiz(
        &self,
        summary: &str,
        content: &str,
        num_questions: usize,
    ) -> Result<String, LlmError>;
}

/// Build the backend selected by `config.llm_backend`.
pub fn backend_from_config(config: &Config) -> Result<Arc<dyn LlmBackend>, LlmError> {
    let backend: Arc<dyn LlmBackend> = match config.llm_backend {
        LlmProvider::Google => {
            let api_key = config
                .google_api_key
                .clone()
                .ok_or(LlmError::MissingApiKey { provider: "Google" })?;
            Arc::new(GoogleBackend::new(
                api_key,
                config.google_model.clone(),
                config.google_api_base.clone(),
            )?)
        }
        LlmProvider::OpenAi => {
            let api_key = config
                .openai_api_key
                .clone()
                .ok_or(LlmError::MissingApiKey { provider: "OpenAI" })?;
            Arc::new(OpenAiBackend::new(
                api_key,
                config.openai_model.clone(),
                config.openai_api_base.clone(),
                config.max_content_length,
            )?)
        }
    };
    Ok(backend)
}

/// Send a vendor request and decode the JSON body, turning non-2xx answers
/// into [`LlmError::Api`].
async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, LlmError> {
    let response = request.send().await.map_err(|e| {
        error!(error = %e, "LLM request failed");
        LlmError::from(e)
    })?;

    let status = response.status();
    if !status.is_success() {
        let message = api_error_message(response).await;
        error!(status = status.as_u16(), message = %message, "LLM API error");
        return Err(LlmError::Api {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| LlmError::InvalidResponse(e.to_string()))
}

/// Both vendors wrap failures as `{"error": {"message": ...}}`.
async fn api_error_message(response: Response) -> String {
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or(body);
    prompts::truncate_chars(&message, MAX_ERROR_BODY_CHARS).to_string()
}
