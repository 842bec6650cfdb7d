//! OpenAI chat-completions backend.

use async_trait::async_trait;
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::prompts::{self, QUIZ_SYSTEM, SUMMARY_SYSTEM};
use super::{LlmBackend, LlmError, send_json};

const TEMPERATURE: f64 = 0.7;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String, LlmError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
    /// Characters of content forwarded for summarization.
    max_content_length: usize,
}

impl OpenAiBackend {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        api_base: impl Into<String>,
        max_content_length: usize,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().build()?,
            api_key: api_key.into(),
            model: model.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            max_content_length,
        })
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
        };

        let response: ChatResponse = send_json(
            self.client
                .post(format!("{}/v1/chat/completions", self.api_base))
                .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
                .json(&body),
        )
        .await?;

        response.into_text()
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    fn model_name(&self) -> String {
        format!("openai-{}", self.model)
    }

    #[instrument(skip_all, fields(model = %self.model))]
    async fn summarize(&self, content: &str) -> Result<String, LlmError> {
        let summary = self
            .chat(
                SUMMARY_SYSTEM,
                &prompts::summary_prompt(content, self.max_content_length),
            )
            .await?;
        info!("summary generated with OpenAI");
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
            .chat(
                QUIZ_SYSTEM,
                &prompts::quiz_prompt(summary, content, num_questions),
            )
            .await?;
        info!("quiz generated with OpenAI");
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_choice_content_is_used() {
        let response: ChatResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": "answer" } }]
        }))
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "answer");
    }

    #[test]
    fn test_missing_or_blank_content_is_empty_response() {
        for value in [
            json!({ "choices": [] }),
            json!({ "choices": [{ "message": { "content": null } }] }),
            json!({ "choices": [{ "message": { "content": "  " } }] }),
        ] {
            let response: ChatResponse = serde_json::from_value(value).unwrap();
            assert_eq!(response.into_text().unwrap_err(), LlmError::EmptyResponse);
        }
    }
}
