//! Client for the third-party transcript service.
//!
//! The service answers with a list of per-video objects whose layout has
//! changed over time. Rather than committing to one schema, the first element
//! is probed with a fixed sequence of shape matchers.

use reqwest::{Client, header};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use crate::config::Config;
use crate::extractor::model::{ContentType, ExtractError};

/// Transcripts shorter than this (after trimming) are not worth summarizing.
pub const MIN_TRANSCRIPT_CHARS: usize = 50;

/// Which response layout produced the transcript text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptShape {
    /// `{"text": "..."}`
    FlatText,
    /// `{"tracks": [{"transcript": [{"text": "...", "start": .., "dur": ..}, ..]}]}`
    Tracks,
    /// `"..."`
    BareString,
    /// `{"content": "..."}`
    Content,
}

type ShapeMatcher = fn(&Value) -> Option<String>;

const SHAPE_MATCHERS: [(TranscriptShape, ShapeMatcher); 4] = [
    (TranscriptShape::FlatText, match_flat_text),
    (TranscriptShape::Tracks, match_tracks),
    (TranscriptShape::BareString, match_bare_string),
    (TranscriptShape::Content, match_content),
];

fn non_empty(text: &str) -> Option<String> {
    (!text.trim().is_empty()).then(|| text.to_string())
}

fn match_flat_text(item: &Value) -> Option<String> {
    item.get("text")?.as_str().and_then(non_empty)
}

fn match_tracks(item: &Value) -> Option<String> {
    let fragments = item
        .get("tracks")?
        .as_array()?
        .first()?
        .get("transcript")?
        .as_array()?;

    let joined = fragments
        .iter()
        .filter_map(|fragment| fragment.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join(" ");

    non_empty(&joined)
}

fn match_bare_string(item: &Value) -> Option<String> {
    item.as_str().and_then(non_empty)
}

fn match_content(item: &Value) -> Option<String> {
    item.get("content")?.as_str().and_then(non_empty)
}

/// Find the transcript text in a decoded service response.
pub fn parse_transcript(body: &Value) -> Result<(String, TranscriptShape), ExtractError> {
    let item = body
        .as_array()
        .and_then(|items| items.first())
        .ok_or_else(|| ExtractError::ParseError("No transcript found for this video.".into()))?;

    SHAPE_MATCHERS
        .iter()
        .find_map(|(shape, matcher)| matcher(item).map(|text| (text.trim().to_string(), *shape)))
        .ok_or_else(|| ExtractError::ParseError("Failed to parse transcript data.".into()))
}

#[derive(Debug, Clone)]
pub struct TranscriptClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

impl TranscriptClient {
    pub fn new(
        api_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(
            config.transcript_api_url.clone(),
            config.transcript_api_key.clone(),
            config.request_timeout,
        )
    }

    /// Fetch and normalize the transcript for `video_id`.
    #[instrument(skip(self))]
    pub async fn fetch_transcript(&self, video_id: &str) -> Result<String, ExtractError> {
        let Some(api_key) = self.api_key.as_deref() else {
            error!("transcript API key not configured");
            return Err(ExtractError::MissingApiKey);
        };

        let response = self
            .client
            .post(&self.api_url)
            .header(header::AUTHORIZATION, format!("Basic {}", api_key))
            .json(&json!({ "ids": [video_id] }))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "transcript request failed");
                if e.is_timeout() {
                    ExtractError::TranscriptTimeout
                } else if e.is_connect() {
                    ExtractError::TranscriptConnection
                } else {
                    ExtractError::fetch(e)
                }
            })?;

        let status = response.status();
        info!(status = status.as_u16(), "transcript API responded");

        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "transcript API error");
            return Err(ExtractError::TranscriptUnavailable {
                status: status.as_u16(),
            });
        }

        let body: Value = response.json().await.map_err(|e| {
            error!(error = %e, "transcript response is not JSON");
            ExtractError::ParseError("Failed to parse API response.".into())
        })?;

        let (text, shape) = parse_transcript(&body)?;
        debug!(?shape, chars = text.len(), "transcript shape matched");

        if text.chars().count() < MIN_TRANSCRIPT_CHARS {
            return Err(ExtractError::ContentTooShort(ContentType::Video));
        }

        Ok(text)
    }
}
