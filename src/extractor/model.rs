use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;
use utoipa::ToSchema;

use crate::fetcher::FetchError;

/// Longest slice of an upstream error echoed back to the caller.
const MAX_ECHOED_ERROR_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Video,
    Article,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Video => "video",
            ContentType::Article => "article",
        }
    }
}

impl Display for ContentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized text pulled from a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedContent {
    pub title: String,
    pub content: String,
    pub content_type: ContentType,
    pub url: String,
}

/// Why extraction failed. `Display` is the message shown to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Invalid URL provided")]
    InvalidInput,

    #[error("Invalid YouTube URL format. Please check the URL.")]
    InvalidVideoUrl,

    #[error("API key not configured. Please set YOUTUBE_TRANSCRIPT_IO_API_KEY")]
    MissingApiKey,

    #[error("API Error: {status}. Video may not have captions.")]
    TranscriptUnavailable { status: u16 },

    #[error("{0}")]
    ParseError(String),

    #[error("Request timed out. Please try again.")]
    TranscriptTimeout,

    #[error("Connection error. Unable to reach the transcript service.")]
    TranscriptConnection,

    #[error("{}", too_short_message(.0))]
    ContentTooShort(ContentType),

    #[error("Request timed out. Website took too long to respond.")]
    Timeout,

    #[error("Connection error. Unable to reach the website.")]
    Connection,

    #[error("HTTP error {status} while fetching article.")]
    Http { status: u16 },

    #[error("Failed to fetch content: {0}")]
    Fetch(String),
}

fn too_short_message(content_type: &ContentType) -> &'static str {
    match content_type {
        ContentType::Video => "Transcript is empty or too short.",
        ContentType::Article => "Article content too short or unable to extract text",
    }
}

impl ExtractError {
    pub fn fetch(detail: impl Display) -> Self {
        Self::Fetch(detail.to_string().chars().take(MAX_ECHOED_ERROR_CHARS).collect())
    }
}

impl From<FetchError> for ExtractError {
    fn from(err: FetchError) -> Self {
        match err {
            e if e.is_timeout() => Self::Timeout,
            FetchError::Connect(_) => Self::Connection,
            FetchError::Http { status, .. } => Self::Http {
                status: status.as_u16(),
            },
            other => Self::fetch(other),
        }
    }
}

/// An extraction error together with the URL it concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{error}")]
pub struct ExtractionFailure {
    pub url: String,
    pub error: ExtractError,
}

impl ExtractionFailure {
    pub fn new(url: impl Into<String>, error: ExtractError) -> Self {
        Self {
            url: url.into(),
            error,
        }
    }
}
