use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::pipeline::ProcessedUrl;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessUrlRequest {
    /// Article or video URL. Surrounding whitespace is ignored.
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProcessUrlResponse {
    pub status: ResponseStatus,
    pub data: ProcessedUrl,
}

impl From<ProcessedUrl> for ProcessUrlResponse {
    fn from(data: ProcessedUrl) -> Self {
        Self {
            status: ResponseStatus::Success,
            data,
        }
    }
}

/// Error envelope shared by every endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub status: ResponseStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: message.into(),
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}
