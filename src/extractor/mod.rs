pub mod article;
pub mod model;
pub mod transcript;
pub mod video;

#[cfg(test)]
mod tests;

pub use model::{ContentType, ExtractError, ExtractedContent, ExtractionFailure};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tracing::{info, instrument};

use crate::config::Config;
use crate::fetcher::{FetchPolicy, Fetcher};
use transcript::TranscriptClient;

/// Turns a URL into normalized title + text.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn extract(&self, url: &str) -> Result<ExtractedContent, ExtractionFailure>;
}

/// Routes video-host URLs to the transcript service and everything else to
/// the article scraper.
#[derive(Debug, Clone)]
pub struct Extractor {
    fetcher: Fetcher,
    transcripts: TranscriptClient,
}

impl Extractor {
    pub fn new(fetcher: Fetcher, transcripts: TranscriptClient) -> Self {
        Self {
            fetcher,
            transcripts,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            Fetcher::new(FetchPolicy::from_config(config))?,
            TranscriptClient::from_config(config)?,
        ))
    }

    async fn extract_video(&self, url: &str) -> Result<ExtractedContent, ExtractError> {
        let video_id = video::extract_video_id(url).ok_or(ExtractError::InvalidVideoUrl)?;
        info!(video_id = %video_id, "processing video");

        let content = self.transcripts.fetch_transcript(&video_id).await?;
        info!(chars = content.len(), "transcript extracted");

        Ok(ExtractedContent {
            title: format!("YouTube Video: {}", video_id),
            content,
            content_type: ContentType::Video,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl ContentSource for Extractor {
    #[instrument(skip(self))]
    async fn extract(&self, url: &str) -> Result<ExtractedContent, ExtractionFailure> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ExtractionFailure::new(url, ExtractError::InvalidInput));
        }

        let result = match video::classify(url) {
            ContentType::Video => self.extract_video(url).await,
            ContentType::Article => article::extract_article(&self.fetcher, url).await,
        };

        result.map_err(|error| ExtractionFailure::new(url, error))
    }
}
