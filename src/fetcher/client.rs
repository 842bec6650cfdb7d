use crate::config::Config;
use crate::fetcher::{
    backoff::calculate_backoff_delay, decode::decode_body, errors::FetchError,
    types::PageResponse,
};
use reqwest::{
    Client, ClientBuilder,
    header::{self, HeaderMap, HeaderValue},
};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const CONSENT_COOKIE: &str = "CONSENT=PENDING+999";

const SUPPORTED_CONTENT_TYPES: [&str; 3] = ["text/html", "application/xhtml", "text/plain"];

/// Timeout and retry knobs for article downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    pub timeout: Duration,
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl FetchPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: config.request_timeout,
            max_attempts: config.fetch_max_attempts,
            backoff_base: config.fetch_backoff_base,
        }
    }
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// HTTP client for article pages. Sends browser-like headers and retries
/// transient failures with exponential backoff.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: FetchPolicy,
}

impl Fetcher {
    pub fn new(policy: FetchPolicy) -> Result<Self, reqwest::Error> {
        let client = ClientBuilder::new()
            .connect_timeout(policy.timeout)
            .timeout(policy.timeout)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .default_headers(browser_headers())
            .build()?;

        Ok(Self { client, policy })
    }

    /// Fetch `url`, retrying retriable failures up to `max_attempts` times in total.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Result<PageResponse, FetchError> {
        let parsed_url = Url::parse(url)?;
        let mut attempt = 0;

        loop {
            match self.fetch_once(parsed_url.clone()).await {
                Ok(page) => return Ok(page),
                Err(err) if err.should_retry() && attempt + 1 < self.policy.max_attempts => {
                    let delay = calculate_backoff_delay(attempt, self.policy.backoff_base);
                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "article fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn fetch_once(&self, url: Url) -> Result<PageResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http(status));
        }

        // Check content length before downloading
        if let Some(content_length) = response.content_length()
            && content_length > MAX_BODY_SIZE
        {
            return Err(FetchError::BodyTooLarge(content_length));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        if !SUPPORTED_CONTENT_TYPES
            .iter()
            .any(|supported| content_type.contains(supported))
        {
            return Err(FetchError::UnsupportedContentType(content_type));
        }

        let body_bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Io(e.to_string()))?;

        // Content-Length may be absent or wrong
        if body_bytes.len() as u64 > MAX_BODY_SIZE {
            return Err(FetchError::BodyTooLarge(body_bytes.len() as u64));
        }

        let (body_utf8, charset) = decode_body(&content_type, &body_bytes);
        debug!(bytes = body_bytes.len(), charset, "page downloaded");

        Ok(PageResponse {
            url_final: final_url,
            status,
            content_type,
            body_utf8,
            charset,
        })
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static(ACCEPT_LANGUAGE),
    );
    headers.insert(header::DNT, HeaderValue::from_static("1"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers.insert(header::COOKIE, HeaderValue::from_static(CONSENT_COOKIE));
    headers
}
