//! Configuration handling for the application.
//!
//! Every knob is read once at startup by [`Config::from_env`] and the resulting
//! value is handed to component constructors. Nothing below the binary looks
//! at the environment on its own.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable names. Public so tests and tooling can refer to them.
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_LLM_BACKEND: &str = "LLM_BACKEND";
pub const ENV_GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub const ENV_GOOGLE_MODEL: &str = "GOOGLE_MODEL";
pub const ENV_GOOGLE_API_BASE: &str = "GOOGLE_API_BASE";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const ENV_OPENAI_API_BASE: &str = "OPENAI_API_BASE";
pub const ENV_TRANSCRIPT_API_KEY: &str = "YOUTUBE_TRANSCRIPT_IO_API_KEY";
pub const ENV_TRANSCRIPT_API_URL: &str = "TRANSCRIPT_API_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";
pub const ENV_FETCH_MAX_ATTEMPTS: &str = "FETCH_MAX_ATTEMPTS";
pub const ENV_FETCH_BACKOFF_BASE_MS: &str = "FETCH_BACKOFF_BASE_MS";
pub const ENV_MIN_SUMMARY_LENGTH: &str = "MIN_SUMMARY_LENGTH";
pub const ENV_MAX_SUMMARY_LENGTH: &str = "MAX_SUMMARY_LENGTH";
pub const ENV_NUM_QUIZ_QUESTIONS: &str = "NUM_QUIZ_QUESTIONS";
pub const ENV_MAX_CONTENT_LENGTH: &str = "MAX_CONTENT_LENGTH";
pub const ENV_ALLOWED_CONTENT_TYPES: &str = "ALLOWED_CONTENT_TYPES";
pub const ENV_FORBIDDEN_TOPICS: &str = "FORBIDDEN_TOPICS";

/// Default development values used when environment variables are absent.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
const DEFAULT_GOOGLE_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_GOOGLE_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com";
const DEFAULT_TRANSCRIPT_API_URL: &str = "https://www.youtube-transcript.io/api/transcripts";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_FETCH_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_FETCH_BACKOFF_BASE_MS: u64 = 1000;
const DEFAULT_MIN_SUMMARY_LENGTH: usize = 100;
const DEFAULT_MAX_SUMMARY_LENGTH: usize = 200_000;
const DEFAULT_NUM_QUIZ_QUESTIONS: usize = 5;
const DEFAULT_MAX_CONTENT_LENGTH: usize = 100_000;
const DEFAULT_ALLOWED_CONTENT_TYPES: &[&str] = &["text", "video", "article"];
const DEFAULT_FORBIDDEN_TOPICS: &[&str] = &[
    "violence",
    "hate",
    "adult content",
    "explicit",
    "drugs",
    "weapons",
    "illegal",
];

/// Which language-model vendor backs the summarizer and quiz generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    #[default]
    Google,
    OpenAi,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Google => "google",
            LlmProvider::OpenAi => "openai",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(LlmProvider::Google),
            "openai" => Ok(LlmProvider::OpenAi),
            other => Err(ConfigError::InvalidValue {
                field: ENV_LLM_BACKEND,
                reason: format!("unknown backend '{}' (expected 'google' or 'openai')", other),
            }),
        }
    }
}

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// TCP bind address (host:port) for the HTTP server.
    pub bind_addr: String,
    pub llm_backend: LlmProvider,
    pub google_api_key: Option<String>,
    pub google_model: String,
    pub google_api_base: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_api_base: String,
    /// Credential for the transcript service; video requests fail without it.
    pub transcript_api_key: Option<String>,
    pub transcript_api_url: String,
    /// Per-attempt timeout for article fetches.
    pub request_timeout: Duration,
    pub fetch_max_attempts: u32,
    pub fetch_backoff_base: Duration,
    pub min_summary_length: usize,
    pub max_summary_length: usize,
    pub num_quiz_questions: usize,
    /// Ceiling on characters sent to the OpenAI summarizer.
    pub max_content_length: usize,
    pub allowed_content_types: Vec<String>,
    /// Lowercase keywords that cause a summary to be rejected.
    pub forbidden_topics: Vec<String>,
}

impl Default for Config {
    /// Development defaults (mirrors `from_env` with no env overrides).
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            llm_backend: LlmProvider::default(),
            google_api_key: None,
            google_model: DEFAULT_GOOGLE_MODEL.to_string(),
            google_api_base: DEFAULT_GOOGLE_API_BASE.to_string(),
            openai_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            transcript_api_key: None,
            transcript_api_url: DEFAULT_TRANSCRIPT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            fetch_max_attempts: DEFAULT_FETCH_MAX_ATTEMPTS,
            fetch_backoff_base: Duration::from_millis(DEFAULT_FETCH_BACKOFF_BASE_MS),
            min_summary_length: DEFAULT_MIN_SUMMARY_LENGTH,
            max_summary_length: DEFAULT_MAX_SUMMARY_LENGTH,
            num_quiz_questions: DEFAULT_NUM_QUIZ_QUESTIONS,
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            allowed_content_types: to_owned_list(DEFAULT_ALLOWED_CONTENT_TYPES),
            forbidden_topics: to_owned_list(DEFAULT_FORBIDDEN_TOPICS),
        }
    }
}

impl Config {
    /// Load from environment variables, falling back to development defaults.
    ///
    /// Fails when a numeric value does not parse, when the summary bounds are
    /// inverted, or when the selected backend has no API key.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            bind_addr: env_string(ENV_BIND_ADDR).unwrap_or(defaults.bind_addr),
            llm_backend: match env_string(ENV_LLM_BACKEND) {
                Some(value) => value.parse()?,
                None => defaults.llm_backend,
            },
            google_api_key: env_string(ENV_GOOGLE_API_KEY),
            google_model: env_string(ENV_GOOGLE_MODEL).unwrap_or(defaults.google_model),
            google_api_base: env_string(ENV_GOOGLE_API_BASE).unwrap_or(defaults.google_api_base),
            openai_api_key: env_string(ENV_OPENAI_API_KEY),
            openai_model: env_string(ENV_OPENAI_MODEL).unwrap_or(defaults.openai_model),
            openai_api_base: env_string(ENV_OPENAI_API_BASE).unwrap_or(defaults.openai_api_base),
            transcript_api_key: env_string(ENV_TRANSCRIPT_API_KEY),
            transcript_api_url: env_string(ENV_TRANSCRIPT_API_URL)
                .unwrap_or(defaults.transcript_api_url),
            request_timeout: Duration::from_secs(env_parse(
                ENV_REQUEST_TIMEOUT_SECS,
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            fetch_max_attempts: env_parse(ENV_FETCH_MAX_ATTEMPTS, DEFAULT_FETCH_MAX_ATTEMPTS)?,
            fetch_backoff_base: Duration::from_millis(env_parse(
                ENV_FETCH_BACKOFF_BASE_MS,
                DEFAULT_FETCH_BACKOFF_BASE_MS,
            )?),
            min_summary_length: env_parse(ENV_MIN_SUMMARY_LENGTH, DEFAULT_MIN_SUMMARY_LENGTH)?,
            max_summary_length: env_parse(ENV_MAX_SUMMARY_LENGTH, DEFAULT_MAX_SUMMARY_LENGTH)?,
            num_quiz_questions: env_parse(ENV_NUM_QUIZ_QUESTIONS, DEFAULT_NUM_QUIZ_QUESTIONS)?,
            max_content_length: env_parse(ENV_MAX_CONTENT_LENGTH, DEFAULT_MAX_CONTENT_LENGTH)?,
            allowed_content_types: env_list(ENV_ALLOWED_CONTENT_TYPES)
                .unwrap_or(defaults.allowed_content_types),
            forbidden_topics: env_list(ENV_FORBIDDEN_TOPICS).unwrap_or(defaults.forbidden_topics),
        };

        config.validate()?;
        Ok(config)
    }

    /// Cross-field checks that a single variable cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_summary_length > self.max_summary_length {
            return Err(ConfigError::InvalidValue {
                field: ENV_MIN_SUMMARY_LENGTH,
                reason: format!(
                    "minimum ({}) exceeds maximum ({})",
                    self.min_summary_length, self.max_summary_length
                ),
            });
        }
        if self.fetch_max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: ENV_FETCH_MAX_ATTEMPTS,
                reason: "must be at least 1".to_string(),
            });
        }
        if self.num_quiz_questions == 0 {
            return Err(ConfigError::InvalidValue {
                field: ENV_NUM_QUIZ_QUESTIONS,
                reason: "must be at least 1".to_string(),
            });
        }

        let (field, key) = match self.llm_backend {
            LlmProvider::Google => (ENV_GOOGLE_API_KEY, &self.google_api_key),
            LlmProvider::OpenAi => (ENV_OPENAI_API_KEY, &self.openai_api_key),
        };
        if key.is_none() {
            return Err(ConfigError::InvalidValue {
                field,
                reason: format!("required when {} is '{}'", ENV_LLM_BACKEND, self.llm_backend.as_str()),
            });
        }

        Ok(())
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    match env_string(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            field: key,
            reason: format!("'{}': {}", raw, e),
        }),
        None => Ok(default),
    }
}

fn env_list(key: &str) -> Option<Vec<String>> {
    env_string(key).map(|raw| {
        raw.split(',')
            .map(|item| item.trim().to_lowercase())
            .filter(|item| !item.is_empty())
            .collect()
    })
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Errors that can occur while building a configuration.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}
