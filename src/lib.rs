pub mod app_state;
pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod guardrails;
pub mod health;
pub mod llm;
pub mod pipeline;
pub mod process;
pub mod quiz;
pub mod router;
pub mod summarizer;
