pub mod backoff;
pub mod client;
pub mod decode;
pub mod errors;
pub mod types;

pub use client::{FetchPolicy, Fetcher};
pub use errors::FetchError;
pub use types::PageResponse;
