//! `OpenAI` chat completions client used to clean up book descriptions.

mod client;
mod error;
mod types;

pub use client::OpenAiNormalizer;
pub use error::NormalizerError;
