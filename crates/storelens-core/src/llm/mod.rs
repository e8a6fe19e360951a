//! Model endpoint integration
//!
//! Provides the `LlmClient` trait and an Ollama-compatible HTTP client
//! with timeout and backoff-retry handling.

mod client;

pub use client::{with_retry, LlmClient, OllamaClient};
