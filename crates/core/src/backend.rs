//! LlmBackend trait - the abstraction over LLM backends.
//!
//! A backend knows how to turn a prompt into text, either as one
//! complete response or as a stream of token fragments. The reasoning
//! engine calls `generate()` or `stream()` without knowing which
//! backend is in use - pure polymorphism.
//!
//! Implementations: OpenAI-compatible HTTP endpoints (OpenAI, Ollama,
//! OpenRouter, vLLM), plus scripted mocks for tests.

use crate::error::BackendError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A complete (non-streaming) response from a backend.
///
/// Backends that return richer response objects adapt them into this
/// single canonical shape at their own boundary; the engine never
/// inspects provider-specific structures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text.
    pub text: String,

    /// Which model actually responded (may differ from requested).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Completion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: None,
        }
    }
}

impl From<String> for Completion {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// The core LLM backend trait.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// A human-readable name for this backend (e.g. "ollama", "openai").
    fn name(&self) -> &str;

    /// Send a prompt and get the complete generated text.
    async fn generate(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> std::result::Result<Completion, BackendError>;

    /// Send a prompt and get a stream of text fragments.
    ///
    /// Default implementation calls `generate()` and delivers the
    /// result as a single fragment, so non-streaming backends still
    /// work in streaming mode.
    async fn stream(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<String, BackendError>>,
        BackendError,
    > {
        let completion = self.generate(prompt, temperature, max_tokens).await?;
        let (tx, rx) = tokio::sync::mpsc::channel(1);
        let _ = tx.send(Ok(completion.text)).await;
        Ok(rx)
    }

    /// Health check - can we reach the backend?
    async fn health_check(&self) -> std::result::Result<bool, BackendError> {
        Ok(true)
    }
}
