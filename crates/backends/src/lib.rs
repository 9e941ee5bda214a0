//! LLM backend implementations for Loresmith.
//!
//! One implementation covers nearly every provider in practice:
//! [`OpenAiCompatBackend`] speaks the OpenAI `/v1/chat/completions`
//! dialect used by OpenAI, OpenRouter, Ollama, vLLM, and friends.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatBackend;
