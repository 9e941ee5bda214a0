//! Reflection - post-hoc self-critique of a completed answer.
//!
//! One extra LLM call with a fixed critique prompt, classified by a
//! marker scan into "approved" or "retry with a reason". Reflection is
//! a quality signal, never a hard gate: any failure in the pass itself
//! defaults to approval so it can never discard a finished answer.

use crate::prompt::PromptBuilder;
use loresmith_core::backend::LlmBackend;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

static RETRY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)RETRY:\s*(.+)").unwrap());

/// The outcome of a reflection pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Approved,
    Retry(String),
}

/// Classify raw critique text. Approval wins when both markers appear;
/// anything unclassifiable is approval.
pub fn classify(text: &str) -> Verdict {
    if text.to_uppercase().contains("APPROVED") {
        return Verdict::Approved;
    }
    if let Some(caps) = RETRY_RE.captures(text) {
        return Verdict::Retry(caps[1].trim().to_string());
    }
    Verdict::Approved
}

/// Run one critique call against the backend.
pub async fn reflect(
    backend: &dyn LlmBackend,
    question: &str,
    answer: &str,
    tools_used: &[String],
    temperature: f32,
) -> Verdict {
    let prompt = PromptBuilder::reflection(question, answer, tools_used);

    match backend.generate(&prompt, temperature, None).await {
        Ok(completion) => classify(&completion.text),
        Err(e) => {
            warn!("reflection call failed, defaulting to approved: {e}");
            Verdict::Approved
        }
    }
}
