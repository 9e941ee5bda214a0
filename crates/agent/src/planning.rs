//! Planning - optional upfront task decomposition.
//!
//! One LLM call before the main loop turns the task into a list of
//! steps. The plan is advisory only: it is attached to the response for
//! transparency but the reasoning loop does not schedule from it.

use crate::prompt::PromptBuilder;
use loresmith_core::backend::LlmBackend;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

static STEP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^Step \d+:\s*(.+)$").unwrap());

/// Extract `Step N: ...` lines from raw plan text, in order.
pub fn parse_plan(text: &str) -> Vec<String> {
    STEP_RE
        .captures_iter(text)
        .map(|c| c[1].trim().to_string())
        .collect()
}

/// Ask the backend for an execution plan. A failed call or a response
/// with no recognizable steps yields an empty plan, which the caller
/// treats as "no plan".
pub async fn create_plan(
    backend: &dyn LlmBackend,
    task: &str,
    tool_names: &[&str],
    temperature: f32,
) -> Vec<String> {
    let prompt = PromptBuilder::planning(task, tool_names);

    match backend.generate(&prompt, temperature, None).await {
        Ok(completion) => parse_plan(&completion.text),
        Err(e) => {
            warn!("planning call failed, continuing without a plan: {e}");
            Vec::new()
        }
    }
}
