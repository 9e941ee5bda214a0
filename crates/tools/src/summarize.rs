//! Summarize tool - extractive sentence selection.
//!
//! Deliberately LLM-free: the reasoning loop already has the model in
//! hand, so this tool just trims long observations down to their
//! leading sentences for re-use in later iterations.

use async_trait::async_trait;
use loresmith_core::error::ToolError;
use loresmith_core::tool::{ParamSpec, Tool, ToolArgs, ToolResult};

pub struct SummarizeTool;

impl SummarizeTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SummarizeTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for SummarizeTool {
    fn name(&self) -> &str {
        "summarize"
    }

    fn description(&self) -> &str {
        "Produce a short extractive summary of the given text (its leading sentences)."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::new("text", "string", "The text to summarize"),
            ParamSpec::new("max_sentences", "integer", "Sentences to keep (default 3)"),
        ]
    }

    async fn execute(&self, arguments: ToolArgs) -> Result<ToolResult, ToolError> {
        let Some(text) = arguments.get("text").and_then(|v| v.as_str()) else {
            return Ok(ToolResult::fail("missing 'text' argument"));
        };
        let max_sentences = arguments
            .get("max_sentences")
            .and_then(|v| v.as_u64())
            .unwrap_or(3)
            .clamp(1, 10) as usize;

        let summary = leading_sentences(text, max_sentences);
        if summary.is_empty() {
            return Ok(ToolResult::fail("text contains no sentences"));
        }
        Ok(ToolResult::ok(summary))
    }
}

fn leading_sentences(text: &str, max: usize) -> String {
    let mut sentences = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            let s = current.trim();
            if !s.is_empty() {
                sentences.push(s.to_string());
            }
            current.clear();
            if sentences.len() == max {
                return sentences.join(" ");
            }
        }
    }
    // Trailing fragment without terminal punctuation counts as a sentence.
    let tail = current.trim();
    if !tail.is_empty() && sentences.len() < max {
        sentences.push(tail.to_string());
    }
    sentences.join(" ")
}
