//! Document search tool - keyword retrieval over the corpus.

use crate::index::DocumentIndex;
use async_trait::async_trait;
use loresmith_core::error::ToolError;
use loresmith_core::tool::{ParamSpec, Tool, ToolArgs, ToolResult};
use std::sync::Arc;

pub struct DocSearchTool {
    index: Arc<dyn DocumentIndex>,
}

impl DocSearchTool {
    pub fn new(index: Arc<dyn DocumentIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl Tool for DocSearchTool {
    fn name(&self) -> &str {
        "doc_search"
    }

    fn description(&self) -> &str {
        "Search the local document corpus. Returns the most relevant passages with their source file names."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::new("query", "string", "The search query"),
            ParamSpec::new("top_k", "integer", "Number of passages to return (default 3)"),
        ]
    }

    async fn execute(&self, arguments: ToolArgs) -> Result<ToolResult, ToolError> {
        let Some(query) = arguments.get("query").and_then(|v| v.as_str()) else {
            return Ok(ToolResult::fail("missing 'query' argument"));
        };
        let top_k = arguments
            .get("top_k")
            .and_then(|v| v.as_u64())
            .unwrap_or(3)
            .clamp(1, 10) as usize;

        let hits = self.index.search(query, top_k);
        tracing::debug!(query, hits = hits.len(), "corpus search");
        if hits.is_empty() {
            return Ok(ToolResult::ok(format!(
                "No relevant documents found for query '{query}'."
            )));
        }

        let output = hits
            .iter()
            .enumerate()
            .map(|(i, hit)| format!("[{}] {} (score {:.1})\n{}", i + 1, hit.name, hit.score, hit.snippet))
            .collect::<Vec<_>>()
            .join("\n\n");

        let sources: Vec<&str> = hits.iter().map(|h| h.name.as_str()).collect();
        let mut metadata = serde_json::Map::new();
        metadata.insert("sources".into(), serde_json::json!(sources));

        Ok(
            ToolResult::ok_with_data(output, serde_json::to_value(&hits).unwrap_or_default())
                .with_metadata(metadata),
        )
    }
}
