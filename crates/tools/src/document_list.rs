//! Document list tool - inventory of the corpus.

use crate::index::DocumentIndex;
use async_trait::async_trait;
use loresmith_core::error::ToolError;
use loresmith_core::tool::{ParamSpec, Tool, ToolArgs, ToolResult};
use std::sync::Arc;

pub struct DocumentListTool {
    index: Arc<dyn DocumentIndex>,
}

impl DocumentListTool {
    pub fn new(index: Arc<dyn DocumentIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl Tool for DocumentListTool {
    fn name(&self) -> &str {
        "document_list"
    }

    fn description(&self) -> &str {
        "List all documents in the local corpus with their sizes."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![]
    }

    async fn execute(&self, _arguments: ToolArgs) -> Result<ToolResult, ToolError> {
        let infos = self.index.list();
        if infos.is_empty() {
            return Ok(ToolResult::ok("The document corpus is empty."));
        }

        let output = infos
            .iter()
            .map(|d| format!("- {} ({} chars)", d.name, d.chars))
            .collect::<Vec<_>>()
            .join("\n");
        let output = format!("{} document(s) in the corpus:\n{}", infos.len(), output);

        Ok(ToolResult::ok_with_data(
            output,
            serde_json::to_value(&infos).unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Document, InMemoryIndex};

    #[tokio::test]
    async fn lists_documents() {
        let index = Arc::new(InMemoryIndex::with_documents(vec![Document::new(
            "a.md", "hello",
        )]));
        let result = DocumentListTool::new(index)
            .execute(ToolArgs::new())
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.contains("1 document(s)"));
        assert!(result.output.contains("a.md (5 chars)"));
    }

    #[tokio::test]
    async fn empty_corpus_is_reported() {
        let index = Arc::new(InMemoryIndex::new());
        let result = DocumentListTool::new(index)
            .execute(ToolArgs::new())
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.contains("empty"));
    }
}
