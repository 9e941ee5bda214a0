//! File write tool - write text files with path validation.

use crate::policy;
use async_trait::async_trait;
use loresmith_core::error::ToolError;
use loresmith_core::tool::{ParamSpec, Tool, ToolArgs, ToolResult};
use std::path::PathBuf;

pub struct FileWriteTool {
    allowed_roots: Vec<PathBuf>,
    forbidden_prefixes: Vec<PathBuf>,
}

impl FileWriteTool {
    pub fn new() -> Self {
        Self {
            allowed_roots: Vec::new(),
            forbidden_prefixes: Vec::new(),
        }
    }

    pub fn with_roots(allowed_roots: Vec<PathBuf>) -> Self {
        Self {
            allowed_roots,
            forbidden_prefixes: Vec::new(),
        }
    }

    pub fn forbid(mut self, prefixes: Vec<PathBuf>) -> Self {
        self.forbidden_prefixes = prefixes;
        self
    }
}

impl Default for FileWriteTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FileWriteTool {
    fn name(&self) -> &str {
        "file_write"
    }

    fn description(&self) -> &str {
        "Write text content to a file, replacing any existing content."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::new("path", "string", "The file path to write"),
            ParamSpec::new("content", "string", "The text content to write"),
        ]
    }

    async fn execute(&self, arguments: ToolArgs) -> Result<ToolResult, ToolError> {
        let Some(path) = arguments.get("path").and_then(|v| v.as_str()) else {
            return Ok(ToolResult::fail("missing 'path' argument"));
        };
        let Some(content) = arguments.get("content").and_then(|v| v.as_str()) else {
            return Ok(ToolResult::fail("missing 'content' argument"));
        };

        // Policy refusals are structural failures, not raised errors.
        let resolved = match policy::validate_path(path, &self.allowed_roots, &self.forbidden_prefixes)
        {
            Ok(resolved) => resolved,
            Err(e) => return Ok(ToolResult::fail(format!("permission denied: {e}"))),
        };

        match tokio::fs::write(&resolved, content).await {
            Ok(()) => Ok(ToolResult::ok(format!(
                "Wrote {} bytes to '{path}'.",
                content.len()
            ))),
            Err(e) => Ok(ToolResult::fail(format!("failed to write '{path}': {e}"))),
        }
    }
}
