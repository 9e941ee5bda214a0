//! Directory listing tool.

use crate::policy;
use async_trait::async_trait;
use loresmith_core::error::ToolError;
use loresmith_core::tool::{ParamSpec, Tool, ToolArgs, ToolResult};
use std::path::PathBuf;

pub struct ListDirectoryTool {
    allowed_roots: Vec<PathBuf>,
}

impl ListDirectoryTool {
    pub fn new() -> Self {
        Self {
            allowed_roots: Vec::new(),
        }
    }

    pub fn with_roots(allowed_roots: Vec<PathBuf>) -> Self {
        Self { allowed_roots }
    }
}

impl Default for ListDirectoryTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ListDirectoryTool {
    fn name(&self) -> &str {
        "list_directory"
    }

    fn description(&self) -> &str {
        "List the entries of a directory. Directories are marked with a trailing slash."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::new(
            "path",
            "string",
            "The directory to list (default: current directory)",
        )]
    }

    async fn execute(&self, arguments: ToolArgs) -> Result<ToolResult, ToolError> {
        let path = arguments
            .get("path")
            .and_then(|v| v.as_str())
            .unwrap_or(".");

        // Policy refusals are structural failures, not raised errors.
        let resolved = match policy::validate_path(path, &self.allowed_roots, &[]) {
            Ok(resolved) => resolved,
            Err(e) => return Ok(ToolResult::fail(format!("permission denied: {e}"))),
        };

        let mut reader = match tokio::fs::read_dir(&resolved).await {
            Ok(reader) => reader,
            Err(e) => return Ok(ToolResult::fail(format!("failed to list '{path}': {e}"))),
        };

        let mut entries = Vec::new();
        while let Ok(Some(entry)) = reader.next_entry().await {
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            entries.push(if is_dir { format!("{name}/") } else { name });
        }
        entries.sort_unstable();

        if entries.is_empty() {
            return Ok(ToolResult::ok(format!("'{path}' is empty.")));
        }
        Ok(ToolResult::ok_with_data(
            entries.join("\n"),
            serde_json::json!(entries),
        ))
    }
}
