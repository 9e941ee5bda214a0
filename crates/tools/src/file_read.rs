//! File read tool - read file contents with path validation.

use crate::policy;
use async_trait::async_trait;
use loresmith_core::error::ToolError;
use loresmith_core::tool::{ParamSpec, Tool, ToolArgs, ToolResult};
use std::path::PathBuf;

pub struct FileReadTool {
    /// Allowed root directories. Empty = allow all.
    allowed_roots: Vec<PathBuf>,
    /// Forbidden path prefixes.
    forbidden_prefixes: Vec<PathBuf>,
}

impl FileReadTool {
    /// A file read tool with no path restrictions.
    pub fn new() -> Self {
        Self {
            allowed_roots: Vec::new(),
            forbidden_prefixes: Vec::new(),
        }
    }

    /// Restrict reads to the given roots.
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

impl Default for FileReadTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FileReadTool {
    fn name(&self) -> &str {
        "file_read"
    }

    fn description(&self) -> &str {
        "Read the contents of a file at the given path."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::new("path", "string", "The file path to read")]
    }

    async fn execute(&self, arguments: ToolArgs) -> Result<ToolResult, ToolError> {
        let Some(path) = arguments.get("path").and_then(|v| v.as_str()) else {
            return Ok(ToolResult::fail("missing 'path' argument"));
        };

        // Policy refusals are structural failures, not raised errors.
        let resolved = match policy::validate_path(path, &self.allowed_roots, &self.forbidden_prefixes)
        {
            Ok(resolved) => resolved,
            Err(e) => return Ok(ToolResult::fail(format!("permission denied: {e}"))),
        };

        match tokio::fs::read_to_string(&resolved).await {
            Ok(content) => Ok(ToolResult::ok(content)),
            Err(e) => Ok(ToolResult::fail(format!("failed to read '{path}': {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(path: &str) -> ToolArgs {
        [("path".to_string(), serde_json::json!(path))].into()
    }

    #[tokio::test]
    async fn reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("note.txt");
        std::fs::write(&file, "Hello, world!").unwrap();

        let result = FileReadTool::new()
            .execute(args(file.to_str().unwrap()))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.output, "Hello, world!");
    }

    #[tokio::test]
    async fn missing_file_is_structural_failure() {
        let result = FileReadTool::new()
            .execute(args("/tmp/loresmith-does-not-exist-598211.txt"))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("failed to read"));
    }

    #[tokio::test]
    async fn missing_path_argument() {
        let result = FileReadTool::new().execute(ToolArgs::new()).await.unwrap();
        assert!(!result.success);
    }

    #[tokio::test]
    async fn outside_roots_is_refused_without_raising() {
        let dir = tempfile::tempdir().unwrap();
        let tool = FileReadTool::with_roots(vec![dir.path().to_path_buf()]);
        let result = tool.execute(args("/tmp")).await.unwrap();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("allowed roots"));
    }

    #[tokio::test]
    async fn traversal_is_refused_without_raising() {
        let tool = FileReadTool::new();
        let result = tool.execute(args("../../../etc/passwd")).await.unwrap();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("traversal"));
    }
}
