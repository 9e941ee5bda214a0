//! Built-in tool implementations for Loresmith.
//!
//! Tools give the agent the ability to act: search the document
//! corpus, list it, read and write files inside a sandbox, search the
//! web, and summarize text. Each implements the `Tool` trait from
//! `loresmith-core` and registers in a `ToolRegistry`.

pub mod doc_search;
pub mod document_list;
pub mod file_read;
pub mod file_write;
pub mod index;
pub mod list_directory;
pub mod policy;
pub mod summarize;
pub mod web_search;

pub use doc_search::DocSearchTool;
pub use document_list::DocumentListTool;
pub use file_read::FileReadTool;
pub use file_write::FileWriteTool;
pub use list_directory::ListDirectoryTool;
pub use summarize::SummarizeTool;
pub use web_search::WebSearchTool;

use index::InMemoryIndex;
use loresmith_core::tool::ToolRegistry;
use std::path::PathBuf;
use std::sync::Arc;

/// A registry with every built-in tool over an empty in-memory corpus.
///
/// Security defaults: file tools are unrestricted in root but block
/// `~/.ssh`, `~/.gnupg`, and `/etc/shadow`.
pub fn default_registry() -> ToolRegistry {
    registry_with_index(Arc::new(InMemoryIndex::new()))
}

/// Like [`default_registry`], but over a caller-supplied corpus.
pub fn registry_with_index(index: Arc<InMemoryIndex>) -> ToolRegistry {
    let forbidden: Vec<PathBuf> = ["~/.ssh", "~/.gnupg", "/etc/shadow"]
        .iter()
        .map(PathBuf::from)
        .collect();

    let mut registry = ToolRegistry::new();
    registry.register(Box::new(DocSearchTool::new(index.clone())));
    registry.register(Box::new(DocumentListTool::new(index)));
    registry.register(Box::new(FileReadTool::new().forbid(forbidden.clone())));
    registry.register(Box::new(FileWriteTool::new().forbid(forbidden)));
    registry.register(Box::new(ListDirectoryTool::new()));
    registry.register(Box::new(WebSearchTool::new()));
    registry.register(Box::new(SummarizeTool::new()));
    registry
}
