//! Shared wiring: config file to a ready [`Agent`].

use anyhow::Context;
use loresmith_agent::{Agent, AgentConfig};
use loresmith_backends::OpenAiCompatBackend;
use loresmith_config::AppConfig;
use loresmith_core::tool::ToolRegistry;
use loresmith_tools::index::{Document, InMemoryIndex};
use loresmith_tools::{
    DocSearchTool, DocumentListTool, FileReadTool, FileWriteTool, ListDirectoryTool,
    SummarizeTool, WebSearchTool,
};
use std::sync::Arc;
use tracing::{info, warn};

pub fn load_config() -> anyhow::Result<AppConfig> {
    AppConfig::load().context("failed to load configuration")
}

pub fn build_backend(config: &AppConfig) -> Arc<OpenAiCompatBackend> {
    // Ollama and friends accept any key; a real key comes from config
    // or the environment.
    let api_key = config.backend.api_key.as_deref().unwrap_or("ollama");
    Arc::new(OpenAiCompatBackend::new(
        &config.backend.name,
        &config.backend.base_url,
        api_key,
        &config.backend.model,
    ))
}

pub fn build_agent(config: &AppConfig) -> anyhow::Result<Agent> {
    let backend = build_backend(config);

    let index = Arc::new(InMemoryIndex::new());
    if let Some(docs_dir) = &config.tools.docs_dir {
        let loaded = load_corpus(&index, docs_dir)?;
        info!(count = loaded, dir = %docs_dir.display(), "document corpus loaded");
    }

    let roots = config.tools.allowed_roots.clone();
    let mut tools = ToolRegistry::new();
    tools.register(Box::new(DocSearchTool::new(index.clone())));
    tools.register(Box::new(DocumentListTool::new(index)));
    tools.register(Box::new(FileReadTool::with_roots(roots.clone())));
    tools.register(Box::new(FileWriteTool::with_roots(roots.clone())));
    tools.register(Box::new(ListDirectoryTool::with_roots(roots)));
    tools.register(Box::new(WebSearchTool::new()));
    tools.register(Box::new(SummarizeTool::new()));

    let agent_config = AgentConfig {
        max_iterations: config.agent.max_iterations,
        temperature: config.agent.temperature,
        enable_reflection: config.agent.enable_reflection,
        enable_planning: config.agent.enable_planning,
        verbose: false,
        max_tokens: config.agent.max_tokens,
        history_turns: config.agent.history_turns,
    };

    Agent::builder()
        .backend(backend)
        .tools(tools)
        .config(agent_config)
        .build()
        .context("failed to assemble agent")
}

/// Load `.md` and `.txt` files from a directory into the index.
fn load_corpus(index: &InMemoryIndex, dir: &std::path::Path) -> anyhow::Result<usize> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read docs dir {}", dir.display()))?;

    let mut loaded = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let is_text = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| matches!(ext, "md" | "txt"));
        if !is_text {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                index.add(Document::new(name, content));
                loaded += 1;
            }
            Err(e) => warn!(path = %path.display(), "skipping unreadable file: {e}"),
        }
    }
    Ok(loaded)
}
