//! Web search tool - stub that returns deterministic results.
//!
//! In production this would call a real search API (Brave, SearxNG,
//! etc.). The stub returns plausible results with real-looking URLs so
//! the reasoning loop and citation rules can be exercised end-to-end
//! without network access.

use async_trait::async_trait;
use loresmith_core::error::ToolError;
use loresmith_core::tool::{ParamSpec, Tool, ToolArgs, ToolResult};
use serde::Serialize;

pub struct WebSearchTool;

impl WebSearchTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web. Returns a list of results with titles, URLs, and snippets."
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::new("query", "string", "The search query"),
            ParamSpec::new("num_results", "integer", "Number of results to return (default 3)"),
        ]
    }

    async fn execute(&self, arguments: ToolArgs) -> Result<ToolResult, ToolError> {
        let Some(query) = arguments.get("query").and_then(|v| v.as_str()) else {
            return Ok(ToolResult::fail("missing 'query' argument"));
        };
        let num_results = arguments
            .get("num_results")
            .and_then(|v| v.as_u64())
            .unwrap_or(3)
            .min(5) as usize;

        let results = mock_results(query, num_results);
        let output = results
            .iter()
            .map(|r| format!("{}\n{}\n{}", r.title, r.url, r.snippet))
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(ToolResult::ok_with_data(
            output,
            serde_json::to_value(&results).unwrap_or_default(),
        ))
    }
}

#[derive(Debug, Clone, Serialize)]
struct SearchResult {
    title: String,
    url: String,
    snippet: String,
}

fn mock_results(query: &str, count: usize) -> Vec<SearchResult> {
    let q = query.to_lowercase();

    // Context-aware canned results for common topics.
    if q.contains("rust") {
        return vec![
            SearchResult {
                title: "The Rust Programming Language".into(),
                url: "https://doc.rust-lang.org/book/".into(),
                snippet: "Rust is a systems programming language focused on safety, speed, and concurrency.".into(),
            },
            SearchResult {
                title: "Rust by Example".into(),
                url: "https://doc.rust-lang.org/rust-by-example/".into(),
                snippet: "Runnable examples illustrating Rust concepts and standard library usage.".into(),
            },
            SearchResult {
                title: "crates.io: Rust Package Registry".into(),
                url: "https://crates.io/".into(),
                snippet: "The Rust community's registry for sharing and discovering libraries.".into(),
            },
        ]
        .into_iter()
        .take(count)
        .collect();
    }

    (0..count)
        .map(|i| SearchResult {
            title: format!("Result {} for: {query}", i + 1),
            url: format!("https://example.com/search?q={}&p={}", urlencode(query), i + 1),
            snippet: format!("Mock search result for the query '{query}'."),
        })
        .collect()
}

fn urlencode(s: &str) -> String {
    s.replace(' ', "+")
}
