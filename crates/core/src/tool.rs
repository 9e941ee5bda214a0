//! Tool trait - the abstraction over agent capabilities.
//!
//! Tools are what give the agent the ability to act in the world:
//! search the document corpus, read/write files, search the web,
//! run analyses. Tools are registered in the [`ToolRegistry`] and
//! invoked by the reasoning loop through [`ToolRegistry::dispatch`],
//! which never raises - every failure mode becomes a structured
//! observation the model can react to.

use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One named parameter a tool accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name (the key in the action input map)
    pub name: String,

    /// Type tag shown to the LLM ("string", "integer", "boolean", ...)
    pub type_tag: String,

    /// What this parameter means
    pub description: String,
}

impl ParamSpec {
    pub fn new(
        name: impl Into<String>,
        type_tag: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_tag: type_tag.into(),
            description: description.into(),
        }
    }
}

/// A tool's advertised capability: name, description, ordered parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParamSpec>,
}

/// The result of a tool execution.
///
/// Tools validate their own parameters: invalid input yields
/// `success = false` with an error string rather than an `Err`.
/// `Err` is reserved for genuine execution faults, and the registry
/// converts those into failed results anyway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool executed successfully
    pub success: bool,

    /// Text output, fed back into the prompt as the observation
    pub output: String,

    /// Optional structured payload for programmatic consumers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Optional metadata (source names, counts, timings)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,

    /// Error text when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    /// A successful result with text output only.
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            data: None,
            metadata: None,
            error: None,
        }
    }

    /// A successful result carrying a structured payload.
    pub fn ok_with_data(output: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            success: true,
            output: output.into(),
            data: Some(data),
            metadata: None,
            error: None,
        }
    }

    /// A structural failure (bad arguments, nothing found, policy refusal).
    pub fn fail(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            success: false,
            output: String::new(),
            data: None,
            metadata: None,
            error: Some(error),
        }
    }

    /// Attach metadata to this result.
    pub fn with_metadata(mut self, metadata: serde_json::Map<String, serde_json::Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Flat string-keyed argument map passed to tools.
pub type ToolArgs = HashMap<String, serde_json::Value>;

/// The core Tool trait.
///
/// Each capability (doc_search, file_read, web_search, summarize, ...)
/// implements this trait and registers in the [`ToolRegistry`].
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g. "doc_search", "file_read").
    fn name(&self) -> &str;

    /// A description of what this tool does (shown to the LLM).
    fn description(&self) -> &str;

    /// Ordered parameter specs (shown to the LLM in the tool catalogue).
    fn parameters(&self) -> Vec<ParamSpec>;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: ToolArgs) -> std::result::Result<ToolResult, ToolError>;

    /// This tool's advertised descriptor.
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// The outcome of dispatching one action, mirrored into two forms:
/// a prose observation for the prompt and a structured payload for
/// the trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// Whether the underlying execution succeeded
    pub success: bool,

    /// Short text fed back into the prompt as `Observation:`
    pub observation: String,

    /// Structured payload retained in the reasoning trace
    pub payload: serde_json::Value,
}

/// A registry of available tools.
///
/// Registry contents are read-only during a run; a registry wrapped in
/// an `Arc` is safe to share across concurrent runs of one agent.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name -
    /// tools may be conditionally re-registered, so this is not an error.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// All advertised descriptors.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.values().map(|t| t.descriptor()).collect()
    }

    /// List all registered tool names, sorted for stable output.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Render the tool catalogue as a prompt block, sorted by name.
    ///
    /// Format per tool:
    /// `- name: description`
    /// `  parameters: p1: type - desc, p2: type - desc`
    pub fn catalogue(&self) -> String {
        let mut names: Vec<&String> = self.tools.keys().collect();
        names.sort_unstable();

        let mut lines = Vec::with_capacity(names.len());
        for name in names {
            let tool = &self.tools[name];
            let params = tool
                .parameters()
                .iter()
                .map(|p| format!("{}: {} - {}", p.name, p.type_tag, p.description))
                .collect::<Vec<_>>()
                .join(", ");
            if params.is_empty() {
                lines.push(format!("- {}: {}", tool.name(), tool.description()));
            } else {
                lines.push(format!(
                    "- {}: {}\n  parameters: {}",
                    tool.name(),
                    tool.description(),
                    params
                ));
            }
        }
        lines.join("\n")
    }

    /// Dispatch one action by name. Never raises: unknown tools, tool
    /// `Err`s, and structural failures all come back as an outcome the
    /// loop records and the model can self-correct from.
    pub async fn dispatch(&self, name: &str, args: ToolArgs) -> DispatchOutcome {
        let Some(tool) = self.tools.get(name) else {
            tracing::warn!(tool = name, "dispatch of unknown tool");
            let observation = format!(
                "Error: unknown tool '{}'. Available tools: {}",
                name,
                self.names().join(", ")
            );
            return DispatchOutcome {
                success: false,
                payload: serde_json::json!({ "success": false, "error": observation }),
                observation,
            };
        };

        tracing::debug!(tool = name, "dispatching");
        match tool.execute(args).await {
            Ok(result) if result.success => {
                let payload = serde_json::json!({
                    "success": true,
                    "output": result.output,
                    "data": result.data,
                    "metadata": result.metadata,
                });
                DispatchOutcome {
                    success: true,
                    observation: result.output,
                    payload,
                }
            }
            Ok(result) => {
                let error = result.error.unwrap_or_else(|| "unspecified failure".into());
                DispatchOutcome {
                    success: false,
                    observation: format!("Tool execution failed: {error}"),
                    payload: serde_json::json!({ "success": false, "error": error }),
                }
            }
            Err(e) => {
                let error = e.to_string();
                DispatchOutcome {
                    success: false,
                    observation: format!("Tool raised an error: {error}"),
                    payload: serde_json::json!({ "success": false, "error": error }),
                }
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
