//! Per-run agent configuration.

use serde::{Deserialize, Serialize};

/// Immutable per-run settings for the reasoning engine.
///
/// Created once per agent instance (or per request) and never mutated
/// during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum reasoning iterations before the loop gives up.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Sampling temperature passed to the backend.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Run the post-hoc self-critique pass on completed answers.
    #[serde(default = "default_true")]
    pub enable_reflection: bool,

    /// Run the upfront task-decomposition call (advisory only).
    #[serde(default)]
    pub enable_planning: bool,

    /// Log per-iteration detail at info level instead of debug.
    #[serde(default)]
    pub verbose: bool,

    /// Maximum tokens per LLM response, when the backend supports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// How many recent conversation turns the facade feeds into the
    /// first prompt of a run.
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,
}

fn default_max_iterations() -> u32 {
    10
}
fn default_temperature() -> f32 {
    0.7
}
fn default_true() -> bool {
    true
}
fn default_history_turns() -> usize {
    5
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            temperature: default_temperature(),
            enable_reflection: true,
            enable_planning: false,
            verbose: false,
            max_tokens: None,
            history_turns: default_history_turns(),
        }
    }
}

impl AgentConfig {
    /// Set max iterations.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Enable or disable the reflection pass.
    pub fn with_reflection(mut self, enabled: bool) -> Self {
        self.enable_reflection = enabled;
        self
    }

    /// Enable or disable upfront planning.
    pub fn with_planning(mut self, enabled: bool) -> Self {
        self.enable_planning = enabled;
        self
    }

    /// Enable or disable verbose logging.
    pub fn with_verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    /// Set the per-response token cap.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }
}
