//! Reasoning trace and terminal result types.

use loresmith_core::tool::ToolArgs;
use serde::{Deserialize, Serialize};

/// One iteration's record in the reasoning trace.
///
/// The trace (`thought_history`) is append-only and owned exclusively
/// by a single run; it is never shared across concurrent runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThoughtStep {
    /// 1-based iteration index.
    pub step: usize,

    /// The model's reasoning for this turn.
    pub thought: String,

    /// Tool name, when the turn requested an action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    /// Parsed action arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_input: Option<ToolArgs>,

    /// The observation text fed back into the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,

    /// The structured dispatch payload, for programmatic consumers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation_data: Option<serde_json::Value>,

    /// Reflection note attached to this step, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection: Option<String>,
}

impl ThoughtStep {
    pub fn new(step: usize, thought: impl Into<String>) -> Self {
        Self {
            step,
            thought: thought.into(),
            action: None,
            action_input: None,
            observation: None,
            observation_data: None,
            reflection: None,
        }
    }
}

/// The terminal result of one reasoning run. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Whether the run produced a final answer (false on LLM failure
    /// or budget exhaustion).
    pub success: bool,

    /// The answer text, or a diagnostic message on failure.
    pub answer: String,

    /// The complete reasoning trace.
    pub thought_history: Vec<ThoughtStep>,

    /// Tools invoked during the run, de-duplicated, in first-use order.
    pub tools_used: Vec<String>,

    /// Number of iterations consumed.
    pub iterations: u32,

    /// Retry suggestion from the reflection pass, if it did not approve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_reflection: Option<String>,

    /// Advisory upfront plan, when planning was enabled.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plan: Vec<String>,
}

impl AgentResponse {
    /// A failure response carrying whatever trace exists so far.
    pub fn failure(
        answer: impl Into<String>,
        thought_history: Vec<ThoughtStep>,
        tools_used: Vec<String>,
        iterations: u32,
    ) -> Self {
        Self {
            success: false,
            answer: answer.into(),
            thought_history,
            tools_used,
            iterations,
            final_reflection: None,
            plan: Vec::new(),
        }
    }

    /// A copy shaped for transport: observations truncated to
    /// `max_observation_chars` so traces stay readable over the wire.
    /// Structured payloads are kept intact.
    pub fn for_transport(&self, max_observation_chars: usize) -> Self {
        let mut out = self.clone();
        for step in &mut out.thought_history {
            if let Some(obs) = &step.observation
                && obs.chars().count() > max_observation_chars
            {
                let truncated: String = obs.chars().take(max_observation_chars).collect();
                step.observation = Some(format!("{truncated}..."));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_view_truncates_long_observations() {
        let mut step = ThoughtStep::new(1, "thinking");
        step.observation = Some("x".repeat(600));
        let response = AgentResponse {
            success: true,
            answer: "done".into(),
            thought_history: vec![step],
            tools_used: vec!["doc_search".into()],
            iterations: 1,
            final_reflection: None,
            plan: Vec::new(),
        };

        let wire = response.for_transport(500);
        let obs = wire.thought_history[0].observation.as_ref().unwrap();
        assert_eq!(obs.chars().count(), 503);
        assert!(obs.ends_with("..."));
        // Original is untouched.
        assert_eq!(
            response.thought_history[0]
                .observation
                .as_ref()
                .unwrap()
                .len(),
            600
        );
    }

    #[test]
    fn transport_view_keeps_short_observations() {
        let mut step = ThoughtStep::new(1, "t");
        step.observation = Some("short".into());
        let response = AgentResponse {
            success: true,
            answer: "a".into(),
            thought_history: vec![step],
            tools_used: vec![],
            iterations: 1,
            final_reflection: None,
            plan: Vec::new(),
        };
        let wire = response.for_transport(500);
        assert_eq!(wire.thought_history[0].observation.as_deref(), Some("short"));
    }

    #[test]
    fn response_serialization_skips_empty_optionals() {
        let response = AgentResponse::failure("boom", vec![], vec![], 2);
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("final_reflection"));
        assert!(!json.contains("plan"));
        assert!(json.contains(r#""success":false"#));
    }
}
