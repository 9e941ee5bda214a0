//! Typed events emitted by the streaming reasoning loop.
//!
//! Events are emitted strictly in the order the loop produces them and
//! each one is self-describing (type + step + payload), so a consumer
//! can resume rendering mid-stream without prior event history. Every
//! run terminates with `done`, or with `error` which ends the stream.

use loresmith_core::tool::ToolArgs;
use serde::{Deserialize, Serialize};

/// Events emitted during streaming execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// The run has started.
    Start { step: usize },

    /// A new reasoning iteration is beginning.
    Iteration { step: usize, max: u32 },

    /// The model is producing hidden reasoning tokens.
    ThinkingStart { step: usize },

    /// The turn's full text, emitted once the turn completes.
    ThinkingEnd { step: usize, text: String },

    /// The terminal marker was detected; answer tokens follow.
    AnswerStart { step: usize },

    /// One token of the user-facing answer.
    AnswerToken { step: usize, token: String },

    /// The agent is invoking a tool.
    Action {
        step: usize,
        tool: String,
        input: ToolArgs,
    },

    /// A tool observation, truncated for transport; `data` keeps the
    /// full structured payload.
    Observation {
        step: usize,
        text: String,
        data: serde_json::Value,
    },

    /// The reflection pass is running.
    Reflecting { step: usize },

    /// Reflection did not approve; carries the retry suggestion.
    ReflectionResult { step: usize, suggestion: String },

    /// End-of-run metadata.
    Meta {
        step: usize,
        tools_used: Vec<String>,
        iterations: u32,
        elapsed_ms: u64,
    },

    /// An error occurred; this ends the stream.
    Error { step: usize, message: String },

    /// The stream is complete.
    Done { step: usize },
}

impl StreamEvent {
    /// Wire-level event name, e.g. for SSE event types.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Iteration { .. } => "iteration",
            Self::ThinkingStart { .. } => "thinking_start",
            Self::ThinkingEnd { .. } => "thinking_end",
            Self::AnswerStart { .. } => "answer_start",
            Self::AnswerToken { .. } => "answer_token",
            Self::Action { .. } => "action",
            Self::Observation { .. } => "observation",
            Self::Reflecting { .. } => "reflecting",
            Self::ReflectionResult { .. } => "reflection_result",
            Self::Meta { .. } => "meta",
            Self::Error { .. } => "error",
            Self::Done { .. } => "done",
        }
    }

    /// The step index this event belongs to.
    pub fn step(&self) -> usize {
        match self {
            Self::Start { step }
            | Self::Iteration { step, .. }
            | Self::ThinkingStart { step }
            | Self::ThinkingEnd { step, .. }
            | Self::AnswerStart { step }
            | Self::AnswerToken { step, .. }
            | Self::Action { step, .. }
            | Self::Observation { step, .. }
            | Self::Reflecting { step }
            | Self::ReflectionResult { step, .. }
            | Self::Meta { step, .. }
            | Self::Error { step, .. }
            | Self::Done { step } => *step,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization_answer_token() {
        let event = StreamEvent::AnswerToken {
            step: 2,
            token: "Hel".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"answer_token""#));
        assert!(json.contains(r#""step":2"#));
        assert!(json.contains(r#""token":"Hel""#));
    }

    #[test]
    fn event_serialization_action() {
        let mut input = ToolArgs::new();
        input.insert("query".into(), serde_json::json!("rust"));
        let event = StreamEvent::Action {
            step: 1,
            tool: "doc_search".into(),
            input,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"action""#));
        assert!(json.contains(r#""tool":"doc_search""#));
    }

    #[test]
    fn event_serialization_done() {
        let event = StreamEvent::Done { step: 3 };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"done""#));
    }

    #[test]
    fn event_type_names() {
        assert_eq!(StreamEvent::Start { step: 0 }.event_type(), "start");
        assert_eq!(
            StreamEvent::ThinkingStart { step: 1 }.event_type(),
            "thinking_start"
        );
        assert_eq!(
            StreamEvent::Error {
                step: 1,
                message: "x".into()
            }
            .event_type(),
            "error"
        );
        assert_eq!(StreamEvent::Done { step: 0 }.event_type(), "done");
    }

    #[test]
    fn event_deserialization() {
        let json = r#"{"type":"iteration","step":1,"max":10}"#;
        let event: StreamEvent = serde_json::from_str(json).unwrap();
        match event {
            StreamEvent::Iteration { step, max } => {
                assert_eq!(step, 1);
                assert_eq!(max, 10);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn step_accessor() {
        assert_eq!(
            StreamEvent::Meta {
                step: 4,
                tools_used: vec![],
                iterations: 4,
                elapsed_ms: 10
            }
            .step(),
            4
        );
    }
}
