//! Action parser - free text to typed actions.
//!
//! The LLM's output channel is prose, not a wire format. This module is
//! the fallible decoder that turns one turn of model output into exactly
//! one of: a terminal answer, a named action with arguments, or "nothing
//! recognized". It never fails - downstream logic handles the
//! [`ParsedTurn::Unrecognized`] case as a normal, recoverable outcome.

use loresmith_core::tool::ToolArgs;
use regex::Regex;
use std::sync::LazyLock;

/// The textual signal marking a final answer in model output.
pub const TERMINAL_MARKER: &str = "Final Answer:";

// Terminal answers match greedily to end-of-text, so an answer may
// itself contain marker-like trailing text that is not re-parsed.
static FINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Final Answer:\s*(.+)").unwrap());

static ACTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Action:\s*(\w+)").unwrap());

static INPUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Action Input:\s*(\{[^{}]*\})").unwrap());

// Permissive fallback for argument blocks that are not valid JSON.
static PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(\w+)"\s*:\s*"([^"]*)""#).unwrap());

static THOUGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Thought:\s*(.+?)(?:Action:|Final Answer:|$)").unwrap());

/// The typed outcome of parsing one LLM turn.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedTurn {
    /// The model concluded: the verbatim text after the terminal marker.
    Final(String),

    /// The model requested a tool invocation.
    Action { name: String, input: ToolArgs },

    /// Neither a terminal marker nor an action was found.
    Unrecognized,
}

/// Parse one turn of raw LLM text.
///
/// The terminal marker takes precedence over any action found in the
/// same turn - a model can legally emit trailing action-like text after
/// concluding.
pub fn parse_turn(text: &str) -> ParsedTurn {
    if let Some(caps) = FINAL_RE.captures(text) {
        return ParsedTurn::Final(caps[1].trim().to_string());
    }

    if let Some(caps) = ACTION_RE.captures(text) {
        let name = caps[1].to_string();
        let input = INPUT_RE
            .captures(text)
            .map(|c| parse_args(&c[1]))
            .unwrap_or_default();
        return ParsedTurn::Action { name, input };
    }

    ParsedTurn::Unrecognized
}

/// Parse an argument block into a flat map. Valid JSON objects are
/// taken as-is; anything else falls back to a `"key": "value"` pair
/// scan so that minor formatting errors from the LLM do not abort the
/// turn. An unparseable block yields an empty map - required-parameter
/// validation belongs to the tool itself.
fn parse_args(block: &str) -> ToolArgs {
    if let Ok(map) = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(block) {
        return map.into_iter().collect();
    }

    PAIR_RE
        .captures_iter(block)
        .map(|c| (c[1].to_string(), serde_json::Value::String(c[2].to_string())))
        .collect()
}

/// Extract the thought portion of a turn: the text after `Thought:` up
/// to the next marker. Falls back to the whole turn when no thought
/// marker is present.
pub fn extract_thought(text: &str) -> String {
    THOUGHT_RE
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_else(|| text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_final_answer() {
        let turn = "Thought: trivial\nFinal Answer: 4";
        assert_eq!(parse_turn(turn), ParsedTurn::Final("4".into()));
    }

    #[test]
    fn final_answer_is_greedy_to_end_of_text() {
        let turn = "Final Answer: The capital is Paris.\nSource: geography.md";
        match parse_turn(turn) {
            ParsedTurn::Final(answer) => {
                assert!(answer.contains("Paris"));
                assert!(answer.contains("Source: geography.md"));
            }
            other => panic!("expected Final, got {other:?}"),
        }
    }

    #[test]
    fn terminal_takes_precedence_over_action() {
        let turn = "Final Answer: done\nAction: lookup\nAction Input: {\"q\": \"x\"}";
        match parse_turn(turn) {
            ParsedTurn::Final(answer) => assert!(answer.starts_with("done")),
            other => panic!("expected Final, got {other:?}"),
        }
    }

    #[test]
    fn reparse_of_terminal_text_is_idempotent() {
        let turn = "Thought: ok\nFinal Answer: the corpus has 12 documents";
        let ParsedTurn::Final(answer) = parse_turn(turn) else {
            panic!("expected Final");
        };
        let reparsed = parse_turn(&format!("Final Answer: {answer}"));
        assert_eq!(reparsed, ParsedTurn::Final(answer));
    }

    #[test]
    fn parses_action_with_json_input() {
        let turn = "Thought: need data\nAction: doc_search\nAction Input: {\"query\": \"rust\", \"top_k\": 3}";
        match parse_turn(turn) {
            ParsedTurn::Action { name, input } => {
                assert_eq!(name, "doc_search");
                assert_eq!(input["query"], serde_json::json!("rust"));
                assert_eq!(input["top_k"], serde_json::json!(3));
            }
            other => panic!("expected Action, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_falls_back_to_pair_scan() {
        // Trailing comma makes this invalid JSON.
        let turn = r#"Action: doc_search
Action Input: {"query": "rust", "lang": "en",}"#;
        match parse_turn(turn) {
            ParsedTurn::Action { name, input } => {
                assert_eq!(name, "doc_search");
                assert_eq!(input["query"], serde_json::json!("rust"));
                assert_eq!(input["lang"], serde_json::json!("en"));
            }
            other => panic!("expected Action, got {other:?}"),
        }
    }

    #[test]
    fn action_without_input_yields_empty_map() {
        let turn = "Thought: listing\nAction: document_list";
        match parse_turn(turn) {
            ParsedTurn::Action { name, input } => {
                assert_eq!(name, "document_list");
                assert!(input.is_empty());
            }
            other => panic!("expected Action, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_turn() {
        assert_eq!(parse_turn("I am not sure what to do."), ParsedTurn::Unrecognized);
        assert_eq!(parse_turn(""), ParsedTurn::Unrecognized);
    }

    #[test]
    fn garbage_input_block_never_panics() {
        let turn = "Action: lookup\nAction Input: {this is not json at all}";
        match parse_turn(turn) {
            ParsedTurn::Action { name, input } => {
                assert_eq!(name, "lookup");
                assert!(input.is_empty());
            }
            other => panic!("expected Action, got {other:?}"),
        }
    }

    #[test]
    fn extracts_thought_before_action() {
        let turn = "Thought: I should search first.\nAction: doc_search\nAction Input: {}";
        assert_eq!(extract_thought(turn), "I should search first.");
    }

    #[test]
    fn thought_falls_back_to_whole_turn() {
        assert_eq!(extract_thought("no markers here"), "no markers here");
    }

    #[test]
    fn multiline_thought_stops_at_final_answer() {
        let turn = "Thought: step one.\nStep two of reasoning.\nFinal Answer: 42";
        let thought = extract_thought(turn);
        assert!(thought.contains("step one."));
        assert!(thought.contains("Step two"));
        assert!(!thought.contains("42"));
    }
}
