//! The Loresmith reasoning engine - the heart of the system.
//!
//! The engine drives a **ReAct** (Thought → Action → Observation) loop:
//!
//! 1. **Build** the per-turn prompt (instructions + tool catalogue +
//!    conversation history + the running transcript)
//! 2. **Call** the LLM backend
//! 3. **Parse** the free-text turn into a typed action or a final answer
//! 4. **If action**: dispatch the tool, append the observation to the
//!    transcript, loop back to step 2
//! 5. **If final answer**: optionally run a reflection pass, then return
//!
//! The loop terminates unconditionally after `max_iterations` turns, so
//! runtime is bounded regardless of model behavior. Every run yields an
//! [`AgentResponse`] - there is no code path that returns nothing.
//!
//! Two execution modes: [`ReactEngine::run`] blocks until the loop
//! finishes; [`ReactEngine::run_stream`] emits typed [`StreamEvent`]s
//! as the loop progresses, including token-level delivery of the final
//! answer.

pub mod config;
pub mod engine;
pub mod facade;
pub mod parser;
pub mod planning;
pub mod prompt;
pub mod reflection;
pub mod response;
pub mod stream_event;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::AgentConfig;
pub use engine::{BUDGET_EXHAUSTED_ANSWER, ReactEngine};
pub use facade::{Agent, AgentBuilder};
pub use parser::{ParsedTurn, extract_thought, parse_turn};
pub use planning::create_plan;
pub use prompt::PromptBuilder;
pub use reflection::{Verdict, reflect};
pub use response::{AgentResponse, ThoughtStep};
pub use stream_event::StreamEvent;
