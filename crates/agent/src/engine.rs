//! The ReAct reasoning loop.
//!
//! [`ReactEngine::run`] drives the blocking loop; [`ReactEngine::run_stream`]
//! is the streaming variant that emits [`StreamEvent`]s as the loop
//! progresses, delivering the final answer token by token.
//!
//! The loop is bounded: at most `max_iterations` LLM turns, after which
//! the run concludes with a fixed budget-exhausted answer. An LLM call
//! failure is fatal to the run (the model is the only driver); a tool
//! failure is not (it becomes an observation the model can react to).

use crate::config::AgentConfig;
use crate::parser::{self, ParsedTurn, TERMINAL_MARKER};
use crate::planning;
use crate::prompt::PromptBuilder;
use crate::reflection::{self, Verdict};
use crate::response::{AgentResponse, ThoughtStep};
use crate::stream_event::StreamEvent;
use chrono::Utc;
use loresmith_core::backend::LlmBackend;
use loresmith_core::tool::ToolRegistry;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The answer returned when the iteration budget runs out before the
/// model concludes.
pub const BUDGET_EXHAUSTED_ANSWER: &str =
    "Sorry, I could not reach a final answer within the reasoning budget. Try rephrasing the question or breaking it into smaller parts.";

/// Observation text cap for streamed events; full payloads travel in
/// the structured `data` field.
const STREAM_OBSERVATION_CHARS: usize = 500;

/// Byte index just past the last non-whitespace character, if any.
/// Text before it is safe to emit as answer tokens; whitespace after
/// it is held back in case the turn ends there.
fn ready_boundary(text: &str) -> Option<usize> {
    text.char_indices()
        .rev()
        .find(|&(_, c)| !c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
}

/// The reasoning engine: one LLM backend, one tool registry, one config.
///
/// The engine itself is stateless between runs; each run owns its own
/// transcript and trace, so one engine is safe to share across
/// concurrent runs.
pub struct ReactEngine {
    backend: Arc<dyn LlmBackend>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

/// Mutable state accumulated over one run.
struct RunState {
    prompt: String,
    history: Vec<ThoughtStep>,
    tools_used: Vec<String>,
}

impl RunState {
    fn record_tool(&mut self, name: &str) {
        if !self.tools_used.iter().any(|t| t == name) {
            self.tools_used.push(name.to_string());
        }
    }
}

impl ReactEngine {
    pub fn new(backend: Arc<dyn LlmBackend>, tools: Arc<ToolRegistry>, config: AgentConfig) -> Self {
        Self {
            backend,
            tools,
            config,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    fn initial_prompt(&self, question: &str, chat_history: &str) -> String {
        let now = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
        PromptBuilder::new(self.tools.catalogue()).initial(question, chat_history, &now)
    }

    /// Run the loop to completion and return the full result.
    ///
    /// Never fails: LLM errors and budget exhaustion come back as a
    /// response with `success = false`.
    pub async fn run(&self, question: &str, chat_history: &str) -> AgentResponse {
        info!(question, "starting reasoning run");

        let plan = if self.config.enable_planning {
            planning::create_plan(
                self.backend.as_ref(),
                question,
                &self.tools.names(),
                self.config.temperature,
            )
            .await
        } else {
            Vec::new()
        };

        let mut state = RunState {
            prompt: self.initial_prompt(question, chat_history),
            history: Vec::new(),
            tools_used: Vec::new(),
        };

        for step in 1..=self.config.max_iterations as usize {
            if self.config.verbose {
                info!(step, max = self.config.max_iterations, "iteration");
            } else {
                debug!(step, "iteration");
            }

            let text = match self
                .backend
                .generate(&state.prompt, self.config.temperature, self.config.max_tokens)
                .await
            {
                Ok(completion) => completion.text,
                Err(e) => {
                    warn!(step, error = %e, "LLM call failed, aborting run");
                    return AgentResponse {
                        plan,
                        ..AgentResponse::failure(
                            format!("LLM call failed: {e}"),
                            state.history,
                            state.tools_used,
                            step as u32,
                        )
                    };
                }
            };

            let mut record = ThoughtStep::new(step, parser::extract_thought(&text));

            match parser::parse_turn(&text) {
                ParsedTurn::Final(answer) => {
                    state.history.push(record);
                    info!(step, "final answer produced");

                    let final_reflection = self
                        .maybe_reflect(question, &answer, &state.tools_used)
                        .await;
                    if let Some(suggestion) = &final_reflection
                        && let Some(last) = state.history.last_mut()
                    {
                        last.reflection = Some(suggestion.clone());
                    }

                    return AgentResponse {
                        success: true,
                        answer,
                        thought_history: state.history,
                        tools_used: state.tools_used,
                        iterations: step as u32,
                        final_reflection,
                        plan,
                    };
                }
                ParsedTurn::Action { name, input } => {
                    debug!(step, tool = %name, "dispatching action");
                    let outcome = self.tools.dispatch(&name, input.clone()).await;
                    state.record_tool(&name);

                    record.action = Some(name);
                    record.action_input = Some(input);
                    record.observation = Some(outcome.observation.clone());
                    record.observation_data = Some(outcome.payload);
                    state.history.push(record);

                    state.prompt =
                        PromptBuilder::with_observation(&state.prompt, &text, &outcome.observation);
                }
                ParsedTurn::Unrecognized => {
                    debug!(step, "unrecognized turn, injecting format reminder");
                    state.history.push(record);
                    state.prompt = PromptBuilder::with_correction(&state.prompt, &text);
                }
            }
        }

        warn!(max = self.config.max_iterations, "iteration budget exhausted");
        AgentResponse {
            plan,
            ..AgentResponse::failure(
                BUDGET_EXHAUSTED_ANSWER,
                state.history,
                state.tools_used,
                self.config.max_iterations,
            )
        }
    }

    /// Run the reflection pass when enabled; `Some(reason)` means the
    /// critique did not approve. The reason is surfaced, never acted on.
    async fn maybe_reflect(
        &self,
        question: &str,
        answer: &str,
        tools_used: &[String],
    ) -> Option<String> {
        if !self.config.enable_reflection {
            return None;
        }
        match reflection::reflect(
            self.backend.as_ref(),
            question,
            answer,
            tools_used,
            self.config.temperature,
        )
        .await
        {
            Verdict::Approved => None,
            Verdict::Retry(reason) => {
                info!(reason, "reflection did not approve the answer");
                Some(reason)
            }
        }
    }

    /// Streaming variant: spawns a worker and returns the event channel.
    ///
    /// Event order per run: `start`, then per iteration `iteration` and
    /// `thinking_start`. On a tool turn, `thinking_end` is followed by
    /// `action` and `observation`. On the concluding turn,
    /// `answer_start` and `answer_token`s are emitted as fragments
    /// arrive (so they precede `thinking_end`, which carries the full
    /// turn text). The stream always ends with `error`, or with `meta`
    /// then `done`. Answer tokens are only emitted once the terminal
    /// marker has been seen, so consumers can render them verbatim.
    pub fn run_stream(self: Arc<Self>, question: String, chat_history: String) -> mpsc::Receiver<StreamEvent> {
        let (tx, rx) = mpsc::channel(128);
        tokio::spawn(async move {
            self.stream_worker(question, chat_history, tx).await;
        });
        rx
    }

    async fn stream_worker(
        &self,
        question: String,
        chat_history: String,
        tx: mpsc::Sender<StreamEvent>,
    ) {
        let started = Instant::now();

        // A closed receiver just ends the run early.
        macro_rules! emit {
            ($event:expr) => {
                if tx.send($event).await.is_err() {
                    return;
                }
            };
        }

        emit!(StreamEvent::Start { step: 0 });

        let mut state = RunState {
            prompt: self.initial_prompt(&question, &chat_history),
            history: Vec::new(),
            tools_used: Vec::new(),
        };

        for step in 1..=self.config.max_iterations as usize {
            emit!(StreamEvent::Iteration {
                step,
                max: self.config.max_iterations,
            });
            emit!(StreamEvent::ThinkingStart { step });

            let mut fragments = match self
                .backend
                .stream(&state.prompt, self.config.temperature, self.config.max_tokens)
                .await
            {
                Ok(rx) => rx,
                Err(e) => {
                    warn!(step, error = %e, "LLM stream failed to open");
                    emit!(StreamEvent::Error {
                        step,
                        message: format!("LLM call failed: {e}"),
                    });
                    return;
                }
            };

            // Buffer the turn and gate answer tokens on the terminal
            // marker; the marker may straddle fragment boundaries, so
            // detection rescans the whole buffer until it fires.
            // Trailing whitespace is held back in `answer_tail` so the
            // emitted tokens concatenate to exactly the parsed answer.
            let mut buffer = String::new();
            let mut answer_started = false;
            let mut answer_tail = String::new();

            loop {
                match fragments.recv().await {
                    Some(Ok(fragment)) => {
                        buffer.push_str(&fragment);
                        if answer_started {
                            answer_tail.push_str(&fragment);
                        } else if let Some(pos) = buffer.find(TERMINAL_MARKER) {
                            answer_started = true;
                            emit!(StreamEvent::AnswerStart { step });
                            answer_tail = buffer[pos + TERMINAL_MARKER.len()..]
                                .trim_start()
                                .to_string();
                        }
                        if answer_started
                            && let Some(boundary) = ready_boundary(&answer_tail)
                        {
                            let tail = answer_tail.split_off(boundary);
                            let token = std::mem::replace(&mut answer_tail, tail);
                            emit!(StreamEvent::AnswerToken { step, token });
                        }
                    }
                    Some(Err(e)) => {
                        warn!(step, error = %e, "LLM stream interrupted");
                        emit!(StreamEvent::Error {
                            step,
                            message: format!("LLM stream interrupted: {e}"),
                        });
                        return;
                    }
                    None => break,
                }
            }

            emit!(StreamEvent::ThinkingEnd {
                step,
                text: buffer.clone(),
            });

            let mut record = ThoughtStep::new(step, parser::extract_thought(&buffer));

            match parser::parse_turn(&buffer) {
                ParsedTurn::Final(answer) => {
                    state.history.push(record);

                    if self.config.enable_reflection {
                        emit!(StreamEvent::Reflecting { step });
                        if let Some(suggestion) = self
                            .maybe_reflect(&question, &answer, &state.tools_used)
                            .await
                        {
                            emit!(StreamEvent::ReflectionResult { step, suggestion });
                        }
                    }

                    emit!(StreamEvent::Meta {
                        step,
                        tools_used: state.tools_used.clone(),
                        iterations: step as u32,
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    });
                    emit!(StreamEvent::Done { step });
                    return;
                }
                ParsedTurn::Action { name, input } => {
                    emit!(StreamEvent::Action {
                        step,
                        tool: name.clone(),
                        input: input.clone(),
                    });

                    let outcome = self.tools.dispatch(&name, input.clone()).await;
                    state.record_tool(&name);

                    let mut text = outcome.observation.clone();
                    if text.chars().count() > STREAM_OBSERVATION_CHARS {
                        text = text.chars().take(STREAM_OBSERVATION_CHARS).collect();
                        text.push_str("...");
                    }
                    emit!(StreamEvent::Observation {
                        step,
                        text,
                        data: outcome.payload.clone(),
                    });

                    record.action = Some(name);
                    record.action_input = Some(input);
                    record.observation = Some(outcome.observation.clone());
                    record.observation_data = Some(outcome.payload);
                    state.history.push(record);

                    state.prompt = PromptBuilder::with_observation(
                        &state.prompt,
                        &buffer,
                        &outcome.observation,
                    );
                }
                ParsedTurn::Unrecognized => {
                    state.history.push(record);
                    state.prompt = PromptBuilder::with_correction(&state.prompt, &buffer);
                }
            }
        }

        // Budget exhausted: deliver the fixed answer through the same
        // answer-token path so consumers need no special case.
        let step = self.config.max_iterations as usize;
        emit!(StreamEvent::AnswerStart { step });
        emit!(StreamEvent::AnswerToken {
            step,
            token: BUDGET_EXHAUSTED_ANSWER.to_string(),
        });
        emit!(StreamEvent::Meta {
            step,
            tools_used: state.tools_used.clone(),
            iterations: self.config.max_iterations,
            elapsed_ms: started.elapsed().as_millis() as u64,
        });
        emit!(StreamEvent::Done { step });
    }
}
