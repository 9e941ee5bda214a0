//! Prompt assembly for the reasoning loop.
//!
//! The per-turn prompt is assembled from a fixed instruction template,
//! the tool catalogue, formatted conversation history, the current
//! timestamp, and - on iterations after the first - the running
//! transcript of prior Thought/Action/Observation blocks. Assembly is
//! deterministic given identical inputs and never truncates the
//! transcript; bounding, if needed, is a caller concern.

/// The ReAct instruction template. Placeholders: `{current_datetime}`,
/// `{chat_history}`, `{tools_description}`, `{question}`.
const REACT_TEMPLATE: &str = r#"You are a knowledge-base assistant with access to a set of tools. Reason and act step by step using the format below.

[System Information]
Current date and time: {current_datetime}

[Conversation History]
{chat_history}

[Available Tools]
{tools_description}

[Core Principles]
1. Check the conversation history first: if the question refers to earlier messages (such as "what did I just ask"), answer directly from [Conversation History] without using any tool.
2. For knowledge questions, prefer the doc_search tool to query the local document corpus.
3. Base your answer only on tool observations or the conversation history. Never use your own knowledge.
4. If the retrieved results contain nothing relevant, state clearly that no relevant information was found in the corpus.
5. Never fabricate content, source names, URLs, or data.

[Source Citation Rules]
1. If the answer comes from the conversation history, cite "Source: conversation history".
2. If web_search was used, include the real URLs returned by the tool.
3. If doc_search was used, cite the source file names from the Observation.
4. Only URLs or file names that literally appear in an Observation may be cited.

[Rules]
1. Follow the Thought -> Action -> Observation format strictly.
2. Execute one Action at a time and decide the next step from its Observation.
3. Only output a Final Answer once an Observation or the history clearly contains the answer.
4. If a tool fails, try a different approach.

[Output Format]
Thought: [your reasoning]
Action: [tool name]
Action Input: {"param1": "value1", "param2": "value2"}

After the observation arrives, continue:
Observation: [tool result]

Thought: [further reasoning, analyzing whether the Observation contains the answer]
...

When the answer can be given:
Thought: [where the answer was found]
Final Answer: [the answer, with its source]

When nothing relevant was found:
Thought: the tool results contain nothing related to the question
Final Answer: Sorry, no relevant information could be found for this question.

[Current Task]
User question: {question}

Begin reasoning (the answer and its sources must come entirely from the conversation history or tool observations):"#;

/// The self-critique template. Placeholders: `{question}`, `{answer}`,
/// `{tools_used}`.
pub(crate) const REFLECTION_TEMPLATE: &str = r#"Review the quality of the following answer:

Question: {question}
Answer: {answer}
Tools used: {tools_used}

Evaluate strictly:
1. Is the answer based entirely on tool results? (Outside knowledge is not allowed.)
2. Are all cited sources real URLs or file names that appeared in a tool result?
3. Does the answer content actually appear in the tool observations?
4. Is there any sign of fabrication or guessing?

If the answer is fully grounded in tool results and the sources are real, output: APPROVED
If a source is fabricated or outside knowledge was used, output: RETRY: sources must be real URLs or file names returned by tools
If some other improvement is needed, output: RETRY: [what must change]"#;

/// The task-decomposition template. Placeholders: `{task}`, `{tools}`.
pub(crate) const PLANNING_TEMPLATE: &str = r#"Analyze the following task and produce an execution plan:

Task: {task}

Available tools: {tools}

Output a step-by-step plan in this format:
Step 1: [concrete action]
Step 2: [concrete action]
...

Notes:
- Each step should be a single executable action
- Mind dependencies between steps
- Prefer the most direct approach"#;

/// Substituted for `{chat_history}` when a run has no prior context.
pub const NO_HISTORY: &str = "(no prior conversation)";

/// The corrective instruction injected when a turn contains neither an
/// action nor a final answer.
pub const FORMAT_REMINDER: &str =
    "No valid action recognized. Respond in the required format: output an Action with an Action Input, or a Final Answer.";

/// Builds the per-turn prompts for one reasoning run.
///
/// The builder owns the rendered tool catalogue; everything else is
/// passed per call so identical inputs always produce identical
/// prompts.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    tools_description: String,
}

impl PromptBuilder {
    pub fn new(tools_description: impl Into<String>) -> Self {
        let mut tools_description = tools_description.into();
        if tools_description.is_empty() {
            tools_description = "(no tools registered)".into();
        }
        Self { tools_description }
    }

    /// The first prompt of a run.
    pub fn initial(&self, question: &str, chat_history: &str, current_datetime: &str) -> String {
        let history = if chat_history.is_empty() {
            NO_HISTORY
        } else {
            chat_history
        };
        REACT_TEMPLATE
            .replace("{current_datetime}", current_datetime)
            .replace("{chat_history}", history)
            .replace("{tools_description}", &self.tools_description)
            .replace("{question}", question)
    }

    /// Grow the transcript with the model's turn and a tool observation.
    pub fn with_observation(prompt: &str, llm_output: &str, observation: &str) -> String {
        format!("{prompt}\n\n{llm_output}\n\nObservation: {observation}\n\nContinue reasoning:")
    }

    /// Grow the transcript with the model's unrecognized turn plus the
    /// corrective format instruction.
    pub fn with_correction(prompt: &str, llm_output: &str) -> String {
        format!("{prompt}\n\n{llm_output}\n\n{FORMAT_REMINDER}")
    }

    /// Render the reflection critique prompt.
    pub fn reflection(question: &str, answer: &str, tools_used: &[String]) -> String {
        let tools = if tools_used.is_empty() {
            "none".to_string()
        } else {
            tools_used.join(", ")
        };
        REFLECTION_TEMPLATE
            .replace("{question}", question)
            .replace("{answer}", answer)
            .replace("{tools_used}", &tools)
    }

    /// Render the planning prompt.
    pub fn planning(task: &str, tool_names: &[&str]) -> String {
        PLANNING_TEMPLATE
            .replace("{task}", task)
            .replace("{tools}", &tool_names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_prompt_is_deterministic() {
        let builder = PromptBuilder::new("- doc_search: search the corpus");
        let a = builder.initial("What is Rust?", "", "2026-08-29 10:00:00 UTC");
        let b = builder.initial("What is Rust?", "", "2026-08-29 10:00:00 UTC");
        assert_eq!(a, b);
    }

    #[test]
    fn initial_prompt_contains_all_sections() {
        let builder = PromptBuilder::new("- doc_search: search the corpus");
        let prompt = builder.initial("What is Rust?", "User: hi", "2026-08-29 10:00:00 UTC");
        assert!(prompt.contains("2026-08-29 10:00:00 UTC"));
        assert!(prompt.contains("User: hi"));
        assert!(prompt.contains("- doc_search: search the corpus"));
        assert!(prompt.contains("User question: What is Rust?"));
        assert!(!prompt.contains("{question}"));
    }

    #[test]
    fn empty_history_uses_placeholder() {
        let builder = PromptBuilder::new("tools");
        let prompt = builder.initial("q", "", "now");
        assert!(prompt.contains(NO_HISTORY));
    }

    #[test]
    fn observation_grows_transcript() {
        let grown = PromptBuilder::with_observation("BASE", "Thought: x\nAction: y", "not found");
        assert!(grown.starts_with("BASE"));
        assert!(grown.contains("Observation: not found"));
        assert!(grown.ends_with("Continue reasoning:"));
    }

    #[test]
    fn correction_injects_reminder() {
        let grown = PromptBuilder::with_correction("BASE", "rambling");
        assert!(grown.contains(FORMAT_REMINDER));
    }

    #[test]
    fn reflection_prompt_handles_no_tools() {
        let prompt = PromptBuilder::reflection("q", "a", &[]);
        assert!(prompt.contains("Tools used: none"));
    }
}
