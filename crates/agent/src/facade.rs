//! The `Agent` facade - the front door callers use.
//!
//! Wires the reasoning engine to a conversation store and offers three
//! entry points: [`Agent::ask`] (blocking), [`Agent::ask_stream`]
//! (event stream), and [`Agent::smart_ask`] (dispatch shortcut that
//! serves simple retrieval questions with one direct `doc_search`
//! call, skipping the reasoning loop).
//!
//! Canned tasks ([`Agent::analyze_corpus`], [`Agent::research_topic`],
//! [`Agent::reorganize_directory`]) wrap `ask` with prewritten
//! multi-step prompts.
//!
//! [`AgentBuilder`] assembles agents, with presets bundling common
//! tool sets.

use crate::config::AgentConfig;
use crate::engine::ReactEngine;
use crate::response::AgentResponse;
use crate::stream_event::StreamEvent;
use loresmith_conversation::{ConversationStore, InMemoryStore};
use loresmith_core::backend::LlmBackend;
use loresmith_core::error::{Error, Result};
use loresmith_core::message::{ConversationId, ConversationMessage, Role};
use loresmith_core::tool::{ToolArgs, ToolRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Questions carrying these need multi-step reasoning, so the smart
/// dispatch shortcut steps aside for the full loop.
const COMPLEX_INDICATORS: &[&str] = &[
    "analyze",
    "compare",
    "summarize",
    "generate",
    "create",
    "write",
    "modify",
    "help me",
    "organize",
];

/// Questions referring back to the conversation need the loop and its
/// history-aware prompt.
const HISTORY_INDICATORS: &[&str] = &[
    "just asked",
    "just said",
    "earlier",
    "previous",
    "previously",
    "before",
    "last question",
    "we discussed",
];

/// True when a question is a simple, single-shot retrieval candidate:
/// no complex-task verbs and no reference to earlier conversation.
pub(crate) fn is_simple_retrieval(question: &str) -> bool {
    let q = question.to_lowercase();
    !COMPLEX_INDICATORS.iter().any(|ind| q.contains(ind))
        && !HISTORY_INDICATORS.iter().any(|ind| q.contains(ind))
}

/// A configured agent: engine + backend + conversation store.
///
/// Cheap to share: all members are behind `Arc`s, and nothing here is
/// mutated between runs.
pub struct Agent {
    engine: Arc<ReactEngine>,
    store: Arc<dyn ConversationStore>,
    config: AgentConfig,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Agent {
    pub fn new(
        backend: Arc<dyn LlmBackend>,
        tools: ToolRegistry,
        store: Arc<dyn ConversationStore>,
        config: AgentConfig,
    ) -> Self {
        let engine = Arc::new(ReactEngine::new(backend, Arc::new(tools), config.clone()));
        Self {
            engine,
            store,
            config,
        }
    }

    pub fn builder() -> AgentBuilder {
        AgentBuilder::default()
    }

    pub fn engine(&self) -> &ReactEngine {
        &self.engine
    }

    /// Start a new conversation session.
    pub async fn new_conversation(&self) -> Result<ConversationId> {
        Ok(self.store.create().await?)
    }

    /// Full message history of a session.
    pub async fn history(&self, id: &ConversationId) -> Result<Vec<ConversationMessage>> {
        Ok(self.store.get_history(id, None).await?)
    }

    /// Drop all messages from a session.
    pub async fn clear_conversation(&self, id: &ConversationId) -> Result<()> {
        Ok(self.store.clear(id).await?)
    }

    /// Ask a question through the full reasoning loop.
    ///
    /// With a conversation id, recent history is fed into the prompt
    /// and the exchange is persisted afterwards; the answer is only
    /// recorded when the run succeeded.
    pub async fn ask(
        &self,
        question: &str,
        conversation: Option<&ConversationId>,
    ) -> Result<AgentResponse> {
        let history = self.rendered_history(conversation).await?;
        let response = self.engine.run(question, &history).await;
        self.persist(conversation, question, &response.answer, response.success)
            .await?;
        Ok(response)
    }

    /// Smart dispatch: simple retrieval questions are answered with one
    /// direct `doc_search` call, skipping the reasoning loop. Complex
    /// or history-referencing questions, agents without a `doc_search`
    /// tool, and failed direct dispatches all fall back to
    /// [`Agent::ask`].
    pub async fn smart_ask(
        &self,
        question: &str,
        conversation: Option<&ConversationId>,
    ) -> Result<AgentResponse> {
        if !is_simple_retrieval(question) || self.engine.tools().get("doc_search").is_none() {
            return self.ask(question, conversation).await;
        }

        debug!("simple retrieval question, dispatching doc_search directly");
        let mut args = ToolArgs::new();
        args.insert("query".into(), serde_json::json!(question));
        args.insert("top_k".into(), serde_json::json!(5));

        let outcome = self.engine.tools().dispatch("doc_search", args).await;
        if !outcome.success {
            // The full loop can still reason its way to an answer.
            return self.ask(question, conversation).await;
        }

        self.persist(conversation, question, &outcome.observation, true)
            .await?;
        Ok(AgentResponse {
            success: true,
            answer: outcome.observation,
            thought_history: Vec::new(),
            tools_used: vec!["doc_search".to_string()],
            iterations: 1,
            final_reflection: None,
            plan: Vec::new(),
        })
    }

    /// Survey the document corpus: what is in it, how it is organized,
    /// and what stands out. A canned multi-step task for the full loop.
    pub async fn analyze_corpus(&self) -> Result<AgentResponse> {
        self.ask(
            "Analyze the document collection: list the documents that are \
             available, group them by topic, and describe the overall \
             structure and any notable gaps.",
            None,
        )
        .await
    }

    /// Research a topic across the corpus and the web tools, returning
    /// a synthesized summary.
    pub async fn research_topic(&self, topic: &str) -> Result<AgentResponse> {
        self.ask(
            &format!(
                "Research the topic '{topic}': search the document \
                 collection for relevant material, supplement with a web \
                 search if needed, and summarize the findings with sources."
            ),
            None,
        )
        .await
    }

    /// Propose and carry out a tidier layout for a directory of
    /// documents. Needs the filesystem tools to be registered.
    pub async fn reorganize_directory(&self, path: &str) -> Result<AgentResponse> {
        self.ask(
            &format!(
                "Inspect the directory '{path}', propose a clearer \
                 organization for its files by topic, and carry out the \
                 reorganization using the file tools."
            ),
            None,
        )
        .await
    }

    /// Streaming ask. Relays engine events; on `done`, the accumulated
    /// answer is persisted to the session before the event is forwarded.
    pub async fn ask_stream(
        &self,
        question: &str,
        conversation: Option<&ConversationId>,
    ) -> Result<mpsc::Receiver<StreamEvent>> {
        let history = self.rendered_history(conversation).await?;

        let engine = self.engine.clone();
        let store = self.store.clone();
        let conversation = conversation.cloned();
        let question = question.to_string();

        let (tx, rx) = mpsc::channel(128);
        tokio::spawn(async move {
            let mut inner = engine.run_stream(question.clone(), history);
            let mut answer = String::new();

            while let Some(event) = inner.recv().await {
                if let StreamEvent::AnswerToken { token, .. } = &event {
                    answer.push_str(token);
                }

                if let (StreamEvent::Done { .. }, Some(id)) = (&event, &conversation) {
                    let answer = answer.trim();
                    if !answer.is_empty() {
                        let _ = store.add_message(id, Role::User, &question).await;
                        let _ = store.add_message(id, Role::Assistant, answer).await;
                    }
                }

                if tx.send(event).await.is_err() {
                    return;
                }
            }
        });
        Ok(rx)
    }

    async fn rendered_history(&self, conversation: Option<&ConversationId>) -> Result<String> {
        match conversation {
            Some(id) => Ok(self
                .store
                .format_for_prompt(id, self.config.history_turns)
                .await?),
            None => Ok(String::new()),
        }
    }

    async fn persist(
        &self,
        conversation: Option<&ConversationId>,
        question: &str,
        answer: &str,
        success: bool,
    ) -> Result<()> {
        if let Some(id) = conversation {
            self.store.add_message(id, Role::User, question).await?;
            if success {
                self.store.add_message(id, Role::Assistant, answer).await?;
            }
        }
        Ok(())
    }
}

/// Assembles an [`Agent`]. A backend is required; tools default to an
/// empty registry and the store defaults to in-memory.
#[derive(Default)]
pub struct AgentBuilder {
    backend: Option<Arc<dyn LlmBackend>>,
    tools: Option<ToolRegistry>,
    store: Option<Arc<dyn ConversationStore>>,
    config: AgentConfig,
}

impl AgentBuilder {
    /// Minimal agent: no tools, no reflection, short iteration budget.
    pub fn simple() -> Self {
        Self {
            config: AgentConfig::default()
                .with_reflection(false)
                .with_max_iterations(5),
            ..Self::default()
        }
    }

    /// Everything on: the full default tool set, reflection, planning.
    pub fn full() -> Self {
        Self {
            tools: Some(loresmith_tools::default_registry()),
            config: AgentConfig::default().with_planning(true),
            ..Self::default()
        }
    }

    /// Research preset: retrieval and summarization tools, a longer
    /// budget, a low temperature.
    pub fn research() -> Self {
        let index = Arc::new(loresmith_tools::index::InMemoryIndex::new());
        let mut tools = ToolRegistry::new();
        tools.register(Box::new(loresmith_tools::DocSearchTool::new(index.clone())));
        tools.register(Box::new(loresmith_tools::DocumentListTool::new(index)));
        tools.register(Box::new(loresmith_tools::WebSearchTool::new()));
        tools.register(Box::new(loresmith_tools::SummarizeTool::new()));
        Self {
            tools: Some(tools),
            config: AgentConfig::default()
                .with_max_iterations(15)
                .with_temperature(0.3)
                .with_planning(true),
            ..Self::default()
        }
    }

    /// File-management preset: filesystem tools rooted at the current
    /// directory, planning enabled.
    pub fn manager() -> Self {
        let roots = vec![PathBuf::from(".")];
        let mut tools = ToolRegistry::new();
        tools.register(Box::new(loresmith_tools::FileReadTool::with_roots(
            roots.clone(),
        )));
        tools.register(Box::new(loresmith_tools::FileWriteTool::with_roots(
            roots.clone(),
        )));
        tools.register(Box::new(loresmith_tools::ListDirectoryTool::with_roots(
            roots,
        )));
        Self {
            tools: Some(tools),
            config: AgentConfig::default()
                .with_reflection(false)
                .with_planning(true)
                .with_max_iterations(12),
            ..Self::default()
        }
    }

    pub fn backend(mut self, backend: Arc<dyn LlmBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn register_tool(mut self, tool: Box<dyn loresmith_core::tool::Tool>) -> Self {
        self.tools.get_or_insert_with(ToolRegistry::new).register(tool);
        self
    }

    pub fn store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let backend = self.backend.ok_or_else(|| Error::Config {
            message: "agent requires an LLM backend".into(),
        })?;
        let tools = self.tools.unwrap_or_default();
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryStore::new()));

        info!(
            backend = backend.name(),
            tools = tools.len(),
            "agent assembled"
        );
        Ok(Agent::new(backend, tools, store, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::SequentialMockBackend;

    fn agent_with(script: Vec<&str>) -> Agent {
        AgentBuilder::simple()
            .backend(Arc::new(SequentialMockBackend::new(script)))
            .build()
            .unwrap()
    }

    #[test]
    fn simple_retrieval_detection() {
        assert!(is_simple_retrieval("What is the capital of France?"));
        assert!(is_simple_retrieval("highway construction rules"));
        assert!(!is_simple_retrieval("Compare the 2018 and 2019 audit reports"));
        assert!(!is_simple_retrieval("help me organize my notes"));
        assert!(!is_simple_retrieval("what did I just ask?"));
        assert!(!is_simple_retrieval("Summarize the onboarding guide"));
    }

    #[test]
    fn build_without_backend_fails() {
        let err = AgentBuilder::default().build().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[tokio::test]
    async fn ask_without_session_runs_the_loop() {
        let agent = agent_with(vec!["Final Answer: 42"]);
        let response = agent.ask("meaning of life?", None).await.unwrap();
        assert!(response.success);
        assert_eq!(response.answer, "42");
    }

    #[tokio::test]
    async fn ask_with_session_persists_the_exchange() {
        let agent = agent_with(vec!["Final Answer: blue"]);
        let id = agent.new_conversation().await.unwrap();

        agent.ask("sky color?", Some(&id)).await.unwrap();

        let history = agent.history(&id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "sky color?");
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].content, "blue");
    }

    #[tokio::test]
    async fn failed_run_does_not_persist_an_answer() {
        // The single scripted turn never concludes, so a 5-iteration
        // budget runs out.
        let agent = agent_with(vec!["Thought: stuck, no action"]);
        let id = agent.new_conversation().await.unwrap();

        let response = agent.ask("q", Some(&id)).await.unwrap();
        assert!(!response.success);

        let history = agent.history(&id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, Role::User);
    }

    #[tokio::test]
    async fn session_history_feeds_the_next_prompt() {
        let backend = Arc::new(SequentialMockBackend::new(vec![
            "Final Answer: blue",
            "Final Answer: you asked about the sky",
        ]));
        let agent = AgentBuilder::simple()
            .backend(backend.clone())
            .build()
            .unwrap();
        let id = agent.new_conversation().await.unwrap();

        agent.ask("sky color?", Some(&id)).await.unwrap();
        agent.ask("what did I just ask?", Some(&id)).await.unwrap();

        let prompts = backend.prompts.lock().unwrap();
        assert!(prompts[1].contains("User: sky color?"));
        assert!(prompts[1].contains("Assistant: blue"));
    }

    fn retrieval_agent(backend: Arc<SequentialMockBackend>) -> Agent {
        let index = Arc::new(loresmith_tools::index::InMemoryIndex::with_documents(vec![
            loresmith_tools::index::Document::new("geography.md", "Paris is the capital of France."),
        ]));
        let mut tools = ToolRegistry::new();
        tools.register(Box::new(loresmith_tools::DocSearchTool::new(index)));
        AgentBuilder::simple()
            .backend(backend)
            .tools(tools)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn smart_ask_serves_simple_questions_without_the_llm() {
        let backend = Arc::new(SequentialMockBackend::new(vec!["Final Answer: unused"]));
        let agent = retrieval_agent(backend.clone());

        let response = agent.smart_ask("capital of France", None).await.unwrap();
        assert!(response.success);
        assert!(response.answer.contains("Paris"));
        assert_eq!(response.tools_used, vec!["doc_search"]);
        assert_eq!(response.iterations, 1);
        assert!(response.thought_history.is_empty());
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn smart_ask_routes_complex_questions_through_the_loop() {
        let backend = Arc::new(SequentialMockBackend::new(vec![
            "Final Answer: they differ in scope",
        ]));
        let agent = retrieval_agent(backend.clone());

        let response = agent
            .smart_ask("Compare the 2018 and 2019 audit reports", None)
            .await
            .unwrap();
        assert!(response.success);
        assert_eq!(response.answer, "they differ in scope");
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn smart_ask_without_a_search_tool_uses_the_loop() {
        let agent = agent_with(vec!["Final Answer: Paris"]);
        let response = agent
            .smart_ask("What is the capital of France?", None)
            .await
            .unwrap();
        assert!(response.success);
        assert_eq!(response.answer, "Paris");
        assert_eq!(response.iterations, 1);
        assert_eq!(response.thought_history.len(), 1);
    }

    #[tokio::test]
    async fn smart_ask_persists_the_direct_answer() {
        let backend = Arc::new(SequentialMockBackend::new(vec!["Final Answer: unused"]));
        let agent = retrieval_agent(backend);
        let id = agent.new_conversation().await.unwrap();

        agent.smart_ask("capital of France", Some(&id)).await.unwrap();

        let history = agent.history(&id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "capital of France");
        assert!(history[1].content.contains("Paris"));
    }

    #[tokio::test]
    async fn research_topic_embeds_the_topic_in_the_task() {
        let backend = Arc::new(SequentialMockBackend::new(vec![
            "Final Answer: rust ownership explained",
        ]));
        let agent = AgentBuilder::simple()
            .backend(backend.clone())
            .build()
            .unwrap();

        let response = agent.research_topic("rust ownership").await.unwrap();
        assert!(response.success);

        let prompts = backend.prompts.lock().unwrap();
        assert!(prompts[0].contains("Research the topic 'rust ownership'"));
    }

    #[tokio::test]
    async fn reorganize_directory_embeds_the_path_in_the_task() {
        let backend = Arc::new(SequentialMockBackend::new(vec![
            "Final Answer: moved notes into topics/",
        ]));
        let agent = AgentBuilder::simple()
            .backend(backend.clone())
            .build()
            .unwrap();

        let response = agent.reorganize_directory("./notes").await.unwrap();
        assert!(response.success);

        let prompts = backend.prompts.lock().unwrap();
        assert!(prompts[0].contains("Inspect the directory './notes'"));
    }

    #[tokio::test]
    async fn analyze_corpus_runs_the_loop() {
        let backend = Arc::new(SequentialMockBackend::new(vec![
            "Final Answer: three documents, two topics",
        ]));
        let agent = AgentBuilder::simple()
            .backend(backend.clone())
            .build()
            .unwrap();

        let response = agent.analyze_corpus().await.unwrap();
        assert!(response.success);
        assert_eq!(response.answer, "three documents, two topics");

        let prompts = backend.prompts.lock().unwrap();
        assert!(prompts[0].contains("Analyze the document collection"));
    }

    #[tokio::test]
    async fn ask_stream_persists_on_done() {
        let agent = agent_with(vec!["Final Answer: streamed answer"]);
        let id = agent.new_conversation().await.unwrap();

        let mut rx = agent.ask_stream("q", Some(&id)).await.unwrap();
        let mut saw_done = false;
        while let Some(event) = rx.recv().await {
            if matches!(event, StreamEvent::Done { .. }) {
                saw_done = true;
            }
        }
        assert!(saw_done);

        let history = agent.history(&id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].content, "streamed answer");
    }

    #[tokio::test]
    async fn clear_conversation_empties_history() {
        let agent = agent_with(vec!["Final Answer: a"]);
        let id = agent.new_conversation().await.unwrap();
        agent.ask("q", Some(&id)).await.unwrap();

        agent.clear_conversation(&id).await.unwrap();
        assert!(agent.history(&id).await.unwrap().is_empty());
    }
}
