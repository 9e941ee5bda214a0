//! Conversation history for Loresmith.
//!
//! The reasoning engine treats a conversation as an ordered message
//! log: it reads recent history when composing the first prompt of a
//! run and appends the user question and final answer afterwards.
//! Persistence format and layout belong to the store implementation,
//! not to the engine.

pub mod in_memory;

pub use in_memory::InMemoryStore;

use async_trait::async_trait;
use loresmith_core::error::ConversationError;
use loresmith_core::message::{ConversationId, ConversationMessage, Role};

/// The conversation collaborator contract.
///
/// Appends to a given conversation id are serialized by the store -
/// the engine itself takes no locks.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Create a new empty conversation and return its id.
    async fn create(&self) -> Result<ConversationId, ConversationError>;

    /// Ordered message history, oldest first. `max_messages` keeps the
    /// most recent messages when set.
    async fn get_history(
        &self,
        id: &ConversationId,
        max_messages: Option<usize>,
    ) -> Result<Vec<ConversationMessage>, ConversationError>;

    /// Append one message to a conversation.
    async fn add_message(
        &self,
        id: &ConversationId,
        role: Role,
        content: &str,
    ) -> Result<(), ConversationError>;

    /// Render the most recent `max_turns` user/assistant exchanges as a
    /// prompt block. Returns an empty string for unknown or empty
    /// conversations - the prompt builder substitutes its "no history"
    /// token.
    async fn format_for_prompt(
        &self,
        id: &ConversationId,
        max_turns: usize,
    ) -> Result<String, ConversationError>;

    /// Remove all messages from a conversation.
    async fn clear(&self, id: &ConversationId) -> Result<(), ConversationError>;
}

/// Render messages as alternating `User:` / `Assistant:` lines,
/// keeping the last `max_turns` exchanges.
///
/// Shared by store implementations so the prompt shape does not drift
/// between backends.
pub fn render_history(messages: &[ConversationMessage], max_turns: usize) -> String {
    // One turn = up to one user + one assistant message.
    let keep = max_turns.saturating_mul(2);
    let start = messages.len().saturating_sub(keep);

    messages[start..]
        .iter()
        .map(|m| match m.role {
            Role::User => format!("User: {}", m.content),
            Role::Assistant => format!("Assistant: {}", m.content),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
