//! In-memory conversation store - useful for testing and ephemeral
//! sessions. Appends per conversation id are serialized by the write
//! lock.

use crate::{ConversationStore, render_history};
use async_trait::async_trait;
use loresmith_core::error::ConversationError;
use loresmith_core::message::{ConversationId, ConversationMessage, Role};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Stores conversations in a HashMap. No persistence across restarts.
pub struct InMemoryStore {
    conversations: Arc<RwLock<HashMap<ConversationId, Vec<ConversationMessage>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            conversations: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of conversations held.
    pub async fn count(&self) -> usize {
        self.conversations.read().await.len()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn create(&self) -> Result<ConversationId, ConversationError> {
        let id = ConversationId::new();
        self.conversations
            .write()
            .await
            .insert(id.clone(), Vec::new());
        Ok(id)
    }

    async fn get_history(
        &self,
        id: &ConversationId,
        max_messages: Option<usize>,
    ) -> Result<Vec<ConversationMessage>, ConversationError> {
        let conversations = self.conversations.read().await;
        let messages = conversations
            .get(id)
            .ok_or_else(|| ConversationError::NotFound(id.to_string()))?;

        let messages = match max_messages {
            Some(max) => messages[messages.len().saturating_sub(max)..].to_vec(),
            None => messages.clone(),
        };
        Ok(messages)
    }

    async fn add_message(
        &self,
        id: &ConversationId,
        role: Role,
        content: &str,
    ) -> Result<(), ConversationError> {
        let mut conversations = self.conversations.write().await;
        conversations
            .entry(id.clone())
            .or_default()
            .push(ConversationMessage::new(role, content));
        Ok(())
    }

    async fn format_for_prompt(
        &self,
        id: &ConversationId,
        max_turns: usize,
    ) -> Result<String, ConversationError> {
        let conversations = self.conversations.read().await;
        let Some(messages) = conversations.get(id) else {
            return Ok(String::new());
        };
        Ok(render_history(messages, max_turns))
    }

    async fn clear(&self, id: &ConversationId) -> Result<(), ConversationError> {
        if let Some(messages) = self.conversations.write().await.get_mut(id) {
            messages.clear();
        }
        Ok(())
    }
}
