//! Process-local conversation storage.

use crate::conversation::{Conversation, ConversationSummary, Message};
use crate::storage::traits::ConversationStore;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory conversation store. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryConversationStore {
    conversations: RwLock<HashMap<String, Conversation>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored conversations.
    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.read().await.is_empty()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn get_or_create(&self, id: &str) -> Result<Conversation> {
        let mut conversations = self.conversations.write().await;
        let conversation = conversations
            .entry(id.to_string())
            .or_insert_with(|| {
                tracing::debug!("Creating conversation {}", id);
                Conversation::new(id)
            });
        Ok(conversation.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<Conversation>> {
        Ok(self.conversations.read().await.get(id).cloned())
    }

    async fn append(&self, id: &str, message: Message) -> Result<Conversation> {
        let mut conversations = self.conversations.write().await;
        let conversation = conversations
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("conversation {}", id)))?;
        conversation.push(message);
        Ok(conversation.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.conversations.write().await.remove(id).is_some())
    }

    async fn list(&self) -> Result<Vec<ConversationSummary>> {
        let conversations = self.conversations.read().await;
        let mut summaries: Vec<ConversationSummary> =
            conversations.values().map(Conversation::summary).collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        Ok(summaries)
    }
}
