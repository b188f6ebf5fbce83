//! Storage trait definitions.

use crate::conversation::{Conversation, ConversationSummary, Message};
use crate::Result;
use async_trait::async_trait;

/// Conversation storage keyed by conversation id.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Fetch a conversation, creating an empty one if the id is unknown.
    async fn get_or_create(&self, id: &str) -> Result<Conversation>;

    /// Fetch a conversation by id.
    async fn get(&self, id: &str) -> Result<Option<Conversation>>;

    /// Append a message, returning the updated conversation.
    ///
    /// Fails with `NotFound` if the conversation does not exist.
    async fn append(&self, id: &str, message: Message) -> Result<Conversation>;

    /// Remove a conversation. Returns whether it existed.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Summaries of every stored conversation, most recently updated first.
    async fn list(&self) -> Result<Vec<ConversationSummary>>;
}
