//! Storage abstraction layer.
//!
//! This module provides trait-based storage abstractions so the process-local
//! maps can later be swapped for a durable backend.

mod memory;
mod traits;

pub use memory::InMemoryConversationStore;
pub use traits::ConversationStore;
