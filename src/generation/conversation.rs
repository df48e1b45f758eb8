//! Append-only conversation state for one loop invocation.

use crate::types::ModelMessage;

/// Ordered turns of one conversation. Turns can only be appended.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ModelMessage>,
}

impl Conversation {
    /// Start from the caller's opening turns.
    pub fn new(opening: Vec<ModelMessage>) -> Self {
        Self { messages: opening }
    }

    pub fn push(&mut self, message: ModelMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ModelMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<ModelMessage> {
        self.messages
    }
}
