//! Conversation loop, structured output, and the model-bound client.

pub mod client;
pub mod conversation;
pub mod object;
pub mod options;
pub mod text;

pub use client::Client;
pub use conversation::Conversation;
pub use object::generate_object;
pub use options::{LoopOptions, ToolErrorPolicy};
pub use text::generate_text;
