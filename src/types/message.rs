//! Message types for model communication.

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::convert::Value;

/// MIME type for JPEG images.
pub const MIME_JPEG: &str = "image/jpeg";
/// MIME type for PNG images.
pub const MIME_PNG: &str = "image/png";
/// MIME type for PDF documents.
pub const MIME_PDF: &str = "application/pdf";

/// One turn in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelMessage {
    pub role: Role,
    pub content: Vec<ContentPart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ModelMessage {
    fn new(role: Role, content: Vec<ContentPart>) -> Self {
        Self {
            role,
            content,
            timestamp: Some(Utc::now()),
        }
    }

    /// Create a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, vec![ContentPart::text(text)])
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![ContentPart::text(text)])
    }

    /// Create a model message containing only text.
    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, vec![ContentPart::text(text)])
    }

    /// Create a model message from arbitrary parts, e.g. function calls.
    pub fn model_parts(content: Vec<ContentPart>) -> Self {
        Self::new(Role::Model, content)
    }

    /// Create a user message carrying raw bytes (an image or a document)
    /// followed by a text prompt about them.
    pub fn user_with_bytes(text: impl Into<String>, bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self::new(
            Role::User,
            vec![
                ContentPart::InlineData(InlineData::from_bytes(bytes, mime_type)),
                ContentPart::text(text),
            ],
        )
    }

    /// Create a tool message carrying one function result.
    pub fn function_response(response: FunctionResponse) -> Self {
        Self::new(Role::Tool, vec![ContentPart::FunctionResponse(response)])
    }

    /// Concatenated text parts.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Function calls in this message, in order.
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::FunctionCall(call) => Some(call),
                _ => None,
            })
            .collect()
    }
}

/// Conversation role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Model,
    /// Function results sent back to the model.
    Tool,
}

/// A single part of message content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    InlineData(InlineData),
    FunctionCall(FunctionCall),
    FunctionResponse(FunctionResponse),
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Binary content embedded in a message, base64-encoded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

impl InlineData {
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }
}

/// A function invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
    /// Opaque signature some models attach to a call and expect back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_signature: Option<String>,
}

/// The result of a function call, as sent back to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionResponse {
    pub id: String,
    pub name: String,
    pub response: Value,
    #[serde(default)]
    pub is_error: bool,
}

impl FunctionResponse {
    /// A successful result, wrapped as `{"output": ...}`.
    pub fn output(call: &FunctionCall, output: Value) -> Self {
        Self {
            id: call.id.clone(),
            name: call.name.clone(),
            response: Value::Map([("output".to_string(), output)].into_iter().collect()),
            is_error: false,
        }
    }

    /// A failure reported to the model, wrapped as `{"error": "..."}`.
    pub fn error(call: &FunctionCall, message: impl Into<String>) -> Self {
        Self {
            id: call.id.clone(),
            name: call.name.clone(),
            response: Value::Map(
                [("error".to_string(), Value::String(message.into()))]
                    .into_iter()
                    .collect(),
            ),
            is_error: true,
        }
    }
}
