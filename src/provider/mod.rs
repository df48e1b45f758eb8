//! Model transport trait and the Gemini implementation.

pub mod http;

#[cfg(feature = "google")]
pub mod google;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::GenbindConfig;
use crate::error::{GenbindError, Result};
use crate::models::GoogleModel;
use crate::types::{
    ContentPart, FinishReason, FunctionCall, GenerationSettings, ModelMessage, ResponseFormat, Usage,
};

/// A request sent to a model transport.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
    /// Functions the model may call, in registration order.
    pub tools: Vec<ToolDefinition>,
    pub response_format: Option<ResponseFormat>,
}

/// Function declaration sent to the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema of the arguments.
    pub parameters: serde_json::Value,
    /// JSON Schema of the result, when the transport accepts one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
}

/// Response from a transport.
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    pub text: String,
    pub function_calls: Vec<FunctionCall>,
    /// Every part of the model turn as received, including parts the loop
    /// does not interpret. Empty when the transport only fills `text` and
    /// `function_calls`.
    pub content: Vec<ContentPart>,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

impl ProviderResponse {
    /// A final answer with no function calls.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: Some(FinishReason::Stop),
            ..Default::default()
        }
    }

    /// A turn requesting function calls.
    pub fn from_calls(function_calls: Vec<FunctionCall>) -> Self {
        Self {
            function_calls,
            finish_reason: Some(FinishReason::ToolCalls),
            ..Default::default()
        }
    }

    /// The model turn to append to the conversation.
    pub fn message(&self) -> ModelMessage {
        if !self.content.is_empty() {
            return ModelMessage::model_parts(self.content.clone());
        }
        let mut parts = Vec::with_capacity(self.function_calls.len() + 1);
        if !self.text.is_empty() {
            parts.push(ContentPart::text(self.text.clone()));
        }
        parts.extend(self.function_calls.iter().cloned().map(ContentPart::FunctionCall));
        ModelMessage::model_parts(parts)
    }
}

/// A model transport. Implementations own their retry behavior; the
/// conversation loop never retries.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "google").
    fn provider_name(&self) -> &str;
    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Run one request/response exchange.
    async fn generate_text(&self, request: &ProviderRequest) -> Result<ProviderResponse>;
}

/// Create a transport for the given model, using the provided config.
#[allow(unused_variables)]
pub fn create_provider(model: &GoogleModel, config: &GenbindConfig) -> Result<Box<dyn ModelProvider>> {
    #[cfg(feature = "google")]
    {
        let api_key = config
            .api_key()
            .ok_or_else(|| GenbindError::Authentication("Missing GEMINI_API_KEY".into()))?;
        let mut provider = google::GoogleProvider::new(model.clone(), api_key);
        if let Some(base_url) = config.base_url() {
            provider = provider.with_base_url(base_url);
        }
        Ok(Box::new(provider))
    }
    #[cfg(not(feature = "google"))]
    Err(GenbindError::Configuration(format!(
        "no transport enabled for model '{model}'"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Value;

    #[test]
    fn message_falls_back_to_text_and_calls() {
        let call = FunctionCall {
            id: "1".into(),
            name: "echo".into(),
            arguments: Value::map(),
            thought_signature: None,
        };
        let response = ProviderResponse {
            text: "thinking".into(),
            ..ProviderResponse::from_calls(vec![call.clone()])
        };

        let message = response.message();

        assert_eq!(message.text(), "thinking");
        assert_eq!(message.function_calls(), vec![&call]);
    }

    #[test]
    fn message_prefers_raw_content() {
        let response = ProviderResponse {
            text: "ignored".into(),
            content: vec![ContentPart::text("raw")],
            ..Default::default()
        };

        assert_eq!(response.message().text(), "raw");
    }
}
