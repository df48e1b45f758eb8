//! A model-bound client over the conversation loop.

use std::sync::Arc;

use super::object::generate_object;
use super::options::LoopOptions;
use super::text::generate_text;
use crate::config::GenbindConfig;
use crate::convert::Record;
use crate::error::Result;
use crate::models::GoogleModel;
use crate::provider::{create_provider, ModelProvider};
use crate::tools::ToolRegistry;
use crate::types::{GenerateObjectResult, GenerateTextResult, ModelMessage};

/// Client bound to one model transport and one set of loop options.
///
/// Cheap to clone; concurrent calls share the transport but nothing else.
#[derive(Clone)]
pub struct Client {
    provider: Arc<dyn ModelProvider>,
    options: LoopOptions,
}

impl Client {
    /// Client for a Gemini model, with credentials and limits from the
    /// global config.
    pub fn new(model: GoogleModel) -> Result<Self> {
        Self::from_config(model, GenbindConfig::global())
    }

    /// Client for the model named by the global config.
    pub fn from_env() -> Result<Self> {
        let config = GenbindConfig::global();
        Self::from_config(config.model(), config)
    }

    pub fn from_config(model: GoogleModel, config: &GenbindConfig) -> Result<Self> {
        let provider: Arc<dyn ModelProvider> = create_provider(&model, config)?.into();
        Ok(Self {
            provider,
            options: LoopOptions::from_config(config),
        })
    }

    /// Client over any transport.
    pub fn with_provider(provider: impl ModelProvider + 'static) -> Self {
        Self {
            provider: Arc::new(provider),
            options: LoopOptions::default(),
        }
    }

    pub fn with_options(mut self, options: LoopOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &LoopOptions {
        &self.options
    }

    pub fn model_id(&self) -> &str {
        self.provider.model_id()
    }

    /// Free-text answer, with `registry`'s tools available to the model.
    pub async fn generate_text(
        &self,
        messages: Vec<ModelMessage>,
        registry: &ToolRegistry,
    ) -> Result<GenerateTextResult> {
        generate_text(self.provider.as_ref(), messages, registry, &self.options).await
    }

    /// Structured answer decoded into `T`.
    pub async fn generate<T: Record>(
        &self,
        messages: Vec<ModelMessage>,
        registry: &ToolRegistry,
    ) -> Result<T> {
        Ok(self.generate_object(messages, registry).await?.object)
    }

    /// Like [`generate`](Self::generate), keeping the conversation, usage
    /// and raw text alongside the record.
    pub async fn generate_object<T: Record>(
        &self,
        messages: Vec<ModelMessage>,
        registry: &ToolRegistry,
    ) -> Result<GenerateObjectResult<T>> {
        generate_object(self.provider.as_ref(), messages, registry, &self.options).await
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("provider", &self.provider.provider_name())
            .field("model", &self.provider.model_id())
            .field("options", &self.options)
            .finish()
    }
}
