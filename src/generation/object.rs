//! Structured output: decode the model's final answer into a record.

use tracing::debug;

use super::options::LoopOptions;
use crate::convert::{self, Record};
use crate::error::Result;
use crate::provider::ModelProvider;
use crate::tools::{schema_of, ToolRegistry};
use crate::types::*;

/// Run the conversation loop with a JSON response schema for `T`, then
/// decode the final answer into `T`.
///
/// Keys the model leaves out keep their default values; anything present
/// must match the record's declared shape.
pub async fn generate_object<T: Record>(
    provider: &dyn ModelProvider,
    messages: Vec<ModelMessage>,
    registry: &ToolRegistry,
    options: &LoopOptions,
) -> Result<GenerateObjectResult<T>> {
    let descriptor = T::descriptor();
    descriptor.validate()?;
    let format = ResponseFormat::JsonSchema {
        schema: schema_of::<T>()?,
        name: descriptor.type_name().to_string(),
    };

    let result = super::text::run(provider, messages, registry, options, Some(format)).await?;

    let raw_text = result.text.trim().to_string();
    let json: serde_json::Value = serde_json::from_str(&strip_code_fences(&raw_text))?;
    debug!(record = descriptor.type_name(), "decoding structured answer");
    let object = convert::decode_json::<T>(json)?;

    Ok(GenerateObjectResult {
        object,
        raw_text,
        steps: result.steps,
        messages: result.messages,
        usage: result.usage,
        finish_reason: result.finish_reason,
    })
}

/// Strip markdown code fences from a JSON response.
fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let Some(fenced) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let body = fenced.strip_prefix("json").unwrap_or(fenced);
    body.strip_suffix("```").unwrap_or(body).trim().to_string()
}
