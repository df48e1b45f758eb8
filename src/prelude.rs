//! Convenience re-exports for common use.

pub use crate::config::GenbindConfig;
pub use crate::convert::{decode, encode, Record, Value, WireField};
pub use crate::error::{BoxError, ConvertError, GenbindError, Result};
pub use crate::generation::{Client, LoopOptions, ToolErrorPolicy};
pub use crate::models::GoogleModel;
pub use crate::provider::ModelProvider;
pub use crate::tools::{ToolDescriptor, ToolExecutionContext, ToolRegistry};
pub use crate::types::{
    ContentPart, FinishReason, GenerateObjectResult, GenerateTextResult, GenerationSettings,
    ModelMessage, Role, Usage, MIME_JPEG, MIME_PDF, MIME_PNG,
};
