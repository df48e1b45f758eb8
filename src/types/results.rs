//! Generation result types.

use super::generation::FinishReason;
use super::message::{FunctionCall, FunctionResponse, ModelMessage};
use super::usage::Usage;

/// Result of a text generation call.
#[derive(Debug, Clone)]
pub struct GenerateTextResult {
    /// Final generated text.
    pub text: String,
    /// One entry per round.
    pub steps: Vec<GenerationStep>,
    /// Full conversation, including function calls, their results and the
    /// final model turn. Suitable for seeding a follow-up call.
    pub messages: Vec<ModelMessage>,
    /// Aggregated usage across all rounds.
    pub usage: Usage,
    /// Why the final round finished.
    pub finish_reason: Option<FinishReason>,
}

/// A single round: one transport call plus the calls it triggered.
#[derive(Debug, Clone)]
pub struct GenerationStep {
    /// Round number, starting at 1.
    pub round: usize,
    pub text: String,
    pub function_calls: Vec<FunctionCall>,
    pub function_responses: Vec<FunctionResponse>,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

/// Result of a structured generation call.
#[derive(Debug, Clone)]
pub struct GenerateObjectResult<T> {
    /// Decoded record.
    pub object: T,
    /// Raw text the record was decoded from.
    pub raw_text: String,
    pub steps: Vec<GenerationStep>,
    pub messages: Vec<ModelMessage>,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}
