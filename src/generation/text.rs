//! The conversation loop: transport calls interleaved with tool dispatch.

use tracing::{debug, warn};

use super::conversation::Conversation;
use super::options::{LoopOptions, ToolErrorPolicy};
use crate::error::{GenbindError, Result, ToolStage};
use crate::provider::{ModelProvider, ProviderRequest};
use crate::tools::{ToolExecutionContext, ToolRegistry};
use crate::types::*;
use crate::util::timeout::guarded;

/// Generate text, dispatching any function calls the model makes.
///
/// Each round sends the whole conversation to the transport. If the reply
/// requests function calls, they run in order and their results are
/// appended before the next round; a reply without calls ends the loop and
/// its text is returned unchanged.
///
/// A call naming a tool missing from `registry` ends the loop with
/// [`GenbindError::UnknownTool`]. Transport failures are never retried here;
/// they surface as [`GenbindError::Transport`] tagged with the round.
pub async fn generate_text(
    provider: &dyn ModelProvider,
    messages: Vec<ModelMessage>,
    registry: &ToolRegistry,
    options: &LoopOptions,
) -> Result<GenerateTextResult> {
    run(provider, messages, registry, options, None).await
}

pub(crate) async fn run(
    provider: &dyn ModelProvider,
    messages: Vec<ModelMessage>,
    registry: &ToolRegistry,
    options: &LoopOptions,
    response_format: Option<ResponseFormat>,
) -> Result<GenerateTextResult> {
    let tools = registry.definitions();
    let response_format = response_format.or_else(|| options.settings.response_format.clone());
    let mut conversation = Conversation::new(messages);
    let mut steps = Vec::new();
    let mut total_usage = Usage::default();
    let mut round = 0;

    loop {
        round += 1;
        if round > options.max_rounds {
            warn!(limit = options.max_rounds, "conversation hit its round limit");
            return Err(GenbindError::RoundLimitExceeded {
                limit: options.max_rounds,
            });
        }
        if options.cancel.as_ref().is_some_and(|token| token.is_cancelled()) {
            return Err(GenbindError::Cancelled { round });
        }

        let request = ProviderRequest {
            messages: conversation.messages().to_vec(),
            settings: options.settings.clone(),
            tools: tools.clone(),
            response_format: response_format.clone(),
        };

        debug!(
            round,
            provider = provider.provider_name(),
            model = provider.model_id(),
            messages = conversation.len(),
            "calling transport"
        );
        let response = guarded(
            round,
            options.request_timeout,
            options.cancel.as_ref(),
            provider.generate_text(&request),
        )
        .await
        .map_err(|err| match err {
            GenbindError::Cancelled { .. } => err,
            source => GenbindError::Transport {
                round,
                source: Box::new(source),
            },
        })?;

        total_usage.merge(&response.usage);
        conversation.push(response.message());

        let mut step = GenerationStep {
            round,
            text: response.text.clone(),
            function_calls: response.function_calls.clone(),
            function_responses: Vec::new(),
            usage: response.usage.clone(),
            finish_reason: response.finish_reason,
        };

        if response.function_calls.is_empty() {
            debug!(round, "model returned a final answer");
            steps.push(step);
            return Ok(GenerateTextResult {
                text: response.text,
                steps,
                messages: conversation.into_messages(),
                usage: total_usage,
                finish_reason: response.finish_reason,
            });
        }

        for (index, call) in response.function_calls.iter().enumerate() {
            let Some(tool) = registry.get(&call.name) else {
                warn!(round, tool = %call.name, "model called an unknown tool");
                return Err(GenbindError::UnknownTool {
                    name: call.name.clone(),
                    round,
                });
            };

            debug!(round, index, tool = %call.name, "dispatching function call");
            let ctx = ToolExecutionContext {
                tool_name: call.name.clone(),
                call_id: Some(call.id.clone()),
                round,
                cancel: options
                    .cancel
                    .as_ref()
                    .map(|token| token.child_token())
                    .unwrap_or_default(),
            };
            let outcome = guarded(
                round,
                options.tool_timeout,
                options.cancel.as_ref(),
                tool.dispatch(call.arguments.clone(), ctx),
            )
            .await
            .map_err(|err| match err {
                // Tool functions report through `ToolExecution`, so a bare
                // timeout here comes from the guard.
                GenbindError::Timeout(timeout_ms) => GenbindError::ToolTimeout {
                    tool_name: call.name.clone(),
                    round,
                    timeout_ms,
                },
                other => other,
            });

            let function_response = match outcome {
                Ok(output) => FunctionResponse::output(call, output),
                Err(err) if reports_to_model(&err, options.tool_error_policy) => {
                    warn!(round, tool = %call.name, error = %err, "reporting tool failure to the model");
                    FunctionResponse::error(call, err.to_string())
                }
                Err(err) => {
                    warn!(round, tool = %call.name, error = %err, "tool failed");
                    return Err(err);
                }
            };
            step.function_responses.push(function_response.clone());
            conversation.push(ModelMessage::function_response(function_response));
        }

        steps.push(step);
    }
}

fn reports_to_model(err: &GenbindError, policy: ToolErrorPolicy) -> bool {
    policy == ToolErrorPolicy::ReportToModel
        && matches!(
            err,
            GenbindError::ToolExecution { .. }
                | GenbindError::ToolConversion {
                    stage: ToolStage::Input,
                    ..
                }
        )
}
