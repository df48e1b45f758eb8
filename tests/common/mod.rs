//! Shared test helpers and mock transport.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use genbind::convert::Value;
use genbind::error::{GenbindError, Result};
use genbind::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use genbind::types::*;

enum Step {
    Reply(ProviderResponse),
    Fail(GenbindError),
    Hang,
}

/// A mock transport that replays scripted replies and records every
/// request it receives.
pub struct MockProvider {
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn push(&self, step: Step) -> &Self {
        self.steps.lock().unwrap().push_back(step);
        self
    }

    /// Queue a final text reply.
    pub fn queue_text(&self, text: &str) -> &Self {
        let mut response = ProviderResponse::from_text(text);
        response.usage = usage(10, 20);
        self.push(Step::Reply(response))
    }

    /// Queue a reply requesting one function call.
    pub fn queue_call(&self, id: &str, name: &str, args: serde_json::Value) -> &Self {
        self.queue_calls(vec![(id, name, args)])
    }

    /// Queue a reply requesting several function calls, in order.
    pub fn queue_calls(&self, calls: Vec<(&str, &str, serde_json::Value)>) -> &Self {
        let calls = calls
            .into_iter()
            .map(|(id, name, args)| FunctionCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments: Value::from_json(args).unwrap(),
                thought_signature: None,
            })
            .collect();
        let mut response = ProviderResponse::from_calls(calls);
        response.usage = usage(10, 5);
        self.push(Step::Reply(response))
    }

    /// Queue a transport failure.
    pub fn queue_error(&self, error: GenbindError) -> &Self {
        self.push(Step::Fail(error))
    }

    /// Queue a reply that never arrives.
    pub fn queue_hang(&self) -> &Self {
        self.push(Step::Hang)
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }

    async fn generate_text(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Reply(response)) => Ok(response),
            Some(Step::Fail(error)) => Err(error),
            Some(Step::Hang) => std::future::pending().await,
            None => Err(GenbindError::InvalidState("no scripted reply left".into())),
        }
    }
}

fn usage(input: u32, output: u32) -> Usage {
    Usage {
        input_tokens: input,
        output_tokens: output,
        total_tokens: input + output,
        ..Default::default()
    }
}

/// The function responses recorded in a request's history, as JSON.
pub fn function_responses(request: &ProviderRequest) -> Vec<(String, serde_json::Value, bool)> {
    request
        .messages
        .iter()
        .flat_map(|message| message.content.iter())
        .filter_map(|part| match part {
            ContentPart::FunctionResponse(response) => Some((
                response.name.clone(),
                response.response.clone().into_json(),
                response.is_error,
            )),
            _ => None,
        })
        .collect()
}
