//! Google Gemini API transport.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map};
use tracing::debug;

use crate::convert::Value;
use crate::error::{GenbindError, Result};
use crate::models::GoogleModel;
use crate::types::*;
use crate::util::retry::RetryPolicy;

use super::http::{google_headers, shared_client, status_to_error};
use super::{ModelProvider, ProviderRequest, ProviderResponse};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Transport for the Gemini `generateContent` endpoint.
pub struct GoogleProvider {
    model: GoogleModel,
    api_key: String,
    base_url: String,
    retry: RetryPolicy,
}

impl GoogleProvider {
    pub fn new(model: GoogleModel, api_key: impl Into<String>) -> Self {
        Self {
            model,
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            retry: RetryPolicy::none(),
        }
    }

    /// Point at a different API root, e.g. a proxy or a test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Retry rate limits and server errors with this policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model.as_str())
    }

    pub(crate) fn build_request_body(&self, request: &ProviderRequest) -> serde_json::Value {
        let mut system_parts = Vec::new();
        let mut contents: Vec<serde_json::Value> = Vec::new();
        let mut last_was_tool = false;

        for msg in &request.messages {
            match msg.role {
                Role::System => {
                    system_parts.push(json!({"text": msg.text()}));
                    continue;
                }
                Role::Tool if last_was_tool => {
                    // Results of one round's calls travel together.
                    if let Some(parts) = contents
                        .last_mut()
                        .and_then(|content| content.get_mut("parts"))
                        .and_then(serde_json::Value::as_array_mut)
                    {
                        parts.extend(build_gemini_parts(&msg.content));
                    }
                }
                role => {
                    let role = if role == Role::Model { "model" } else { "user" };
                    contents.push(json!({
                        "role": role,
                        "parts": build_gemini_parts(&msg.content),
                    }));
                }
            }
            last_was_tool = msg.role == Role::Tool;
        }

        let mut body = Map::new();
        body.insert("contents".into(), serde_json::Value::Array(contents));
        if !system_parts.is_empty() {
            body.insert("systemInstruction".into(), json!({"parts": system_parts}));
        }

        let settings = &request.settings;
        let mut gen_config = Map::new();
        if let Some(max) = settings.max_tokens {
            gen_config.insert("maxOutputTokens".into(), max.into());
        }
        if let Some(temp) = settings.temperature {
            gen_config.insert("temperature".into(), temp.into());
        }
        if let Some(top_p) = settings.top_p {
            gen_config.insert("topP".into(), top_p.into());
        }
        if let Some(top_k) = settings.top_k {
            gen_config.insert("topK".into(), top_k.into());
        }
        if let Some(ref stops) = settings.stop_sequences {
            gen_config.insert("stopSequences".into(), json!(stops));
        }
        if let Some(seed) = settings.seed {
            gen_config.insert("seed".into(), seed.into());
        }
        let response_format = request
            .response_format
            .as_ref()
            .or(settings.response_format.as_ref());
        if let Some(ResponseFormat::JsonSchema { schema, .. }) = response_format {
            gen_config.insert("responseMimeType".into(), "application/json".into());
            gen_config.insert("responseJsonSchema".into(), schema.clone());
        }
        if !gen_config.is_empty() {
            body.insert("generationConfig".into(), serde_json::Value::Object(gen_config));
        }

        if !request.tools.is_empty() {
            let declarations: Vec<serde_json::Value> = request
                .tools
                .iter()
                .map(|tool| {
                    let mut decl = Map::new();
                    decl.insert("name".into(), tool.name.clone().into());
                    decl.insert("description".into(), tool.description.clone().into());
                    decl.insert("parametersJsonSchema".into(), tool.parameters.clone());
                    if let Some(ref response) = tool.response {
                        decl.insert("responseJsonSchema".into(), response.clone());
                    }
                    serde_json::Value::Object(decl)
                })
                .collect();
            body.insert("tools".into(), json!([{"functionDeclarations": declarations}]));
        }

        serde_json::Value::Object(body)
    }

    async fn send(&self, body: &serde_json::Value) -> Result<GeminiResponse> {
        let resp = shared_client()
            .post(self.endpoint())
            .headers(google_headers(&self.api_key))
            .json(body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        Ok(resp.json().await?)
    }
}

#[async_trait]
impl ModelProvider for GoogleProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    fn model_id(&self) -> &str {
        self.model.as_str()
    }

    async fn generate_text(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        let body = self.build_request_body(request);

        debug!(
            model = self.model.as_str(),
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Google generate_text"
        );

        let data = self.retry.execute(|| self.send(&body)).await?;
        parse_response(data)
    }
}

fn build_gemini_parts(content: &[ContentPart]) -> Vec<serde_json::Value> {
    content
        .iter()
        .map(|part| match part {
            ContentPart::Text { text } => json!({"text": text}),
            ContentPart::InlineData(data) => json!({
                "inlineData": {
                    "mimeType": data.mime_type,
                    "data": data.data,
                }
            }),
            ContentPart::FunctionCall(call) => {
                let mut part = Map::new();
                part.insert(
                    "functionCall".into(),
                    json!({
                        "id": call.id,
                        "name": call.name,
                        "args": call.arguments.clone().into_json(),
                    }),
                );
                if let Some(ref signature) = call.thought_signature {
                    part.insert("thoughtSignature".into(), signature.clone().into());
                }
                serde_json::Value::Object(part)
            }
            ContentPart::FunctionResponse(response) => json!({
                "functionResponse": {
                    "id": response.id,
                    "name": response.name,
                    "response": response.response.clone().into_json(),
                }
            }),
        })
        .collect()
}

fn parse_response(data: GeminiResponse) -> Result<ProviderResponse> {
    let Some(candidate) = data.candidates.into_iter().next() else {
        let reason = data
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(GenbindError::api(200, format!("Gemini returned no candidates: {reason}")));
    };

    let mut text = String::new();
    let mut function_calls = Vec::new();
    let mut content = Vec::new();

    for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
        if let Some(call) = part.function_call {
            let arguments = match call.args {
                Some(args) if !args.is_null() => Value::try_from(args)?,
                _ => Value::map(),
            };
            let call = FunctionCall {
                id: call.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                name: call.name,
                arguments,
                thought_signature: part.thought_signature,
            };
            content.push(ContentPart::FunctionCall(call.clone()));
            function_calls.push(call);
        } else if let Some(t) = part.text {
            if part.thought.unwrap_or(false) {
                continue;
            }
            text.push_str(&t);
            content.push(ContentPart::Text { text: t });
        }
    }

    let finish_reason = match candidate.finish_reason.as_deref() {
        Some("STOP") if !function_calls.is_empty() => Some(FinishReason::ToolCalls),
        Some("STOP") => Some(FinishReason::Stop),
        Some("MAX_TOKENS") => Some(FinishReason::Length),
        Some("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII") => {
            Some(FinishReason::ContentFilter)
        }
        Some("MALFORMED_FUNCTION_CALL") => Some(FinishReason::Error),
        _ => None,
    };

    let usage = data
        .usage_metadata
        .map(|u| Usage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
            reasoning_tokens: u.thoughts_token_count,
        })
        .unwrap_or_default();

    Ok(ProviderResponse {
        text,
        function_calls,
        content,
        usage,
        finish_reason,
    })
}

// Internal Gemini response types

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    thought: Option<bool>,
    thought_signature: Option<String>,
    function_call: Option<GeminiFunctionCall>,
}

#[derive(Deserialize)]
struct GeminiFunctionCall {
    id: Option<String>,
    name: String,
    args: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
    thoughts_token_count: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn provider() -> GoogleProvider {
        GoogleProvider::new(GoogleModel::Gemini3FlashPreview, "key")
    }

    fn request(messages: Vec<ModelMessage>) -> ProviderRequest {
        ProviderRequest {
            messages,
            settings: GenerationSettings::default(),
            tools: Vec::new(),
            response_format: None,
        }
    }

    #[test]
    fn system_messages_become_system_instruction() {
        let body = provider().build_request_body(&request(vec![
            ModelMessage::system("be brief"),
            ModelMessage::user("hi"),
        ]));

        assert_eq!(body["systemInstruction"], json!({"parts": [{"text": "be brief"}]}));
        assert_eq!(body["contents"], json!([{"role": "user", "parts": [{"text": "hi"}]}]));
    }

    #[test]
    fn function_turns_keep_signatures_and_group_results() {
        let call = |id: &str| FunctionCall {
            id: id.into(),
            name: "echo".into(),
            arguments: Value::from_json(json!({"msg": id})).unwrap(),
            thought_signature: Some(format!("sig-{id}")),
        };
        let messages = vec![
            ModelMessage::user("go"),
            ModelMessage::model_parts(vec![
                ContentPart::FunctionCall(call("a")),
                ContentPart::FunctionCall(call("b")),
            ]),
            ModelMessage::function_response(FunctionResponse::output(&call("a"), Value::from("A"))),
            ModelMessage::function_response(FunctionResponse::output(&call("b"), Value::from("B"))),
        ];

        let body = provider().build_request_body(&request(messages));

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(
            contents[1]["parts"][0],
            json!({
                "functionCall": {"id": "a", "name": "echo", "args": {"msg": "a"}},
                "thoughtSignature": "sig-a"
            })
        );
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(
            contents[2]["parts"],
            json!([
                {"functionResponse": {"id": "a", "name": "echo", "response": {"output": "A"}}},
                {"functionResponse": {"id": "b", "name": "echo", "response": {"output": "B"}}},
            ])
        );
    }

    #[test]
    fn structured_output_and_tools_are_declared() {
        let mut req = request(vec![ModelMessage::user("hi")]);
        req.response_format = Some(ResponseFormat::JsonSchema {
            schema: json!({"type": "object"}),
            name: "Answer".into(),
        });
        req.tools = vec![super::super::ToolDefinition {
            name: "echo".into(),
            description: "Echo".into(),
            parameters: json!({"type": "object"}),
            response: Some(json!({"type": "object"})),
        }];

        let body = provider().build_request_body(&req);

        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseJsonSchema"], json!({"type": "object"}));
        assert_eq!(
            body["tools"][0]["functionDeclarations"][0]["parametersJsonSchema"],
            json!({"type": "object"})
        );
        assert_eq!(
            body["tools"][0]["functionDeclarations"][0]["responseJsonSchema"],
            json!({"type": "object"})
        );
    }

    #[test]
    fn parses_calls_and_skips_thoughts() {
        let data: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "pondering", "thought": true},
                    {"functionCall": {"name": "echo", "args": {"msg": "hi"}}, "thoughtSignature": "sig"}
                ]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 4, "totalTokenCount": 7}
        }))
        .unwrap();

        let response = parse_response(data).unwrap();

        assert_eq!(response.text, "");
        assert_eq!(response.function_calls.len(), 1);
        assert_eq!(response.function_calls[0].name, "echo");
        assert_eq!(response.function_calls[0].thought_signature.as_deref(), Some("sig"));
        assert_eq!(response.finish_reason, Some(FinishReason::ToolCalls));
        assert_eq!(response.usage.total_tokens, 7);
    }

    #[test]
    fn blocked_prompts_are_api_errors() {
        let data: GeminiResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();

        let err = parse_response(data).unwrap_err();

        assert!(err.to_string().contains("SAFETY"));
    }
}
