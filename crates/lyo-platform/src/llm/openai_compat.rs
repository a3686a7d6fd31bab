//! OpenAI-compatible completion adapter.
//!
//! Works with OpenAI, DeepSeek, and any provider using the
//! OpenAI chat completions API format.
//! Uses browser `fetch()` via gloo-net for WASM compatibility.

use async_trait::async_trait;
use gloo_net::http::Request;
use serde::Deserialize;
use serde_json::{json, Value};

use lyo_core::ports::*;
use lyo_types::{config::LlmConfig, LyoError, Result};

/// Provider that speaks the OpenAI chat completions protocol.
pub struct OpenAiCompatProvider {
    config: LlmConfig,
    base_url: String,
}

impl OpenAiCompatProvider {
    pub fn new(config: LlmConfig) -> Self {
        let base_url = config.base_url();
        Self { config, base_url }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

#[async_trait(?Send)]
impl LlmPort for OpenAiCompatProvider {
    async fn chat_completion(&self, req: ChatRequest) -> Result<ChatResponse> {
        if self.config.api_key.is_empty() {
            log::warn!("No API key configured for {}", self.config.provider.label());
        }
        let body = build_request_body(&req);

        let response = Request::post(&self.endpoint())
            .header("Content-Type", "application/json")
            .header("Authorization", &format!("Bearer {}", self.config.api_key))
            .json(&body)
            .map_err(|e| LyoError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| LyoError::Network(e.to_string()))?;

        if !response.ok() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(LyoError::Api { status, body: text });
        }

        let text = response
            .text()
            .await
            .map_err(|e| LyoError::MalformedResponse(e.to_string()))?;

        parse_response_body(&text)
    }
}

/// JSON body for a chat completions request
pub fn build_request_body(req: &ChatRequest) -> Value {
    let messages: Vec<Value> = req
        .messages
        .iter()
        .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
        .collect();

    let mut body = json!({
        "model": req.model,
        "messages": messages,
        "temperature": req.temperature,
    });

    if let Some(max_tokens) = req.max_tokens {
        body["max_tokens"] = json!(max_tokens);
    }

    body
}

/// Decode a 2xx response body. Undecodable JSON, a missing choice and
/// empty content are all `MalformedResponse`.
pub fn parse_response_body(text: &str) -> Result<ChatResponse> {
    let data: ApiResponse =
        serde_json::from_str(text).map_err(|e| LyoError::MalformedResponse(e.to_string()))?;

    let choice = data
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LyoError::MalformedResponse("No choices in response".to_string()))?;

    let content = choice
        .message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| LyoError::MalformedResponse("Empty completion".to_string()))?;

    let usage = data.usage.map(|u| TokenUsage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });

    Ok(ChatResponse { text: content, usage })
}

// ─── API response types ──────────────────────────────────────

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
