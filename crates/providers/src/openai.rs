//! OpenAI-compatible chat completions adapter.
//!
//! Works with OpenAI, Azure-style gateways, Ollama, vLLM, Together, and
//! any other endpoint that follows the OpenAI chat completions contract,
//! with automatic retry + exponential back-off on transient (5xx /
//! timeout) failures.

use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use wl_domain::chat::ChatMessage;
use wl_domain::config::LlmConfig;
use wl_domain::error::{Error, Result};
use wl_domain::trace::TraceEvent;
use wl_domain::{ToolCall, ToolDefinition};

use crate::traits::{ChatRequest, ChatResponse, LlmProvider, Usage};
use crate::util::{from_reqwest, resolve_api_key};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An LLM provider adapter for any OpenAI-compatible API endpoint.
///
/// Created once at startup and reused for the lifetime of the process.
/// The underlying `reqwest::Client` maintains a connection pool.
pub struct OpenAiProvider {
    id: String,
    base_url: String,
    api_key: String,
    default_model: String,
    http: Client,
    max_retries: u32,
}

impl OpenAiProvider {
    /// Build a new adapter from the shared [`LlmConfig`].
    ///
    /// The API key is read from the environment variable named by
    /// `cfg.api_key_env`; a missing variable is a startup error, not a
    /// per-request one.
    pub fn new(cfg: &LlmConfig) -> Result<Self> {
        let api_key = resolve_api_key(&cfg.api_key_env)?;
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            id: "openai".into(),
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            api_key,
            default_model: cfg.model.clone(),
            http,
            max_retries: cfg.max_retries,
        })
    }

    // ── request helpers ──────────────────────────────────────────────

    fn authed_post(&self, url: &str) -> RequestBuilder {
        self.http
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
    }

    /// Resolve the effective model name for this request.
    fn effective_model(&self, req: &ChatRequest) -> String {
        req.model
            .clone()
            .unwrap_or_else(|| self.default_model.clone())
    }

    fn build_chat_body(&self, req: &ChatRequest) -> Value {
        let messages: Vec<Value> = req.messages.iter().map(msg_to_openai).collect();

        let mut body = serde_json::json!({
            "messages": messages,
            "model": self.effective_model(req),
        });

        if !req.tools.is_empty() {
            let tools: Vec<Value> = req.tools.iter().map(tool_to_openai).collect();
            body["tools"] = Value::Array(tools);
        }
        if let Some(temp) = req.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        if let Some(max) = req.max_tokens {
            body["max_tokens"] = serde_json::json!(max);
        }
        if req.json_mode {
            body["response_format"] = serde_json::json!({"type": "json_object"});
        }
        body
    }

    fn emit_attempt(
        &self,
        model: &str,
        attempt: u32,
        status: u16,
        duration_ms: u64,
        usage: Option<&Usage>,
    ) {
        TraceEvent::LlmRequest {
            provider: self.id.clone(),
            model: model.to_owned(),
            attempt,
            status,
            duration_ms,
            prompt_tokens: usage.map(|u| u.prompt_tokens),
            completion_tokens: usage.map(|u| u.completion_tokens),
        }
        .emit();
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Message serialization helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn msg_to_openai(msg: &ChatMessage) -> Value {
    serde_json::json!({
        "role": msg.role,
        "content": msg.content,
    })
}

fn tool_to_openai(tool: &ToolDefinition) -> Value {
    serde_json::json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        }
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response deserialization helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn parse_chat_response(provider: &str, body: &Value) -> Result<ChatResponse> {
    let choice = body
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
        .ok_or_else(|| Error::Provider {
            provider: provider.into(),
            message: "no choices in response".into(),
        })?;

    let message = choice.get("message").ok_or_else(|| Error::Provider {
        provider: provider.into(),
        message: "no message in choice".into(),
    })?;

    let content = message
        .get("content")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let finish_reason = choice
        .get("finish_reason")
        .and_then(|v| v.as_str())
        .map(String::from);

    let model = body
        .get("model")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();

    let tool_calls = parse_openai_tool_calls(message);
    let usage = body.get("usage").and_then(parse_openai_usage);

    Ok(ChatResponse {
        content,
        tool_calls,
        usage,
        model,
        finish_reason,
    })
}

fn parse_openai_tool_calls(message: &Value) -> Vec<ToolCall> {
    let arr = match message.get("tool_calls").and_then(|v| v.as_array()) {
        Some(a) => a,
        None => return Vec::new(),
    };
    arr.iter()
        .filter_map(|tc| {
            let call_id = tc.get("id")?.as_str()?.to_string();
            let func = tc.get("function")?;
            let tool_name = func.get("name")?.as_str()?.to_string();
            // Arguments arrive as a JSON-encoded string; a malformed blob
            // degrades to an empty object rather than dropping the call.
            let args_str = func.get("arguments")?.as_str().unwrap_or("{}");
            let arguments: Value =
                serde_json::from_str(args_str).unwrap_or(Value::Object(Default::default()));
            Some(ToolCall {
                call_id,
                tool_name,
                arguments,
            })
        })
        .collect()
}

fn parse_openai_usage(v: &Value) -> Option<Usage> {
    Some(Usage {
        prompt_tokens: v.get("prompt_tokens")?.as_u64()? as u32,
        completion_tokens: v.get("completion_tokens")?.as_u64()? as u32,
        total_tokens: v.get("total_tokens")?.as_u64()? as u32,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    /// Send a chat completion request with retry + exponential back-off.
    ///
    /// * Retries on 5xx status codes and transport errors (timeouts,
    ///   connection resets).
    /// * Does **not** retry on 4xx (client errors are permanent).
    /// * Emits a `TraceEvent::LlmRequest` after every attempt.
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_chat_body(&req);
        let model = self.effective_model(&req);

        tracing::debug!(provider = %self.id, model = %model, "chat completion request");

        let mut last_err: Option<Error> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = Duration::from_millis(100 * 2u64.pow(attempt - 1));
                tokio::time::sleep(backoff).await;
            }

            let start = Instant::now();
            let result = self.authed_post(&url).json(&body).send().await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(resp) => {
                    let status = resp.status();

                    if status.is_server_error() {
                        // 5xx — transient, retry
                        let text = resp.text().await.unwrap_or_default();
                        self.emit_attempt(&model, attempt, status.as_u16(), duration_ms, None);
                        last_err = Some(Error::Provider {
                            provider: self.id.clone(),
                            message: format!("HTTP {} - {}", status.as_u16(), text),
                        });
                        continue;
                    }

                    if status.is_client_error() {
                        // 4xx — permanent, do NOT retry
                        let text = resp.text().await.unwrap_or_default();
                        self.emit_attempt(&model, attempt, status.as_u16(), duration_ms, None);
                        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                            return Err(Error::Auth(format!(
                                "{} auth failed ({}): {}",
                                self.id,
                                status.as_u16(),
                                text
                            )));
                        }
                        return Err(Error::Provider {
                            provider: self.id.clone(),
                            message: format!("HTTP {} - {}", status.as_u16(), text),
                        });
                    }

                    let text = resp.text().await.map_err(from_reqwest)?;
                    let resp_json: Value = serde_json::from_str(&text)?;
                    let parsed = parse_chat_response(&self.id, &resp_json)?;
                    self.emit_attempt(
                        &model,
                        attempt,
                        status.as_u16(),
                        duration_ms,
                        parsed.usage.as_ref(),
                    );
                    return Ok(parsed);
                }
                Err(e) => {
                    let status = e.status().map(|s| s.as_u16()).unwrap_or(0);
                    self.emit_attempt(&model, attempt, status, duration_ms, None);
                    tracing::warn!(
                        provider = %self.id,
                        error = %e,
                        "transport error, will retry"
                    );
                    last_err = Some(from_reqwest(e));
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| Error::Provider {
            provider: self.id.clone(),
            message: "all retries exhausted".into(),
        }))
    }

    fn provider_id(&self) -> &str {
        &self.id
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use wl_domain::action::TOOL_CREATE_ACCOUNT;

    fn test_provider() -> OpenAiProvider {
        OpenAiProvider {
            id: "openai".into(),
            base_url: "https://api.example.test/v1".into(),
            api_key: "sk-test".into(),
            default_model: "gpt-4o".into(),
            http: Client::new(),
            max_retries: 0,
        }
    }

    fn sample_tool() -> ToolDefinition {
        ToolDefinition {
            name: TOOL_CREATE_ACCOUNT.into(),
            description: "Create a new account".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": { "Name": { "type": "string" } }
            }),
        }
    }

    #[test]
    fn body_carries_model_and_messages() {
        let provider = test_provider();
        let req = ChatRequest::text(vec![
            ChatMessage::system("be brief"),
            ChatMessage::user("hi"),
        ]);
        let body = provider.build_chat_body(&req);

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert!(body.get("tools").is_none());
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn body_serializes_tools_as_functions() {
        let provider = test_provider();
        let req = ChatRequest::with_tools(vec![ChatMessage::user("hi")], vec![sample_tool()]);
        let body = provider.build_chat_body(&req);

        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], TOOL_CREATE_ACCOUNT);
        assert_eq!(
            body["tools"][0]["function"]["parameters"]["type"],
            "object"
        );
    }

    #[test]
    fn json_mode_sets_response_format() {
        let provider = test_provider();
        let req = ChatRequest::json(vec![ChatMessage::user("classify this")]);
        let body = provider.build_chat_body(&req);

        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn request_model_overrides_default() {
        let provider = test_provider();
        let mut req = ChatRequest::text(vec![ChatMessage::user("hi")]);
        req.model = Some("gpt-4o-mini".into());
        let body = provider.build_chat_body(&req);

        assert_eq!(body["model"], "gpt-4o-mini");
    }

    #[test]
    fn parses_plain_text_response() {
        let body = serde_json::json!({
            "model": "gpt-4o-2024-08-06",
            "choices": [{
                "message": { "role": "assistant", "content": "Hello!" },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15 }
        });
        let resp = parse_chat_response("openai", &body).unwrap();

        assert_eq!(resp.content, "Hello!");
        assert!(resp.tool_calls.is_empty());
        assert_eq!(resp.finish_reason.as_deref(), Some("stop"));
        assert_eq!(resp.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn parses_tool_call_arguments_from_string() {
        let message = serde_json::json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_abc",
                "type": "function",
                "function": {
                    "name": "modifyAccount",
                    "arguments": "{\"recordId\":\"rec123\",\"Status\":\"Active\"}"
                }
            }]
        });
        let calls = parse_openai_tool_calls(&message);

        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].call_id, "call_abc");
        assert_eq!(calls[0].tool_name, "modifyAccount");
        assert_eq!(calls[0].arguments["recordId"], "rec123");
        assert_eq!(calls[0].arguments["Status"], "Active");
    }

    #[test]
    fn malformed_tool_arguments_degrade_to_empty_object() {
        let message = serde_json::json!({
            "tool_calls": [{
                "id": "call_bad",
                "function": { "name": "deleteAccount", "arguments": "{not json" }
            }]
        });
        let calls = parse_openai_tool_calls(&message);

        assert_eq!(calls.len(), 1);
        assert!(calls[0].arguments.as_object().unwrap().is_empty());
    }

    #[test]
    fn missing_choices_is_a_provider_error() {
        let body = serde_json::json!({ "model": "gpt-4o" });
        let err = parse_chat_response("openai", &body).unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }
}
