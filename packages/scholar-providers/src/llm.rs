use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

const JSON_INSTRUCTION: &str = "IMPORTANT: Output ONLY valid JSON.";

/// Token accounting reported by an OpenAI-compatible endpoint, when present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TokenUsage {
	pub prompt_tokens: u64,
	pub completion_tokens: u64,
	pub total_tokens: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatReply {
	pub content: String,
	pub usage: Option<TokenUsage>,
}

/// Chat-completions client for one configured model.
#[derive(Clone, Debug)]
pub struct LlmClient {
	client: Client,
	cfg: scholar_config::LlmProviderConfig,
}
impl LlmClient {
	pub fn new(cfg: &scholar_config::LlmProviderConfig) -> Result<Self> {
		let client = Client::builder()
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.default_headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
			.build()?;

		Ok(Self { client, cfg: cfg.clone() })
	}

	/// Sends one system and one user message and returns the assistant text.
	///
	/// With `json_mode` the request asks for a JSON object response format and the system
	/// prompt is made to mention JSON, which some endpoints require for that format.
	pub async fn chat(&self, system: &str, user: &str, json_mode: bool) -> Result<ChatReply> {
		let url = format!("{}{}", self.cfg.api_base, self.cfg.path);
		let system = if json_mode { ensure_json_instruction(system) } else { system.to_string() };
		let mut body = serde_json::json!({
			"model": self.cfg.model,
			"temperature": self.cfg.temperature,
			"max_tokens": self.cfg.max_tokens,
			"messages": [
				{ "role": "system", "content": system },
				{ "role": "user", "content": user },
			],
		});

		if json_mode {
			body["response_format"] = serde_json::json!({ "type": "json_object" });
		}

		let started = Instant::now();
		let res = self.client.post(&url).json(&body).send().await?;
		let json: Value = crate::check_status(res).await?.json().await?;
		let reply = parse_chat_response(&json)?;

		match reply.usage {
			Some(usage) => tracing::info!(
				model = %self.cfg.model,
				prompt_tokens = usage.prompt_tokens,
				completion_tokens = usage.completion_tokens,
				total_tokens = usage.total_tokens,
				elapsed_ms = started.elapsed().as_millis() as u64,
				"Chat completion finished."
			),
			None => tracing::info!(
				model = %self.cfg.model,
				elapsed_ms = started.elapsed().as_millis() as u64,
				"Chat completion finished without usage data."
			),
		}

		Ok(reply)
	}
}

pub fn ensure_json_instruction(system: &str) -> String {
	if system.to_lowercase().contains("json") {
		return system.to_string();
	}

	format!("{system}\n\n{JSON_INSTRUCTION}")
}

pub fn parse_chat_response(json: &Value) -> Result<ChatReply> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Chat response is missing choices[0].message.content.".to_string(),
		})?;
	let usage = json.get("usage").filter(|v| v.is_object()).map(|usage| {
		let count = |key: &str| usage.get(key).and_then(|v| v.as_u64()).unwrap_or(0);

		TokenUsage {
			prompt_tokens: count("prompt_tokens"),
			completion_tokens: count("completion_tokens"),
			total_tokens: count("total_tokens"),
		}
	});

	Ok(ChatReply { content: content.to_string(), usage })
}
