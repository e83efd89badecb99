use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::llm::{
    models::{ChatOptions, ChatResponse, Message, Usage},
    LlmError, LlmProvider,
};

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
}

impl AnthropicProvider {
    pub fn new(api_key: String, base_url: String, default_model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            default_model,
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn chat(&self, messages: &[Message], options: ChatOptions) -> Result<ChatResponse, LlmError> {
        let model = options.model.as_deref().unwrap_or(&self.default_model);

        // Anthropic takes the system prompt as a separate field; 'messages'
        // carries only user/assistant turns.
        let mut system = String::new();
        let filtered_messages: Vec<Message> = messages
            .iter()
            .filter_map(|m| {
                if m.role == "system" {
                    system.push_str(&m.content);
                    system.push('\n');
                    None
                } else {
                    Some(m.clone())
                }
            })
            .collect();

        if let Some(opts_system) = &options.system_prompt {
            system.push_str(opts_system);
        }

        let body = json!({
            "model": model,
            "messages": filtered_messages,
            "system": system.trim(),
            "temperature": options.temperature.unwrap_or(0.7),
            "max_tokens": options.max_tokens.unwrap_or(4096),
        });

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(LlmError::RateLimited);
            }
            return Err(LlmError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let content = json["content"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        if content.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        let usage = json.get("usage").map(|u| Usage {
            input_tokens: u["input_tokens"].as_u64().unwrap_or(0) as u32,
            output_tokens: u["output_tokens"].as_u64().unwrap_or(0) as u32,
        });

        Ok(ChatResponse {
            content,
            model: model.to_string(),
            usage,
        })
    }
}
