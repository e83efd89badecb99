use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::llm::models::{ChatOptions, ChatResponse, Message};
use crate::llm::{LlmError, LlmProvider};

/// The single point of contact with the external model. Bounds every call
/// with a timeout, retries transient failures once, and turns structured
/// replies into typed values. Callers never see a raw transport error.
pub struct CompletionGateway {
    provider: Arc<dyn LlmProvider>,
    timeout: Duration,
}

impl CompletionGateway {
    pub fn new(provider: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn complete(&self, system_prompt: &str, turns: &[Message]) -> Result<ChatResponse, LlmError> {
        let options = ChatOptions {
            system_prompt: Some(system_prompt.to_string()),
            ..Default::default()
        };

        let mut retried = false;
        loop {
            let result = match tokio::time::timeout(self.timeout, self.provider.chat(turns, options.clone())).await {
                Ok(inner) => inner,
                Err(_) => Err(LlmError::Timeout),
            };

            match result {
                Err(e) if e.is_transient() && !retried => {
                    warn!(provider = self.provider.name(), error = %e, "transient completion failure, retrying once");
                    retried = true;
                }
                other => return other,
            }
        }
    }

    /// Asks for bare JSON and parses the reply once. Models love to wrap
    /// JSON in Markdown fences, so those are stripped before parsing; any
    /// remaining mismatch is a `Malformed` failure, never retried.
    pub async fn complete_structured<T: DeserializeOwned>(
        &self,
        system_prompt: &str,
        turns: &[Message],
    ) -> Result<T, LlmError> {
        let system = format!("{system_prompt}\n\nRespond with JSON only: no prose, no Markdown fences.");
        let response = self.complete(&system, turns).await?;
        let payload = strip_code_fences(&response.content);
        serde_json::from_str(payload).map_err(|e| LlmError::Malformed(e.to_string()))
    }
}

fn strip_code_fences(text: &str) -> &str {
    let mut t = text.trim();
    if let Some(rest) = t.strip_prefix("```json") {
        t = rest;
    } else if let Some(rest) = t.strip_prefix("```") {
        t = rest;
    }
    if let Some(rest) = t.strip_suffix("```") {
        t = rest;
    }
    t.trim()
}
