pub mod anthropic;
pub mod gateway;
pub mod models;
pub mod openai;

pub use gateway::CompletionGateway;

use anthropic::AnthropicProvider;
use openai::OpenAiProvider;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use models::{ChatOptions, ChatResponse, Message};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("rate limited")]
    RateLimited,
    #[error("empty completion")]
    EmptyResponse,
    #[error("malformed completion: {0}")]
    Malformed(String),
}

impl LlmError {
    /// Timeouts, dropped connections and 5xx-class answers get one more
    /// attempt; empty or malformed content does not.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Network(_) | LlmError::Timeout | LlmError::RateLimited => true,
            LlmError::Upstream { status, .. } => *status >= 500,
            LlmError::EmptyResponse | LlmError::Malformed(_) => false,
        }
    }
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn chat(&self, messages: &[Message], options: ChatOptions) -> Result<ChatResponse, LlmError>;
}

/// A registry or factory trait to initialize providers from config.
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_default(config: &AppConfig) -> Option<Arc<dyn LlmProvider>> {
        let provider_name = config.llm.provider.as_str();

        match provider_name {
            "openai" => {
                let cfg = config.llm.openai.as_ref()?;
                Some(Arc::new(OpenAiProvider::new(
                    cfg.api_key.clone(),
                    cfg.api_base.clone(),
                    cfg.default_model.clone(),
                )))
            }
            "anthropic" => {
                let cfg = config.llm.anthropic.as_ref()?;
                Some(Arc::new(AnthropicProvider::new(
                    cfg.api_key.clone(),
                    cfg.api_base.clone(),
                    cfg.default_model.clone(),
                )))
            }
            _ => None,
        }
    }
}
