use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenAiConfig {
    pub api_base: String,
    pub api_key: String,
    pub default_model: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnthropicConfig {
    pub api_base: String,
    pub api_key: String,
    pub default_model: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub provider: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    pub openai: Option<OpenAiConfig>,
    pub anthropic: Option<AnthropicConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    pub max_history_messages: u32,
    pub system_prompt: String,
    pub fallback_reply: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScentConfig {
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub chat: ChatConfig,
    pub scent: ScentConfig,
}

impl AppConfig {
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("FLEUR").separator("__"))
            .build()?;

        let mut app_config: AppConfig = settings.try_deserialize()?;

        // Expand environment variables if present like ${OPENAI_API_KEY}
        app_config.server.host = expand_env(&app_config.server.host);
        app_config.database.path = expand_env(&app_config.database.path);

        if let Some(ref mut openai) = app_config.llm.openai {
            openai.api_key = expand_env(&openai.api_key);
        }
        if let Some(ref mut anthropic) = app_config.llm.anthropic {
            anthropic.api_key = expand_env(&anthropic.api_key);
        }

        Ok(app_config)
    }
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_fuzzy_threshold() -> f32 {
    0.5
}

fn expand_env(val: &str) -> String {
    if val.starts_with("${") && val.ends_with('}') {
        let var_name = &val[2..val.len() - 1];
        std::env::var(var_name).unwrap_or_else(|_| "".to_string())
    } else {
        val.to_string()
    }
}
