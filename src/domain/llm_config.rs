use serde::{Deserialize, Serialize};

/// Connection settings for the OpenAI-compatible chat-completions gateway
/// the generators and advisor chats talk to.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LLMConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1234/v1".to_string(),
            model: "local-model".to_string(),
            api_key: None,
            max_tokens: Some(4096),
            temperature: Some(0.7),
        }
    }
}
