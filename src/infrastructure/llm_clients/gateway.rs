use super::{ByteStream, LLMClient};
use crate::domain::chat::ChatMessage;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use async_trait::async_trait;
use futures_util::StreamExt;
use serde_json::json;

/// Client for an OpenAI-compatible chat-completions gateway.
pub struct GatewayClient {
    client: reqwest::Client,
}

impl GatewayClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn completions_url(config: &LLMConfig) -> String {
        if config.base_url.ends_with('/') {
            format!("{}chat/completions", config.base_url)
        } else {
            format!("{}/chat/completions", config.base_url)
        }
    }

    async fn send_request(
        &self,
        config: &LLMConfig,
        body: serde_json::Value,
    ) -> Result<reqwest::Response> {
        let mut request = self.client.post(Self::completions_url(config)).json(&body);
        if let Some(api_key) = &config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::LLMError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                429 => AppError::LLMError("Rate limit exceeded. Please try again later.".to_string()),
                402 => AppError::LLMError("AI credits exhausted. Please add credits to continue.".to_string()),
                _ => AppError::LLMError(format!("API error ({}): {}", status, text)),
            });
        }

        Ok(response)
    }

    fn request_body(
        config: &LLMConfig,
        system: &str,
        messages: &[ChatMessage],
        stream: bool,
    ) -> serde_json::Value {
        let mut wire_messages = vec![json!({ "role": "system", "content": system })];
        for message in messages {
            wire_messages.push(json!({ "role": message.role, "content": message.content }));
        }
        let mut body = json!({
            "model": config.model,
            "messages": wire_messages,
            "stream": stream,
        });
        if let Some(max_tokens) = config.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if let Some(temperature) = config.temperature {
            body["temperature"] = json!(temperature);
        }
        body
    }
}

impl Default for GatewayClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for GatewayClient {
    async fn generate(&self, config: &LLMConfig, system: &str, user: &str) -> Result<String> {
        let body = Self::request_body(config, system, &[ChatMessage::user(user)], false);
        let response = self.send_request(config, body).await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::LLMError(format!("Failed to parse JSON: {}", e)))?;

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::LLMError("Invalid response format".to_string()))
    }

    async fn stream_chat(
        &self,
        config: &LLMConfig,
        system: &str,
        messages: &[ChatMessage],
    ) -> Result<ByteStream> {
        let body = Self::request_body(config, system, messages, true);
        let response = self.send_request(config, body).await?;

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| AppError::LLMError(format!("Stream read failed: {}", e))));

        Ok(Box::pin(stream))
    }
}
