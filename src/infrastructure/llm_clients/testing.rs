use super::{ByteStream, LLMClient};
use crate::domain::chat::ChatMessage;
use crate::domain::error::Result;
use crate::domain::llm_config::LLMConfig;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;
use std::sync::Mutex;

/// Scripted gateway stand-in for use case tests: `generate` returns the
/// canned reply, `stream_chat` replays canned SSE chunks. Records the last
/// prompts it was handed.
pub struct ScriptedClient {
    reply: String,
    chunks: Vec<Vec<u8>>,
    pub last_system: Mutex<Option<String>>,
    pub last_user: Mutex<Option<String>>,
}

impl ScriptedClient {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            chunks: Vec::new(),
            last_system: Mutex::new(None),
            last_user: Mutex::new(None),
        }
    }

    pub fn streaming(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            reply: String::new(),
            chunks,
            last_system: Mutex::new(None),
            last_user: Mutex::new(None),
        }
    }
}

#[async_trait]
impl LLMClient for ScriptedClient {
    async fn generate(&self, _config: &LLMConfig, system: &str, user: &str) -> Result<String> {
        *self.last_system.lock().unwrap() = Some(system.to_string());
        *self.last_user.lock().unwrap() = Some(user.to_string());
        Ok(self.reply.clone())
    }

    async fn stream_chat(
        &self,
        _config: &LLMConfig,
        system: &str,
        _messages: &[ChatMessage],
    ) -> Result<ByteStream> {
        *self.last_system.lock().unwrap() = Some(system.to_string());
        let items: Vec<Result<Bytes>> = self
            .chunks
            .iter()
            .map(|chunk| Ok(Bytes::from(chunk.clone())))
            .collect();
        Ok(Box::pin(stream::iter(items)))
    }
}
