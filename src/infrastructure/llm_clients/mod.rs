pub mod gateway;
pub mod sse;

use crate::domain::chat::ChatMessage;
use crate::domain::error::Result;
use crate::domain::llm_config::LLMConfig;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use std::pin::Pin;

/// Raw SSE byte stream from the gateway; fed to `sse::accumulate_sse` or
/// relayed to the caller untouched.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

#[cfg(test)]
pub mod testing;

#[async_trait]
pub trait LLMClient {
    /// One-shot completion: system + user prompt in, full reply text out.
    async fn generate(&self, config: &LLMConfig, system: &str, user: &str) -> Result<String>;

    /// Streaming chat completion. The returned stream carries the gateway's
    /// SSE body; dropping it aborts the upstream request.
    async fn stream_chat(
        &self,
        config: &LLMConfig,
        system: &str,
        messages: &[ChatMessage],
    ) -> Result<ByteStream>;
}
