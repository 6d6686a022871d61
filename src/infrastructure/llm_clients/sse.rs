use crate::domain::error::{AppError, Result};
use futures_util::{Stream, StreamExt};
use tracing::debug;

/// Consumes an OpenAI-style SSE byte stream and accumulates the assistant
/// reply, invoking `on_delta` for every non-empty text fragment as it
/// arrives.
///
/// Bytes are buffered until a full line is available, so a chunk boundary
/// falling inside a multi-byte UTF-8 character never corrupts the decoded
/// output. Lines that are not valid JSON after the `data: ` prefix are
/// skipped; the stream is third-party output and a single bad chunk must not
/// kill the whole reply. Dropping the returned future stops the read loop,
/// which is how callers cancel an in-flight stream.
pub async fn accumulate_sse<S, B, E, F>(mut stream: S, mut on_delta: F) -> Result<String>
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
    F: FnMut(&str),
{
    let mut buffer: Vec<u8> = Vec::new();
    let mut accumulated = String::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| AppError::LLMError(format!("Stream read failed: {}", e)))?;
        buffer.extend_from_slice(chunk.as_ref());

        while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = buffer.drain(..=pos).collect();
            if let Some(delta) = delta_from_line(&line) {
                accumulated.push_str(&delta);
                on_delta(&delta);
            }
        }
    }

    // A final line may arrive without a trailing newline.
    if !buffer.is_empty() {
        if let Some(delta) = delta_from_line(&buffer) {
            accumulated.push_str(&delta);
            on_delta(&delta);
        }
    }

    Ok(accumulated)
}

/// Extracts the delta text from one SSE line, tolerating everything the
/// gateway might send: non-`data:` lines, the `[DONE]` sentinel, malformed
/// JSON, and payloads without a delta field.
fn delta_from_line(raw: &[u8]) -> Option<String> {
    let line = match std::str::from_utf8(raw) {
        Ok(line) => line,
        Err(_) => {
            debug!("Skipping SSE line with invalid UTF-8");
            return None;
        }
    };

    let payload = line.trim_end_matches(['\r', '\n']).strip_prefix("data: ")?;
    if payload == "[DONE]" {
        return None;
    }

    let value: serde_json::Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(err) => {
            debug!(error = %err, "Skipping malformed SSE chunk");
            return None;
        }
    };

    value["choices"][0]["delta"]["content"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
