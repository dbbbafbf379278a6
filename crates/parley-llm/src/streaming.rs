use std::collections::VecDeque;
use std::pin::Pin;

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::{LlmError, Result};

/// Finite, non-restartable sequence of non-empty completion text deltas.
///
/// The sequence ends at the `data: [DONE]` sentinel or when the transport
/// closes; dropping it closes the underlying connection.
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// One `data:`-prefixed streaming event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatStreamChunk {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChoice {
    pub delta: Delta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatStreamChunk {
    /// Text delta carried by this event, if any.
    pub fn content(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.delta.content.as_deref())
    }
}

/// Decode a line-oriented completion event stream into text deltas.
///
/// Events arrive as `data: {json}` lines terminated by a `data: [DONE]`
/// sentinel. Blank lines and events without a content delta are skipped;
/// the sentinel ends the sequence without emitting a value. Transport and
/// JSON failures surface as `Err` items.
///
/// Generic over the byte source so fixtures can drive it in tests; the
/// client passes `response.bytes_stream()` directly.
pub fn decode_chat_stream<S, B, E>(byte_stream: S) -> CompletionStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<LlmError> + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(byte_stream);
        let mut buffer = VecDeque::with_capacity(8192);

        while let Some(chunk_result) = byte_chunks.next().await {
            let bytes = match chunk_result {
                Ok(bytes) => bytes,
                Err(e) => {
                    yield Err(e.into());
                    return;
                }
            };
            buffer.extend(bytes.as_ref().iter().copied());

            while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();

                let Ok(line_str) = std::str::from_utf8(&line_bytes) else {
                    continue;
                };
                let line = line_str.trim();

                if line.is_empty() {
                    continue;
                }

                let Some(data) = line.strip_prefix("data: ") else {
                    continue;
                };

                if data == "[DONE]" {
                    return;
                }

                match serde_json::from_str::<ChatStreamChunk>(data) {
                    Ok(chunk) => {
                        if let Some(content) = chunk.content() {
                            if !content.is_empty() {
                                yield Ok(content.to_string());
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(LlmError::Stream(format!("failed to parse chunk: {}", e)));
                    }
                }
            }
        }
    })
}
