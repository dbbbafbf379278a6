use async_trait::async_trait;

use crate::error::Result;
use crate::streaming::CompletionStream;
use crate::types::ChatMessage;

/// Capability of forwarding a conversation to a hosted completion endpoint.
///
/// The persistence layer and tests depend on this seam rather than on the
/// concrete Azure client.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Buffered completion: returns the assistant's full reply text.
    async fn send_message(
        &self,
        user_id: &str,
        messages: &[ChatMessage],
        deployment: &str,
    ) -> Result<String>;

    /// Streaming completion: returns incremental text deltas.
    ///
    /// Cancellation is the caller's responsibility: stop consuming and drop
    /// the stream to close the connection.
    async fn send_message_streaming(
        &self,
        user_id: &str,
        messages: &[ChatMessage],
        deployment: &str,
    ) -> Result<CompletionStream>;

    /// Compress free text into a short title.
    async fn summarize(&self, text: &str) -> Result<String>;
}
