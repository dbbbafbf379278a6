// Azure OpenAI chat-completion client (HTTP direct, no SDK)
//
// Azure addresses models through deployments rather than model names:
// - URL: {endpoint}/openai/deployments/{deployment}/chat/completions?api-version=...
// - Auth: either `api-key: <key>` or `Authorization: Bearer <token>` from a
//   managed identity, fixed at construction.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::credentials::{select_credential, CredentialProvider, COGNITIVE_SERVICES_RESOURCE};
use crate::error::{LlmError, Result};
use crate::streaming::{decode_chat_stream, CompletionStream};
use crate::traits::CompletionClient;
use crate::types::ChatMessage;

/// Hard cap on generated titles, in characters.
const MAX_TITLE_LENGTH: usize = 20;

const SUMMARY_SYSTEM_PROMPT: &str = "Summarize the following text in a short phrase suitable as a title. Do not under any circumstances exceed 20 characters";

const DEFAULT_API_VERSION: &str = "2024-05-01-preview";
const DEFAULT_SUMMARY_DEPLOYMENT: &str = "gpt-4o";

pub struct AzureChatClient {
    http: reqwest::Client,
    endpoint: String,
    api_version: String,
    credential: Arc<dyn CredentialProvider>,
    summary_deployment: String,
}

impl AzureChatClient {
    /// Create a new client with the builder pattern
    pub fn builder() -> AzureChatClientBuilder {
        AzureChatClientBuilder::default()
    }

    fn build_url(&self, deployment: &str) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, deployment, self.api_version
        )
    }

    fn build_payload(messages: &[ChatMessage], stream: bool) -> Result<Value> {
        let mut payload = serde_json::json!({
            "messages": serde_json::to_value(messages)?,
        });
        if stream {
            payload
                .as_object_mut()
                .expect("payload is an object")
                .insert("stream".to_string(), Value::Bool(true));
        }
        Ok(payload)
    }

    /// Post a completion request and fail on any non-2xx status.
    async fn post(&self, deployment: &str, payload: &Value) -> Result<reqwest::Response> {
        let url = self.build_url(deployment);
        let (header_name, header_value) = self.credential.auth_header().await?;

        let response = self
            .http
            .post(&url)
            .header(header_name, header_value)
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Upstream { status, body });
        }

        Ok(response)
    }
}

#[async_trait]
impl CompletionClient for AzureChatClient {
    async fn send_message(
        &self,
        user_id: &str,
        messages: &[ChatMessage],
        deployment: &str,
    ) -> Result<String> {
        tracing::debug!(user_id, deployment, count = messages.len(), "sending completion request");

        let payload = Self::build_payload(messages, false)?;
        let response = self.post(deployment, &payload).await?;

        let raw: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;
        extract_reply(raw)
    }

    async fn send_message_streaming(
        &self,
        user_id: &str,
        messages: &[ChatMessage],
        deployment: &str,
    ) -> Result<CompletionStream> {
        tracing::debug!(user_id, deployment, count = messages.len(), "sending streaming completion request");

        let payload = Self::build_payload(messages, true)?;
        let response = self.post(deployment, &payload).await?;

        Ok(decode_chat_stream(response.bytes_stream()))
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        let messages = vec![
            ChatMessage::system(SUMMARY_SYSTEM_PROMPT),
            ChatMessage::user(text),
        ];

        let payload = Self::build_payload(&messages, false)?;
        let response = self.post(&self.summary_deployment, &payload).await?;

        let raw: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

        let choice = raw
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::MalformedResponse("response carried no choices".to_string()))?;

        match choice.message.content {
            Some(summary) => Ok(truncate_title(&summary, MAX_TITLE_LENGTH)),
            None => {
                tracing::warn!("summary response carried no content, keeping original text");
                Ok(text.to_string())
            }
        }
    }
}

fn extract_reply(raw: ChatCompletionResponse) -> Result<String> {
    let choice = raw
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::MalformedResponse("response carried no choices".to_string()))?;
    Ok(choice.message.content.unwrap_or_default())
}

/// Truncate to at most `max_chars` characters, never splitting a codepoint.
fn truncate_title(title: &str, max_chars: usize) -> String {
    match title.char_indices().nth(max_chars) {
        Some((idx, _)) => title[..idx].to_string(),
        None => title.to_string(),
    }
}

/// Builder for [`AzureChatClient`]
#[derive(Default)]
pub struct AzureChatClientBuilder {
    endpoint: Option<String>,
    api_version: Option<String>,
    api_key: Option<String>,
    use_managed_identity: bool,
    summary_deployment: Option<String>,
}

impl AzureChatClientBuilder {
    /// Set the Azure OpenAI endpoint (base URL)
    /// Example: "https://my-resource.openai.azure.com"
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Static API key. Omitting it selects managed identity.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Force bearer-token auth even when a key is configured.
    pub fn use_managed_identity(mut self, enabled: bool) -> Self {
        self.use_managed_identity = enabled;
        self
    }

    /// Deployment used for title summarization (default: gpt-4o).
    pub fn summary_deployment(mut self, deployment: impl Into<String>) -> Self {
        self.summary_deployment = Some(deployment.into());
        self
    }

    pub fn build(self) -> Result<AzureChatClient> {
        let endpoint = self
            .endpoint
            .ok_or_else(|| LlmError::Configuration("Endpoint is required".to_string()))?;
        let endpoint = endpoint.trim_end_matches('/').to_string();

        let api_version = self
            .api_version
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        let summary_deployment = self
            .summary_deployment
            .unwrap_or_else(|| DEFAULT_SUMMARY_DEPLOYMENT.to_string());

        let credential = select_credential(
            self.api_key.as_deref(),
            self.use_managed_identity,
            COGNITIVE_SERVICES_RESOURCE,
        )?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| LlmError::Configuration(format!("failed to create HTTP client: {}", e)))?;

        Ok(AzureChatClient {
            http,
            endpoint,
            api_version,
            credential,
            summary_deployment,
        })
    }
}

// ============================================================================
// RESPONSE TYPES (Chat Completions)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResponseMessage {
    role: String,
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_reply_from_fixture() {
        let raw: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"Hello there"},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        assert_eq!(extract_reply(raw).unwrap(), "Hello there");
    }

    #[test]
    fn test_extract_reply_null_content_is_empty() {
        let raw: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_reply(raw).unwrap(), "");
    }

    #[test]
    fn test_extract_reply_no_choices_is_malformed() {
        let raw: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            extract_reply(raw),
            Err(LlmError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_truncate_title_short_input_untouched() {
        assert_eq!(truncate_title("Short title", 20), "Short title");
    }

    #[test]
    fn test_truncate_title_caps_length() {
        let long = "An unreasonably verbose conversation title";
        let truncated = truncate_title(long, 20);
        assert_eq!(truncated.chars().count(), 20);
        assert!(long.starts_with(&truncated));
    }

    #[test]
    fn test_truncate_title_respects_codepoints() {
        let title = "é".repeat(25);
        assert_eq!(truncate_title(&title, 20).chars().count(), 20);
    }

    #[test]
    fn test_payload_omits_stream_when_buffered() {
        let messages = vec![ChatMessage::user("hi")];
        let payload = AzureChatClient::build_payload(&messages, false).unwrap();
        assert!(payload.get("stream").is_none());
        assert_eq!(payload["messages"][0]["role"], "user");
    }

    #[test]
    fn test_payload_sets_stream_flag() {
        let messages = vec![ChatMessage::user("hi")];
        let payload = AzureChatClient::build_payload(&messages, true).unwrap();
        assert_eq!(payload["stream"], true);
    }
}
