pub mod azure_openai;
pub mod credentials;
pub mod error;
pub mod streaming;
pub mod traits;
pub mod types;

pub use azure_openai::{AzureChatClient, AzureChatClientBuilder};
pub use credentials::{
    ApiKeyCredential, CredentialProvider, ManagedIdentityCredential,
    COGNITIVE_SERVICES_RESOURCE, STORAGE_RESOURCE,
};
pub use error::{LlmError, Result};
pub use streaming::{decode_chat_stream, ChatStreamChunk, CompletionStream};
pub use traits::CompletionClient;
pub use types::{ChatMessage, Role};
