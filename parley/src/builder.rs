//! High-level wiring of a completion client and a history service.

use anyhow::{Context, Result};
use std::sync::Arc;

use parley_llm::{
    AzureChatClient, CompletionClient, ManagedIdentityCredential, STORAGE_RESOURCE,
};
use parley_persist::{
    AzureBlobStore, BlobStore, ChatHistoryService, HistoryOptions, LocalBlobStore, MemoryBlobStore,
};

use crate::config::{Config, StorageConfig};

/// Builder for a fully wired [`Parley`] backend
///
/// # Example
///
/// ```rust,no_run
/// use parley::prelude::*;
///
/// # fn main() -> Result<()> {
/// let backend = ParleyBuilder::new()
///     .endpoint("https://my-resource.openai.azure.com")
///     .api_key("...")
///     .storage(StorageConfig::Local { path: "./chat-history".to_string() })
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ParleyBuilder {
    // Completion endpoint
    endpoint: Option<String>,
    api_key: Option<String>,
    api_version: Option<String>,
    use_managed_identity: bool,
    summary_deployment: Option<String>,

    // Storage
    storage: StorageConfig,

    // History behavior
    history: HistoryOptions,

    // Chat defaults
    deployment: String,
    streaming_enabled: bool,
}

impl Default for ParleyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ParleyBuilder {
    pub fn new() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            api_version: None,
            use_managed_identity: false,
            summary_deployment: None,
            storage: StorageConfig::Local {
                path: "./chat-history".to_string(),
            },
            history: HistoryOptions::default(),
            deployment: "gpt-4o".to_string(),
            streaming_enabled: false,
        }
    }

    /// Set the Azure OpenAI endpoint (required)
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the API key; omit it to authenticate with managed identity
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Force bearer-token auth even when a key is configured
    pub fn use_managed_identity(mut self, enabled: bool) -> Self {
        self.use_managed_identity = enabled;
        self
    }

    pub fn summary_deployment(mut self, deployment: impl Into<String>) -> Self {
        self.summary_deployment = Some(deployment.into());
        self
    }

    /// Choose the blob backend (default: local ./chat-history)
    pub fn storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    /// Tune the history service behavior
    pub fn history_options(mut self, options: HistoryOptions) -> Self {
        self.history = options;
        self
    }

    /// Deployment receiving conversation turns (default: gpt-4o)
    pub fn deployment(mut self, deployment: impl Into<String>) -> Self {
        self.deployment = deployment.into();
        self
    }

    /// Prefer incremental delivery of assistant replies
    pub fn streaming_enabled(mut self, enabled: bool) -> Self {
        self.streaming_enabled = enabled;
        self
    }

    /// Build the backend
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not set or the completion client
    /// cannot be constructed.
    pub fn build(self) -> Result<Parley> {
        let endpoint = self
            .endpoint
            .context("Endpoint is required. Call .endpoint(url)")?;

        let mut client = AzureChatClient::builder()
            .endpoint(endpoint)
            .use_managed_identity(self.use_managed_identity);
        if let Some(key) = self.api_key.filter(|k| !k.is_empty()) {
            client = client.api_key(key);
        }
        if let Some(version) = self.api_version {
            client = client.api_version(version);
        }
        if let Some(deployment) = self.summary_deployment {
            client = client.summary_deployment(deployment);
        }
        let completions: Arc<dyn CompletionClient> = Arc::new(
            client
                .build()
                .context("Failed to create completion client")?,
        );

        let store: Arc<dyn BlobStore> = match self.storage {
            StorageConfig::Local { path } => Arc::new(LocalBlobStore::new(path)),
            StorageConfig::Memory => Arc::new(MemoryBlobStore::new()),
            StorageConfig::Azure { account, container } => Arc::new(AzureBlobStore::new(
                account,
                container,
                Arc::new(ManagedIdentityCredential::new(STORAGE_RESOURCE)),
            )),
        };

        let history = Arc::new(ChatHistoryService::with_options(
            store,
            Arc::clone(&completions),
            self.history,
        ));

        Ok(Parley {
            completions,
            history,
            deployment: self.deployment,
            streaming_enabled: self.streaming_enabled,
        })
    }
}

/// A configured chat backend: completion client plus history service
pub struct Parley {
    completions: Arc<dyn CompletionClient>,
    history: Arc<ChatHistoryService>,
    deployment: String,
    streaming_enabled: bool,
}

impl Parley {
    /// Wire a backend straight from loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = ParleyBuilder::new()
            .endpoint(&config.azure_openai.endpoint)
            .api_version(&config.azure_openai.api_version)
            .use_managed_identity(config.azure_openai.use_managed_identity)
            .summary_deployment(&config.azure_openai.summary_deployment)
            .storage(config.storage.clone())
            .history_options(HistoryOptions {
                title_threshold: config.history.title_threshold,
                summarize_on_create: config.history.summarize_on_create,
            })
            .deployment(&config.chat.deployment)
            .streaming_enabled(config.chat.streaming_enabled);

        if !config.azure_openai_api_key.is_empty() {
            builder = builder.api_key(&config.azure_openai_api_key);
        }

        builder.build()
    }

    /// Get the completion client
    pub fn completions(&self) -> &Arc<dyn CompletionClient> {
        &self.completions
    }

    /// Get the history service
    pub fn history(&self) -> &Arc<ChatHistoryService> {
        &self.history
    }

    /// Default deployment for conversation turns
    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    /// Whether callers should prefer the streaming send path
    pub fn streaming_enabled(&self) -> bool {
        self.streaming_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_endpoint() {
        assert!(ParleyBuilder::new().build().is_err());
    }

    #[test]
    fn test_build_with_memory_storage() {
        let backend = ParleyBuilder::new()
            .endpoint("https://test-resource.openai.azure.com")
            .api_key("test-key")
            .storage(StorageConfig::Memory)
            .deployment("gpt-4o")
            .streaming_enabled(true)
            .build()
            .unwrap();

        assert_eq!(backend.deployment(), "gpt-4o");
        assert!(backend.streaming_enabled());
    }
}
