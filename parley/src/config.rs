use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub azure_openai: AzureOpenAiConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    pub chat: ChatConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    // Secret (from ENV only); absence selects managed identity
    #[serde(default)]
    pub azure_openai_api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AzureOpenAiConfig {
    pub endpoint: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub use_managed_identity: bool,
    #[serde(default = "default_summary_deployment")]
    pub summary_deployment: String,
}

/// Blob namespace backing the history service.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    Local {
        path: String,
    },
    Memory,
    Azure {
        account: String,
        #[serde(default = "default_container")]
        container: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_title_threshold")]
    pub title_threshold: usize,
    #[serde(default = "default_true")]
    pub summarize_on_create: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            title_threshold: default_title_threshold(),
            summarize_on_create: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Deployment receiving conversation turns.
    pub deployment: String,
    /// Prefer incremental delivery of assistant replies.
    #[serde(default)]
    pub streaming_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

fn default_api_version() -> String {
    "2024-05-01-preview".to_string()
}

fn default_summary_deployment() -> String {
    "gpt-4o".to_string()
}

fn default_container() -> String {
    "chat-history".to_string()
}

fn default_title_threshold() -> usize {
    20
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (with AZURE_OPENAI_, STORAGE_, etc. prefixes)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::default()
                    .prefix("AZURE_OPENAI")
                    .separator("_")
                    .try_parsing(true),
            )
            .add_source(
                Environment::default()
                    .prefix("STORAGE")
                    .separator("_")
                    .try_parsing(true),
            )
            .add_source(
                Environment::default()
                    .prefix("HISTORY")
                    .separator("_")
                    .try_parsing(true),
            )
            .add_source(
                Environment::default()
                    .prefix("CHAT")
                    .separator("_")
                    .try_parsing(true),
            )
            .add_source(
                Environment::default()
                    .prefix("LOG")
                    .separator("_")
                    .try_parsing(true),
            );

        let config = builder.build()?;

        let mut cfg: Config = config.try_deserialize()?;

        // The API key never lives in TOML; an empty value selects managed
        // identity.
        cfg.azure_openai_api_key = std::env::var("AZURE_OPENAI_API_KEY").unwrap_or_default();

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }
}
