//! # Parley - Chat Backend for Rust
//!
//! Parley is a chat-application backend built from two collaborating parts:
//! - **Completion client** (`parley-llm`): forwards conversation turns to an
//!   Azure OpenAI deployment, buffered or streamed, with api-key or
//!   managed-identity auth.
//! - **History store** (`parley-persist`): blob-backed per-user thread
//!   indexes and per-thread message logs, with lazy title compression.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parley::prelude::*;
//! use parley_llm::ChatMessage;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = ParleyBuilder::new()
//!         .endpoint("https://my-resource.openai.azure.com")
//!         .api_key(std::env::var("AZURE_OPENAI_API_KEY")?)
//!         .build()?;
//!
//!     let thread_id = backend.history().create_thread("user-1", "Trip planning").await?;
//!
//!     let reply = backend
//!         .completions()
//!         .send_message(
//!             "user-1",
//!             &[ChatMessage::user("Where should I go in May?")],
//!             backend.deployment(),
//!         )
//!         .await?;
//!     println!("{}", reply);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! `Config::load()` layers `config/default.toml`, `config/{ENV}.toml` and
//! prefixed environment variables; the API key comes only from
//! `AZURE_OPENAI_API_KEY`, and leaving it unset selects managed identity.

// Re-export all public APIs
pub use parley_llm as llm;
pub use parley_persist as persist;

// Re-export commonly used types
pub use parley_llm::{AzureChatClient, ChatMessage, CompletionClient, LlmError, Role};
pub use parley_persist::{ChatHistoryService, ChatThread, HistoryOptions, PersistError};

/// Application-level configuration loading
pub mod config;

/// High-level builder for wiring a backend
pub mod builder;

pub use builder::{Parley, ParleyBuilder};
pub use config::Config;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging from configuration.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_logging(config: &config::LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}

/// Convenient prelude with commonly used types
pub mod prelude {
    pub use crate::builder::{Parley, ParleyBuilder};
    pub use crate::config::{Config, StorageConfig};
    pub use crate::llm::{ChatMessage, CompletionClient, Role};
    pub use crate::persist::{ChatHistoryService, ChatThread, HistoryOptions};
    pub use anyhow::Result;
}
