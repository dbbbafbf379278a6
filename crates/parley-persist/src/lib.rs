pub mod error;
pub mod history;
pub mod models;
pub mod store;

pub use error::PersistError;
pub use history::{ChatHistoryService, HistoryOptions};
pub use models::{ChatMessage, ChatThread, MessageRole};
pub use store::{AzureBlobStore, BlobStore, LocalBlobStore, MemoryBlobStore};
