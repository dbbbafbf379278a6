//! Blob namespace the history service persists into.
//!
//! Three backends: local filesystem (development), in-memory (tests and
//! ephemeral use), and Azure Blob Storage over plain REST (production).

mod azure;
mod local;
mod memory;

pub use azure::AzureBlobStore;
pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;

use async_trait::async_trait;

use crate::error::Result;

/// Whole-object key-value storage.
///
/// Every write replaces the object in full; there is no partial update and
/// no concurrency token. A missing object reads as `None`, never an error.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read an object, `None` when absent.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Overwrite an object in full, creating it if absent.
    async fn write(&self, key: &str, data: &[u8]) -> Result<()>;

    /// Delete an object; deleting an absent object is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}
