use std::sync::Arc;
use uuid::Uuid;

use parley_llm::CompletionClient;

use crate::error::Result;
use crate::models::{ChatMessage, ChatThread};
use crate::store::BlobStore;

/// Behavior knobs for the history service.
///
/// The thread-title policy differs between deployments, so both the length
/// threshold and whether new threads are summarized immediately are
/// configuration rather than constants.
#[derive(Debug, Clone)]
pub struct HistoryOptions {
    /// Titles longer than this many characters are rewritten on list.
    pub title_threshold: usize,
    /// Compress titles through the completion client at thread creation.
    pub summarize_on_create: bool,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            title_threshold: 20,
            summarize_on_create: true,
        }
    }
}

/// Durable CRUD over per-user thread indexes and per-thread message logs.
///
/// The service is the sole writer of both objects and always rewrites them
/// in full; two concurrent writers race and the later overwrite wins. A
/// missing index or log reads as empty, never as an error.
pub struct ChatHistoryService {
    store: Arc<dyn BlobStore>,
    completion: Arc<dyn CompletionClient>,
    options: HistoryOptions,
}

impl ChatHistoryService {
    pub fn new(store: Arc<dyn BlobStore>, completion: Arc<dyn CompletionClient>) -> Self {
        Self::with_options(store, completion, HistoryOptions::default())
    }

    pub fn with_options(
        store: Arc<dyn BlobStore>,
        completion: Arc<dyn CompletionClient>,
        options: HistoryOptions,
    ) -> Self {
        Self {
            store,
            completion,
            options,
        }
    }

    fn index_key(user_id: &str) -> String {
        format!("{}/index.json", user_id)
    }

    fn thread_key(user_id: &str, thread_id: &str) -> String {
        format!("{}/{}.json", user_id, thread_id)
    }

    async fn load_index(&self, user_id: &str) -> Result<Vec<ChatThread>> {
        match self.store.read(&Self::index_key(user_id)).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    async fn save_index(&self, user_id: &str, threads: &[ChatThread]) -> Result<()> {
        let bytes = serde_json::to_vec(threads)?;
        self.store.write(&Self::index_key(user_id), &bytes).await
    }

    /// List a user's threads, newest first.
    ///
    /// Over-length titles are compressed through the completion client and
    /// the rewritten index is persisted before returning; after the first
    /// rewrite the check finds nothing to do.
    pub async fn list_threads(&self, user_id: &str) -> Result<Vec<ChatThread>> {
        let mut threads = self.load_index(user_id).await?;

        let mut changed = false;
        for thread in threads.iter_mut() {
            if thread.title.chars().count() > self.options.title_threshold {
                tracing::debug!(user_id, thread_id = %thread.id, "rewriting over-length title");
                thread.title = self.completion.summarize(&thread.title).await?;
                changed = true;
            }
        }
        if changed {
            self.save_index(user_id, &threads).await?;
        }

        Ok(threads)
    }

    /// Create a thread and prepend it to the user's index.
    pub async fn create_thread(&self, user_id: &str, title: &str) -> Result<String> {
        let mut threads = self.load_index(user_id).await?;

        let id = Uuid::new_v4().simple().to_string();
        let title = if self.options.summarize_on_create {
            self.completion.summarize(title).await?
        } else {
            title.to_string()
        };

        threads.insert(0, ChatThread::new(id.clone(), title));
        self.save_index(user_id, &threads).await?;

        tracing::debug!(user_id, thread_id = %id, "created thread");
        Ok(id)
    }

    /// Message log for one thread, empty when absent.
    pub async fn load_history(&self, user_id: &str, thread_id: &str) -> Result<Vec<ChatMessage>> {
        match self.store.read(&Self::thread_key(user_id, thread_id)).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    /// Overwrite a thread's message log in full.
    pub async fn save_history(
        &self,
        user_id: &str,
        thread_id: &str,
        messages: &[ChatMessage],
    ) -> Result<()> {
        let bytes = serde_json::to_vec(messages)?;
        self.store
            .write(&Self::thread_key(user_id, thread_id), &bytes)
            .await
    }

    /// Remove a thread from the index and delete its message log.
    ///
    /// The index is persisted only when an entry was actually removed; the
    /// log blob is deleted unconditionally.
    pub async fn delete_thread(&self, user_id: &str, thread_id: &str) -> Result<()> {
        let mut threads = self.load_index(user_id).await?;

        let before = threads.len();
        threads.retain(|t| t.id != thread_id);
        if threads.len() != before {
            self.save_index(user_id, &threads).await?;
        }

        self.store
            .delete(&Self::thread_key(user_id, thread_id))
            .await?;

        tracing::debug!(user_id, thread_id, "deleted thread");
        Ok(())
    }
}
