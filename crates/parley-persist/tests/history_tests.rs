use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parley_llm::streaming::CompletionStream;
use parley_llm::{CompletionClient, LlmError};
use parley_persist::{
    BlobStore, ChatHistoryService, ChatMessage, ChatThread, HistoryOptions, MemoryBlobStore,
};

/// Completion client double: summarization takes the first 10 characters
/// and counts how often it was asked.
struct MockCompletionClient {
    summarize_calls: AtomicUsize,
}

impl MockCompletionClient {
    fn new() -> Self {
        Self {
            summarize_calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.summarize_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn send_message(
        &self,
        _user_id: &str,
        _messages: &[parley_llm::ChatMessage],
        _deployment: &str,
    ) -> Result<String, LlmError> {
        Ok("canned reply".to_string())
    }

    async fn send_message_streaming(
        &self,
        _user_id: &str,
        _messages: &[parley_llm::ChatMessage],
        _deployment: &str,
    ) -> Result<CompletionStream, LlmError> {
        Ok(Box::pin(futures::stream::iter(vec![Ok(
            "canned".to_string()
        )])))
    }

    async fn summarize(&self, text: &str) -> Result<String, LlmError> {
        self.summarize_calls.fetch_add(1, Ordering::SeqCst);
        Ok(text.chars().take(10).collect())
    }
}

fn service_with(
    options: HistoryOptions,
) -> (
    ChatHistoryService,
    Arc<MemoryBlobStore>,
    Arc<MockCompletionClient>,
) {
    let store = Arc::new(MemoryBlobStore::new());
    let completion = Arc::new(MockCompletionClient::new());
    let service = ChatHistoryService::with_options(
        store.clone() as Arc<dyn BlobStore>,
        completion.clone(),
        options,
    );
    (service, store, completion)
}

fn default_service() -> (
    ChatHistoryService,
    Arc<MemoryBlobStore>,
    Arc<MockCompletionClient>,
) {
    service_with(HistoryOptions::default())
}

#[tokio::test]
async fn test_list_threads_empty_for_unknown_user() {
    let (service, _, _) = default_service();
    assert!(service.list_threads("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_then_list_returns_single_summarized_entry() {
    let (service, _, completion) = default_service();

    let id = service.create_thread("u1", "My Title").await.unwrap();
    let threads = service.list_threads("u1").await.unwrap();

    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].id, id);
    // Mock summarization keeps the first 10 characters.
    assert_eq!(threads[0].title, "My Title");
    assert_eq!(completion.calls(), 1);
}

#[tokio::test]
async fn test_create_without_summarize_keeps_title() {
    let (service, _, completion) = service_with(HistoryOptions {
        summarize_on_create: false,
        ..HistoryOptions::default()
    });

    service.create_thread("u1", "Exact title kept").await.unwrap();
    let threads = service.list_threads("u1").await.unwrap();

    assert_eq!(threads[0].title, "Exact title kept");
    assert_eq!(completion.calls(), 0);
}

#[tokio::test]
async fn test_new_threads_are_prepended() {
    let (service, _, _) = service_with(HistoryOptions {
        summarize_on_create: false,
        ..HistoryOptions::default()
    });

    let first = service.create_thread("u1", "first").await.unwrap();
    let second = service.create_thread("u1", "second").await.unwrap();

    let threads = service.list_threads("u1").await.unwrap();
    assert_eq!(threads.len(), 2);
    assert_eq!(threads[0].id, second);
    assert_eq!(threads[1].id, first);
}

#[tokio::test]
async fn test_thread_ids_are_unique_and_opaque() {
    let (service, _, _) = service_with(HistoryOptions {
        summarize_on_create: false,
        ..HistoryOptions::default()
    });

    let a = service.create_thread("u1", "a").await.unwrap();
    let b = service.create_thread("u1", "b").await.unwrap();

    assert_ne!(a, b);
    assert_eq!(a.len(), 32);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn test_list_rewrites_only_over_length_titles() {
    let (service, store, completion) = default_service();

    // Seed an index directly: one 25-character title, one short one.
    let index = vec![
        ChatThread::new("t1", "This title is 25 chars ok"),
        ChatThread::new("t2", "short"),
    ];
    store
        .write("u1/index.json", &serde_json::to_vec(&index).unwrap())
        .await
        .unwrap();

    let threads = service.list_threads("u1").await.unwrap();
    assert_eq!(threads[0].title, "This title");
    assert_eq!(threads[1].title, "short");
    assert_eq!(completion.calls(), 1);

    // Idempotent after the first migration: nothing left to rewrite.
    let again = service.list_threads("u1").await.unwrap();
    assert_eq!(again, threads);
    assert_eq!(completion.calls(), 1);
}

#[tokio::test]
async fn test_migrated_index_is_persisted() {
    let (service, store, _) = default_service();

    let index = vec![ChatThread::new("t1", "An overly verbose conversation title")];
    store
        .write("u1/index.json", &serde_json::to_vec(&index).unwrap())
        .await
        .unwrap();

    service.list_threads("u1").await.unwrap();

    let raw = store.read("u1/index.json").await.unwrap().unwrap();
    let stored: Vec<ChatThread> = serde_json::from_slice(&raw).unwrap();
    assert_eq!(stored[0].title, "An overly");
}

#[tokio::test]
async fn test_history_roundtrip_preserves_order() {
    let (service, _, _) = default_service();

    let messages = vec![
        ChatMessage::user("A"),
        ChatMessage::assistant("B"),
        ChatMessage::user("C"),
    ];
    service.save_history("u1", "t1", &messages).await.unwrap();

    let loaded = service.load_history("u1", "t1").await.unwrap();
    assert_eq!(loaded, messages);
}

#[tokio::test]
async fn test_save_history_overwrites_in_full() {
    let (service, _, _) = default_service();

    service
        .save_history("u1", "t1", &[ChatMessage::user("old"), ChatMessage::assistant("log")])
        .await
        .unwrap();
    service
        .save_history("u1", "t1", &[ChatMessage::user("new")])
        .await
        .unwrap();

    let loaded = service.load_history("u1", "t1").await.unwrap();
    assert_eq!(loaded, vec![ChatMessage::user("new")]);
}

#[tokio::test]
async fn test_load_history_missing_is_empty() {
    let (service, _, _) = default_service();
    assert!(service.load_history("u1", "absent").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_thread_removes_index_entry_and_log() {
    let (service, _, _) = service_with(HistoryOptions {
        summarize_on_create: false,
        ..HistoryOptions::default()
    });

    let keep = service.create_thread("u1", "keep").await.unwrap();
    let doomed = service.create_thread("u1", "drop").await.unwrap();
    service
        .save_history("u1", &doomed, &[ChatMessage::user("bye")])
        .await
        .unwrap();

    service.delete_thread("u1", &doomed).await.unwrap();

    let threads = service.list_threads("u1").await.unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].id, keep);
    assert!(service.load_history("u1", &doomed).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_unknown_thread_is_ok() {
    let (service, _, _) = default_service();
    assert!(service.delete_thread("u1", "missing").await.is_ok());
}

#[tokio::test]
async fn test_users_are_isolated() {
    let (service, _, _) = service_with(HistoryOptions {
        summarize_on_create: false,
        ..HistoryOptions::default()
    });

    service.create_thread("alice", "hers").await.unwrap();
    assert!(service.list_threads("bob").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_persisted_objects_use_stored_field_casing() {
    let (service, store, _) = service_with(HistoryOptions {
        summarize_on_create: false,
        ..HistoryOptions::default()
    });

    let id = service.create_thread("u1", "Title").await.unwrap();
    service
        .save_history("u1", &id, &[ChatMessage::user("hello")])
        .await
        .unwrap();

    let index = String::from_utf8(store.read("u1/index.json").await.unwrap().unwrap()).unwrap();
    assert!(index.contains("\"Id\""));
    assert!(index.contains("\"Title\""));

    let log_key = format!("u1/{}.json", id);
    let log = String::from_utf8(store.read(&log_key).await.unwrap().unwrap()).unwrap();
    assert!(log.contains("\"Role\":\"user\""));
    assert!(log.contains("\"Content\":\"hello\""));
}
