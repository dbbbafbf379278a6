use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Completion client error: {0}")]
    Completion(#[from] parley_llm::LlmError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, PersistError>;
