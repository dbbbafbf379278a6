mod message;
mod thread;

pub use message::{ChatMessage, MessageRole};
pub use thread::ChatThread;
