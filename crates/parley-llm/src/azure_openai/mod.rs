mod client;

pub use client::{AzureChatClient, AzureChatClientBuilder};
