use anyhow::Result;
use parley_llm::{AzureChatClient, ChatMessage, CompletionClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Load Azure OpenAI configuration from environment variables
    let endpoint = std::env::var("AZURE_OPENAI_ENDPOINT")?;
    let api_key = std::env::var("AZURE_OPENAI_API_KEY").ok();
    let deployment = std::env::var("AZURE_OPENAI_DEPLOYMENT")
        .unwrap_or_else(|_| "gpt-4o".to_string());

    println!("Azure OpenAI Chat Completion Example");
    println!("=====================================\n");
    println!("Endpoint: {}", endpoint);
    println!("Deployment: {}\n", deployment);

    let mut builder = AzureChatClient::builder().endpoint(endpoint);
    if let Some(key) = api_key {
        builder = builder.api_key(key);
    }
    let client = builder.build()?;

    println!("Sending request...\n");

    let reply = client
        .send_message(
            "example-user",
            &[ChatMessage::user("What is the capital of France?")],
            &deployment,
        )
        .await?;

    println!("Response: {}", reply);

    Ok(())
}
