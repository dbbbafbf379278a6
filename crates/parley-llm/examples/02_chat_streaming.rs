use anyhow::Result;
use futures::StreamExt;
use parley_llm::{AzureChatClient, ChatMessage, CompletionClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Load Azure OpenAI configuration from environment variables
    let endpoint = std::env::var("AZURE_OPENAI_ENDPOINT")?;
    let api_key = std::env::var("AZURE_OPENAI_API_KEY").ok();
    let deployment = std::env::var("AZURE_OPENAI_DEPLOYMENT")
        .unwrap_or_else(|_| "gpt-4o".to_string());

    println!("Azure OpenAI Streaming Chat Example");
    println!("====================================\n");
    println!("Endpoint: {}", endpoint);
    println!("Deployment: {}\n", deployment);

    let mut builder = AzureChatClient::builder().endpoint(endpoint);
    if let Some(key) = api_key {
        builder = builder.api_key(key);
    }
    let client = builder.build()?;

    println!("Streaming response:\n");
    println!("---");

    let mut stream = client
        .send_message_streaming(
            "example-user",
            &[ChatMessage::user(
                "Write a short poem about the sea in exactly 4 lines.",
            )],
            &deployment,
        )
        .await?;

    while let Some(delta) = stream.next().await {
        print!("{}", delta?);
        std::io::Write::flush(&mut std::io::stdout())?;
    }

    println!("\n---\nStream complete!");

    Ok(())
}
