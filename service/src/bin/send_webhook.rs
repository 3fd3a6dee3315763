//! Posts a test webhook to a running giftwheel service, standing in for the
//! TikFinity relay.

use anyhow::Context;
use clap::Parser;
use giftwheel_types::api::WebhookPayload;
use tracing::info;

#[derive(Parser)]
#[command(name = "send-webhook", about = "Send a test webhook to a giftwheel service")]
struct Args {
    /// Gift sku to target. Omitted = the service picks a segment.
    sku: Option<String>,

    /// Base URL of the service.
    #[arg(long, default_value = "http://localhost:3001")]
    url: String,

    /// Shared secret; defaults to $GIFTWHEEL_WEBHOOK_TOKEN.
    #[arg(long)]
    token: Option<String>,

    /// Username to report in the payload.
    #[arg(long, default_value = "TestUser123")]
    username: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    let token = args
        .token
        .or_else(|| std::env::var("GIFTWHEEL_WEBHOOK_TOKEN").ok());

    info!(sku = ?args.sku, url = %args.url, "sending test webhook");
    let payload = WebhookPayload {
        value1: Some(args.username),
        value2: Some("Test gift".to_string()),
        value3: args.sku,
        secret: token.clone(),
    };

    let client = reqwest::Client::new();
    let mut request = client
        .post(format!("{}/webhook/tikfinity", args.url))
        .json(&payload);
    if let Some(token) = &token {
        request = request.header("x-tikfinity-token", token);
    }

    let response = request.send().await.context("send webhook")?;
    let status = response.status();
    let body: serde_json::Value = response.json().await.context("decode response")?;
    info!(%status, %body, "webhook response");
    Ok(())
}
