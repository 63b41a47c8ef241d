//! Re-register the Helius webhook that feeds this service
//! Usage: cargo run --bin sync_webhooks [--url https://host:port/webhook] [--list]

use migration_sentinel::config::AppConfig;
use migration_sentinel::helius::{HeliusWebhookClient, WebhookRegistration};

struct Args {
    url: Option<String>,
    list_only: bool,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        url: None,
        list_only: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--url" => {
                if i + 1 < args.len() {
                    parsed.url = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    eprintln!("ERROR: --url requires a value");
                    std::process::exit(1);
                }
            }
            "--list" => {
                parsed.list_only = true;
                i += 1;
            }
            "--help" | "-h" => {
                println!("Usage: sync_webhooks [--url URL] [--list]");
                println!("  --url URL  Public webhook URL (default: webhook.public_url from config)");
                println!("  --list     Only list existing webhooks");
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                std::process::exit(1);
            }
        }
    }

    parsed
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let args = parse_args();
    let config = AppConfig::load()?;

    if config.helius.api_key.is_empty() {
        eprintln!("ERROR: Helius API key is not configured");
        std::process::exit(1);
    }

    let client = HeliusWebhookClient::new(&config.helius)?;

    println!("=== Helius Webhook Sync ===");

    let existing = client.list_webhooks().await?;
    println!("Existing webhooks: {}", existing.len());
    for webhook in &existing {
        println!("  - {} -> {}", webhook.webhook_id, webhook.webhook_url);
    }

    if args.list_only {
        return Ok(());
    }

    let Some(url) = args.url.or(config.webhook.public_url.clone()) else {
        eprintln!("ERROR: no webhook URL given (use --url or webhook.public_url)");
        std::process::exit(1);
    };

    let registration = WebhookRegistration::enhanced(
        &url,
        &config.migration.watch_address,
        config.webhook.auth_token.clone(),
    );

    println!();
    println!("Registering {} for {}", url, config.migration.watch_address);
    match client.replace_all(&registration).await {
        Ok(webhook_id) => {
            println!("✓ Webhook registered: {}", webhook_id);
            Ok(())
        }
        Err(e) => {
            eprintln!("ERROR: Webhook registration failed: {:#}", e);
            std::process::exit(1);
        }
    }
}
