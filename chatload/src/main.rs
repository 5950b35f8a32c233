use anyhow::Context;
use chatload::cli::ChatloadCli;
use chatload::prelude::*;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_LOG_FILTER: &str = "chatload=info,mock_service=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = ChatloadCli::parse();
    let config = cli.test_config().context("Invalid configuration")?;
    let service = HttpChatService::new(&config.base_url, config.request_timeout)
        .context("Unable to build HTTP client")?;

    if cli.register {
        for user in &config.users {
            match service.register(user).await {
                Ok(()) => info!("Registered {}", user.username),
                Err(error) => warn!("Unable to register {}: {error}", user.username),
            }
        }
    }

    println!("=== Load simulation started ===");
    let recorder = LatencyRecorder::new();
    let summary = chatload::orchestrator::run(&config, Arc::new(service), &recorder).await;
    info!(
        "{} of {} users completed",
        summary.completed(),
        summary.outcomes.len()
    );

    println!("\n=== Load test results ===");
    println!("{}", Report::generate(&recorder.snapshot()));

    Ok(())
}
