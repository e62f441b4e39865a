//! Turnstile - project-listing intake gateway

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use turnstile::{config::Args, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("turnstile={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // Print startup banner
    info!("======================================");
    info!("  Turnstile - listing intake gateway");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("GitHub API: {}", args.github_api_url);
    info!(
        "Records repo: {}/{} @ {}",
        args.records_repo_owner, args.records_repo_name, args.records_repo_branch
    );
    info!(
        "Assets repo: {}/{} @ {}",
        args.assets_repo_owner, args.assets_repo_name, args.assets_repo_branch
    );
    info!("Auto-fork: {}", args.auto_fork);
    info!(
        "Rate limit: {} requests per {}s",
        args.rate_limit_max_requests, args.rate_limit_window_secs
    );
    info!("======================================");

    let state = Arc::new(server::AppState::new(args));
    server::run(state).await?;

    Ok(())
}
