//! automod Bot
//!
//! Discord bot that classifies every message it can read with a streamed
//! guard model and removes unsafe messages in servers that opted in.

use anyhow::Result;
use clap::Parser;
use serenity::all::GatewayIntents;
use serenity::Client;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};

mod commands;
mod config;
mod context;
mod discord;
mod moderator;

use config::BotConfig;
use context::ServiceContext;
use discord::Handler;

#[derive(Parser, Debug)]
#[command(name = "automod")]
#[command(about = "AI automod bot for Discord", long_about = None)]
pub(crate) struct Cli {
    /// Discord bot token
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    discord_token: String,

    /// Base URL of the OpenAI-compatible classification service
    #[arg(long, env = "CHUTES_BASE_URL")]
    base_url: Option<String>,

    /// Guard model name
    #[arg(long, env = "CHUTES_MODEL")]
    model: Option<String>,

    /// API key for the classification service
    #[arg(long, env = "CHUTES_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Classification timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Configuration file path
    #[arg(short, long, default_value = "automod.yaml")]
    config: String,

    /// Group configuration store path
    #[arg(long, env = "AUTOMOD_STORE")]
    store: Option<PathBuf>,

    /// Serve Prometheus metrics on this address
    #[arg(long)]
    metrics_addr: Option<SocketAddr>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("Starting automod bot");

    let config = BotConfig::load(&cli.config, &cli)?;
    info!("Configuration loaded successfully");
    info!("Classifier endpoint: {}", config.classifier.base_url);
    info!("Model: {}", config.classifier.model);
    info!("Group store: {}", config.store.path.display());

    init_metrics(cli.metrics_addr)?;

    let context = ServiceContext::init(config)?;

    let handler = Handler::new(context.moderator(), context.store());
    let mut client = Client::builder(&cli.discord_token, gateway_intents())
        .event_handler(handler)
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Shutdown signal received, disconnecting...");
        shard_manager.shutdown_all().await;
    });

    let result = client.start().await;
    context.shutdown();

    if let Err(e) = result {
        return Err(anyhow::anyhow!("Gateway client failed: {}", e));
    }

    info!("Shutdown complete");
    Ok(())
}

/// Gateway events the bot subscribes to. Direct messages are received so
/// they can be classified, though they are never enforced.
fn gateway_intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("automod=debug,serenity=info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("automod=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Describe metrics and, when an address is given, serve them for scraping
fn init_metrics(addr: Option<SocketAddr>) -> Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    if let Some(addr) = addr {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;
        info!("Metrics exporter listening on http://{}", addr);
    }

    metrics::describe_counter!(
        "automod_classifications_total",
        "Total number of classifications by safety level"
    );
    metrics::describe_counter!(
        "automod_classification_errors_total",
        "Classification failures by kind"
    );
    metrics::describe_histogram!(
        "automod_classification_latency_ms",
        metrics::Unit::Milliseconds,
        "Classification latency in milliseconds"
    );
    metrics::describe_counter!(
        "automod_enforcements_total",
        "Enforcement actions applied by kind"
    );
    metrics::describe_counter!(
        "automod_enforcement_failures_total",
        "Failed enforcement steps by step"
    );
    metrics::describe_counter!("automod_toggles_total", "Per-server enable/disable changes");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_intents_include_direct_messages() {
        let intents = gateway_intents();

        assert!(intents.contains(GatewayIntents::GUILD_MESSAGES));
        assert!(intents.contains(GatewayIntents::DIRECT_MESSAGES));
        assert!(intents.contains(GatewayIntents::MESSAGE_CONTENT));
    }
}
