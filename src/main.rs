use badge_card::cli::Cli;
use badge_card::config::Settings;
use badge_card::server;
use badge_card::storage::AssetUrlCache;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = Settings::load(Cli::parse())?;

    // RUST_LOG wins over the configured trace level when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.get_trace_level().to_string()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // One cache for the whole lifetime of the process, shared by all requests.
    let cache = AssetUrlCache::new();

    info!("Initializing badge card server.");
    server::serve(settings, cache).await?;

    Ok(())
}
