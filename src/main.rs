/// Giftpool recorder service entry point
use giftpool_recorder::{config::ServerConfig, context::AppContext, server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(config.logging.env_filter())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let ctx = AppContext::new(config).await?;

    server::serve(ctx).await?;

    Ok(())
}
