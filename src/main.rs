use chrono::Utc;
use dotenv::dotenv;
use eth_widget_feed::config::Config;
use eth_widget_feed::error::Result;
use eth_widget_feed::refresh::RefreshPipeline;
use std::time::Duration;
use tokio::time;
use tracing::{info, warn};
use tracing_subscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    info!("Starting widget feed");
    info!("Feed base URL: {}", config.base_url);
    info!("Refresh interval: {}s", config.refresh_interval_secs);

    let interval_secs = config.refresh_interval_secs;
    let pipeline = RefreshPipeline::new(config)?;

    // Minimal host loop: the real display surface schedules its own cycles
    // and treats next_refresh_at as a hint.
    let mut ticker = time::interval(Duration::from_secs(interval_secs));
    loop {
        ticker.tick().await;

        let (outcome, next_refresh_at) = pipeline.refresh(Utc::now()).await;
        let snapshot = outcome.snapshot();

        if outcome.is_degraded() {
            warn!(
                "Degraded cycle, showing placeholders until {}",
                next_refresh_at
            );
        } else {
            info!(
                "ETH {} | base fee {} (level {}) | next refresh {}",
                snapshot.price_text, snapshot.gas_text, snapshot.gas_level, next_refresh_at
            );
        }
    }
}
