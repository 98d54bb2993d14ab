use news_agent::config::SweeperConfig;
use news_agent::{store, utils, RetentionSweeper};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_tracing();

    let config = match SweeperConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let post_store = store::connect(&config.store, reqwest::Client::new())
        .await
        .map_err(|e| {
            error!("Failed to connect to post store: {}", e);
            e
        })?;

    let sweeper = RetentionSweeper::with_days(post_store, config.retention_days)?;
    info!(retention_days = config.retention_days, "Sweeping expired posts");

    let deleted = sweeper.sweep().await.map_err(|e| {
        error!("Retention sweep failed: {}", e);
        e
    })?;

    info!("Retention sweep finished: {} post(s) deleted", deleted);
    Ok(())
}
