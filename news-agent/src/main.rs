use news_agent::{utils, AgentConfig, BlogAgent};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_tracing();

    let config = match AgentConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!(mode = ?config.mode, models = ?config.models, "Starting news agent");

    let agent = BlogAgent::from_config(&config).await.map_err(|e| {
        error!("Failed to initialise clients: {}", e);
        e
    })?;

    let summary = agent.run().await;
    for saved in &summary.saved {
        info!(
            category = %saved.category,
            origin = ?saved.origin,
            title = %saved.title,
            source_url = %saved.source_url,
            "Saved"
        );
    }
    if !summary.skipped_categories.is_empty() {
        info!(skipped = ?summary.skipped_categories, "Categories without a new post");
    }

    info!("News agent finished: {} post(s) saved", summary.saved_count());
    Ok(())
}
