use std::sync::Arc;
use std::time::Duration;

use quiz_backend::{
    config::{get_config, init_config},
    services::news_service::{NewsService, NewsSettings},
    utils::time::SystemClock,
};
use reqwest::Client;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    init_config()?;
    let config = get_config();

    let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
    let news = NewsService::new(NewsSettings::from_config(config), client, Arc::new(SystemClock));
    let items = news.get_tech_news().await;
    for item in &items {
        tracing::info!(id = %item.id, title = %item.title, "cached headline");
    }
    tracing::info!(count = items.len(), "news cache warmed");
    Ok(())
}
