use std::path::PathBuf;

use quiz_backend::{
    config::{get_config, init_config},
    database::pool::{create_pool, run_migrations},
    services::seed_service::SeedService,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    init_config()?;
    let config = get_config();

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let report = SeedService::new(pool)
        .seed_from_files(
            &data_dir.join("seed_questions.json"),
            &data_dir.join("seed_videos.json"),
        )
        .await?;
    tracing::info!(
        questions = report.questions,
        videos = report.videos,
        "seeding finished"
    );
    Ok(())
}
