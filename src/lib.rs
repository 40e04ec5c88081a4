pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::services::{
    leaderboard_service::LeaderboardService,
    news_service::{NewsService, NewsSettings},
    quiz_service::QuizService,
    schedule_service::ScheduleService,
    session_store::SessionStore,
};
use crate::utils::time::{Clock, SystemClock};
use reqwest::Client;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    pub quiz_service: QuizService,
    pub leaderboard_service: LeaderboardService,
    pub schedule_service: ScheduleService,
    pub news_service: NewsService,
    pub sessions: SessionStore,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &Config) -> error::Result<Self> {
        Self::with_clock(pool, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        pool: SqlitePool,
        config: &Config,
        clock: Arc<dyn Clock>,
    ) -> error::Result<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        let quiz_service = QuizService::new(pool.clone());
        let leaderboard_service = LeaderboardService::new(pool.clone());
        let schedule_service = ScheduleService::new(pool.clone());
        let news_service = NewsService::new(
            NewsSettings::from_config(config),
            http_client,
            clock.clone(),
        );

        Ok(Self {
            pool,
            config: Arc::new(config.clone()),
            quiz_service,
            leaderboard_service,
            schedule_service,
            news_service,
            sessions: SessionStore::new(clock.clone()),
            clock,
        })
    }
}
