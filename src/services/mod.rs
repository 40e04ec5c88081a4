pub mod calendar;
pub mod grading_service;
pub mod leaderboard_service;
pub mod news_cache;
pub mod news_service;
pub mod quiz_service;
pub mod schedule_service;
pub mod seed_service;
pub mod session_store;
