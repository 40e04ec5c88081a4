pub mod attempt;
pub mod concept_video;
pub mod leaderboard;
pub mod news;
pub mod question;
pub mod schedule;
pub mod user;
