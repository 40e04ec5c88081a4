pub mod news_dto;
pub mod quiz_dto;
pub mod schedule_dto;
