use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::schedule::{Schedule, ScheduleDraft};
use crate::services::calendar::CalendarWeek;
use crate::utils::time::{is_weekend, parse_iso_date};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScheduleForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub note: String,
    /// Checkbox: present (any value) means checked.
    #[serde(default)]
    pub include_weekends: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleFormError {
    #[error("title and start date are required")]
    MissingField,
    #[error("dates must be YYYY-MM-DD")]
    InvalidDate,
    #[error("end date is before start date")]
    EndBeforeStart,
}

impl ScheduleForm {
    /// Validates the raw form into a draft.
    ///
    /// A blank end date means a single-day entry. A single-day entry that
    /// falls on a weekend always shows weekends, otherwise it would be hidden.
    pub fn into_draft(self) -> Result<ScheduleDraft, ScheduleFormError> {
        let trimmed = ScheduleForm {
            title: self.title.trim().to_string(),
            start_date: self.start_date.trim().to_string(),
            end_date: self.end_date.trim().to_string(),
            note: self.note.trim().to_string(),
            include_weekends: self.include_weekends,
        };
        if trimmed.validate().is_err() {
            return Err(ScheduleFormError::MissingField);
        }

        let end_raw = if trimmed.end_date.is_empty() {
            trimmed.start_date.as_str()
        } else {
            trimmed.end_date.as_str()
        };
        let start_date = parse_iso_date(&trimmed.start_date).ok_or(ScheduleFormError::InvalidDate)?;
        let end_date = parse_iso_date(end_raw).ok_or(ScheduleFormError::InvalidDate)?;
        if end_date < start_date {
            return Err(ScheduleFormError::EndBeforeStart);
        }

        let mut include_weekends = trimmed.include_weekends.is_some();
        if start_date == end_date && is_weekend(start_date) {
            include_weekends = true;
        }

        Ok(ScheduleDraft {
            title: trimmed.title,
            start_date,
            end_date,
            note: trimmed.note,
            include_weekends,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<String>,
    pub month: Option<String>,
}

impl CalendarQuery {
    /// Requested month, or the month of `today` when either part is missing
    /// or malformed.
    pub fn resolve(&self, today: NaiveDate) -> (i32, u32) {
        let year = self.year.as_deref().and_then(|y| y.trim().parse::<i32>().ok());
        let month = self
            .month
            .as_deref()
            .and_then(|m| m.trim().parse::<u32>().ok())
            .filter(|m| (1..=12).contains(m));
        match (year, month) {
            (Some(y), Some(m)) if NaiveDate::from_ymd_opt(y, m, 1).is_some() => (y, m),
            _ => (today.year(), today.month()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarResponse {
    pub year: i32,
    pub month: u32,
    pub prev_year: i32,
    pub prev_month: u32,
    pub next_year: i32,
    pub next_month: u32,
    pub weeks: Vec<CalendarWeek>,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleAdminResponse {
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub schedules: Vec<Schedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_item: Option<Schedule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminLoginForm {
    #[serde(default)]
    pub password: String,
}

/// All-day event for client calendar widgets; `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CalendarFeedEvent {
    pub title: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(rename = "allDay")]
    pub all_day: bool,
}

impl From<&Schedule> for CalendarFeedEvent {
    fn from(s: &Schedule) -> Self {
        Self {
            title: s.title.clone(),
            start: s.start_date,
            end: s.end_date.succ_opt().unwrap_or(s.end_date),
            all_day: true,
        }
    }
}
