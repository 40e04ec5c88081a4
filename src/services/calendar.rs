use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

use crate::models::schedule::Schedule;
use crate::utils::time::is_weekend;

/// Where a day sits within an event's run of visible days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Single,
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayEvent {
    pub id: i64,
    pub title: String,
    pub segment: Segment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub day: u32,
    pub date: NaiveDate,
    pub events: Vec<DayEvent>,
}

/// Sunday-first rows; `None` pads days belonging to adjacent months.
pub type CalendarWeek = Vec<Option<CalendarDay>>;

pub fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// First and last day of the month.
pub fn month_range(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = first_of_month(year, month)?;
    let (ny, nm) = next_month(year, month);
    let end = first_of_month(ny, nm)? - Duration::days(1);
    Some((start, end))
}

pub fn prev_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Number of days from `from` through `to` an event is drawn on: every day,
/// or weekdays only.
fn visible_count(from: NaiveDate, to: NaiveDate, include_weekends: bool) -> i64 {
    if to < from {
        return 0;
    }
    let span = (to - from).num_days() + 1;
    if include_weekends {
        return span;
    }
    let full_weeks = span / 7;
    let tail_start = from + Duration::days(full_weeks * 7);
    let tail = (0..span % 7)
        .map(|offset| tail_start + Duration::days(offset))
        .filter(|day| !is_weekend(*day))
        .count() as i64;
    full_weeks * 5 + tail
}

fn segment_for(position: i64, len: i64) -> Segment {
    if len == 1 {
        Segment::Single
    } else if position == 0 {
        Segment::Start
    } else if position == len - 1 {
        Segment::End
    } else {
        Segment::Middle
    }
}

/// Lays out `events` over the month grid.
///
/// Segments are computed over an event's whole run of visible days, so an
/// event crossing a month boundary shows as `middle`/`end` at the top of the
/// following month.
pub fn build_calendar(year: i32, month: u32, events: &[Schedule]) -> Vec<CalendarWeek> {
    let Some((start, end)) = month_range(year, month) else {
        return Vec::new();
    };

    let mut by_day: HashMap<NaiveDate, Vec<DayEvent>> = HashMap::new();
    for event in events {
        let len = visible_count(event.start_date, event.end_date, event.include_weekends);
        let last = event.end_date.min(end);
        let mut cur = event.start_date.max(start);
        while cur <= last {
            if event.include_weekends || !is_weekend(cur) {
                let position =
                    visible_count(event.start_date, cur, event.include_weekends) - 1;
                by_day.entry(cur).or_default().push(DayEvent {
                    id: event.id,
                    title: event.title.clone(),
                    segment: segment_for(position, len),
                });
            }
            match cur.succ_opt() {
                Some(next) => cur = next,
                None => break,
            }
        }
    }

    let leading = start.weekday().num_days_from_sunday() as usize;
    let mut cells: Vec<Option<CalendarDay>> = vec![None; leading];
    let mut cur = start;
    while cur <= end {
        cells.push(Some(CalendarDay {
            day: cur.day(),
            date: cur,
            events: by_day.remove(&cur).unwrap_or_default(),
        }));
        match cur.succ_opt() {
            Some(next) => cur = next,
            None => break,
        }
    }
    while cells.len() % 7 != 0 {
        cells.push(None);
    }

    cells.chunks(7).map(|week| week.to_vec()).collect()
}
