//! Session (meeting time) model.
//!
//! A session is one contiguous meeting of an offering, e.g. the Monday
//! lecture 09:00-10:30 of a given week.
//!
//! # Time Model
//! Timestamps are naive wall-clock times of the catalog. Intervals are
//! half-open: a session ending at 10:00 does not overlap one starting at
//! 10:00.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// A time interval [start, end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Session {
    /// Session start (inclusive).
    pub start: NaiveDateTime,
    /// Session end (exclusive).
    pub end: NaiveDateTime,
}

impl Session {
    /// Creates a new session.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Whether two sessions overlap in time.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Weekday of the session start.
    #[inline]
    pub fn weekday(&self) -> Weekday {
        self.start.weekday()
    }

    /// Calendar date of the session start.
    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Whether the session lies on Monday through Friday.
    ///
    /// Both endpoints must fall on a weekday.
    pub fn is_workday(&self) -> bool {
        is_workday(self.start.weekday()) && is_workday(self.end.weekday())
    }

    /// Duration in hours.
    pub fn duration_hours(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 3600.0
    }

    /// Whether the session overlaps the daily window [hour_start:00, hour_end:00).
    ///
    /// Compared by time of day. A session ending on a later date counts as
    /// ending at midnight.
    pub fn overlaps_hours(&self, hour_start: u32, hour_end: u32) -> bool {
        let start = minute_of_day(&self.start);
        let end = if self.end.date() > self.start.date() {
            MINUTES_PER_DAY
        } else {
            minute_of_day(&self.end)
        };
        start < hour_end * 60 && end > hour_start * 60
    }
}

fn minute_of_day(t: &NaiveDateTime) -> u32 {
    t.hour() * 60 + t.minute()
}

/// Whether a weekday is Monday through Friday.
#[inline]
pub fn is_workday(day: Weekday) -> bool {
    day.num_days_from_monday() < 5
}
