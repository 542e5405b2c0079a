//! Shared fixtures for unit tests.

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{Offering, Session};

/// Timestamp in the week of 2024-01-01 (a Monday); `day` 0 = Monday.
pub(crate) fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1 + day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .unwrap()
}

/// Session on `day` from `from` to `to` (hour, minute).
pub(crate) fn session(day: u32, from: (u32, u32), to: (u32, u32)) -> Session {
    Session::new(at(day, from.0, from.1), at(day, to.0, to.1))
}

/// Offering in `group` with one session per `(day, start_hour, end_hour)`.
pub(crate) fn offering(course_id: u32, group: &str, slots: &[(u32, u32, u32)]) -> Offering {
    slots.iter().fold(
        Offering::new(course_id).with_group(group).with_credits(5),
        |o, &(day, from, to)| o.with_session(session(day, (from, 0), (to, 0))),
    )
}
