//! Workload aggregation.
//!
//! Hour load counts parallel sessions once: sessions are bucketed per day
//! (or ISO week), merged into disjoint spans, and the span lengths summed.
//! Only Monday-Friday sessions contribute to hour load.

use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

use super::intervals::merge_intervals;
use crate::models::{CourseId, LoadPeriod, Offering, Session};

/// Calendar period that hour load is aggregated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LoadBucket {
    Day(NaiveDate),
    /// ISO week.
    Week { year: i32, week: u32 },
}

impl LoadBucket {
    /// Bucket containing the session start.
    pub fn of(session: &Session, period: LoadPeriod) -> Self {
        match period {
            LoadPeriod::Day => Self::Day(session.date()),
            LoadPeriod::Week => {
                let iso = session.start.iso_week();
                Self::Week {
                    year: iso.year(),
                    week: iso.week(),
                }
            }
        }
    }
}

/// Scheduled hours per load bucket, parallel sessions counted once.
///
/// Buckets without any scheduled time are omitted.
pub fn hours_by_period(schedule: &[&Offering], period: LoadPeriod) -> BTreeMap<LoadBucket, f64> {
    let mut buckets: BTreeMap<LoadBucket, Vec<Session>> = BTreeMap::new();
    for session in schedule.iter().flat_map(|o| o.sessions.iter()) {
        if !session.is_workday() {
            continue;
        }
        buckets
            .entry(LoadBucket::of(session, period))
            .or_default()
            .push(*session);
    }

    buckets
        .into_iter()
        .map(|(bucket, sessions)| {
            let hours = merge_intervals(sessions)
                .iter()
                .map(Session::duration_hours)
                .sum::<f64>();
            (bucket, hours)
        })
        .filter(|(_, hours)| *hours > 0.0)
        .collect()
}

/// Hours of every active bucket, in calendar order.
pub fn hours_per_period(schedule: &[&Offering], period: LoadPeriod) -> Vec<f64> {
    hours_by_period(schedule, period).into_values().collect()
}

/// Minimum and maximum hour load over active buckets.
///
/// Returns `(0.0, 0.0)` if nothing is scheduled on a workday.
pub fn load_range(schedule: &[&Offering], period: LoadPeriod) -> (f64, f64) {
    let hours = hours_per_period(schedule, period);
    if hours.is_empty() {
        return (0.0, 0.0);
    }
    let min = hours.iter().copied().fold(f64::INFINITY, f64::min);
    let max = hours.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (min, max)
}

/// Number of distinct courses with a session on each calendar day.
pub fn courses_per_day(schedule: &[&Offering]) -> BTreeMap<NaiveDate, usize> {
    let mut days: BTreeMap<NaiveDate, BTreeSet<CourseId>> = BTreeMap::new();
    for offering in schedule {
        for session in &offering.sessions {
            days.entry(session.date())
                .or_default()
                .insert(offering.course_id);
        }
    }
    days.into_iter()
        .map(|(day, courses)| (day, courses.len()))
        .collect()
}
