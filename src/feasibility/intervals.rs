//! Interval algorithms over sessions.
//!
//! - Overlap detection by sort-and-sweep, O(n log n), with the pairwise
//!   O(n²) check kept as a reference.
//! - Classic interval merging into disjoint spans.
//!
//! All sessions are half-open `[start, end)` with `start <= end`.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 14.3 (Interval Trees)

use chrono::NaiveDateTime;

use crate::models::Session;

/// Whether any two sessions overlap, by sorting on start time and sweeping.
///
/// # Algorithm
/// Sessions are sorted by start and processed in runs of equal start time.
/// A run overlaps an earlier session iff its start lies before the latest
/// end seen so far. Within a run, two sessions of positive length always
/// overlap; zero-length sessions overlap nothing that starts with them.
pub fn sessions_overlap(mut sessions: Vec<Session>) -> bool {
    sessions.sort_unstable_by_key(|s| s.start);

    let mut latest_end: Option<NaiveDateTime> = None;
    let mut i = 0;
    while i < sessions.len() {
        let start = sessions[i].start;
        let mut run_end = i;
        while run_end < sessions.len() && sessions[run_end].start == start {
            run_end += 1;
        }
        let run = &sessions[i..run_end];

        if latest_end.is_some_and(|end| start < end) {
            return true;
        }
        if run.iter().filter(|s| s.end > s.start).count() > 1 {
            return true;
        }

        let run_max = run.iter().map(|s| s.end).max();
        latest_end = latest_end.max(run_max);
        i = run_end;
    }

    false
}

/// Whether any two sessions overlap, checking every pair.
pub fn sessions_overlap_pairwise(sessions: &[Session]) -> bool {
    sessions
        .iter()
        .enumerate()
        .any(|(i, a)| sessions[i + 1..].iter().any(|b| a.overlaps(b)))
}

/// Merges overlapping or adjoining sessions into disjoint, sorted spans.
pub fn merge_intervals(mut sessions: Vec<Session>) -> Vec<Session> {
    sessions.sort_unstable_by_key(|s| (s.start, s.end));

    let mut merged: Vec<Session> = Vec::with_capacity(sessions.len());
    for current in sessions {
        match merged.last_mut() {
            Some(last) if current.start <= last.end => {
                last.end = last.end.max(current.end);
            }
            _ => merged.push(current),
        }
    }
    merged
}
