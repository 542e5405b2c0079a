//! Greedy hill-climbing constructor.
//!
//! # Algorithm
//!
//! Starting from the required offerings:
//! 1. Rebuild the candidate pool: drop offerings whose course or group is
//!    already taken and those that would make the partial schedule invalid.
//! 2. Pick the next offering. On an empty schedule this is the candidate
//!    with the highest mark; otherwise the candidate maximizing the mark of
//!    the extended schedule. Ties go to the earliest candidate.
//! 3. Stop when the schedule is valid as complete and either has reached
//!    the maximum course count or no candidate remains.
//!
//! Fails when no candidate remains (or the maximum count is reached)
//! before the schedule becomes valid as complete.
//!
//! # Complexity
//! O(k · n · v) for k picks over n offerings, v being one validity check.

use log::{debug, info};

use super::{to_schedule, ScheduleSolver};
use crate::feasibility::FeasibilityChecker;
use crate::models::{Offering, Schedule};
use crate::preprocess::PreparedProblem;
use crate::scoring::Mark;

/// Greedy constructor with one-ply lookahead.
#[derive(Debug, Clone, Default)]
pub struct GreedyConstructor;

impl GreedyConstructor {
    /// Creates a greedy constructor.
    pub fn new() -> Self {
        Self
    }

    /// Builds one schedule, or `None` if the greedy path dead-ends.
    pub fn build(&self, problem: &PreparedProblem<'_>) -> Option<Schedule> {
        let checker = problem.checker();
        let max = checker.constraints().course_count().max;

        let mut schedule: Vec<&Offering> = problem.required().iter().collect();
        let mut available: Vec<&Offering> = problem
            .offerings()
            .iter()
            .filter(|o| !problem.is_required(o.course_id))
            .collect();

        loop {
            available = rebuild_available(checker, &mut schedule, available);
            let complete = checker.is_valid(&schedule, true);
            if complete && schedule.len() >= max {
                break;
            }

            let next = if schedule.is_empty() {
                best_by_offering_mark(problem, &available)
            } else {
                best_by_schedule_mark(problem, &mut schedule, &available)
            };

            match next {
                None if complete => break,
                None => {
                    info!(
                        "greedy: no candidate left with {} offerings, schedule incomplete",
                        schedule.len()
                    );
                    return None;
                }
                Some(_) if schedule.len() >= max => {
                    info!("greedy: reached {max} offerings without a valid schedule");
                    return None;
                }
                Some(offering) => {
                    debug!(
                        "greedy: picked course {} (mark {})",
                        offering.course_id,
                        problem.mark(offering.course_id)
                    );
                    schedule.push(offering);
                }
            }
        }

        info!("greedy: built schedule with {} offerings", schedule.len());
        Some(to_schedule(&schedule))
    }
}

impl ScheduleSolver for GreedyConstructor {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn solve(&self, problem: &PreparedProblem<'_>) -> Option<Schedule> {
        self.build(problem)
    }
}

/// Keeps candidates that are still compatible with the partial schedule.
fn rebuild_available<'p>(
    checker: &FeasibilityChecker<'_>,
    schedule: &mut Vec<&'p Offering>,
    candidates: Vec<&'p Offering>,
) -> Vec<&'p Offering> {
    candidates
        .into_iter()
        .filter(|candidate| {
            let taken = schedule
                .iter()
                .any(|o| o.course_id == candidate.course_id || o.shares_group(candidate));
            if taken {
                return false;
            }
            schedule.push(*candidate);
            let valid = checker.is_valid(schedule, false);
            schedule.pop();
            valid
        })
        .collect()
}

fn best_by_offering_mark<'p>(
    problem: &PreparedProblem<'_>,
    available: &[&'p Offering],
) -> Option<&'p Offering> {
    let mut best: Option<(&Offering, Mark)> = None;
    for &candidate in available {
        let mark = problem.mark(candidate.course_id);
        if best.map_or(true, |(_, m)| mark > m) {
            best = Some((candidate, mark));
        }
    }
    best.map(|(o, _)| o)
}

fn best_by_schedule_mark<'p>(
    problem: &PreparedProblem<'_>,
    schedule: &mut Vec<&'p Offering>,
    available: &[&'p Offering],
) -> Option<&'p Offering> {
    let scorer = problem.scorer();
    let mut best: Option<(&Offering, Mark)> = None;
    for &candidate in available {
        schedule.push(candidate);
        let mark = scorer.schedule_mark(schedule);
        schedule.pop();
        if let Some(mark) = mark {
            if best.map_or(true, |(_, m)| mark > m) {
                best = Some((candidate, mark));
            }
        }
    }
    best.map(|(o, _)| o)
}
