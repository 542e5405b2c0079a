//! Ordered backtracking with forward checking.
//!
//! # Algorithm
//!
//! Offerings are bucketed by group. Groups are ordered by their best
//! offering mark (descending), ties broken by smaller group first; within a
//! group, offerings keep the mark-descending order of the prepared pool.
//!
//! Depth-first search assigns one group per level: each offering of the
//! group is tried in order, then the option of leaving the group empty.
//! A branch is cut as soon as the partial schedule is invalid or adding one
//! more offering would exceed the maximum course count. A leaf (every group
//! decided) is accepted iff its size lies within the course-count bounds
//! and it is valid as complete.
//!
//! The first accepted leaf is returned. This is not necessarily the
//! highest-marked schedule; see [`super::ExhaustiveSearch`] for that.
//!
//! The search keeps an explicit frame stack instead of recursing, so its
//! depth is bounded only by memory.
//!
//! # Reference
//! Haralick & Elliott (1980), "Increasing Tree Search Efficiency for
//! Constraint Satisfaction Problems", Artificial Intelligence 14(3)

use log::{debug, info};
use std::cmp::Reverse;
use std::collections::HashMap;

use super::{to_schedule, ScheduleSolver};
use crate::models::{Offering, Schedule};
use crate::preprocess::PreparedProblem;
use crate::scoring::Mark;

/// Candidate offerings of one group, best mark first.
#[derive(Debug, Clone)]
pub struct OfferingGroup<'p> {
    /// Group identifier.
    pub group_id: &'p str,
    /// Offerings in the group, mark descending.
    pub offerings: Vec<&'p Offering>,
    /// Mark of the best offering.
    pub best_mark: Mark,
}

/// Buckets the searchable offerings by group in search order.
///
/// Required offerings and every other offering of their groups are left
/// out; the search starts from the required offerings instead.
pub fn order_groups<'p>(problem: &'p PreparedProblem<'_>) -> Vec<OfferingGroup<'p>> {
    let taken: Vec<&str> = problem.required().iter().filter_map(|o| o.group()).collect();

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<OfferingGroup<'p>> = Vec::new();
    for offering in problem.offerings() {
        let Some(group_id) = offering.group() else {
            continue;
        };
        if taken.contains(&group_id) || problem.is_required(offering.course_id) {
            continue;
        }
        let slot = *index.entry(group_id).or_insert_with(|| {
            groups.push(OfferingGroup {
                group_id,
                offerings: Vec::new(),
                best_mark: problem.mark(offering.course_id),
            });
            groups.len() - 1
        });
        groups[slot].offerings.push(offering);
    }

    groups.sort_by_key(|g| (Reverse(g.best_mark), g.offerings.len()));
    groups
}

/// One level of the search: the decision for `groups[group]`.
#[derive(Debug, Clone, Copy)]
struct Frame {
    group: usize,
    /// Next option to try; `offerings.len()` means "leave the group empty".
    cursor: usize,
    /// Whether this frame currently has an offering on the schedule.
    chosen: bool,
}

impl Frame {
    fn new(group: usize) -> Self {
        Self {
            group,
            cursor: 0,
            chosen: false,
        }
    }
}

/// First-found backtracking search over groups.
#[derive(Debug, Clone, Default)]
pub struct OrderedBacktracker {
    node_limit: Option<usize>,
}

impl OrderedBacktracker {
    /// Creates a backtracker without a node limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops the search (returning `None`) after this many placements.
    pub fn with_node_limit(mut self, limit: usize) -> Self {
        self.node_limit = Some(limit);
        self
    }

    /// Searches for the first acceptable schedule.
    pub fn search(&self, problem: &PreparedProblem<'_>) -> Option<Schedule> {
        let checker = problem.checker();
        let bounds = checker.constraints().course_count();
        let groups = order_groups(problem);
        debug!("backtracking over {} groups", groups.len());

        let mut schedule: Vec<&Offering> = problem.required().iter().collect();
        let mut stack: Vec<Frame> = vec![Frame::new(0)];
        let mut nodes: usize = 0;

        while let Some(frame) = stack.last_mut() {
            if frame.group == groups.len() {
                stack.pop();
                if bounds.contains(schedule.len()) && checker.is_valid(&schedule, true) {
                    info!(
                        "backtracking: found schedule with {} offerings after {nodes} placements",
                        schedule.len()
                    );
                    return Some(to_schedule(&schedule));
                }
                continue;
            }

            if frame.chosen {
                schedule.pop();
                frame.chosen = false;
            }

            let group = &groups[frame.group];
            if frame.cursor > group.offerings.len() {
                stack.pop();
                continue;
            }

            let cursor = frame.cursor;
            frame.cursor += 1;
            let next = frame.group + 1;

            if cursor == group.offerings.len() {
                stack.push(Frame::new(next));
                continue;
            }
            if schedule.len() + 1 > bounds.max {
                // Every remaining offering fails the same way
                frame.cursor = group.offerings.len();
                continue;
            }

            schedule.push(group.offerings[cursor]);
            nodes += 1;
            if !checker.is_valid(&schedule, false) {
                schedule.pop();
                continue;
            }
            frame.chosen = true;
            stack.push(Frame::new(next));

            if self.node_limit.is_some_and(|limit| nodes >= limit) {
                info!("backtracking: node limit {nodes} reached");
                return None;
            }
        }

        info!("backtracking: search exhausted after {nodes} placements");
        None
    }
}

impl ScheduleSolver for OrderedBacktracker {
    fn name(&self) -> &'static str {
        "ordered-backtracking"
    }

    fn solve(&self, problem: &PreparedProblem<'_>) -> Option<Schedule> {
        self.search(problem)
    }
}
