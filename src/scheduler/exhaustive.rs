//! Exhaustive search for the highest-marked schedule.
//!
//! # Algorithm
//!
//! Enumerates every way of picking at most one offering per group, on top
//! of the required offerings, and keeps the valid complete schedule with
//! the highest mark (first found on ties). Branches are cut when the
//! partial schedule becomes invalid, exceeds the maximum course count, or
//! can no longer reach the minimum count with the groups left.
//!
//! Partial validity only gets worse as offerings are added, so the cuts
//! never lose a solution.
//!
//! Intended as a reference for small instances: the search space is
//! Σ_{k=min}^{max} e_k(s_1, ..., s_g), the elementary symmetric polynomials
//! of the group sizes (see [`search_space_size`]).

use log::{debug, info};

use super::{order_groups, to_schedule, OfferingGroup, ScheduleSolver};
use crate::feasibility::FeasibilityChecker;
use crate::models::{CountBounds, Offering, Schedule};
use crate::preprocess::PreparedProblem;
use crate::scoring::{Mark, Scorer};

/// Number of schedules choosing one offering from each of k groups, summed
/// over k within `bounds`.
///
/// Saturates at `u128::MAX`.
pub fn search_space_size(group_sizes: &[usize], bounds: CountBounds) -> u128 {
    // ways[k] = number of ways to fill exactly k groups
    let mut ways: Vec<u128> = vec![0; group_sizes.len() + 1];
    ways[0] = 1;
    for (i, &size) in group_sizes.iter().enumerate() {
        for k in (1..=i + 1).rev() {
            let extra = ways[k - 1].saturating_mul(size as u128);
            ways[k] = ways[k].saturating_add(extra);
        }
    }
    ways.iter()
        .enumerate()
        .filter(|(k, _)| bounds.contains(*k))
        .fold(0u128, |acc, (_, &w)| acc.saturating_add(w))
}

/// Best-mark search over all group subsets.
#[derive(Debug, Clone, Default)]
pub struct ExhaustiveSearch;

impl ExhaustiveSearch {
    /// Creates an exhaustive search.
    pub fn new() -> Self {
        Self
    }

    /// Finds the highest-marked valid schedule.
    pub fn search(&self, problem: &PreparedProblem<'_>) -> Option<Schedule> {
        let groups = order_groups(problem);
        let sizes: Vec<usize> = groups.iter().map(|g| g.offerings.len()).collect();
        let bounds = problem.checker().constraints().course_count();
        let free = CountBounds::new(
            bounds.min.saturating_sub(problem.required().len()),
            bounds.max.saturating_sub(problem.required().len()),
        );
        debug!(
            "exhaustive: {} groups, up to {} candidate schedules",
            groups.len(),
            search_space_size(&sizes, free)
        );

        let mut search = Search {
            checker: problem.checker(),
            scorer: problem.scorer(),
            groups: &groups,
            bounds,
            schedule: problem.required().iter().collect(),
            best: None,
            leaves: 0,
        };
        search.visit(0);

        info!("exhaustive: {} complete schedules examined", search.leaves);
        search.best.map(|(schedule, mark)| {
            info!("exhaustive: best mark {mark}");
            schedule
        })
    }
}

impl ScheduleSolver for ExhaustiveSearch {
    fn name(&self) -> &'static str {
        "exhaustive"
    }

    fn solve(&self, problem: &PreparedProblem<'_>) -> Option<Schedule> {
        self.search(problem)
    }
}

struct Search<'s, 'p> {
    checker: &'s FeasibilityChecker<'s>,
    scorer: &'s Scorer<'s>,
    groups: &'s [OfferingGroup<'p>],
    bounds: CountBounds,
    schedule: Vec<&'p Offering>,
    best: Option<(Schedule, Mark)>,
    leaves: usize,
}

impl<'s, 'p> Search<'s, 'p> {
    fn visit(&mut self, depth: usize) {
        if self.schedule.len() + (self.groups.len() - depth) < self.bounds.min {
            return;
        }
        if depth == self.groups.len() {
            self.leaves += 1;
            self.consider_leaf();
            return;
        }

        if self.schedule.len() < self.bounds.max {
            let groups = self.groups;
            for &offering in &groups[depth].offerings {
                self.schedule.push(offering);
                if self.checker.is_valid(&self.schedule, false) {
                    self.visit(depth + 1);
                }
                self.schedule.pop();
            }
        }
        self.visit(depth + 1);
    }

    fn consider_leaf(&mut self) {
        if !self.bounds.contains(self.schedule.len()) || !self.checker.is_valid(&self.schedule, true) {
            return;
        }
        let Some(mark) = self.scorer.schedule_mark(&self.schedule) else {
            return;
        };
        if self.best.as_ref().map_or(true, |(_, best)| mark > *best) {
            self.best = Some((to_schedule(&self.schedule), mark));
        }
    }
}
