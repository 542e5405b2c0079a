//! Schedule construction algorithms and solution reporting.
//!
//! All solvers consume a [`PreparedProblem`] and return `Some(schedule)` or
//! `None` when the search is exhausted. Exhaustion is a normal outcome.
//!
//! # Algorithms
//!
//! | Solver | Strategy | Optimal |
//! |--------|----------|---------|
//! | [`GreedyConstructor`] | Hill climbing, one-ply lookahead | No |
//! | [`OrderedBacktracker`] | Fixed group order, forward checking | No (first found) |
//! | [`ExhaustiveSearch`] | Enumerate every group subset | Yes |
//!
//! # References
//!
//! - Feldman & Golumbic (1990), "Optimization Algorithms for Student
//!   Scheduling via Constraint Satisfiability", The Computer Journal 33(4)
//! - Haralick & Elliott (1980), "Increasing Tree Search Efficiency for
//!   Constraint Satisfaction Problems" (forward checking)

mod backtrack;
mod exhaustive;
mod greedy;
mod report;

pub use backtrack::{order_groups, OfferingGroup, OrderedBacktracker};
pub use exhaustive::{search_space_size, ExhaustiveSearch};
pub use greedy::GreedyConstructor;
pub use report::{OfferingLine, ScheduleReport};

use std::fmt::Debug;

use crate::models::{Offering, Schedule};
use crate::preprocess::PreparedProblem;
use crate::scoring::Mark;

/// A schedule construction algorithm.
pub trait ScheduleSolver: Debug {
    /// Solver name (e.g., "greedy").
    fn name(&self) -> &'static str;

    /// Builds one schedule, or `None` if the search finds none.
    fn solve(&self, problem: &PreparedProblem<'_>) -> Option<Schedule>;
}

/// Result of running one solver, ready for reporting.
#[derive(Debug, Clone)]
pub struct SolverOutcome {
    /// Name of the solver that produced this outcome.
    pub solver: &'static str,
    /// The schedule found, if any.
    pub schedule: Option<Schedule>,
    /// Mark of the schedule. `None` if no schedule or a hard violation.
    pub mark: Option<Mark>,
    /// Whether the schedule is valid as complete. `false` if absent.
    pub valid: bool,
}

impl SolverOutcome {
    /// Whether a valid schedule was found.
    pub fn is_success(&self) -> bool {
        self.schedule.is_some() && self.valid
    }
}

/// Runs a solver and scores its result.
pub fn evaluate(solver: &dyn ScheduleSolver, problem: &PreparedProblem<'_>) -> SolverOutcome {
    let schedule = solver.solve(problem);
    let mark = schedule.as_ref().and_then(|s| {
        let refs: Vec<&Offering> = s.iter().collect();
        problem.scorer().schedule_mark(&refs)
    });
    let valid = problem.checker().is_valid_schedule(schedule.as_ref(), true);
    SolverOutcome {
        solver: solver.name(),
        schedule,
        mark,
        valid,
    }
}

/// Runs every solver on the same problem.
pub fn compare(solvers: &[&dyn ScheduleSolver], problem: &PreparedProblem<'_>) -> Vec<SolverOutcome> {
    solvers.iter().map(|s| evaluate(*s, problem)).collect()
}

fn to_schedule(offerings: &[&Offering]) -> Schedule {
    offerings.iter().map(|o| (*o).clone()).collect()
}
