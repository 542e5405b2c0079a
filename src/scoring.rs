//! Soft-preference scoring.
//!
//! The mark of an offering is its course priority plus its group priority
//! plus, for every session, the weight of each soft fixed-time rule the
//! session falls into. The mark of a schedule is the sum of its offering
//! marks, or `None` if any offering violates a hard constraint.
//!
//! Search algorithms maximize the schedule mark.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::feasibility::FeasibilityChecker;
use crate::models::{ConstraintSet, CourseId, Offering};

/// Numeric desirability score.
pub type Mark = i64;

/// Computes offering and schedule marks for one constraint snapshot.
///
/// Owns a [`FeasibilityChecker`] for the same snapshot; offering marks are
/// memoized per course id.
#[derive(Debug)]
pub struct Scorer<'c> {
    checker: FeasibilityChecker<'c>,
    marks: RefCell<HashMap<CourseId, Mark>>,
}

impl<'c> Scorer<'c> {
    /// Creates a scorer (and its checker) for a snapshot.
    pub fn new(constraints: &'c ConstraintSet) -> Self {
        Self {
            checker: FeasibilityChecker::new(constraints),
            marks: RefCell::new(HashMap::new()),
        }
    }

    /// The feasibility checker bound to the same snapshot.
    pub fn checker(&self) -> &FeasibilityChecker<'c> {
        &self.checker
    }

    /// The snapshot being scored against.
    pub fn constraints(&self) -> &'c ConstraintSet {
        self.checker.constraints()
    }

    /// Soft-preference mark of a single offering.
    ///
    /// Hard rules never contribute; offerings that trigger them are
    /// excluded by the checker, not scored.
    pub fn offering_mark(&self, offering: &Offering) -> Mark {
        if let Some(&mark) = self.marks.borrow().get(&offering.course_id) {
            return mark;
        }
        let mark = self.compute_mark(offering);
        self.marks.borrow_mut().insert(offering.course_id, mark);
        mark
    }

    fn compute_mark(&self, offering: &Offering) -> Mark {
        let constraints = self.constraints();
        let mut mark = Mark::from(constraints.course_priority(offering.course_id));
        if let Some(group) = offering.group() {
            mark += Mark::from(constraints.group_priority(group));
        }
        for session in &offering.sessions {
            mark += constraints
                .soft_rules()
                .iter()
                .filter(|rule| rule.matches(session))
                .map(|rule| Mark::from(rule.weight))
                .sum::<Mark>();
        }
        mark
    }

    /// Mark of a schedule, or `None` if any offering violates a hard constraint.
    pub fn schedule_mark(&self, schedule: &[&Offering]) -> Option<Mark> {
        let mut total: Mark = 0;
        for offering in schedule {
            if self.checker.offering_violates_hard_constraints(offering) {
                return None;
            }
            total += self.offering_mark(offering);
        }
        Some(total)
    }
}
