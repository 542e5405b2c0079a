//! Offering preprocessing.
//!
//! Prepares a raw offering pool for search:
//! 1. Drops offerings without a group or violating a hard constraint
//!    (variable inconsistency, Feldman & Golumbic §4).
//! 2. Computes every surviving offering's mark into a side table.
//! 3. Resolves must-schedule courses and groups to concrete offerings,
//!    failing fatally if they are missing or mutually incompatible.
//! 4. Orders the pool by mark, descending (stable).
//!
//! The ordering is a heuristic shared by the search algorithms; it does
//! not affect correctness.

use log::{debug, info, warn};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use crate::error::PreprocessError;
use crate::feasibility::FeasibilityChecker;
use crate::models::{CourseId, Offering};
use crate::scoring::{Mark, Scorer};

/// A preprocessed offering pool bound to one constraint snapshot.
#[derive(Debug)]
pub struct PreparedProblem<'a> {
    scorer: &'a Scorer<'a>,
    offerings: Vec<Offering>,
    marks: HashMap<CourseId, Mark>,
    required: Vec<Offering>,
    dropped: usize,
}

impl<'a> PreparedProblem<'a> {
    /// Scorer for the snapshot this pool was prepared against.
    pub fn scorer(&self) -> &'a Scorer<'a> {
        self.scorer
    }

    /// Checker for the snapshot this pool was prepared against.
    pub fn checker(&self) -> &'a FeasibilityChecker<'a> {
        self.scorer.checker()
    }

    /// Surviving offerings, by mark descending.
    pub fn offerings(&self) -> &[Offering] {
        &self.offerings
    }

    /// Cached mark of a surviving offering (0 if unknown).
    pub fn mark(&self, course_id: CourseId) -> Mark {
        self.marks.get(&course_id).copied().unwrap_or(0)
    }

    /// The mark side table.
    pub fn marks(&self) -> &HashMap<CourseId, Mark> {
        &self.marks
    }

    /// Resolved must-schedule offerings.
    pub fn required(&self) -> &[Offering] {
        &self.required
    }

    /// Whether a course is one of the resolved must-schedule offerings.
    pub fn is_required(&self, course_id: CourseId) -> bool {
        self.required.iter().any(|o| o.course_id == course_id)
    }

    /// Number of offerings dropped from the raw pool.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

/// Preprocesses a raw offering pool.
///
/// # Errors
/// Returns a [`PreprocessError`] when the must-schedule set cannot be
/// resolved: a required course is absent or infeasible, two required
/// courses overlap or share a group, or a required group has no compatible
/// offering.
pub fn preprocess<'a>(
    scorer: &'a Scorer<'a>,
    offerings: impl IntoIterator<Item = Offering>,
) -> Result<PreparedProblem<'a>, PreprocessError> {
    let checker = scorer.checker();
    let raw: Vec<Offering> = offerings.into_iter().collect();
    info!("preprocessing {} offerings", raw.len());

    let raw_ids: HashSet<CourseId> = raw.iter().map(|o| o.course_id).collect();
    let total = raw.len();
    let ungrouped = raw.iter().filter(|o| o.group_id.is_none()).count();
    if ungrouped > 0 {
        warn!("dropping {ungrouped} offerings without a group");
    }
    let mut kept: Vec<Offering> = raw
        .into_iter()
        .filter(|o| o.group_id.is_some() && !checker.offering_violates_hard_constraints(o))
        .collect();
    let dropped = total - kept.len();

    let marks: HashMap<CourseId, Mark> = kept
        .iter()
        .map(|o| (o.course_id, scorer.offering_mark(o)))
        .collect();
    kept.sort_by_key(|o| Reverse(marks.get(&o.course_id).copied().unwrap_or_default()));

    let required = resolve_required(checker, &kept, &raw_ids)?;
    info!(
        "preprocessed offerings: kept {}, dropped {}, required {}",
        kept.len(),
        dropped,
        required.len()
    );

    Ok(PreparedProblem {
        scorer,
        offerings: kept,
        marks,
        required,
        dropped,
    })
}

/// Resolves must-schedule courses, then must-schedule groups.
///
/// `pool` must already be ordered by mark, descending.
fn resolve_required(
    checker: &FeasibilityChecker<'_>,
    pool: &[Offering],
    raw_ids: &HashSet<CourseId>,
) -> Result<Vec<Offering>, PreprocessError> {
    let constraints = checker.constraints();
    let mut required: Vec<Offering> = Vec::new();

    for &course_id in constraints.must_schedule() {
        let offering = match pool.iter().find(|o| o.course_id == course_id) {
            Some(o) => o,
            None if raw_ids.contains(&course_id) => {
                return Err(PreprocessError::RequiredCourseInfeasible(course_id))
            }
            None => return Err(PreprocessError::MissingRequiredCourse(course_id)),
        };
        for other in &required {
            if other.shares_group(offering) {
                return Err(PreprocessError::RequiredCoursesShareGroup(
                    other.course_id,
                    course_id,
                ));
            }
            if other.overlaps(offering) {
                return Err(PreprocessError::RequiredCoursesOverlap(
                    other.course_id,
                    course_id,
                ));
            }
        }
        debug!("required course {course_id} resolved");
        required.push(offering.clone());
    }

    for group in constraints.must_schedule_groups() {
        if required.iter().any(|o| o.group() == Some(group.as_str())) {
            continue;
        }
        let chosen = pool
            .iter()
            .filter(|o| o.group() == Some(group.as_str()))
            .find(|o| !required.iter().any(|r| r.overlaps(o)))
            .ok_or_else(|| PreprocessError::RequiredGroupUnsatisfiable(group.clone()))?;
        debug!(
            "required group '{group}' resolved to course {}",
            chosen.course_id
        );
        required.push(chosen.clone());
    }

    Ok(required)
}
