//! Feasibility checking against a constraint snapshot.
//!
//! [`FeasibilityChecker`] answers whether an offering or a (partial or
//! complete) schedule satisfies the hard constraints of a
//! [`ConstraintSet`].
//!
//! # Validity
//!
//! `is_valid(schedule, complete)` short-circuits in this order:
//! 1. No two sessions overlap; no two offerings share a course or group.
//! 2. Hour load within bounds (upper bound always, lower bound only when
//!    `complete`).
//! 3. If `complete`: total course count within bounds, and every active day
//!    has an allowed number of distinct courses.
//! 4. Every must-schedule course and group is present.
//! 5. No offering violates a hard constraint.
//!
//! # Caching
//! Hard-constraint results are memoized per course id. A checker is bound
//! to one snapshot; reconfiguring means building a new checker, which
//! discards the cache.

mod intervals;
mod load;

pub use intervals::{merge_intervals, sessions_overlap, sessions_overlap_pairwise};
pub use load::{courses_per_day, hours_by_period, hours_per_period, load_range, LoadBucket};

use chrono::NaiveDate;
use log::trace;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::{ConstraintSet, CourseId, Offering, Schedule};

/// Checks offerings and schedules against a constraint snapshot.
///
/// # Example
///
/// ```
/// use course_planner::feasibility::FeasibilityChecker;
/// use course_planner::models::{ConstraintConfig, ConstraintSet, FixedTimeRule, Offering, Session};
/// use chrono::{NaiveDate, Weekday};
///
/// let constraints = ConstraintSet::new(
///     ConstraintConfig::new().with_rule(FixedTimeRule::on(Weekday::Mon, 7, 9, -100)),
/// ).unwrap();
/// let checker = FeasibilityChecker::new(&constraints);
///
/// let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let early = Offering::new(1).with_group("math").with_session(Session::new(
///     monday.and_hms_opt(7, 30, 0).unwrap(),
///     monday.and_hms_opt(8, 30, 0).unwrap(),
/// ));
/// assert!(checker.offering_violates_hard_constraints(&early));
/// ```
#[derive(Debug)]
pub struct FeasibilityChecker<'c> {
    constraints: &'c ConstraintSet,
    hard_cache: RefCell<HashMap<CourseId, bool>>,
}

impl<'c> FeasibilityChecker<'c> {
    /// Creates a checker for a snapshot.
    pub fn new(constraints: &'c ConstraintSet) -> Self {
        Self {
            constraints,
            hard_cache: RefCell::new(HashMap::new()),
        }
    }

    /// The snapshot this checker validates against.
    pub fn constraints(&self) -> &'c ConstraintSet {
        self.constraints
    }

    /// Whether an offering is excluded outright.
    ///
    /// True iff the course (or its group) is must-not-schedule, or any
    /// session overlaps a hard fixed-time rule. Memoized per course id.
    pub fn offering_violates_hard_constraints(&self, offering: &Offering) -> bool {
        if let Some(&cached) = self.hard_cache.borrow().get(&offering.course_id) {
            return cached;
        }
        let violates = self.compute_hard_violation(offering);
        self.hard_cache
            .borrow_mut()
            .insert(offering.course_id, violates);
        violates
    }

    fn compute_hard_violation(&self, offering: &Offering) -> bool {
        if self.constraints.must_not_schedule().contains(&offering.course_id) {
            trace!("course {} is must-not-schedule", offering.course_id);
            return true;
        }
        if let Some(group) = offering.group() {
            if self.constraints.must_not_schedule_groups().contains(group) {
                trace!("course {} is in forbidden group '{group}'", offering.course_id);
                return true;
            }
        }
        let blocked = offering.sessions.iter().any(|session| {
            self.constraints
                .hard_rules()
                .iter()
                .any(|rule| rule.matches(session))
        });
        if blocked {
            trace!("course {} meets in a blocked time window", offering.course_id);
        }
        blocked
    }

    /// Whether any two sessions across the schedule overlap.
    pub fn schedule_overlaps(&self, schedule: &[&Offering]) -> bool {
        sessions_overlap(
            schedule
                .iter()
                .flat_map(|o| o.sessions.iter().copied())
                .collect(),
        )
    }

    /// Whether two offerings share a course id or a group.
    pub fn violates_exclusivity(&self, schedule: &[&Offering]) -> bool {
        let mut courses = HashSet::with_capacity(schedule.len());
        let mut groups = HashSet::with_capacity(schedule.len());
        schedule.iter().any(|o| {
            !courses.insert(o.course_id) || o.group().is_some_and(|g| !groups.insert(g))
        })
    }

    /// Minimum and maximum hour load over active days (or weeks).
    pub fn daily_or_weekly_load(&self, schedule: &[&Offering]) -> (f64, f64) {
        load_range(schedule, self.constraints.load_period())
    }

    /// Distinct courses per calendar day.
    pub fn scheduled_counts_per_day(&self, schedule: &[&Offering]) -> BTreeMap<NaiveDate, usize> {
        courses_per_day(schedule)
    }

    /// Whether every must-schedule course and group is present.
    pub fn contains_required(&self, schedule: &[&Offering]) -> bool {
        let courses_present = self
            .constraints
            .must_schedule()
            .iter()
            .all(|id| schedule.iter().any(|o| o.course_id == *id));
        courses_present
            && self
                .constraints
                .must_schedule_groups()
                .iter()
                .all(|g| schedule.iter().any(|o| o.group() == Some(g.as_str())))
    }

    /// Composite validity check.
    ///
    /// With `complete = false`, count bounds and the lower hour-load bound
    /// are skipped so partial schedules can be checked during construction.
    pub fn is_valid(&self, schedule: &[&Offering], complete: bool) -> bool {
        if self.schedule_overlaps(schedule) || self.violates_exclusivity(schedule) {
            return false;
        }

        let load_bounds = self.constraints.hour_load();
        if load_bounds.is_set() {
            let (min, max) = self.daily_or_weekly_load(schedule);
            if !load_bounds.satisfies_max(max) || (complete && !load_bounds.satisfies_min(min)) {
                return false;
            }
        }

        if complete {
            if !self.constraints.course_count().contains(schedule.len()) {
                return false;
            }
            let daily = self.constraints.daily_course_count();
            if daily.is_set()
                && !self
                    .scheduled_counts_per_day(schedule)
                    .values()
                    .all(|&count| daily.contains(count))
            {
                return false;
            }
        }

        if !self.contains_required(schedule) {
            return false;
        }

        !schedule
            .iter()
            .any(|o| self.offering_violates_hard_constraints(o))
    }

    /// Validity of an optional schedule. `None` is always invalid.
    pub fn is_valid_schedule(&self, schedule: Option<&Schedule>, complete: bool) -> bool {
        schedule.is_some_and(|s| {
            let refs: Vec<&Offering> = s.iter().collect();
            self.is_valid(&refs, complete)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bounds, ConstraintConfig, FixedTimeRule, LoadPeriod};
    use crate::test_support::{offering, session};
    use chrono::Weekday;

    fn checker_for(config: ConstraintConfig) -> (ConstraintSet, Vec<Offering>) {
        let offerings = vec![
            offering(1, "a", &[(0, 9, 10)]),
            offering(2, "a", &[(0, 9, 10)]),
            offering(3, "b", &[(1, 10, 12)]),
            offering(4, "c", &[(2, 14, 16)]),
        ];
        (ConstraintSet::new(config).unwrap(), offerings)
    }

    #[test]
    fn test_same_group_overlap_scenario() {
        let c = ConstraintSet::unconstrained();
        let checker = FeasibilityChecker::new(&c);
        let a = offering(1, "g", &[]).with_session(session(0, (9, 0), (10, 0)));
        let b = offering(2, "g", &[]).with_session(session(0, (9, 30), (10, 30)));
        assert!(checker.schedule_overlaps(&[&a, &b]));
    }

    #[test]
    fn test_hard_time_rule_scenario() {
        let (c, _) = checker_for(
            ConstraintConfig::new().with_rule(FixedTimeRule::on(Weekday::Mon, 7, 9, -100)),
        );
        let checker = FeasibilityChecker::new(&c);
        let early = Offering::new(10).with_group("x").with_session(
            session(0, (7, 30), (8, 30)),
        );
        let tuesday = Offering::new(11).with_group("x").with_session(
            session(1, (7, 30), (8, 30)),
        );
        assert!(checker.offering_violates_hard_constraints(&early));
        assert!(!checker.offering_violates_hard_constraints(&tuesday));
        assert!(!checker.is_valid(&[&early], false));
    }

    #[test]
    fn test_soft_rule_is_not_hard() {
        let (c, offerings) = checker_for(ConstraintConfig::new().with_rule(FixedTimeRule::daily(9, 10, -99)));
        let checker = FeasibilityChecker::new(&c);
        assert!(!checker.offering_violates_hard_constraints(&offerings[0]));
    }

    #[test]
    fn test_must_not_schedule_course_and_group() {
        let (c, offerings) = checker_for(
            ConstraintConfig::new()
                .forbid_course(3)
                .with_group_priority("c", -100),
        );
        let checker = FeasibilityChecker::new(&c);
        assert!(!checker.offering_violates_hard_constraints(&offerings[0]));
        assert!(checker.offering_violates_hard_constraints(&offerings[2]));
        assert!(checker.offering_violates_hard_constraints(&offerings[3]));
    }

    #[test]
    fn test_hard_result_is_cached() {
        let (c, offerings) = checker_for(ConstraintConfig::new().forbid_course(1));
        let checker = FeasibilityChecker::new(&c);
        assert!(checker.offering_violates_hard_constraints(&offerings[0]));
        assert!(checker.offering_violates_hard_constraints(&offerings[0]));
        assert_eq!(checker.hard_cache.borrow().len(), 1);
    }

    #[test]
    fn test_overlap_fails_validity() {
        let (c, o) = checker_for(ConstraintConfig::new());
        let checker = FeasibilityChecker::new(&c);
        assert!(checker.is_valid(&[&o[0], &o[2]], false));
        let clash = offering(9, "z", &[(0, 9, 11)]);
        assert!(!checker.is_valid(&[&o[0], &clash], false));
    }

    #[test]
    fn test_group_exclusivity() {
        let (c, o) = checker_for(ConstraintConfig::new());
        let checker = FeasibilityChecker::new(&c);
        let same_group = offering(5, "b", &[(3, 9, 10)]);
        assert!(checker.violates_exclusivity(&[&o[2], &same_group]));
        assert!(!checker.is_valid(&[&o[2], &same_group], false));
        assert!(checker.violates_exclusivity(&[&o[2], &o[2]]));
        assert!(!checker.violates_exclusivity(&[&o[0], &o[2], &o[3]]));
    }

    #[test]
    fn test_hour_load_upper_bound_always_checked() {
        let (c, o) = checker_for(
            ConstraintConfig::new().with_hour_load(Bounds::at_most(1.5), LoadPeriod::Day),
        );
        let checker = FeasibilityChecker::new(&c);
        assert!(checker.is_valid(&[&o[0]], false));
        // Course 3 meets 2h on Tuesday
        assert!(!checker.is_valid(&[&o[2]], false));
    }

    #[test]
    fn test_hour_load_lower_bound_only_when_complete() {
        let (c, o) = checker_for(
            ConstraintConfig::new().with_hour_load(Bounds::at_least(2.0), LoadPeriod::Day),
        );
        let checker = FeasibilityChecker::new(&c);
        assert!(checker.is_valid(&[&o[0]], false));
        assert!(!checker.is_valid(&[&o[0]], true));
        assert!(checker.is_valid(&[&o[2], &o[3]], true));
    }

    #[test]
    fn test_course_count_only_when_complete() {
        let (c, o) = checker_for(ConstraintConfig::new().with_course_count(2, 2));
        let checker = FeasibilityChecker::new(&c);
        assert!(checker.is_valid(&[&o[0]], false));
        assert!(!checker.is_valid(&[&o[0]], true));
        assert!(checker.is_valid(&[&o[0], &o[2]], true));
        assert!(!checker.is_valid(&[&o[0], &o[2], &o[3]], true));
    }

    #[test]
    fn test_daily_minimum_scenario() {
        let (c, o) = checker_for(ConstraintConfig::new().with_daily_course_count(Bounds::at_least(2)));
        let checker = FeasibilityChecker::new(&c);
        // Monday has exactly one course
        assert!(!checker.is_valid(&[&o[0]], true));
        assert!(checker.is_valid(&[&o[0]], false));

        let also_monday = offering(7, "m", &[(0, 12, 13)]);
        assert!(checker.is_valid(&[&o[0], &also_monday], true));
    }

    #[test]
    fn test_daily_maximum() {
        let (c, o) = checker_for(ConstraintConfig::new().with_daily_course_count(Bounds::at_most(1)));
        let checker = FeasibilityChecker::new(&c);
        let also_monday = offering(7, "m", &[(0, 12, 13)]);
        assert!(checker.is_valid(&[&o[0], &o[2]], true));
        assert!(!checker.is_valid(&[&o[0], &also_monday], true));
    }

    #[test]
    fn test_must_schedule_checked_for_partial() {
        let (c, o) = checker_for(ConstraintConfig::new().require_course(3));
        let checker = FeasibilityChecker::new(&c);
        assert!(!checker.is_valid(&[&o[0]], false));
        assert!(checker.is_valid(&[&o[0], &o[2]], false));
    }

    #[test]
    fn test_must_schedule_group() {
        let (c, o) = checker_for(ConstraintConfig::new().with_group_priority("c", 100));
        let checker = FeasibilityChecker::new(&c);
        assert!(!checker.is_valid(&[&o[0]], true));
        assert!(checker.is_valid(&[&o[0], &o[3]], true));
    }

    #[test]
    fn test_hard_violation_fails_validity() {
        let (c, o) = checker_for(ConstraintConfig::new().forbid_course(4));
        let checker = FeasibilityChecker::new(&c);
        assert!(!checker.is_valid(&[&o[0], &o[3]], false));
    }

    #[test]
    fn test_empty_and_absent_schedule() {
        let (c, _) = checker_for(ConstraintConfig::new());
        let checker = FeasibilityChecker::new(&c);
        assert!(checker.is_valid(&[], true));
        assert!(!checker.is_valid_schedule(None, true));
        assert!(checker.is_valid_schedule(Some(&Schedule::new()), true));
    }

    #[test]
    fn test_loads_and_counts_delegate_to_period() {
        let (c, o) = checker_for(
            ConstraintConfig::new().with_hour_load(Bounds::unbounded(), LoadPeriod::Week),
        );
        let checker = FeasibilityChecker::new(&c);
        let (min, max) = checker.daily_or_weekly_load(&[&o[0], &o[2], &o[3]]);
        assert!((min - 5.0).abs() < 1e-10);
        assert!((max - 5.0).abs() < 1e-10);
        assert_eq!(checker.scheduled_counts_per_day(&[&o[0], &o[2]]).len(), 2);
    }
}
