//! Constraint model.
//!
//! Defines the student's hard constraints and soft preferences:
//! fixed-time rules, course and group priorities, hour-load bounds,
//! and course-count bounds.
//!
//! # Priority Scale
//! Weights range over `[-MAX_PRIORITY, MAX_PRIORITY]`. A weight whose
//! magnitude equals [`MAX_PRIORITY`] is a hard rule; anything smaller is a
//! soft score adjustment.
//!
//! # Snapshots
//! [`ConstraintConfig`] is the plain, deserializable record.
//! [`ConstraintSet`] is the validated, immutable snapshot consumed by the
//! checker and the solvers. Reconfiguring means building a new snapshot;
//! every snapshot carries a unique `version` so caches can detect staleness.
//!
//! # Reference
//! Feldman & Golumbic (1990), "Optimization Algorithms for Student
//! Scheduling via Constraint Satisfiability", The Computer Journal 33(4)

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{CourseId, GroupId, Session};
use crate::error::ConfigError;

/// Sentinel magnitude marking a hard rule.
pub const MAX_PRIORITY: i32 = 100;

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

/// A weekday/hour window with a weight.
///
/// `weekday = None` applies the window to every day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedTimeRule {
    /// Day the rule applies to. `None` = every day.
    #[serde(default)]
    pub weekday: Option<Weekday>,
    /// Window start hour (inclusive).
    pub hour_start: u32,
    /// Window end hour (exclusive).
    pub hour_end: u32,
    /// Signed weight. `|weight| == MAX_PRIORITY` blocks the window.
    pub weight: i32,
}

impl FixedTimeRule {
    /// Creates a rule for one weekday.
    pub fn on(weekday: Weekday, hour_start: u32, hour_end: u32, weight: i32) -> Self {
        Self {
            weekday: Some(weekday),
            hour_start,
            hour_end,
            weight,
        }
    }

    /// Creates a rule applying to every day.
    pub fn daily(hour_start: u32, hour_end: u32, weight: i32) -> Self {
        Self {
            weekday: None,
            hour_start,
            hour_end,
            weight,
        }
    }

    /// Whether this rule is hard (blocks the window outright).
    #[inline]
    pub fn is_hard(&self) -> bool {
        self.weight.abs() == MAX_PRIORITY
    }

    /// Whether a session falls on this rule's day and overlaps its window.
    pub fn matches(&self, session: &Session) -> bool {
        self.weekday.map_or(true, |day| day == session.weekday())
            && session.overlaps_hours(self.hour_start, self.hour_end)
    }
}

/// Optional lower/upper bounds. `None` = unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds<T> {
    #[serde(default)]
    pub min: Option<T>,
    #[serde(default)]
    pub max: Option<T>,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    /// Unbounded on both sides.
    pub fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    /// Bounded on both sides.
    pub fn between(min: T, max: T) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Lower bound only.
    pub fn at_least(min: T) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    /// Upper bound only.
    pub fn at_most(max: T) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// Whether either side is set.
    pub fn is_set(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    /// Whether `value` satisfies both sides.
    pub fn contains(&self, value: T) -> bool {
        self.satisfies_min(value) && self.satisfies_max(value)
    }

    /// Whether `value` satisfies the lower side.
    pub fn satisfies_min(&self, value: T) -> bool {
        self.min.map_or(true, |min| value >= min)
    }

    /// Whether `value` satisfies the upper side.
    pub fn satisfies_max(&self, value: T) -> bool {
        self.max.map_or(true, |max| value <= max)
    }
}

/// Inclusive bounds on the number of offerings in a complete schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountBounds {
    pub min: usize,
    pub max: usize,
}

impl CountBounds {
    /// Creates inclusive bounds.
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Whether `count` lies within the bounds.
    #[inline]
    pub fn contains(&self, count: usize) -> bool {
        count >= self.min && count <= self.max
    }
}

impl Default for CountBounds {
    fn default() -> Self {
        Self {
            min: 0,
            max: usize::MAX,
        }
    }
}

/// Bucket over which hour load is aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoadPeriod {
    /// Per calendar day.
    #[default]
    Day,
    /// Per ISO calendar week.
    Week,
}

/// Plain constraint record, as read from configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintConfig {
    /// Weekday/hour rules, hard or soft.
    pub fixed_time_rules: Vec<FixedTimeRule>,
    /// Per-course weights.
    pub course_priorities: BTreeMap<CourseId, i32>,
    /// Per-group weights.
    pub group_priorities: BTreeMap<GroupId, i32>,
    /// Scheduled hours permitted per active load period.
    pub hour_load: Bounds<f64>,
    /// Load aggregation period.
    pub load_period: LoadPeriod,
    /// Total number of offerings in a complete schedule.
    pub course_count: CountBounds,
    /// Distinct courses per active day ("zero or within bounds").
    pub daily_course_count: Bounds<usize>,
}

impl ConstraintConfig {
    /// Creates an empty configuration (no constraints).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fixed-time rule.
    pub fn with_rule(mut self, rule: FixedTimeRule) -> Self {
        self.fixed_time_rules.push(rule);
        self
    }

    /// Sets a course weight.
    pub fn with_course_priority(mut self, course_id: CourseId, weight: i32) -> Self {
        self.course_priorities.insert(course_id, weight);
        self
    }

    /// Sets a group weight.
    pub fn with_group_priority(mut self, group_id: impl Into<GroupId>, weight: i32) -> Self {
        self.group_priorities.insert(group_id.into(), weight);
        self
    }

    /// Marks a course as must-schedule.
    pub fn require_course(self, course_id: CourseId) -> Self {
        self.with_course_priority(course_id, MAX_PRIORITY)
    }

    /// Marks a course as must-not-schedule.
    pub fn forbid_course(self, course_id: CourseId) -> Self {
        self.with_course_priority(course_id, -MAX_PRIORITY)
    }

    /// Sets the hour-load bounds.
    pub fn with_hour_load(mut self, bounds: Bounds<f64>, period: LoadPeriod) -> Self {
        self.hour_load = bounds;
        self.load_period = period;
        self
    }

    /// Sets the total course-count bounds.
    pub fn with_course_count(mut self, min: usize, max: usize) -> Self {
        self.course_count = CountBounds::new(min, max);
        self
    }

    /// Sets the daily course-count bounds.
    pub fn with_daily_course_count(mut self, bounds: Bounds<usize>) -> Self {
        self.daily_course_count = bounds;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let weights = self
            .course_priorities
            .iter()
            .map(|(id, w)| (format!("course {id}"), *w))
            .chain(
                self.group_priorities
                    .iter()
                    .map(|(id, w)| (format!("group '{id}'"), *w)),
            )
            .chain(self.fixed_time_rules.iter().map(|r| {
                (
                    format!("time rule {}..{}", r.hour_start, r.hour_end),
                    r.weight,
                )
            }));
        for (target, weight) in weights {
            if weight.abs() > MAX_PRIORITY {
                return Err(ConfigError::WeightOutOfRange {
                    target,
                    weight,
                    max: MAX_PRIORITY,
                });
            }
        }

        for rule in &self.fixed_time_rules {
            if rule.hour_start >= rule.hour_end || rule.hour_end > 24 {
                return Err(ConfigError::InvalidHourWindow {
                    hour_start: rule.hour_start,
                    hour_end: rule.hour_end,
                });
            }
        }

        for bound in [self.hour_load.min, self.hour_load.max].into_iter().flatten() {
            if !bound.is_finite() || bound < 0.0 {
                return Err(ConfigError::InvalidHourLoad(bound));
            }
        }

        check_order("hour load", self.hour_load.min, self.hour_load.max)?;
        check_order(
            "course count",
            Some(self.course_count.min),
            Some(self.course_count.max),
        )?;
        check_order(
            "daily course count",
            self.daily_course_count.min,
            self.daily_course_count.max,
        )
    }
}

fn check_order<T: PartialOrd + Display>(
    name: &'static str,
    min: Option<T>,
    max: Option<T>,
) -> Result<(), ConfigError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(ConfigError::InvertedBounds {
            name,
            min: min.to_string(),
            max: max.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Validated, immutable constraint snapshot with derived sets.
///
/// # Example
///
/// ```
/// use course_planner::models::{ConstraintConfig, ConstraintSet, FixedTimeRule};
/// use chrono::Weekday;
///
/// let config = ConstraintConfig::new()
///     .with_rule(FixedTimeRule::on(Weekday::Mon, 7, 9, -100))
///     .require_course(42)
///     .with_course_count(2, 5);
/// let constraints = ConstraintSet::new(config).unwrap();
///
/// assert!(constraints.must_schedule().contains(&42));
/// assert_eq!(constraints.hard_rules().len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ConstraintConfig", into = "ConstraintConfig")]
pub struct ConstraintSet {
    config: ConstraintConfig,
    version: u64,
    must_schedule: BTreeSet<CourseId>,
    must_not_schedule: BTreeSet<CourseId>,
    must_schedule_groups: BTreeSet<GroupId>,
    must_not_schedule_groups: BTreeSet<GroupId>,
    hard_rules: Vec<FixedTimeRule>,
    soft_rules: Vec<FixedTimeRule>,
}

impl ConstraintSet {
    /// Validates a configuration and derives the hard/soft sets.
    pub fn new(config: ConstraintConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let must_schedule = keys_with_weight(&config.course_priorities, MAX_PRIORITY);
        let must_not_schedule = keys_with_weight(&config.course_priorities, -MAX_PRIORITY);
        let must_schedule_groups = keys_with_weight(&config.group_priorities, MAX_PRIORITY);
        let must_not_schedule_groups = keys_with_weight(&config.group_priorities, -MAX_PRIORITY);
        let (hard_rules, soft_rules): (Vec<FixedTimeRule>, Vec<FixedTimeRule>) = config
            .fixed_time_rules
            .iter()
            .partition(|rule| rule.is_hard());

        Ok(Self {
            version: NEXT_VERSION.fetch_add(1, Ordering::Relaxed),
            must_schedule,
            must_not_schedule,
            must_schedule_groups,
            must_not_schedule_groups,
            hard_rules,
            soft_rules,
            config,
        })
    }

    /// A snapshot with no constraints at all.
    pub fn unconstrained() -> Self {
        Self::new(ConstraintConfig::default()).unwrap_or_else(|_| unreachable!())
    }

    /// Unique snapshot identifier.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The underlying configuration.
    pub fn config(&self) -> &ConstraintConfig {
        &self.config
    }

    /// Course ids that every complete schedule must contain.
    pub fn must_schedule(&self) -> &BTreeSet<CourseId> {
        &self.must_schedule
    }

    /// Course ids that no schedule may contain.
    pub fn must_not_schedule(&self) -> &BTreeSet<CourseId> {
        &self.must_not_schedule
    }

    /// Groups that every complete schedule must fulfill.
    pub fn must_schedule_groups(&self) -> &BTreeSet<GroupId> {
        &self.must_schedule_groups
    }

    /// Groups whose offerings are all forbidden.
    pub fn must_not_schedule_groups(&self) -> &BTreeSet<GroupId> {
        &self.must_not_schedule_groups
    }

    /// Fixed-time rules that block their window.
    pub fn hard_rules(&self) -> &[FixedTimeRule] {
        &self.hard_rules
    }

    /// Fixed-time rules that adjust the mark.
    pub fn soft_rules(&self) -> &[FixedTimeRule] {
        &self.soft_rules
    }

    /// Weight of a course (0 if absent).
    pub fn course_priority(&self, course_id: CourseId) -> i32 {
        self.config
            .course_priorities
            .get(&course_id)
            .copied()
            .unwrap_or(0)
    }

    /// Weight of a group (0 if absent).
    pub fn group_priority(&self, group_id: &str) -> i32 {
        self.config
            .group_priorities
            .get(group_id)
            .copied()
            .unwrap_or(0)
    }

    /// Hour-load bounds.
    pub fn hour_load(&self) -> Bounds<f64> {
        self.config.hour_load
    }

    /// Hour-load aggregation period.
    pub fn load_period(&self) -> LoadPeriod {
        self.config.load_period
    }

    /// Total course-count bounds.
    pub fn course_count(&self) -> CountBounds {
        self.config.course_count
    }

    /// Daily course-count bounds.
    pub fn daily_course_count(&self) -> Bounds<usize> {
        self.config.daily_course_count
    }
}

impl TryFrom<ConstraintConfig> for ConstraintSet {
    type Error = ConfigError;

    fn try_from(config: ConstraintConfig) -> Result<Self, Self::Error> {
        Self::new(config)
    }
}

impl From<ConstraintSet> for ConstraintConfig {
    fn from(set: ConstraintSet) -> Self {
        set.config
    }
}

fn keys_with_weight<K: Ord + Clone>(map: &BTreeMap<K, i32>, weight: i32) -> BTreeSet<K> {
    map.iter()
        .filter(|(_, w)| **w == weight)
        .map(|(k, _)| k.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::session;

    #[test]
    fn test_rule_hardness() {
        assert!(FixedTimeRule::daily(7, 8, -100).is_hard());
        assert!(FixedTimeRule::daily(7, 8, 100).is_hard());
        assert!(!FixedTimeRule::daily(7, 8, -99).is_hard());
    }

    #[test]
    fn test_rule_matches_weekday() {
        let rule = FixedTimeRule::on(Weekday::Mon, 7, 9, -100);
        assert!(rule.matches(&session(0, (7, 30), (8, 30))));
        assert!(!rule.matches(&session(1, (7, 30), (8, 30))));
        assert!(!rule.matches(&session(0, (9, 0), (10, 0))));

        let every_day = FixedTimeRule::daily(7, 9, 50);
        assert!(every_day.matches(&session(3, (8, 0), (9, 30))));
    }

    #[test]
    fn test_bounds() {
        let b = Bounds::between(2, 4);
        assert!(b.contains(2) && b.contains(4));
        assert!(!b.contains(1) && !b.contains(5));
        assert!(Bounds::<usize>::unbounded().contains(1000));
        assert!(!Bounds::<usize>::unbounded().is_set());
        assert!(Bounds::at_least(2).satisfies_max(1_000_000));
        assert!(!Bounds::at_most(3.0).satisfies_max(3.5));
    }

    #[test]
    fn test_derived_sets() {
        let config = ConstraintConfig::new()
            .with_rule(FixedTimeRule::daily(7, 8, -100))
            .with_rule(FixedTimeRule::daily(9, 10, 50))
            .require_course(1)
            .forbid_course(2)
            .with_course_priority(3, 40)
            .with_group_priority("math", 100)
            .with_group_priority("art", -100);
        let set = ConstraintSet::new(config).unwrap();

        assert_eq!(set.must_schedule().iter().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(set.must_not_schedule().iter().copied().collect::<Vec<_>>(), vec![2]);
        assert!(set.must_schedule_groups().contains("math"));
        assert!(set.must_not_schedule_groups().contains("art"));
        assert_eq!(set.hard_rules().len(), 1);
        assert_eq!(set.soft_rules().len(), 1);
        assert_eq!(set.course_priority(3), 40);
        assert_eq!(set.course_priority(99), 0);
        assert_eq!(set.group_priority("nothing"), 0);
    }

    #[test]
    fn test_versions_are_unique() {
        let a = ConstraintSet::unconstrained();
        let b = ConstraintSet::unconstrained();
        assert_ne!(a.version(), b.version());
    }

    #[test]
    fn test_rejects_out_of_range_weight() {
        let err = ConstraintSet::new(ConstraintConfig::new().with_course_priority(1, 101));
        assert!(matches!(err, Err(ConfigError::WeightOutOfRange { weight: 101, .. })));
    }

    #[test]
    fn test_rejects_bad_hour_window() {
        let err = ConstraintSet::new(ConstraintConfig::new().with_rule(FixedTimeRule::daily(9, 9, 10)));
        assert!(matches!(err, Err(ConfigError::InvalidHourWindow { .. })));
        let err = ConstraintSet::new(ConstraintConfig::new().with_rule(FixedTimeRule::daily(20, 25, 10)));
        assert!(matches!(err, Err(ConfigError::InvalidHourWindow { .. })));
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let err = ConstraintSet::new(ConstraintConfig::new().with_course_count(5, 2));
        assert!(matches!(err, Err(ConfigError::InvertedBounds { name: "course count", .. })));

        let err = ConstraintSet::new(
            ConstraintConfig::new().with_hour_load(Bounds::between(10.0, 2.0), LoadPeriod::Day),
        );
        assert!(matches!(err, Err(ConfigError::InvertedBounds { name: "hour load", .. })));

        let err = ConstraintSet::new(
            ConstraintConfig::new().with_hour_load(Bounds::at_least(-1.0), LoadPeriod::Week),
        );
        assert!(matches!(err, Err(ConfigError::InvalidHourLoad(_))));
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = r#"{
            "fixed_time_rules": [
                {"weekday": "Mon", "hour_start": 7, "hour_end": 9, "weight": -100},
                {"hour_start": 18, "hour_end": 20, "weight": -50}
            ],
            "course_priorities": {"17": 100, "4": -100},
            "group_priorities": {"math": 30},
            "hour_load": {"max": 8.0},
            "course_count": {"min": 2, "max": 6}
        }"#;
        let set: ConstraintSet = serde_json::from_str(json).unwrap();

        assert_eq!(set.hard_rules()[0].weekday, Some(Weekday::Mon));
        assert_eq!(set.soft_rules()[0].weekday, None);
        assert!(set.must_schedule().contains(&17));
        assert!(set.must_not_schedule().contains(&4));
        assert_eq!(set.group_priority("math"), 30);
        assert_eq!(set.hour_load(), Bounds::at_most(8.0));
        assert_eq!(set.load_period(), LoadPeriod::Day);
        assert_eq!(set.course_count(), CountBounds::new(2, 6));
        assert!(!set.daily_course_count().is_set());
    }

    #[test]
    fn test_deserialize_rejects_invalid() {
        let json = r#"{"course_priorities": {"1": 250}}"#;
        assert!(serde_json::from_str::<ConstraintSet>(json).is_err());
    }

    #[test]
    fn test_serialize_round_trip_keeps_config() {
        let config = ConstraintConfig::new().require_course(3).with_course_count(1, 4);
        let set = ConstraintSet::new(config.clone()).unwrap();
        let json = serde_json::to_string(&set).unwrap();
        let back: ConstraintSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back.config(), &config);
    }
}
