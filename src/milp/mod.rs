//! Mixed-integer formulation for external solvers.
//!
//! Translates a [`PreparedProblem`] into a solver-agnostic 0/1 linear
//! program. The core does not solve it; an external MILP solver consumes
//! the variables, objective and rows, and hands back the selected course
//! ids, which [`MilpModel::accept`] validates like any other schedule.
//!
//! # Formulation
//!
//! Binary `y_o` per offering, maximize `Σ mark(o) · y_o`, subject to:
//! - must-schedule course: `y_o = 1`
//! - group: `Σ_{o ∈ g} y_o ≤ 1` (`= 1` for a must-schedule group)
//! - course count: `min ≤ Σ y_o ≤ max`
//! - forbidden pair (overlap or same group): `y_i + y_j ≤ 1`
//! - daily count, with day indicator `u_d`:
//!   `Σ_{o on d} y_o ≥ min · u_d` and `Σ_{o on d} y_o ≤ max · u_d`
//! - hour load per period `b`: `Σ h_{o,b} · y_o ≤ max`; for a lower bound,
//!   with period indicator `p_b`, `Σ h_{o,b} · y_o ≥ min · p_b`,
//!   `Σ h_{o,b} · y_o ≤ H_b · p_b` and `Σ p_b ≥ 1`
//!
//! Summing hours is exact because forbidden pairs rule out overlaps.
//!
//! # Reference
//! Williams (2013), "Model Building in Mathematical Programming", 5th ed.,
//! Ch. 9: Building Integer Programming Models

use chrono::NaiveDate;
use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::SelectionError;
use crate::feasibility::{hours_by_period, FeasibilityChecker, LoadBucket};
use crate::models::{Bounds, CourseId, LoadPeriod, Offering, Schedule};
use crate::preprocess::PreparedProblem;

const TOLERANCE: f64 = 1e-9;

/// A binary decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    /// Whether the offering is selected.
    Offering(CourseId),
    /// Whether any selected offering meets on the date.
    DayUsed(NaiveDate),
    /// Whether any selected offering contributes hours to the period.
    PeriodUsed(LoadBucket),
}

/// Row sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Le,
    Ge,
    Eq,
}

/// A linear row `Σ coef · x  (sense)  rhs` over variable indices.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    /// Row name, e.g. `"group:math"`.
    pub name: String,
    /// `(variable index, coefficient)` pairs.
    pub terms: Vec<(usize, f64)>,
    pub sense: Sense,
    pub rhs: f64,
}

impl LinearConstraint {
    fn new(name: impl Into<String>, terms: Vec<(usize, f64)>, sense: Sense, rhs: f64) -> Self {
        Self {
            name: name.into(),
            terms,
            sense,
            rhs,
        }
    }

    /// Left-hand side under an assignment.
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(var, coef)| coef * values.get(var).copied().unwrap_or(0.0))
            .sum()
    }

    /// Whether the row holds under an assignment.
    pub fn is_satisfied(&self, values: &[f64]) -> bool {
        let lhs = self.lhs(values);
        match self.sense {
            Sense::Le => lhs <= self.rhs + TOLERANCE,
            Sense::Ge => lhs >= self.rhs - TOLERANCE,
            Sense::Eq => (lhs - self.rhs).abs() <= TOLERANCE,
        }
    }
}

/// A 0/1 linear program for one prepared problem.
#[derive(Debug, Clone)]
pub struct MilpModel {
    version: u64,
    variables: Vec<Variable>,
    index: HashMap<Variable, usize>,
    objective: Vec<f64>,
    constraints: Vec<LinearConstraint>,
    forbidden_pairs: Vec<(CourseId, CourseId)>,
    hour_load: Bounds<f64>,
    load_period: LoadPeriod,
    offerings: Vec<Offering>,
}

impl MilpModel {
    /// Constraint version the model was built against.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// All variables; row terms refer to positions in this slice.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Position of a variable.
    pub fn variable_index(&self, variable: &Variable) -> Option<usize> {
        self.index.get(variable).copied()
    }

    /// Objective coefficients (to maximize), aligned with [`Self::variables`].
    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Course pairs that may not both be selected.
    pub fn forbidden_pairs(&self) -> &[(CourseId, CourseId)] {
        &self.forbidden_pairs
    }

    /// Hour-load bounds of the snapshot.
    pub fn hour_load(&self) -> Bounds<f64> {
        self.hour_load
    }

    /// Objective value of an assignment.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective
            .iter()
            .zip(values)
            .map(|(coef, value)| coef * value)
            .sum()
    }

    /// The assignment a selection induces, indicators included.
    ///
    /// Course ids that are not variables of the model are ignored.
    pub fn values_for(&self, selection: &[CourseId]) -> Vec<f64> {
        let mut values = vec![0.0; self.variables.len()];
        for offering in self.offerings.iter().filter(|o| selection.contains(&o.course_id)) {
            let mut set = |variable: Variable| {
                if let Some(&i) = self.index.get(&variable) {
                    values[i] = 1.0;
                }
            };
            set(Variable::Offering(offering.course_id));
            for session in &offering.sessions {
                set(Variable::DayUsed(session.date()));
            }
            for bucket in hours_by_period(&[offering], self.load_period).into_keys() {
                set(Variable::PeriodUsed(bucket));
            }
        }
        values
    }

    /// Whether every row holds under an assignment.
    pub fn is_satisfied(&self, values: &[f64]) -> bool {
        self.constraints.iter().all(|row| row.is_satisfied(values))
    }

    /// Decodes a solver's selection into a validated schedule.
    ///
    /// # Errors
    /// Fails if the checker belongs to a different constraint version, a
    /// course id is not a model variable, or the selection is not valid as
    /// a complete schedule.
    pub fn accept(
        &self,
        selection: &[CourseId],
        checker: &FeasibilityChecker<'_>,
    ) -> Result<Schedule, SelectionError> {
        let current = checker.constraints().version();
        if current != self.version {
            return Err(SelectionError::StaleModel {
                model: self.version,
                checker: current,
            });
        }

        let mut refs: Vec<&Offering> = Vec::with_capacity(selection.len());
        for &course_id in selection {
            let offering = self
                .offerings
                .iter()
                .find(|o| o.course_id == course_id)
                .ok_or(SelectionError::UnknownCourse(course_id))?;
            refs.push(offering);
        }

        if !checker.is_valid(&refs, true) {
            return Err(SelectionError::Invalid(refs.len()));
        }
        info!("accepted external selection of {} courses", refs.len());
        Ok(refs.into_iter().cloned().collect())
    }
}

/// Builds a [`MilpModel`] from a prepared problem.
///
/// # Example
/// ```
/// use course_planner::milp::MilpModelBuilder;
/// use course_planner::models::{ConstraintConfig, ConstraintSet, Offering};
/// use course_planner::preprocess::preprocess;
/// use course_planner::scoring::Scorer;
///
/// let constraints = ConstraintSet::new(ConstraintConfig::new().with_course_count(1, 2)).unwrap();
/// let scorer = Scorer::new(&constraints);
/// let problem = preprocess(&scorer, vec![
///     Offering::new(1).with_group("a"),
///     Offering::new(2).with_group("a"),
/// ]).unwrap();
///
/// let model = MilpModelBuilder::new(&problem).build();
/// assert_eq!(model.forbidden_pairs(), &[(1, 2)]);
/// let schedule = model.accept(&[2], scorer.checker()).unwrap();
/// assert_eq!(schedule.course_ids(), vec![2]);
/// ```
#[derive(Debug)]
pub struct MilpModelBuilder<'p, 'a> {
    problem: &'p PreparedProblem<'a>,
}

impl<'p, 'a> MilpModelBuilder<'p, 'a> {
    /// Creates a builder for a prepared problem.
    pub fn new(problem: &'p PreparedProblem<'a>) -> Self {
        Self { problem }
    }

    /// All pairs of pool offerings that overlap in time or share a group.
    pub fn forbidden_pairs(&self) -> Vec<(CourseId, CourseId)> {
        let offerings = self.problem.offerings();
        let mut pairs = Vec::new();
        for (i, a) in offerings.iter().enumerate() {
            for b in &offerings[i + 1..] {
                if a.shares_group(b) || a.overlaps(b) {
                    pairs.push((a.course_id.min(b.course_id), a.course_id.max(b.course_id)));
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }

    /// Builds the model.
    pub fn build(&self) -> MilpModel {
        let problem = self.problem;
        let constraints = problem.checker().constraints();
        let offerings = problem.offerings();

        let mut model = MilpModel {
            version: constraints.version(),
            variables: Vec::new(),
            index: HashMap::new(),
            objective: Vec::new(),
            constraints: Vec::new(),
            forbidden_pairs: Vec::new(),
            hour_load: constraints.hour_load(),
            load_period: constraints.load_period(),
            offerings: offerings.to_vec(),
        };

        let y: Vec<usize> = offerings
            .iter()
            .map(|o| model.add_variable(Variable::Offering(o.course_id), problem.mark(o.course_id) as f64))
            .collect();
        let var_of: HashMap<CourseId, usize> = offerings
            .iter()
            .zip(&y)
            .map(|(o, &v)| (o.course_id, v))
            .collect();

        for course_id in constraints.must_schedule() {
            if let Some(&v) = var_of.get(course_id) {
                model.add_row(format!("must:{course_id}"), vec![(v, 1.0)], Sense::Eq, 1.0);
            }
        }

        let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (o, &v) in offerings.iter().zip(&y) {
            if let Some(g) = o.group() {
                groups.entry(g).or_default().push(v);
            }
        }
        for group in constraints.must_schedule_groups() {
            let vars = groups.get(group.as_str()).cloned().unwrap_or_default();
            model.add_row(format!("must-group:{group}"), ones(&vars), Sense::Eq, 1.0);
        }
        for (group, vars) in &groups {
            if vars.len() > 1 && !constraints.must_schedule_groups().contains(*group) {
                model.add_row(format!("group:{group}"), ones(vars), Sense::Le, 1.0);
            }
        }

        let count = constraints.course_count();
        if count.min > 0 {
            model.add_row("count:min", ones(&y), Sense::Ge, count.min as f64);
        }
        if count.max < y.len() {
            model.add_row("count:max", ones(&y), Sense::Le, count.max as f64);
        }

        let pairs = self.forbidden_pairs();
        for &(a, b) in &pairs {
            if let (Some(&va), Some(&vb)) = (var_of.get(&a), var_of.get(&b)) {
                model.add_row(format!("pair:{a}:{b}"), vec![(va, 1.0), (vb, 1.0)], Sense::Le, 1.0);
            }
        }
        model.forbidden_pairs = pairs;

        self.add_daily_rows(&mut model, &y);
        self.add_load_rows(&mut model, &y);

        debug!(
            "milp model: {} variables, {} rows, {} forbidden pairs",
            model.variables.len(),
            model.constraints.len(),
            model.forbidden_pairs.len()
        );
        model
    }

    fn add_daily_rows(&self, model: &mut MilpModel, y: &[usize]) {
        let daily = self.problem.checker().constraints().daily_course_count();
        if !daily.is_set() {
            return;
        }

        let mut days: BTreeMap<NaiveDate, BTreeSet<usize>> = BTreeMap::new();
        for (o, &v) in self.problem.offerings().iter().zip(y) {
            for session in &o.sessions {
                days.entry(session.date()).or_default().insert(v);
            }
        }

        for (date, vars) in days {
            let vars: Vec<usize> = vars.into_iter().collect();
            let u = model.add_variable(Variable::DayUsed(date), 0.0);
            if let Some(min) = daily.min.filter(|&m| m > 0) {
                let mut terms = ones(&vars);
                terms.push((u, -(min as f64)));
                model.add_row(format!("day:{date}:min"), terms, Sense::Ge, 0.0);
            }
            let cap = daily.max.map_or(vars.len(), |m| m.min(vars.len()));
            let mut terms = ones(&vars);
            terms.push((u, -(cap as f64)));
            model.add_row(format!("day:{date}:max"), terms, Sense::Le, 0.0);
        }
    }

    fn add_load_rows(&self, model: &mut MilpModel, y: &[usize]) {
        let constraints = self.problem.checker().constraints();
        let bounds = constraints.hour_load();
        if !bounds.is_set() {
            return;
        }
        let period = constraints.load_period();

        let mut buckets: BTreeMap<LoadBucket, Vec<(usize, f64)>> = BTreeMap::new();
        for (o, &v) in self.problem.offerings().iter().zip(y) {
            for (bucket, hours) in hours_by_period(&[o], period) {
                buckets.entry(bucket).or_default().push((v, hours));
            }
        }

        let min = bounds.min.filter(|&m| m > 0.0);
        let mut indicators = Vec::new();
        for (bucket, terms) in buckets {
            let label = match bucket {
                LoadBucket::Day(date) => date.to_string(),
                LoadBucket::Week { year, week } => format!("{year}-W{week:02}"),
            };
            if let Some(max) = bounds.max {
                model.add_row(format!("load:{label}:max"), terms.clone(), Sense::Le, max);
            }
            if let Some(min) = min {
                let p = model.add_variable(Variable::PeriodUsed(bucket), 0.0);
                indicators.push(p);
                let total: f64 = terms.iter().map(|&(_, h)| h).sum();

                let mut lower = terms.clone();
                lower.push((p, -min));
                model.add_row(format!("load:{label}:min"), lower, Sense::Ge, 0.0);

                let mut link = terms;
                link.push((p, -total));
                model.add_row(format!("load:{label}:active"), link, Sense::Le, 0.0);
            }
        }
        if min.is_some() {
            model.add_row("load:any", ones(&indicators), Sense::Ge, 1.0);
        }
    }
}

impl MilpModel {
    fn add_variable(&mut self, variable: Variable, coefficient: f64) -> usize {
        let i = self.variables.len();
        self.variables.push(variable);
        self.index.insert(variable, i);
        self.objective.push(coefficient);
        i
    }

    fn add_row(&mut self, name: impl Into<String>, terms: Vec<(usize, f64)>, sense: Sense, rhs: f64) {
        self.constraints.push(LinearConstraint::new(name, terms, sense, rhs));
    }
}

fn ones(vars: &[usize]) -> Vec<(usize, f64)> {
    vars.iter().map(|&v| (v, 1.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConstraintConfig, ConstraintSet};
    use crate::preprocess::preprocess;
    use crate::scoring::Scorer;
    use crate::test_support::offering;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn pool() -> Vec<Offering> {
        vec![
            offering(1, "a", &[(0, 9, 11)]),
            offering(2, "a", &[(1, 9, 11)]),
            offering(3, "b", &[(0, 10, 12)]),
            offering(4, "c", &[(2, 9, 10)]),
        ]
    }

    #[test]
    fn test_forbidden_pairs() {
        let c = ConstraintSet::unconstrained();
        let scorer = Scorer::new(&c);
        let problem = preprocess(&scorer, pool()).unwrap();
        let pairs = MilpModelBuilder::new(&problem).forbidden_pairs();
        // 1-2 share a group, 1-3 overlap
        assert_eq!(pairs, vec![(1, 2), (1, 3)]);
    }

    #[test]
    fn test_objective_uses_marks() {
        let c = ConstraintSet::new(
            ConstraintConfig::new()
                .with_course_priority(3, 40)
                .with_group_priority("c", -15),
        )
        .unwrap();
        let scorer = Scorer::new(&c);
        let problem = preprocess(&scorer, pool()).unwrap();
        let model = MilpModelBuilder::new(&problem).build();

        let i3 = model.variable_index(&Variable::Offering(3)).unwrap();
        let i4 = model.variable_index(&Variable::Offering(4)).unwrap();
        assert_eq!(model.objective()[i3], 40.0);
        assert_eq!(model.objective()[i4], -15.0);
        let values = model.values_for(&[3, 4]);
        assert_eq!(model.objective_value(&values), 25.0);
    }

    #[test]
    fn test_rows() {
        let c = ConstraintSet::new(
            ConstraintConfig::new()
                .require_course(4)
                .with_course_count(2, 3)
                .with_daily_course_count(Bounds::between(2, 3)),
        )
        .unwrap();
        let scorer = Scorer::new(&c);
        let problem = preprocess(&scorer, pool()).unwrap();
        let model = MilpModelBuilder::new(&problem).build();

        let names: Vec<&str> = model.constraints().iter().map(|r| r.name.as_str()).collect();
        assert!(names.contains(&"must:4"));
        assert!(names.contains(&"group:a"));
        assert!(names.contains(&"count:min"));
        assert!(names.contains(&"count:max"));
        assert!(names.contains(&"pair:1:3"));
        assert!(names.contains(&"day:2024-01-01:min"));
        let days = model
            .variables()
            .iter()
            .filter(|v| matches!(v, Variable::DayUsed(_)))
            .count();
        assert_eq!(days, 3);
    }

    #[test]
    fn test_accept() {
        let c = ConstraintSet::new(ConstraintConfig::new().with_course_count(2, 2)).unwrap();
        let scorer = Scorer::new(&c);
        let problem = preprocess(&scorer, pool()).unwrap();
        let model = MilpModelBuilder::new(&problem).build();
        let checker = scorer.checker();

        let schedule = model.accept(&[2, 3], checker).unwrap();
        assert_eq!(schedule.course_ids(), vec![2, 3]);
        assert_eq!(model.accept(&[1, 3], checker), Err(SelectionError::Invalid(2)));
        assert_eq!(model.accept(&[4], checker), Err(SelectionError::Invalid(1)));
        assert_eq!(model.accept(&[2, 9], checker), Err(SelectionError::UnknownCourse(9)));
    }

    #[test]
    fn test_accept_rejects_stale_model() {
        let old = ConstraintSet::unconstrained();
        let scorer = Scorer::new(&old);
        let problem = preprocess(&scorer, pool()).unwrap();
        let model = MilpModelBuilder::new(&problem).build();

        let new = ConstraintSet::unconstrained();
        let checker = FeasibilityChecker::new(&new);
        assert!(matches!(
            model.accept(&[2], &checker),
            Err(SelectionError::StaleModel { .. })
        ));
    }

    /// Every subset of a random pool satisfies the model iff the checker
    /// accepts it as a complete schedule.
    #[test]
    fn test_model_matches_checker() {
        let mut rng = StdRng::seed_from_u64(11);
        for round in 0..40 {
            let mut config = ConstraintConfig::new().with_course_count(1, 4);
            if round % 2 == 0 {
                config = config.with_daily_course_count(Bounds::between(2, 2));
            }
            if round % 3 == 0 {
                let period = if round % 2 == 0 { LoadPeriod::Day } else { LoadPeriod::Week };
                config = config.with_hour_load(Bounds::between(2.0, 4.0), period);
            }
            if round % 5 == 0 {
                config = config.with_group_priority("g0", 100);
            }

            let pool: Vec<Offering> = (1..=8u32)
                .map(|id| {
                    let day = rng.random_range(0..7);
                    let from = rng.random_range(8..16);
                    let to = from + rng.random_range(1..4);
                    let group = format!("g{}", rng.random_range(0..4));
                    offering(id, &group, &[(day, from, to)])
                })
                .collect();

            let c = ConstraintSet::new(config).unwrap();
            let scorer = Scorer::new(&c);
            let Ok(problem) = preprocess(&scorer, pool) else {
                continue;
            };
            let model = MilpModelBuilder::new(&problem).build();
            let ids: Vec<CourseId> = problem.offerings().iter().map(|o| o.course_id).collect();

            for mask in 0u32..(1 << ids.len()) {
                let selection: Vec<CourseId> = ids
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, &id)| id)
                    .collect();
                let refs: Vec<&Offering> = problem
                    .offerings()
                    .iter()
                    .filter(|o| selection.contains(&o.course_id))
                    .collect();
                let expected = scorer.checker().is_valid(&refs, true);
                let values = model.values_for(&selection);
                assert_eq!(
                    model.is_satisfied(&values),
                    expected,
                    "round {round}, selection {selection:?}"
                );
            }
        }
    }
}
