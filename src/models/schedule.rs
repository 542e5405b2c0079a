//! Schedule (solution) model.
//!
//! A schedule is an ordered selection of offerings. The order reflects
//! construction order only; validity is checked by
//! [`FeasibilityChecker`](crate::feasibility::FeasibilityChecker).

use serde::{Deserialize, Serialize};

use super::{CourseId, Offering};

/// An ordered selection of offerings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Selected offerings, in construction order.
    pub offerings: Vec<Offering>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an offering.
    pub fn push(&mut self, offering: Offering) {
        self.offerings.push(offering);
    }

    /// Number of offerings.
    pub fn len(&self) -> usize {
        self.offerings.len()
    }

    /// Whether the schedule is empty.
    pub fn is_empty(&self) -> bool {
        self.offerings.is_empty()
    }

    /// Iterates over the offerings.
    pub fn iter(&self) -> std::slice::Iter<'_, Offering> {
        self.offerings.iter()
    }

    /// Whether the schedule contains a course.
    pub fn contains_course(&self, course_id: CourseId) -> bool {
        self.offerings.iter().any(|o| o.course_id == course_id)
    }

    /// Course ids in construction order.
    pub fn course_ids(&self) -> Vec<CourseId> {
        self.offerings.iter().map(|o| o.course_id).collect()
    }

    /// Sum of credits.
    pub fn total_credits(&self) -> u32 {
        self.offerings.iter().map(|o| o.credits).sum()
    }
}

impl From<Vec<Offering>> for Schedule {
    fn from(offerings: Vec<Offering>) -> Self {
        Self { offerings }
    }
}

impl FromIterator<Offering> for Schedule {
    fn from_iter<I: IntoIterator<Item = Offering>>(iter: I) -> Self {
        Self {
            offerings: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a Offering;
    type IntoIter = std::slice::Iter<'a, Offering>;

    fn into_iter(self) -> Self::IntoIter {
        self.offerings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::offering;

    fn sample_schedule() -> Schedule {
        vec![
            offering(1, "a", &[(0, 9, 10)]),
            offering(2, "b", &[(1, 9, 10)]),
            offering(3, "c", &[(2, 9, 10)]).with_credits(3),
        ]
        .into()
    }

    #[test]
    fn test_schedule_queries() {
        let s = sample_schedule();
        assert_eq!(s.len(), 3);
        assert!(!s.is_empty());
        assert!(s.contains_course(2));
        assert!(!s.contains_course(9));
        assert_eq!(s.course_ids(), vec![1, 2, 3]);
        assert_eq!(s.total_credits(), 13);
    }

    #[test]
    fn test_schedule_iteration() {
        let s = sample_schedule();
        let ids: Vec<u32> = (&s).into_iter().map(|o| o.course_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let rebuilt: Schedule = s.iter().cloned().collect();
        assert_eq!(rebuilt, s);
    }

    #[test]
    fn test_empty_schedule() {
        let mut s = Schedule::new();
        assert!(s.is_empty());
        assert_eq!(s.total_credits(), 0);
        s.push(offering(5, "x", &[]));
        assert_eq!(s.len(), 1);
    }
}
