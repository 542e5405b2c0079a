//! Offering (course instance) model.
//!
//! An offering is one concrete, schedulable instance of a course: a fixed
//! set of sessions belonging to a requirement group.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use super::Session;

/// Course identifier, unique per offering.
pub type CourseId = u32;

/// Requirement group identifier.
pub type GroupId = String;

/// A schedulable course offering.
///
/// Equality and hashing use `course_id` only. Callers must not supply two
/// offerings with the same `course_id` but different `group_id`.
///
/// Offerings are immutable once loaded; desirability marks live in a
/// side table (see [`crate::preprocess::PreparedProblem`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offering {
    /// Unique course identifier.
    pub course_id: CourseId,
    /// Requirement group this offering fulfills. `None` = unassigned.
    pub group_id: Option<GroupId>,
    /// Meeting times. Order is irrelevant.
    pub sessions: Vec<Session>,
    /// Workload weight (credits).
    pub credits: u32,
    /// Human-readable title.
    #[serde(default)]
    pub title: String,
}

impl Offering {
    /// Creates an offering without group or sessions.
    pub fn new(course_id: CourseId) -> Self {
        Self {
            course_id,
            group_id: None,
            sessions: Vec::new(),
            credits: 0,
            title: String::new(),
        }
    }

    /// Sets the requirement group.
    pub fn with_group(mut self, group_id: impl Into<GroupId>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    /// Adds a session.
    pub fn with_session(mut self, session: Session) -> Self {
        self.sessions.push(session);
        self
    }

    /// Sets the credits.
    pub fn with_credits(mut self, credits: u32) -> Self {
        self.credits = credits;
        self
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Group identifier as `&str`, if any.
    pub fn group(&self) -> Option<&str> {
        self.group_id.as_deref()
    }

    /// Whether two offerings fulfill the same requirement group.
    pub fn shares_group(&self, other: &Self) -> bool {
        matches!((self.group(), other.group()), (Some(a), Some(b)) if a == b)
    }

    /// Whether any session of `self` overlaps any session of `other`.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.sessions
            .iter()
            .any(|a| other.sessions.iter().any(|b| a.overlaps(b)))
    }

    /// Total scheduled hours across all sessions.
    pub fn total_hours(&self) -> f64 {
        self.sessions.iter().map(Session::duration_hours).sum()
    }
}

impl PartialEq for Offering {
    fn eq(&self, other: &Self) -> bool {
        self.course_id == other.course_id
    }
}

impl Eq for Offering {}

impl Hash for Offering {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.course_id.hash(state);
    }
}
