//! Error types.
//!
//! Configuration problems are fatal and reported before any search starts.
//! A search that finds no schedule is not an error; solvers return `None`.

use thiserror::Error;

use crate::models::{CourseId, GroupId};

/// An invalid constraint snapshot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("priority {weight} for {target} is outside [-{max}, {max}]")]
    WeightOutOfRange {
        target: String,
        weight: i32,
        max: i32,
    },
    #[error("hour window {hour_start}..{hour_end} is not within 0..=24 with start < end")]
    InvalidHourWindow { hour_start: u32, hour_end: u32 },
    #[error("{name} bounds are inverted: min {min} > max {max}")]
    InvertedBounds {
        name: &'static str,
        min: String,
        max: String,
    },
    #[error("hour load bound {0} is negative or not finite")]
    InvalidHourLoad(f64),
}

/// A configuration that cannot be satisfied by any schedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreprocessError {
    #[error("required course {0} is not in the offering pool")]
    MissingRequiredCourse(CourseId),
    #[error("required course {0} has no group or violates a hard constraint")]
    RequiredCourseInfeasible(CourseId),
    #[error("required courses {0} and {1} overlap")]
    RequiredCoursesOverlap(CourseId, CourseId),
    #[error("required courses {0} and {1} belong to the same group")]
    RequiredCoursesShareGroup(CourseId, CourseId),
    #[error("required group '{0}' has no offering compatible with the other required courses")]
    RequiredGroupUnsatisfiable(GroupId),
}

/// An externally solved selection that cannot be turned into a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("model was built for constraint version {model}, checker has version {checker}")]
    StaleModel { model: u64, checker: u64 },
    #[error("course {0} is not a variable of the model")]
    UnknownCourse(CourseId),
    #[error("selection of {0} courses is not a valid complete schedule")]
    Invalid(usize),
}
