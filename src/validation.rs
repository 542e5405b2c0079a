//! Input validation for offering catalogs.
//!
//! Checks structural integrity of offerings before preprocessing.
//! Detects:
//! - Duplicate course ids (with and without conflicting groups)
//! - Empty or inverted sessions
//! - Sessions of one offering overlapping each other
//! - Offerings without a group
//! - Required courses and groups absent from the catalog
//!
//! All problems are collected; validation does not stop at the first one.

use std::collections::{HashMap, HashSet};

use crate::feasibility::sessions_overlap;
use crate::models::{ConstraintSet, CourseId, Offering};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two offerings share a course id.
    DuplicateId,
    /// Two offerings share a course id but name different groups.
    ConflictingGroup,
    /// A session ends at or before its start.
    InvalidSession,
    /// Two sessions of the same offering overlap.
    SelfOverlap,
    /// An offering has no group.
    MissingGroup,
    /// A required course or group does not occur in the catalog.
    UnknownReference,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates an offering catalog.
///
/// Checks:
/// 1. No duplicate course ids; duplicates naming different groups are
///    reported as [`ValidationErrorKind::ConflictingGroup`]
/// 2. Every session ends after it starts
/// 3. No two sessions of one offering overlap
/// 4. Every offering has a group
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_offerings(offerings: &[Offering]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut seen: HashMap<CourseId, &Offering> = HashMap::new();
    for offering in offerings {
        if let Some(first) = seen.get(&offering.course_id) {
            let (kind, message) = if first.group_id != offering.group_id {
                (
                    ValidationErrorKind::ConflictingGroup,
                    format!(
                        "Course {} appears in groups {:?} and {:?}",
                        offering.course_id, first.group_id, offering.group_id
                    ),
                )
            } else {
                (
                    ValidationErrorKind::DuplicateId,
                    format!("Duplicate course ID: {}", offering.course_id),
                )
            };
            errors.push(ValidationError::new(kind, message));
        } else {
            seen.insert(offering.course_id, offering);
        }

        if offering.group_id.is_none() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingGroup,
                format!("Course {} has no group", offering.course_id),
            ));
        }

        let mut well_formed = true;
        for session in &offering.sessions {
            if session.end <= session.start {
                well_formed = false;
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidSession,
                    format!(
                        "Course {} has a session from {} to {}",
                        offering.course_id, session.start, session.end
                    ),
                ));
            }
        }

        if well_formed && sessions_overlap(offering.sessions.clone()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::SelfOverlap,
                format!("Course {} has overlapping sessions", offering.course_id),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a catalog together with the constraint snapshot it will be
/// scheduled against.
///
/// Runs [`validate_offerings`] and additionally checks that every required
/// course and required group occurs in the catalog.
pub fn validate_input(offerings: &[Offering], constraints: &ConstraintSet) -> ValidationResult {
    let mut errors = validate_offerings(offerings).err().unwrap_or_default();

    let course_ids: HashSet<CourseId> = offerings.iter().map(|o| o.course_id).collect();
    for course_id in constraints.must_schedule() {
        if !course_ids.contains(course_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownReference,
                format!("Required course {course_id} is not in the catalog"),
            ));
        }
    }

    let groups: HashSet<&str> = offerings.iter().filter_map(|o| o.group()).collect();
    for group in constraints.must_schedule_groups() {
        if !groups.contains(group.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownReference,
                format!("Required group '{group}' is not in the catalog"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
