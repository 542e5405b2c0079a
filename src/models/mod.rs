//! Course scheduling domain models.
//!
//! Provides the data types for describing a student's scheduling problem
//! and its solutions.
//!
//! # Domain Mappings
//!
//! | course-planner | University catalog | Feldman & Golumbic |
//! |----------------|--------------------|--------------------|
//! | Offering | Course section | Offering |
//! | Group | Requirement slot | Course |
//! | Session | Lecture/tutorial meeting | Time slot |
//! | ConstraintSet | Student preferences | Requirements + marks |
//! | Schedule | Weekly timetable | Schedule |

mod constraint;
mod offering;
mod schedule;
mod session;

pub use constraint::{
    Bounds, ConstraintConfig, ConstraintSet, CountBounds, FixedTimeRule, LoadPeriod, MAX_PRIORITY,
};
pub use offering::{CourseId, GroupId, Offering};
pub use schedule::Schedule;
pub use session::{is_workday, Session};
