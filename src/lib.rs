//! Constraint evaluation and schedule construction for weekly course plans.
//!
//! Given a catalog of course offerings and a constraint snapshot (blocked
//! time windows, required and forbidden courses, course-count and hour-load
//! bounds, soft time and course preferences), builds high-scoring
//! overlap-free schedules and compares search strategies.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Session`, `Offering`, `Schedule`,
//!   `ConstraintConfig`, `ConstraintSet`
//! - **`feasibility`**: Hard-constraint checks (overlap sweep, load
//!   aggregation, composite validity)
//! - **`scoring`**: Offering and schedule marks
//! - **`preprocess`**: Filtering, mark side table, must-schedule resolution
//! - **`scheduler`**: Greedy, ordered backtracking and exhaustive solvers,
//!   plus schedule reports
//! - **`milp`**: 0/1 linear formulation for external MILP solvers
//! - **`validation`**: Catalog integrity checks
//!
//! # Example
//!
//! ```
//! use course_planner::models::{ConstraintConfig, ConstraintSet, Offering, Session};
//! use course_planner::preprocess::preprocess;
//! use course_planner::scheduler::{evaluate, GreedyConstructor};
//! use course_planner::scoring::Scorer;
//! use chrono::NaiveDate;
//!
//! let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let lecture = |h| Session::new(
//!     monday.and_hms_opt(h, 0, 0).unwrap(),
//!     monday.and_hms_opt(h + 2, 0, 0).unwrap(),
//! );
//! let catalog = vec![
//!     Offering::new(1).with_group("math").with_session(lecture(8)),
//!     Offering::new(2).with_group("math").with_session(lecture(10)),
//!     Offering::new(3).with_group("cs").with_session(lecture(10)),
//! ];
//!
//! let constraints = ConstraintSet::new(ConstraintConfig::new().with_course_count(2, 2)).unwrap();
//! let scorer = Scorer::new(&constraints);
//! let problem = preprocess(&scorer, catalog).unwrap();
//!
//! let outcome = evaluate(&GreedyConstructor::new(), &problem);
//! assert!(outcome.is_success());
//! assert_eq!(outcome.schedule.unwrap().course_ids(), vec![1, 3]);
//! ```
//!
//! # References
//!
//! - Feldman & Golumbic (1990), "Optimization Algorithms for Student
//!   Scheduling via Constraint Satisfiability", The Computer Journal 33(4)
//! - Schaerf (1999), "A Survey of Automated Timetabling", Artificial
//!   Intelligence Review 13(2)

pub mod error;
pub mod feasibility;
pub mod milp;
pub mod models;
pub mod preprocess;
pub mod scheduler;
pub mod scoring;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use error::{ConfigError, PreprocessError, SelectionError};
pub use feasibility::FeasibilityChecker;
pub use preprocess::{preprocess, PreparedProblem};
pub use scoring::{Mark, Scorer};
