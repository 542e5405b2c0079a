//! Schedule summary and listing.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Mark | Sum of offering marks (`None` on a hard violation) |
//! | Valid | Schedule passes the complete validity check |
//! | Credits | Sum of offering credits |
//! | Load | Min/max hours over active days (or weeks) |
//! | Courses per day | Distinct courses starting on each date |

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

use crate::models::{CourseId, Offering, Schedule, Session};
use crate::scoring::{Mark, Scorer};

const SESSION_FORMAT: &str = "%A %d.%m %H:%M";

/// One offering of a reported schedule.
#[derive(Debug, Clone)]
pub struct OfferingLine {
    pub course_id: CourseId,
    pub group_id: Option<String>,
    pub title: String,
    pub credits: u32,
    pub mark: Mark,
    pub sessions: Vec<Session>,
}

/// Summary of a schedule against one constraint snapshot.
#[derive(Debug, Clone)]
pub struct ScheduleReport {
    /// Schedule mark.
    pub mark: Option<Mark>,
    /// Whether the schedule is valid as complete.
    pub valid: bool,
    /// Number of offerings.
    pub course_count: usize,
    /// Total credits.
    pub total_credits: u32,
    /// (min, max) hour load over active periods.
    pub load: (f64, f64),
    /// Distinct courses per calendar day.
    pub courses_per_day: BTreeMap<NaiveDate, usize>,
    /// Offerings with their marks, sessions in chronological order.
    pub lines: Vec<OfferingLine>,
}

impl ScheduleReport {
    /// Builds the report for a schedule.
    pub fn calculate(schedule: &Schedule, scorer: &Scorer<'_>) -> Self {
        let checker = scorer.checker();
        let refs: Vec<&Offering> = schedule.iter().collect();

        let lines = schedule
            .iter()
            .map(|o| {
                let mut sessions = o.sessions.clone();
                sessions.sort_by_key(|s| s.start);
                OfferingLine {
                    course_id: o.course_id,
                    group_id: o.group_id.clone(),
                    title: o.title.clone(),
                    credits: o.credits,
                    mark: scorer.offering_mark(o),
                    sessions,
                }
            })
            .collect();

        Self {
            mark: scorer.schedule_mark(&refs),
            valid: checker.is_valid(&refs, true),
            course_count: schedule.len(),
            total_credits: schedule.total_credits(),
            load: checker.daily_or_weekly_load(&refs),
            courses_per_day: checker.scheduled_counts_per_day(&refs),
            lines,
        }
    }

    /// Busiest day and its course count.
    pub fn busiest_day(&self) -> Option<(NaiveDate, usize)> {
        self.courses_per_day
            .iter()
            .max_by_key(|(date, count)| (**count, std::cmp::Reverse(**date)))
            .map(|(date, count)| (*date, *count))
    }
}

impl fmt::Display for ScheduleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            let label = if line.title.is_empty() {
                format!("course {}", line.course_id)
            } else {
                format!("{} ({})", line.title, line.course_id)
            };
            writeln!(
                f,
                "{label} [{}] {} credits, mark {}",
                line.group_id.as_deref().unwrap_or("-"),
                line.credits,
                line.mark
            )?;
            for session in &line.sessions {
                writeln!(
                    f,
                    "    {} - {}",
                    session.start.format(SESSION_FORMAT),
                    session.end.format("%H:%M")
                )?;
            }
        }
        let mark = self
            .mark
            .map_or_else(|| "hard violation".to_string(), |m| m.to_string());
        write!(
            f,
            "{} courses, {} credits, mark {mark}, load {:.1}-{:.1} h, {}",
            self.course_count,
            self.total_credits,
            self.load.0,
            self.load.1,
            if self.valid { "valid" } else { "invalid" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConstraintConfig, ConstraintSet, FixedTimeRule};
    use crate::test_support::offering;

    fn schedule() -> Schedule {
        vec![
            offering(1, "math", &[(2, 10, 12), (0, 10, 12)]).with_title("Analysis"),
            offering(2, "cs", &[(0, 13, 14)]).with_credits(3),
        ]
        .into()
    }

    #[test]
    fn test_report_metrics() {
        let c = ConstraintSet::new(
            ConstraintConfig::new()
                .with_rule(FixedTimeRule::daily(10, 11, 15))
                .with_course_priority(2, 5),
        )
        .unwrap();
        let scorer = Scorer::new(&c);
        let report = ScheduleReport::calculate(&schedule(), &scorer);

        assert_eq!(report.mark, Some(30 + 5));
        assert!(report.valid);
        assert_eq!(report.course_count, 2);
        assert_eq!(report.total_credits, 8);
        assert!((report.load.0 - 2.0).abs() < 1e-10);
        assert!((report.load.1 - 3.0).abs() < 1e-10);
        assert_eq!(report.courses_per_day.len(), 2);
        assert_eq!(
            report.busiest_day(),
            Some((NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 2))
        );
    }

    #[test]
    fn test_report_listing() {
        let c = ConstraintSet::unconstrained();
        let scorer = Scorer::new(&c);
        let text = ScheduleReport::calculate(&schedule(), &scorer).to_string();

        assert!(text.contains("Analysis (1) [math] 5 credits, mark 0"));
        assert!(text.contains("course 2 [cs] 3 credits"));
        // Sessions are listed chronologically
        let monday = text.find("Monday 01.01 10:00 - 12:00").unwrap();
        let wednesday = text.find("Wednesday 03.01 10:00 - 12:00").unwrap();
        assert!(monday < wednesday);
        assert!(text.ends_with("2 courses, 8 credits, mark 0, load 2.0-3.0 h, valid"));
    }

    #[test]
    fn test_report_hard_violation() {
        let c = ConstraintSet::new(ConstraintConfig::new().forbid_course(2)).unwrap();
        let scorer = Scorer::new(&c);
        let report = ScheduleReport::calculate(&schedule(), &scorer);
        assert_eq!(report.mark, None);
        assert!(!report.valid);
        assert!(report.to_string().contains("mark hard violation"));
    }
}
