//! Weekly repeat of a placed lesson.
//!
//! Projects a lesson forward week by week. Each projected occurrence is
//! checked against the lunch break and against the lesson set as it was
//! before the expansion; occurrences that fail are skipped and reported,
//! and the rest are returned as placements ready to commit.
//!
//! Sibling occurrences are not checked against each other (they fall on
//! different dates).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::conflict::{check_conflict, straddles_lunch, Conflict};
use crate::models::{weeks_after, Lesson, LessonId, Outcome, Placement};

/// Accepted and skipped occurrences of a weekly repeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceReport {
    /// The lesson being repeated.
    pub base: LessonId,
    /// Weeks considered after clamping.
    pub weeks: u32,
    /// Occurrences that passed every check, in week order.
    pub accepted: Vec<Placement>,
    /// Occurrences that were dropped, in week order.
    pub skipped: Vec<SkippedOccurrence>,
}

/// An occurrence that was not placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedOccurrence {
    /// Week offset from the base lesson (1-based).
    pub week: u32,
    /// Projected date, if representable.
    pub date: Option<NaiveDate>,
    /// Why the occurrence was dropped.
    pub reason: SkipReason,
}

/// Why an occurrence was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The occurrence would straddle the lunch break.
    LunchBreak,
    /// The occurrence collides with an existing lesson.
    Conflict(Conflict),
    /// The projected date is past the calendar's range.
    DateOutOfRange,
}

impl RecurrenceReport {
    /// Batch outcome.
    pub fn outcome(&self) -> Outcome {
        Outcome::from_counts(self.accepted.len(), self.skipped.len())
    }
}

/// Projects `base` forward by 1..=`weeks` weeks.
///
/// `weeks` is clamped to `[1, max_repeat_weeks]`. Week `i` lands on
/// `base.date + 7·i` days with the same start, length, student,
/// instructor and room. `lessons` is the snapshot every occurrence is
/// checked against; it is never modified.
pub fn expand_weekly(
    lessons: &[Lesson],
    base: &Lesson,
    weeks: u32,
    config: &SchedulerConfig,
) -> RecurrenceReport {
    let weeks = config.clamp_repeat_weeks(weeks);
    let mut report = RecurrenceReport {
        base: base.id,
        weeks,
        accepted: Vec::new(),
        skipped: Vec::new(),
    };

    for week in 1..=weeks {
        let Some(date) = weeks_after(base.date(), week) else {
            report.skipped.push(SkippedOccurrence {
                week,
                date: None,
                reason: SkipReason::DateOutOfRange,
            });
            continue;
        };
        let candidate = Placement {
            date,
            ..base.placement.clone()
        };

        let reason = if straddles_lunch(&candidate, config.lunch) {
            Some(SkipReason::LunchBreak)
        } else {
            check_conflict(lessons, &candidate, None).map(SkipReason::Conflict)
        };

        match reason {
            Some(reason) => {
                log::debug!(
                    "Skipping week {} ({}) of lesson {}: {:?}",
                    week,
                    date,
                    base.id,
                    reason
                );
                report.skipped.push(SkippedOccurrence {
                    week,
                    date: Some(date),
                    reason,
                });
            }
            None => report.accepted.push(candidate),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::ConflictReason;
    use crate::models::LessonStatus;
    use chrono::NaiveTime;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
    }

    fn base() -> Lesson {
        Lesson::new(
            LessonId(1),
            Placement::new("S1", "I1", 1, day(), t(8, 0)).with_end(t(9, 0)),
        )
    }

    #[test]
    fn test_clean_repeat() {
        let lessons = vec![base()];
        let report = expand_weekly(&lessons, &base(), 4, &SchedulerConfig::default());

        assert_eq!(report.outcome(), Outcome::Complete);
        let dates: Vec<NaiveDate> = report.accepted.iter().map(|p| p.date).collect();
        let expected: Vec<NaiveDate> = (1..=4).map(|w| weeks_after(day(), w).unwrap()).collect();
        assert_eq!(dates, expected);
        assert!(report
            .accepted
            .iter()
            .all(|p| p.start == t(8, 0) && p.end_time() == t(9, 0) && p.room_id == 1));
    }

    #[test]
    fn test_conflicting_week_is_skipped() {
        let week_one = weeks_after(day(), 1).unwrap();
        let lessons = vec![
            base(),
            Lesson::new(
                LessonId(2),
                Placement::new("S2", "I2", 1, week_one, t(8, 0)),
            ),
        ];
        let report = expand_weekly(&lessons, &base(), 2, &SchedulerConfig::default());

        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.accepted[0].date, weeks_after(day(), 2).unwrap());
        assert_eq!(report.outcome(), Outcome::Partial);
        assert_eq!(
            report.skipped,
            vec![SkippedOccurrence {
                week: 1,
                date: Some(week_one),
                reason: SkipReason::Conflict(Conflict {
                    reason: ConflictReason::RoomBusy,
                    existing: LessonId(2),
                }),
            }]
        );
    }

    #[test]
    fn test_deleted_lessons_do_not_block() {
        let week_one = weeks_after(day(), 1).unwrap();
        let mut blocker = Lesson::new(
            LessonId(2),
            Placement::new("S2", "I1", 2, week_one, t(8, 0)),
        );
        blocker.status = LessonStatus::Deleted;
        let lessons = vec![base(), blocker];
        let report = expand_weekly(&lessons, &base(), 1, &SchedulerConfig::default());
        assert_eq!(report.outcome(), Outcome::Complete);
    }

    #[test]
    fn test_lunch_straddle_skips_everything() {
        let straddling = Lesson::new(
            LessonId(9),
            Placement::new("S1", "I1", 1, day(), t(11, 30)),
        );
        let report = expand_weekly(&[], &straddling, 3, &SchedulerConfig::default());
        assert_eq!(report.outcome(), Outcome::Failed);
        assert!(report
            .skipped
            .iter()
            .all(|s| s.reason == SkipReason::LunchBreak));
        assert_eq!(report.skipped.len(), 3);
    }

    #[test]
    fn test_weeks_are_clamped() {
        let config = SchedulerConfig::default();
        let none = expand_weekly(&[], &base(), 0, &config);
        assert_eq!(none.weeks, 1);
        assert_eq!(none.accepted.len(), 1);

        let many = expand_weekly(&[], &base(), 400, &config);
        assert_eq!(many.weeks, 52);
        assert_eq!(many.accepted.len(), 52);
    }

    #[test]
    fn test_snapshot_is_not_modified() {
        let lessons = vec![base()];
        let before = lessons.clone();
        let _ = expand_weekly(&lessons, &base(), 3, &SchedulerConfig::default());
        assert_eq!(lessons, before);
    }
}
