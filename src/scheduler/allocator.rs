//! Initial weekly slot allocation.
//!
//! # Algorithm
//!
//! 1. Assign instructors round-robin over the active instructors
//!    (`student index mod instructor count`), unconditionally.
//! 2. Build the weekly slot catalog (weekday × grid time, lunch excluded)
//!    and shuffle it once; every student scans the same order.
//! 3. For each active student in input order, take the first slot where
//!    the instructor is free, some room is free (lowest free room id wins),
//!    the lesson does not straddle lunch and the student has no other
//!    lesson on that weekday.
//! 4. Expand the chosen slot into one dated lesson per week over the
//!    initial horizon.
//!
//! Students without a feasible slot get no lessons and are listed in
//! [`AllocationReport::unscheduled`]. There is no backtracking, so input
//! order matters and the result is a best-effort heuristic, not a maximum
//! matching.
//!
//! # Complexity
//! O(s · c · a) where s=students, c=catalog size, a=slots already taken.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching

use std::collections::HashSet;

use chrono::{NaiveDate, Weekday};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::conflict::{clashes, straddles_lunch, ConflictKey};
use crate::error::ScheduleError;
use crate::models::{
    weeks_after, Instructor, Lesson, LessonId, Outcome, Placement, Student, WeeklySlot,
};

/// Result of an initial allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationReport {
    /// Dated lessons for every scheduled student.
    pub lessons: Vec<Lesson>,
    /// Input students with their instructor assignment filled in.
    pub students: Vec<Student>,
    /// Weekly slot chosen for each scheduled student.
    pub assignments: Vec<SlotAssignment>,
    /// Students that received no lessons.
    pub unscheduled: Vec<UnscheduledStudent>,
}

/// A student's recurring weekly lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignment {
    /// Scheduled student.
    pub student_id: String,
    /// Assigned instructor.
    pub instructor_id: String,
    /// Weekly slot.
    pub slot: WeeklySlot,
    /// Room number.
    pub room_id: u32,
}

/// A student left without lessons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnscheduledStudent {
    /// Student ID.
    pub student_id: String,
    /// Why no slot was given.
    pub reason: UnscheduledReason,
}

/// Why a student was not scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnscheduledReason {
    /// Inactive students never receive new lessons.
    Inactive,
    /// Every slot was blocked for the instructor, the rooms or lunch.
    NoFeasibleSlot,
}

impl AllocationReport {
    /// Batch outcome over the active students.
    ///
    /// Inactive students are not counted as failures.
    pub fn outcome(&self) -> Outcome {
        let skipped = self
            .unscheduled
            .iter()
            .filter(|u| u.reason == UnscheduledReason::NoFeasibleSlot)
            .count();
        Outcome::from_counts(self.assignments.len(), skipped)
    }

    /// Whether the student received a weekly slot.
    pub fn is_scheduled(&self, student_id: &str) -> bool {
        self.assignments.iter().any(|a| a.student_id == student_id)
    }
}

/// Greedy weekly slot allocator.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_lesson::config::SchedulerConfig;
/// use u_lesson::models::{Instructor, Student};
/// use u_lesson::scheduler::SlotAllocator;
///
/// let students = vec![Student::new("S1"), Student::new("S2")];
/// let instructors = vec![Instructor::new("I1")];
/// let anchor = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
///
/// let allocator = SlotAllocator::new(SchedulerConfig::default());
/// let report = allocator.allocate_seeded(&students, &instructors, anchor, 7).unwrap();
/// assert_eq!(report.lessons.len(), 2 * 12);
/// ```
#[derive(Debug, Clone)]
pub struct SlotAllocator {
    config: SchedulerConfig,
    first_id: u64,
}

impl SlotAllocator {
    /// Creates an allocator. Lesson ids start at 1.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            first_id: 1,
        }
    }

    /// Sets the first lesson id handed out.
    pub fn with_first_id(mut self, first_id: u64) -> Self {
        self.first_id = first_id;
        self
    }

    /// Allocates with a fixed seed; identical inputs give identical results.
    pub fn allocate_seeded(
        &self,
        students: &[Student],
        instructors: &[Instructor],
        anchor: NaiveDate,
        seed: u64,
    ) -> Result<AllocationReport, ScheduleError> {
        let mut rng = SmallRng::seed_from_u64(seed);
        self.allocate(students, instructors, anchor, &mut rng)
    }

    /// Allocates a weekly slot to every active student.
    ///
    /// The first occurrence of each slot is the first matching weekday on
    /// or after `anchor`.
    ///
    /// # Errors
    /// [`ScheduleError::InvalidConfig`] if the configuration is inconsistent;
    /// [`ScheduleError::NoActiveInstructors`] if no instructor is active.
    pub fn allocate<R: Rng + ?Sized>(
        &self,
        students: &[Student],
        instructors: &[Instructor],
        anchor: NaiveDate,
        rng: &mut R,
    ) -> Result<AllocationReport, ScheduleError> {
        self.config.validate()?;

        let active: Vec<&Instructor> = instructors.iter().filter(|i| i.is_active()).collect();
        if active.is_empty() {
            return Err(ScheduleError::NoActiveInstructors);
        }

        let mut catalog = self.config.weekly_slots();
        catalog.shuffle(rng);

        let mut students = students.to_vec();
        let mut report = AllocationReport {
            lessons: Vec::new(),
            students: Vec::new(),
            assignments: Vec::new(),
            unscheduled: Vec::new(),
        };
        // First-week occurrence of every slot taken so far.
        let mut first_week: Vec<Placement> = Vec::new();
        let mut booked_days: HashSet<(String, Weekday)> = HashSet::new();
        let mut next_id = self.first_id;

        for (idx, student) in students.iter_mut().enumerate() {
            let instructor = active[idx % active.len()];
            student.instructor_id = Some(instructor.id.clone());

            if !student.is_active() {
                log::debug!("Skipping inactive student '{}'", student.id);
                report.unscheduled.push(UnscheduledStudent {
                    student_id: student.id.clone(),
                    reason: UnscheduledReason::Inactive,
                });
                continue;
            }

            let found = catalog.iter().find_map(|slot| {
                if booked_days.contains(&(student.id.clone(), slot.weekday)) {
                    return None;
                }
                let date = slot.first_date_from(anchor)?;
                let probe = Placement::new(&student.id, &instructor.id, 0, date, slot.start)
                    .with_minutes(self.config.lesson_minutes);
                if !probe.window().is_valid() || straddles_lunch(&probe, self.config.lunch) {
                    return None;
                }
                if first_week
                    .iter()
                    .any(|p| clashes(p, &probe, ConflictKey::Instructor))
                {
                    return None;
                }
                let room_id = (1..=self.config.room_count).find(|&room_id| {
                    let in_room = Placement {
                        room_id,
                        ..probe.clone()
                    };
                    !first_week
                        .iter()
                        .any(|p| clashes(p, &in_room, ConflictKey::Room))
                })?;
                Some((*slot, Placement { room_id, ..probe }))
            });

            let Some((slot, placement)) = found else {
                log::warn!(
                    "No feasible weekly slot for student '{}' (instructor '{}')",
                    student.id,
                    instructor.id
                );
                report.unscheduled.push(UnscheduledStudent {
                    student_id: student.id.clone(),
                    reason: UnscheduledReason::NoFeasibleSlot,
                });
                continue;
            };

            log::debug!(
                "Student '{}' -> {:?} {} room {} with '{}'",
                student.id,
                slot.weekday,
                slot.start,
                placement.room_id,
                instructor.id
            );

            booked_days.insert((student.id.clone(), slot.weekday));
            for week in 0..self.config.initial_horizon_weeks {
                let Some(date) = weeks_after(placement.date, week) else {
                    break;
                };
                report.lessons.push(Lesson::new(
                    LessonId(next_id),
                    Placement {
                        date,
                        ..placement.clone()
                    },
                ));
                next_id += 1;
            }
            report.assignments.push(SlotAssignment {
                student_id: student.id.clone(),
                instructor_id: instructor.id.clone(),
                slot,
                room_id: placement.room_id,
            });
            first_week.push(placement);
        }

        log::info!(
            "Allocated {} of {} students ({} lessons, {} unscheduled)",
            report.assignments.len(),
            students.len(),
            report.lessons.len(),
            report.unscheduled.len()
        );

        report.students = students;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::audit;
    use chrono::{Datelike, NaiveTime};
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn anchor() -> NaiveDate {
        // A Wednesday
        NaiveDate::from_ymd_opt(2024, 9, 4).unwrap()
    }

    fn students(n: usize) -> Vec<Student> {
        (1..=n).map(|i| Student::new(format!("S{i}"))).collect()
    }

    fn instructors(n: usize) -> Vec<Instructor> {
        (1..=n).map(|i| Instructor::new(format!("I{i}"))).collect()
    }

    #[test]
    fn test_every_student_scheduled_with_room_to_spare() {
        let allocator = SlotAllocator::new(SchedulerConfig::default());
        let report = allocator
            .allocate_seeded(&students(10), &instructors(3), anchor(), 42)
            .unwrap();

        assert_eq!(report.outcome(), Outcome::Complete);
        assert_eq!(report.assignments.len(), 10);
        assert_eq!(report.lessons.len(), 10 * 12);
        assert!(audit(&report.lessons, t(12, 0)).is_empty());
    }

    #[test]
    fn test_round_robin_instructors() {
        let allocator = SlotAllocator::new(SchedulerConfig::default());
        let report = allocator
            .allocate_seeded(&students(5), &instructors(2), anchor(), 1)
            .unwrap();

        let assigned: Vec<&str> = report
            .students
            .iter()
            .map(|s| s.instructor_id.as_deref().unwrap())
            .collect();
        assert_eq!(assigned, vec!["I1", "I2", "I1", "I2", "I1"]);
    }

    #[test]
    fn test_inactive_instructors_skipped_in_round_robin() {
        let mut staff = instructors(3);
        staff[1] = Instructor::new("I2").inactive();
        let allocator = SlotAllocator::new(SchedulerConfig::default());
        let report = allocator
            .allocate_seeded(&students(3), &staff, anchor(), 1)
            .unwrap();

        let assigned: Vec<&str> = report
            .students
            .iter()
            .map(|s| s.instructor_id.as_deref().unwrap())
            .collect();
        assert_eq!(assigned, vec!["I1", "I3", "I1"]);
    }

    #[test]
    fn test_no_active_instructors() {
        let allocator = SlotAllocator::new(SchedulerConfig::default());
        let staff = vec![Instructor::new("I1").inactive()];
        let result = allocator.allocate_seeded(&students(2), &staff, anchor(), 1);
        assert!(matches!(result, Err(ScheduleError::NoActiveInstructors)));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let configs = [
            SchedulerConfig::default().with_room_count(0),
            SchedulerConfig::default().with_weekdays(Vec::new()),
        ];
        for config in configs {
            let result = SlotAllocator::new(config).allocate_seeded(
                &students(2),
                &instructors(1),
                anchor(),
                3,
            );
            assert!(matches!(result, Err(ScheduleError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_occurrences_follow_the_weekly_slot() {
        let allocator = SlotAllocator::new(SchedulerConfig::default());
        let report = allocator
            .allocate_seeded(&students(1), &instructors(1), anchor(), 9)
            .unwrap();
        let slot = report.assignments[0].slot;

        assert_eq!(report.lessons.len(), 12);
        let mut dates: Vec<NaiveDate> = report.lessons.iter().map(|l| l.date()).collect();
        dates.sort();
        assert!(dates[0] >= anchor());
        assert!((dates[0] - anchor()).num_days() < 7);
        for pair in dates.windows(2) {
            assert_eq!((pair[1] - pair[0]).num_days(), 7);
        }
        assert!(report.lessons.iter().all(|l| l.date().weekday() == slot.weekday
            && l.placement.start == slot.start
            && l.placement.minutes() == 60));
    }

    #[test]
    fn test_lesson_ids_are_sequential() {
        let allocator = SlotAllocator::new(SchedulerConfig::default()).with_first_id(100);
        let report = allocator
            .allocate_seeded(&students(2), &instructors(1), anchor(), 3)
            .unwrap();
        let ids: Vec<u64> = report.lessons.iter().map(|l| l.id.0).collect();
        assert_eq!(ids, (100..124).collect::<Vec<_>>());
    }

    #[test]
    fn test_seeded_allocation_is_reproducible() {
        let allocator = SlotAllocator::new(SchedulerConfig::default());
        let a = allocator
            .allocate_seeded(&students(8), &instructors(2), anchor(), 2024)
            .unwrap();
        let b = allocator
            .allocate_seeded(&students(8), &instructors(2), anchor(), 2024)
            .unwrap();
        assert_eq!(a.lessons, b.lessons);
        assert_eq!(a.assignments, b.assignments);
    }

    #[test]
    fn test_saturated_grid_leaves_students_unscheduled() {
        // One instructor, one room, one weekly cell: only one student fits.
        let config = SchedulerConfig::default()
            .with_weekdays(vec![Weekday::Mon])
            .with_time_slots(vec![t(9, 0)])
            .with_room_count(1);
        let allocator = SlotAllocator::new(config);
        let report = allocator
            .allocate_seeded(&students(2), &instructors(1), anchor(), 5)
            .unwrap();

        assert_eq!(report.outcome(), Outcome::Partial);
        assert!(report.is_scheduled("S1"));
        assert!(!report.is_scheduled("S2"));
        assert_eq!(
            report.unscheduled,
            vec![UnscheduledStudent {
                student_id: "S2".into(),
                reason: UnscheduledReason::NoFeasibleSlot,
            }]
        );
        assert!(report.lessons.iter().all(|l| l.placement.student_id == "S1"));
    }

    #[test]
    fn test_one_room_one_instructor_never_shares_a_cell() {
        let config = SchedulerConfig::default().with_room_count(1);
        let allocator = SlotAllocator::new(config);
        for seed in 0..20 {
            let report = allocator
                .allocate_seeded(&students(2), &instructors(1), anchor(), seed)
                .unwrap();
            let cells: HashSet<WeeklySlot> =
                report.assignments.iter().map(|a| a.slot).collect();
            assert_eq!(cells.len(), report.assignments.len());
        }
    }

    #[test]
    fn test_room_ids_fill_from_one() {
        let config = SchedulerConfig::default()
            .with_weekdays(vec![Weekday::Tue])
            .with_time_slots(vec![t(15, 0)])
            .with_room_count(3);
        let allocator = SlotAllocator::new(config);
        let report = allocator
            .allocate_seeded(&students(4), &instructors(4), anchor(), 0)
            .unwrap();

        let rooms: Vec<u32> = report.assignments.iter().map(|a| a.room_id).collect();
        assert_eq!(rooms, vec![1, 2, 3]);
        assert!(!report.is_scheduled("S4"));
    }

    #[test]
    fn test_inactive_students_get_instructor_but_no_lessons() {
        let mut roster = students(3);
        roster[1] = Student::new("S2").inactive();
        let allocator = SlotAllocator::new(SchedulerConfig::default());
        let report = allocator
            .allocate_seeded(&roster, &instructors(1), anchor(), 11)
            .unwrap();

        assert_eq!(report.outcome(), Outcome::Complete);
        assert!(report.students[1].instructor_id.is_some());
        assert!(!report.is_scheduled("S2"));
        assert_eq!(report.unscheduled[0].reason, UnscheduledReason::Inactive);
    }

    #[test]
    fn test_long_lessons_avoid_lunch() {
        // 90-minute lessons from 11:00 would cross 12:00.
        let config = SchedulerConfig::default()
            .with_weekdays(vec![Weekday::Fri])
            .with_time_slots(vec![t(11, 0), t(12, 0)])
            .with_lesson_minutes(90);
        let allocator = SlotAllocator::new(config);
        let report = allocator
            .allocate_seeded(&students(1), &instructors(1), anchor(), 0)
            .unwrap();
        assert_eq!(report.outcome(), Outcome::Failed);
        assert!(report.lessons.is_empty());
    }

    #[test]
    fn test_no_feasible_slot_counts_by_instructor() {
        let config = SchedulerConfig::default()
            .with_weekdays(vec![Weekday::Mon])
            .with_time_slots(vec![t(9, 0), t(10, 0)]);
        let allocator = SlotAllocator::new(config);
        let report = allocator
            .allocate_seeded(&students(5), &instructors(2), anchor(), 8)
            .unwrap();

        // Each instructor has two cells; five students, four cells.
        let mut per_instructor: HashMap<&str, usize> = HashMap::new();
        for a in &report.assignments {
            *per_instructor.entry(a.instructor_id.as_str()).or_default() += 1;
        }
        assert_eq!(per_instructor["I1"], 2);
        assert_eq!(per_instructor["I2"], 2);
        assert_eq!(report.unscheduled.len(), 1);
        assert_eq!(report.unscheduled[0].student_id, "S5");
    }

    proptest! {
        #[test]
        fn prop_allocation_respects_invariants(
            seed in any::<u64>(),
            n_students in 0usize..60,
            n_instructors in 1usize..5,
            rooms in 1u32..4,
        ) {
            let config = SchedulerConfig::default()
                .with_room_count(rooms)
                .with_weekdays(vec![Weekday::Mon, Weekday::Thu])
                .with_initial_horizon(2);
            let allocator = SlotAllocator::new(config);
            let report = allocator
                .allocate_seeded(&students(n_students), &instructors(n_instructors), anchor(), seed)
                .unwrap();

            prop_assert!(audit(&report.lessons, t(12, 0)).is_empty());
            prop_assert_eq!(
                report.assignments.len() + report.unscheduled.len(),
                n_students
            );
            prop_assert_eq!(report.lessons.len(), report.assignments.len() * 2);
        }
    }
}
