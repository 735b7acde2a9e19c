//! The lesson book: roster, lessons and configuration in one value.
//!
//! [`Scheduler`] owns the authoritative lesson collection. Every mutation
//! validates the complete change first and only then writes, so a
//! rejected add, move, copy, repeat or restore leaves the book exactly as
//! it was. There is no locking: two copies mutated independently can each
//! pass validation and still collide when merged.

use chrono::{NaiveDate, NaiveTime};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::allocator::{AllocationReport, SlotAllocator};
use super::kpi::ScheduleKpi;
use super::recurrence::{expand_weekly, RecurrenceReport};
use crate::config::SchedulerConfig;
use crate::conflict::{self, Conflict};
use crate::error::ScheduleError;
use crate::layout::{self, PlacedLesson};
use crate::models::{
    Instructor, Lesson, LessonId, LessonStatus, Outcome, Placement, Student, TimeWindow,
    Violation,
};
use crate::validation::validate_input;

/// Target of a lesson move. Length is always kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonMove {
    /// New date.
    pub date: NaiveDate,
    /// New start time.
    pub start: NaiveTime,
    /// Hand the lesson to another instructor.
    pub instructor_id: Option<String>,
    /// Move to another room.
    pub room_id: Option<u32>,
}

impl LessonMove {
    /// Moves to a new date and start, same instructor and room.
    pub fn to(date: NaiveDate, start: NaiveTime) -> Self {
        Self {
            date,
            start,
            instructor_id: None,
            room_id: None,
        }
    }

    /// Also changes the instructor.
    pub fn with_instructor(mut self, instructor_id: impl Into<String>) -> Self {
        self.instructor_id = Some(instructor_id.into());
        self
    }

    /// Also changes the room.
    pub fn with_room(mut self, room_id: u32) -> Self {
        self.room_id = Some(room_id);
        self
    }
}

/// Lessons created by a weekly repeat, plus what was skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatSummary {
    /// Ids of the committed occurrences, in week order.
    pub created: Vec<LessonId>,
    /// Expansion details.
    pub report: RecurrenceReport,
}

impl RepeatSummary {
    /// Batch outcome.
    pub fn outcome(&self) -> Outcome {
        self.report.outcome()
    }
}

/// Lesson book.
///
/// # Example
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use u_lesson::config::SchedulerConfig;
/// use u_lesson::models::{Instructor, Placement, Student};
/// use u_lesson::scheduler::Scheduler;
///
/// let mut book = Scheduler::new(
///     vec![Student::new("S1"), Student::new("S2")],
///     vec![Instructor::new("I1")],
///     Vec::new(),
///     SchedulerConfig::default(),
/// )
/// .unwrap();
///
/// let day = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
/// let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
/// book.add_lesson(Placement::new("S1", "I1", 1, day, nine)).unwrap();
///
/// // Same instructor, same hour: rejected.
/// assert!(book.add_lesson(Placement::new("S2", "I1", 2, day, nine)).is_err());
/// assert_eq!(book.active_lessons().count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Scheduler {
    config: SchedulerConfig,
    students: Vec<Student>,
    instructors: Vec<Instructor>,
    lessons: Vec<Lesson>,
    next_id: u64,
}

impl Scheduler {
    /// Builds a lesson book from existing data.
    ///
    /// # Errors
    /// [`ScheduleError::InvalidConfig`] for an inconsistent configuration,
    /// [`ScheduleError::InvalidInput`] with every structural problem found
    /// in the roster and lessons.
    pub fn new(
        students: Vec<Student>,
        instructors: Vec<Instructor>,
        lessons: Vec<Lesson>,
        config: SchedulerConfig,
    ) -> Result<Self, ScheduleError> {
        config.validate()?;
        validate_input(&students, &instructors, &lessons, &config)
            .map_err(ScheduleError::InvalidInput)?;

        let next_id = lessons.iter().map(|l| l.id.0).max().map_or(1, |max| max + 1);
        Ok(Self {
            config,
            students,
            instructors,
            lessons,
            next_id,
        })
    }

    // ---- initial allocation ----

    /// Runs the initial allocation with thread-local randomness.
    pub fn initialize(&mut self, anchor: NaiveDate) -> Result<AllocationReport, ScheduleError> {
        let mut rng = rand::rng();
        self.initialize_with_rng(anchor, &mut rng)
    }

    /// Runs the initial allocation with a fixed seed.
    pub fn initialize_seeded(
        &mut self,
        anchor: NaiveDate,
        seed: u64,
    ) -> Result<AllocationReport, ScheduleError> {
        let mut rng = SmallRng::seed_from_u64(seed);
        self.initialize_with_rng(anchor, &mut rng)
    }

    /// Runs the initial allocation and stores its lessons and the
    /// students' instructor assignments.
    ///
    /// # Errors
    /// [`ScheduleError::AlreadyAllocated`] if the book already holds
    /// lessons (trashed ones included); [`ScheduleError::NoActiveInstructors`].
    pub fn initialize_with_rng<R: Rng + ?Sized>(
        &mut self,
        anchor: NaiveDate,
        rng: &mut R,
    ) -> Result<AllocationReport, ScheduleError> {
        if !self.lessons.is_empty() {
            return Err(ScheduleError::AlreadyAllocated);
        }

        let report = SlotAllocator::new(self.config.clone())
            .with_first_id(self.next_id)
            .allocate(&self.students, &self.instructors, anchor, rng)?;

        self.students = report.students.clone();
        self.lessons = report.lessons.clone();
        self.next_id += report.lessons.len() as u64;
        Ok(report)
    }

    // ---- validation ----

    /// Checks a placement against the exclusivity rules only.
    pub fn check_conflict(&self, placement: &Placement, ignore: Option<LessonId>) -> Option<Conflict> {
        conflict::check_conflict(&self.lessons, placement, ignore)
    }

    /// Checks everything a new or moved placement must satisfy.
    ///
    /// Order: unknown student or instructor, inactive student or
    /// instructor, room range, empty interval, lunch break, conflict.
    pub fn validate_placement(
        &self,
        placement: &Placement,
        ignore: Option<LessonId>,
    ) -> Result<(), ScheduleError> {
        self.check_participants(placement)?;

        if placement.room_id == 0 || placement.room_id > self.config.room_count {
            return Err(ScheduleError::RoomOutOfRange {
                room: placement.room_id,
                room_count: self.config.room_count,
            });
        }

        let window = placement.window();
        if !window.is_valid() {
            return Err(ScheduleError::InvalidInterval {
                start: window.start,
                end: window.end,
            });
        }
        if conflict::straddles_lunch(placement, self.config.lunch) {
            return Err(ScheduleError::LunchBreak {
                start: window.start,
                end: window.end,
                lunch: self.config.lunch,
            });
        }

        match self.check_conflict(placement, ignore) {
            Some(conflict) => Err(conflict.into()),
            None => Ok(()),
        }
    }

    fn check_participants(&self, placement: &Placement) -> Result<(), ScheduleError> {
        let student = self
            .student(&placement.student_id)
            .ok_or_else(|| ScheduleError::UnknownStudent(placement.student_id.clone()))?;
        let instructor = self
            .instructor(&placement.instructor_id)
            .ok_or_else(|| ScheduleError::UnknownInstructor(placement.instructor_id.clone()))?;

        if !student.is_active() {
            return Err(ScheduleError::InactiveStudent(student.id.clone()));
        }
        if !instructor.is_active() {
            return Err(ScheduleError::InactiveInstructor(instructor.id.clone()));
        }
        Ok(())
    }

    // ---- mutations ----

    /// Adds a new lesson.
    pub fn add_lesson(&mut self, placement: Placement) -> Result<LessonId, ScheduleError> {
        self.validate_placement(&placement, None)?;
        let id = self.push(placement);
        log::info!("Added lesson {id}");
        Ok(id)
    }

    /// Moves a lesson, keeping its length.
    pub fn move_lesson(&mut self, id: LessonId, target: LessonMove) -> Result<(), ScheduleError> {
        let idx = self.position(id)?;
        let lesson = &self.lessons[idx];
        if !lesson.is_active() {
            return Err(ScheduleError::LessonTrashed(id));
        }

        let mut placement = lesson.placement.shifted_to(target.date, target.start);
        if let Some(instructor_id) = target.instructor_id {
            placement.instructor_id = instructor_id;
        }
        if let Some(room_id) = target.room_id {
            placement.room_id = room_id;
        }

        self.validate_placement(&placement, Some(id))?;
        log::info!(
            "Moved lesson {id} to {} {}",
            placement.date,
            placement.start
        );
        self.lessons[idx].placement = placement;
        Ok(())
    }

    /// Copies a lesson to another date and start.
    pub fn copy_lesson(
        &mut self,
        id: LessonId,
        date: NaiveDate,
        start: NaiveTime,
    ) -> Result<LessonId, ScheduleError> {
        let source = self.active(id)?;
        let placement = source.placement.shifted_to(date, start);

        self.validate_placement(&placement, None)?;
        let copy = self.push(placement);
        log::info!("Copied lesson {id} to {copy}");
        Ok(copy)
    }

    /// Repeats a lesson weekly for `weeks` weeks (clamped to the
    /// configured maximum).
    ///
    /// Occurrences that straddle lunch or conflict with the book as it is
    /// now are skipped and listed in the summary; the rest are committed
    /// together.
    pub fn repeat_weekly(&mut self, id: LessonId, weeks: u32) -> Result<RepeatSummary, ScheduleError> {
        let base = self.active(id)?.clone();
        self.check_participants(&base.placement)?;

        let report = expand_weekly(&self.lessons, &base, weeks, &self.config);
        let created: Vec<LessonId> = report
            .accepted
            .iter()
            .map(|placement| self.push(placement.clone()))
            .collect();

        log::info!(
            "Repeated lesson {id}: {} created, {} skipped",
            created.len(),
            report.skipped.len()
        );
        Ok(RepeatSummary { created, report })
    }

    /// Moves a lesson to the trash.
    pub fn trash_lesson(&mut self, id: LessonId) -> Result<(), ScheduleError> {
        let idx = self.position(id)?;
        if !self.lessons[idx].is_active() {
            return Err(ScheduleError::LessonTrashed(id));
        }
        self.lessons[idx].status = LessonStatus::Deleted;
        log::info!("Trashed lesson {id}");
        Ok(())
    }

    /// Restores a trashed lesson after re-validating its placement against
    /// the current book.
    pub fn restore_lesson(&mut self, id: LessonId) -> Result<(), ScheduleError> {
        let idx = self.position(id)?;
        let lesson = &self.lessons[idx];
        if lesson.is_active() {
            return Err(ScheduleError::NotTrashed(id));
        }

        self.validate_placement(&lesson.placement, Some(id))?;
        self.lessons[idx].status = LessonStatus::Scheduled;
        log::info!("Restored lesson {id}");
        Ok(())
    }

    /// Removes a lesson permanently, whatever its status.
    pub fn purge_lesson(&mut self, id: LessonId) -> Result<Lesson, ScheduleError> {
        let idx = self.position(id)?;
        log::info!("Purged lesson {id}");
        Ok(self.lessons.remove(idx))
    }

    /// Permanently removes every trashed lesson. Returns how many.
    pub fn empty_trash(&mut self) -> usize {
        let before = self.lessons.len();
        self.lessons.retain(Lesson::is_active);
        let removed = before - self.lessons.len();
        log::info!("Emptied trash: {removed} lessons purged");
        removed
    }

    // ---- queries ----

    /// Configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// All students.
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// All instructors.
    pub fn instructors(&self) -> &[Instructor] {
        &self.instructors
    }

    /// Every lesson, trashed ones included.
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    /// Looks up a student.
    pub fn student(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    /// Looks up an instructor.
    pub fn instructor(&self, id: &str) -> Option<&Instructor> {
        self.instructors.iter().find(|i| i.id == id)
    }

    /// Looks up a lesson.
    pub fn lesson(&self, id: LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }

    /// Scheduled lessons.
    pub fn active_lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.lessons.iter().filter(|l| l.is_active())
    }

    /// Lessons in the trash.
    pub fn trashed_lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.lessons.iter().filter(|l| !l.is_active())
    }

    /// Scheduled lessons on a date.
    pub fn lessons_on(&self, date: NaiveDate) -> impl Iterator<Item = &Lesson> {
        self.active_lessons().filter(move |l| l.date() == date)
    }

    /// Scheduled lessons of a student.
    pub fn lessons_for_student<'a>(&'a self, student_id: &'a str) -> impl Iterator<Item = &'a Lesson> {
        self.active_lessons()
            .filter(move |l| l.placement.student_id == student_id)
    }

    /// Lane layout of one day.
    pub fn layout_day(&self, date: NaiveDate, window: TimeWindow) -> Vec<PlacedLesson> {
        layout::layout_day(self.lessons_on(date), window)
    }

    /// Lane layout of several days.
    pub fn layout_week(
        &self,
        dates: &[NaiveDate],
        window: TimeWindow,
    ) -> BTreeMap<NaiveDate, Vec<PlacedLesson>> {
        layout::layout_week(&self.lessons, dates, window)
    }

    /// Every invariant breach in the active lessons.
    pub fn audit(&self) -> Vec<Violation> {
        conflict::audit(&self.lessons, self.config.lunch)
    }

    /// Book metrics.
    pub fn kpi(&self) -> ScheduleKpi {
        ScheduleKpi::calculate(&self.lessons, &self.students, &self.config)
    }

    /// Hands the collections back, e.g. for persistence.
    pub fn into_parts(self) -> (Vec<Student>, Vec<Instructor>, Vec<Lesson>) {
        (self.students, self.instructors, self.lessons)
    }

    // ---- internals ----

    fn position(&self, id: LessonId) -> Result<usize, ScheduleError> {
        self.lessons
            .iter()
            .position(|l| l.id == id)
            .ok_or(ScheduleError::LessonNotFound(id))
    }

    fn active(&self, id: LessonId) -> Result<&Lesson, ScheduleError> {
        let lesson = &self.lessons[self.position(id)?];
        if lesson.is_active() {
            Ok(lesson)
        } else {
            Err(ScheduleError::LessonTrashed(id))
        }
    }

    fn push(&mut self, placement: Placement) -> LessonId {
        let id = LessonId(self.next_id);
        self.next_id += 1;
        self.lessons.push(Lesson::new(id, placement));
        id
    }
}
