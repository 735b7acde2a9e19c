//! Lesson scheduling domain models.
//!
//! Provides the data types for the lesson book: who is taught
//! (students), by whom (instructors), where and when (placements),
//! plus invariant violations and batch outcomes.
//!
//! # Domain Mappings
//!
//! | u-lesson | Music school | Tutoring | Clinic |
//! |----------|-------------|----------|--------|
//! | Student | Pupil | Learner | Patient |
//! | Instructor | Teacher | Tutor | Therapist |
//! | Room | Practice room | Desk | Treatment room |
//! | Lesson | Weekly lesson | Session | Appointment |

mod calendar;
mod lesson;
mod roster;
mod schedule;

pub use calendar::{next_weekday_on_or_after, weeks_after, TimeWindow, WeeklySlot};
pub use lesson::{Lesson, LessonId, LessonStatus, Placement, DEFAULT_LESSON_MINUTES};
pub use roster::{EntityStatus, Instructor, Student};
pub use schedule::{Outcome, Violation, ViolationType};
