//! Error type for scheduler operations.

use chrono::NaiveTime;
use thiserror::Error;

use crate::conflict::Conflict;
use crate::models::LessonId;
use crate::validation::ValidationError;

/// Errors returned by configuration, input validation and lesson mutations.
///
/// Every mutation that fails leaves the lesson book untouched.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration document is not valid JSON for `SchedulerConfig`.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Structural problems in the roster or lessons, all of them.
    #[error("input validation failed with {} error(s)", .0.len())]
    InvalidInput(Vec<ValidationError>),

    /// Allocation needs at least one active instructor.
    #[error("no active instructors to allocate students to")]
    NoActiveInstructors,

    /// Initial allocation was requested for a book that has lessons.
    #[error("lessons already exist; initial allocation runs only once")]
    AlreadyAllocated,

    /// No lesson with this id.
    #[error("lesson {0} not found")]
    LessonNotFound(LessonId),

    /// The placement names a student not in the roster.
    #[error("unknown student '{0}'")]
    UnknownStudent(String),

    /// The placement names an instructor not in the roster.
    #[error("unknown instructor '{0}'")]
    UnknownInstructor(String),

    /// Inactive students cannot be given lessons.
    #[error("student '{0}' is inactive")]
    InactiveStudent(String),

    /// Inactive instructors cannot be given lessons.
    #[error("instructor '{0}' is inactive")]
    InactiveInstructor(String),

    /// Room id outside `1..=room_count`.
    #[error("room {room} is outside 1..={room_count}")]
    RoomOutOfRange { room: u32, room_count: u32 },

    /// The lesson ends at or before its start.
    #[error("lesson interval {start}-{end} is empty")]
    InvalidInterval { start: NaiveTime, end: NaiveTime },

    /// The lesson would run across the lunch break.
    #[error("lesson {start}-{end} straddles the lunch break at {lunch}")]
    LunchBreak {
        start: NaiveTime,
        end: NaiveTime,
        lunch: NaiveTime,
    },

    /// The placement collides with an existing lesson.
    #[error(transparent)]
    Conflict(#[from] Conflict),

    /// The lesson is trashed and must be restored first.
    #[error("lesson {0} is in the trash")]
    LessonTrashed(LessonId),

    /// Only trashed lessons can be restored.
    #[error("lesson {0} is not in the trash")]
    NotTrashed(LessonId),
}
