//! Lesson model.
//!
//! A lesson is one dated occurrence of a student meeting an instructor
//! in a room. The where-and-when part of a lesson is its [`Placement`];
//! candidates for add/move/copy/repeat are plain placements that have
//! not been given an identity yet.

use std::fmt;

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use super::TimeWindow;

/// Lesson length used when a placement carries no explicit end time.
pub const DEFAULT_LESSON_MINUTES: i64 = 60;

/// Unique lesson identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LessonId(pub u64);

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonStatus {
    /// Active and counted by every invariant.
    #[default]
    Scheduled,
    /// Soft-deleted (in the trash). Ignored by conflict checks.
    Deleted,
}

/// Who meets where and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Student taking the lesson.
    pub student_id: String,
    /// Instructor giving the lesson.
    pub instructor_id: String,
    /// Room number (1-based).
    pub room_id: u32,
    /// Calendar date.
    pub date: NaiveDate,
    /// Start time of day.
    pub start: NaiveTime,
    /// End time of day. `None` = start + [`DEFAULT_LESSON_MINUTES`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveTime>,
}

impl Placement {
    /// Creates a placement with the default lesson length.
    pub fn new(
        student_id: impl Into<String>,
        instructor_id: impl Into<String>,
        room_id: u32,
        date: NaiveDate,
        start: NaiveTime,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            instructor_id: instructor_id.into(),
            room_id,
            date,
            start,
            end: None,
        }
    }

    /// Sets an explicit end time.
    pub fn with_end(mut self, end: NaiveTime) -> Self {
        self.end = Some(end);
        self
    }

    /// Sets the end time to `start + minutes`.
    pub fn with_minutes(mut self, minutes: i64) -> Self {
        self.end = Some(offset_time(self.start, minutes));
        self
    }

    /// Effective end time.
    ///
    /// A default end that would wrap past midnight comes out earlier than
    /// `start`, which makes the window invalid.
    pub fn end_time(&self) -> NaiveTime {
        self.end
            .unwrap_or_else(|| offset_time(self.start, DEFAULT_LESSON_MINUTES))
    }

    /// The occupied `[start, end)` window.
    #[inline]
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end_time())
    }

    /// Length in minutes.
    pub fn minutes(&self) -> i64 {
        self.window().minutes()
    }

    /// Whether both placements share a date and their windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.date == other.date && self.window().overlaps(&other.window())
    }

    /// Same placement moved to another date and start, keeping its length.
    pub fn shifted_to(&self, date: NaiveDate, start: NaiveTime) -> Self {
        let minutes = self.minutes();
        Self {
            date,
            start,
            end: Some(offset_time(start, minutes)),
            ..self.clone()
        }
    }
}

/// A dated lesson with identity and lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    /// Unique lesson identifier.
    pub id: LessonId,
    /// Student, instructor, room, date and time.
    #[serde(flatten)]
    pub placement: Placement,
    /// Lifecycle state.
    #[serde(default)]
    pub status: LessonStatus,
}

impl Lesson {
    /// Creates a scheduled lesson.
    pub fn new(id: LessonId, placement: Placement) -> Self {
        Self {
            id,
            placement,
            status: LessonStatus::Scheduled,
        }
    }

    /// Whether the lesson takes part in conflict checks.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == LessonStatus::Scheduled
    }

    /// Calendar date.
    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.placement.date
    }

    /// The occupied `[start, end)` window.
    #[inline]
    pub fn window(&self) -> TimeWindow {
        self.placement.window()
    }
}

fn offset_time(start: NaiveTime, minutes: i64) -> NaiveTime {
    start.overflowing_add_signed(TimeDelta::minutes(minutes)).0
}
