//! Invariant violations and batch outcomes.
//!
//! A violation records a breach of one of the lesson-set invariants,
//! either between two lessons or for a single lesson crossing the
//! lunch break. [`Outcome`] summarizes batch operations that may
//! succeed only in part (allocation, weekly repeats).

use serde::{Deserialize, Serialize};

use super::LessonId;

/// A breach of a lesson-set invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Offending lesson.
    pub lesson_id: LessonId,
    /// The other lesson involved (`None` for lunch straddles).
    pub other_id: Option<LessonId>,
    /// Human-readable description.
    pub message: String,
}

/// Classification of invariant violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationType {
    /// Instructor booked into two overlapping lessons.
    InstructorOverlap,
    /// Room booked into two overlapping lessons.
    RoomOverlap,
    /// Student booked into two overlapping lessons.
    StudentOverlap,
    /// Lesson interval strictly contains the lunch instant.
    LunchStraddle,
}

/// How much of a batch operation went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Every requested item was placed.
    Complete,
    /// Some items were placed, some were skipped.
    Partial,
    /// Items were requested but none were placed.
    Failed,
}

impl Outcome {
    /// Classifies a batch from its placed and skipped counts.
    pub fn from_counts(placed: usize, skipped: usize) -> Self {
        match (placed, skipped) {
            (_, 0) => Self::Complete,
            (0, _) => Self::Failed,
            _ => Self::Partial,
        }
    }
}

impl Violation {
    /// Creates a pairwise overlap violation.
    pub fn overlap(
        violation_type: ViolationType,
        lesson_id: LessonId,
        other_id: LessonId,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            lesson_id,
            other_id: Some(other_id),
            message: message.into(),
        }
    }

    /// Creates a lunch straddle violation.
    pub fn lunch_straddle(lesson_id: LessonId, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::LunchStraddle,
            lesson_id,
            other_id: None,
            message: message.into(),
        }
    }
}
