//! Input validation for a lesson book.
//!
//! Checks structural integrity of students, instructors and lessons
//! before a scheduler is built from them. Detects:
//! - Duplicate IDs
//! - Lessons referencing unknown students or instructors
//! - Rooms outside the configured range
//! - Empty or inverted lesson intervals
//!
//! Invariant breaches between lessons (overlaps, lunch) are not input
//! errors; see [`crate::conflict::audit`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::models::{Instructor, Lesson, Student};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A lesson references a student that doesn't exist.
    UnknownStudent,
    /// A lesson references an instructor that doesn't exist.
    UnknownInstructor,
    /// A lesson uses a room number outside `1..=room_count`.
    RoomOutOfRange,
    /// A lesson ends at or before its start.
    InvalidInterval,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the inputs of a lesson book.
///
/// Checks:
/// 1. No duplicate student IDs
/// 2. No duplicate instructor IDs
/// 3. No duplicate lesson IDs
/// 4. Every lesson's student and instructor exist
/// 5. Every lesson's room is within `1..=room_count`
/// 6. Every lesson ends after it starts
///
/// Deleted lessons are checked as well; they can be restored later.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    students: &[Student],
    instructors: &[Instructor],
    lessons: &[Lesson],
    config: &SchedulerConfig,
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut student_ids = HashSet::new();
    for s in students {
        if !student_ids.insert(s.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate student ID: {}", s.id),
            ));
        }
    }

    let mut instructor_ids = HashSet::new();
    for i in instructors {
        if !instructor_ids.insert(i.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate instructor ID: {}", i.id),
            ));
        }
    }

    let mut lesson_ids = HashSet::new();
    for lesson in lessons {
        if !lesson_ids.insert(lesson.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate lesson ID: {}", lesson.id),
            ));
        }

        let p = &lesson.placement;
        if !student_ids.contains(p.student_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownStudent,
                format!(
                    "Lesson {} references unknown student '{}'",
                    lesson.id, p.student_id
                ),
            ));
        }
        if !instructor_ids.contains(p.instructor_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownInstructor,
                format!(
                    "Lesson {} references unknown instructor '{}'",
                    lesson.id, p.instructor_id
                ),
            ));
        }
        if p.room_id == 0 || p.room_id > config.room_count {
            errors.push(ValidationError::new(
                ValidationErrorKind::RoomOutOfRange,
                format!(
                    "Lesson {} uses room {} outside 1..={}",
                    lesson.id, p.room_id, config.room_count
                ),
            ));
        }
        if !p.window().is_valid() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidInterval,
                format!(
                    "Lesson {} ends at {} which is not after its start {}",
                    lesson.id,
                    p.end_time(),
                    p.start
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
