//! Conflict detection.
//!
//! Checks a candidate placement against the active lesson set for the
//! three exclusivity rules: an instructor, a room and a student can each
//! be in only one lesson at a time. All checks are built on one
//! primitive, [`clashes`], which the allocator uses as well.
//!
//! The lunch-break rule is a separate check ([`straddles_lunch`]);
//! callers apply both.
//!
//! # Algorithm
//! Linear scan over the lesson set with half-open interval overlap
//! (`a.start < b.end && b.start < a.end`) on the same date.
//! [`audit`] groups by date and compares pairs within each day.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Lesson, LessonId, Placement, Violation, ViolationType};

/// Which exclusivity rule to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictKey {
    /// Same instructor.
    Instructor,
    /// Same room.
    Room,
    /// Same student.
    Student,
}

impl ConflictKey {
    /// Keys in the order conflicts are reported.
    pub const PRIORITY: [ConflictKey; 3] = [Self::Instructor, Self::Room, Self::Student];

    /// Whether two placements share this key.
    pub fn shared_by(self, a: &Placement, b: &Placement) -> bool {
        match self {
            Self::Instructor => a.instructor_id == b.instructor_id,
            Self::Room => a.room_id == b.room_id,
            Self::Student => a.student_id == b.student_id,
        }
    }

    /// The reason reported when this key collides.
    pub fn reason(self) -> ConflictReason {
        match self {
            Self::Instructor => ConflictReason::InstructorBusy,
            Self::Room => ConflictReason::RoomBusy,
            Self::Student => ConflictReason::StudentDoubleBooked,
        }
    }

    fn violation_type(self) -> ViolationType {
        match self {
            Self::Instructor => ViolationType::InstructorOverlap,
            Self::Room => ViolationType::RoomOverlap,
            Self::Student => ViolationType::StudentOverlap,
        }
    }
}

/// Why a placement was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictReason {
    /// The instructor already teaches an overlapping lesson.
    InstructorBusy,
    /// The room is already occupied.
    RoomBusy,
    /// The student already has an overlapping lesson.
    StudentDoubleBooked,
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::InstructorBusy => "instructor is already teaching at this time",
            Self::RoomBusy => "room is already occupied at this time",
            Self::StudentDoubleBooked => "student already has a lesson at this time",
        };
        f.write_str(message)
    }
}

/// A rejected placement: the reason and the lesson it collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{reason} (conflicts with lesson {existing})")]
pub struct Conflict {
    /// First colliding rule.
    pub reason: ConflictReason,
    /// The existing lesson that blocks the placement.
    pub existing: LessonId,
}

/// Whether `existing` and `candidate` overlap on the same date and share
/// `key`.
#[inline]
pub fn clashes(existing: &Placement, candidate: &Placement, key: ConflictKey) -> bool {
    key.shared_by(existing, candidate) && existing.overlaps(candidate)
}

/// Checks a candidate placement against the active lessons.
///
/// Deleted lessons and the lesson `ignore` (the one being moved) are
/// skipped. For the first overlapping lesson that shares anything with
/// the candidate, the reason is picked in priority order: instructor,
/// room, student. Iteration order decides which lesson is reported when
/// several collide.
///
/// Returns `None` iff the candidate breaks none of the exclusivity rules.
pub fn check_conflict(
    lessons: &[Lesson],
    candidate: &Placement,
    ignore: Option<LessonId>,
) -> Option<Conflict> {
    lessons
        .iter()
        .filter(|l| l.is_active() && Some(l.id) != ignore)
        .find_map(|l| {
            ConflictKey::PRIORITY
                .into_iter()
                .find(|&key| clashes(&l.placement, candidate, key))
                .map(|key| Conflict {
                    reason: key.reason(),
                    existing: l.id,
                })
        })
}

/// Whether the placement's interval strictly contains `lunch`.
#[inline]
pub fn straddles_lunch(placement: &Placement, lunch: NaiveTime) -> bool {
    placement.window().straddles(lunch)
}

/// Reports every invariant breach in the active lesson set.
///
/// Each overlapping pair is reported once per shared key, plus one entry
/// per lesson that straddles `lunch`.
pub fn audit(lessons: &[Lesson], lunch: NaiveTime) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut by_date: BTreeMap<NaiveDate, Vec<&Lesson>> = BTreeMap::new();

    for lesson in lessons.iter().filter(|l| l.is_active()) {
        if straddles_lunch(&lesson.placement, lunch) {
            violations.push(Violation::lunch_straddle(
                lesson.id,
                format!(
                    "Lesson {} ({}-{}) straddles lunch at {}",
                    lesson.id,
                    lesson.placement.start,
                    lesson.placement.end_time(),
                    lunch
                ),
            ));
        }
        by_date.entry(lesson.date()).or_default().push(lesson);
    }

    for (date, day) in &by_date {
        for (i, a) in day.iter().enumerate() {
            for b in &day[i + 1..] {
                for key in ConflictKey::PRIORITY {
                    if clashes(&a.placement, &b.placement, key) {
                        violations.push(Violation::overlap(
                            key.violation_type(),
                            a.id,
                            b.id,
                            format!("Lessons {} and {} overlap on {}: {:?}", a.id, b.id, date, key),
                        ));
                    }
                }
            }
        }
    }

    violations
}
