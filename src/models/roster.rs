//! Student and instructor models.
//!
//! Both are owned by an external roster; the scheduler only reads their
//! identity and status, and writes the student's instructor assignment
//! during initial allocation.

use serde::{Deserialize, Serialize};

/// Whether an entity can take part in new placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    /// Eligible for new lessons.
    #[default]
    Active,
    /// Kept for history; must not receive new lessons.
    Inactive,
}

/// A student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Unique student identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Assigned instructor (set by the allocator).
    #[serde(default)]
    pub instructor_id: Option<String>,
    /// Enrollment status.
    #[serde(default)]
    pub status: EntityStatus,
}

/// An instructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructor {
    /// Unique instructor identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Employment status.
    #[serde(default)]
    pub status: EntityStatus,
}

impl Student {
    /// Creates an active student with no instructor.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            instructor_id: None,
            status: EntityStatus::Active,
        }
    }

    /// Sets the student name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the assigned instructor.
    pub fn with_instructor(mut self, instructor_id: impl Into<String>) -> Self {
        self.instructor_id = Some(instructor_id.into());
        self
    }

    /// Marks the student inactive.
    pub fn inactive(mut self) -> Self {
        self.status = EntityStatus::Inactive;
        self
    }

    /// Whether the student may receive new lessons.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == EntityStatus::Active
    }
}

impl Instructor {
    /// Creates an active instructor.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            status: EntityStatus::Active,
        }
    }

    /// Sets the instructor name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Marks the instructor inactive.
    pub fn inactive(mut self) -> Self {
        self.status = EntityStatus::Inactive;
        self
    }

    /// Whether the instructor may be given new lessons.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == EntityStatus::Active
    }
}
