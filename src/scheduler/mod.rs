//! Lesson allocation, weekly repeats, the lesson book and KPI evaluation.
//!
//! # Algorithms
//!
//! `SlotAllocator` assigns every active student to an instructor by
//! round-robin and places one weekly lesson per student on a shuffled slot
//! catalog: greedy, first fit, lowest free room. It is a heuristic and can
//! leave students unplaced even when a perfect matching exists.
//!
//! `expand_weekly` projects a lesson forward week by week against a fixed
//! snapshot, skipping occurrences that clash or straddle lunch.
//!
//! `Scheduler` owns the lessons and applies add, move, copy, repeat and
//! trash operations atomically.
//!
//! # KPI
//!
//! `ScheduleKpi` reports lesson counts, per-instructor load, students
//! without lessons and room utilization.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4
//! - Kleinberg & Tardos (2005), "Algorithm Design", §4.1 Interval Scheduling

mod allocator;
mod book;
mod kpi;
mod recurrence;

pub use allocator::{
    AllocationReport, SlotAllocator, SlotAssignment, UnscheduledReason, UnscheduledStudent,
};
pub use book::{LessonMove, RepeatSummary, Scheduler};
pub use kpi::ScheduleKpi;
pub use recurrence::{expand_weekly, RecurrenceReport, SkipReason, SkippedOccurrence};
