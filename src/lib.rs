//! Scheduling core for recurring one-to-one lessons.
//!
//! Students are paired with instructors and given a weekly slot in one of a
//! fixed number of rooms. The crate places those lessons, keeps them free of
//! double bookings, repeats them week over week and lays overlapping lessons
//! out side by side for a calendar view.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Student`, `Instructor`, `Lesson`,
//!   `Placement`, `TimeWindow`, `WeeklySlot`, `Violation`
//! - **`config`**: Slot grid, weekdays, lunch break and room count
//! - **`conflict`**: Instructor / room / student exclusivity checks and audit
//! - **`scheduler`**: Initial allocation, weekly repeats, the `Scheduler`
//!   lesson book and KPIs
//! - **`layout`**: Lane assignment for overlapping lessons in a day view
//! - **`validation`**: Input integrity checks (duplicate IDs, dangling refs,
//!   room range, empty intervals)
//!
//! # Time model
//!
//! Lesson intervals are half-open `[start, end)` on a single date. Two
//! lessons that merely touch do not overlap. No time zones are involved.
//!
//! # References
//!
//! - Kleinberg & Tardos (2005), "Algorithm Design", §4.1 Interval Partitioning
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

pub mod config;
pub mod conflict;
pub mod error;
pub mod layout;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use config::SchedulerConfig;
pub use error::ScheduleError;
pub use scheduler::Scheduler;
