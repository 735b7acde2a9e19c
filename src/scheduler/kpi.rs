//! Lesson book metrics (KPIs).
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Active lessons | Lessons with status scheduled |
//! | Trashed lessons | Soft-deleted lessons |
//! | Lessons per instructor | Active lessons grouped by instructor |
//! | Students without lessons | Active students with no active lesson |
//! | Avg room utilization | Booked room-minutes / bookable room-minutes, averaged over teaching dates |
//!
//! Bookable room-minutes per date are `room_count × bookable grid times ×
//! lesson_minutes`, so a fully allocated grid reads 1.0.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;

use crate::config::SchedulerConfig;
use crate::models::{Lesson, Student};

/// Lesson book indicators.
#[derive(Debug, Clone)]
pub struct ScheduleKpi {
    /// Lessons with status scheduled.
    pub active_lessons: usize,
    /// Soft-deleted lessons.
    pub trashed_lessons: usize,
    /// Active lessons per instructor.
    pub lessons_by_instructor: HashMap<String, usize>,
    /// Active students that have no active lesson.
    pub students_without_lessons: Vec<String>,
    /// Room utilization per date with at least one active lesson.
    pub utilization_by_date: BTreeMap<NaiveDate, f64>,
    /// Mean of `utilization_by_date` (0.0 when there are no lessons).
    pub avg_room_utilization: f64,
}

impl ScheduleKpi {
    /// Computes KPIs from a lesson set and its roster.
    pub fn calculate(lessons: &[Lesson], students: &[Student], config: &SchedulerConfig) -> Self {
        let mut trashed_lessons = 0;
        let mut lessons_by_instructor: HashMap<String, usize> = HashMap::new();
        let mut busy_by_date: BTreeMap<NaiveDate, i64> = BTreeMap::new();
        let mut taught: HashSet<&str> = HashSet::new();

        for lesson in lessons {
            if !lesson.is_active() {
                trashed_lessons += 1;
                continue;
            }
            let p = &lesson.placement;
            *lessons_by_instructor
                .entry(p.instructor_id.clone())
                .or_insert(0) += 1;
            *busy_by_date.entry(p.date).or_insert(0) += p.minutes().max(0);
            taught.insert(p.student_id.as_str());
        }

        let students_without_lessons = students
            .iter()
            .filter(|s| s.is_active() && !taught.contains(s.id.as_str()))
            .map(|s| s.id.clone())
            .collect();

        let capacity = i64::from(config.room_count)
            * config.bookable_times().count() as i64
            * config.lesson_minutes;
        let utilization_by_date: BTreeMap<NaiveDate, f64> = if capacity > 0 {
            busy_by_date
                .into_iter()
                .map(|(date, busy)| (date, busy as f64 / capacity as f64))
                .collect()
        } else {
            BTreeMap::new()
        };

        let avg_room_utilization = if utilization_by_date.is_empty() {
            0.0
        } else {
            let sum: f64 = utilization_by_date.values().sum();
            sum / utilization_by_date.len() as f64
        };

        Self {
            active_lessons: lessons.len() - trashed_lessons,
            trashed_lessons,
            lessons_by_instructor,
            students_without_lessons,
            utilization_by_date,
            avg_room_utilization,
        }
    }

    /// Whether every active student has a lesson and utilization reaches
    /// `min_utilization`.
    pub fn meets_thresholds(&self, min_utilization: f64) -> bool {
        self.students_without_lessons.is_empty() && self.avg_room_utilization >= min_utilization
    }
}
