//! Scheduler configuration.
//!
//! Holds the time grid, the lunch-break instant, the room count and the
//! allocation and repeat horizons. Every field has a default, so a JSON
//! document only needs to name what it overrides.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::ScheduleError;
use crate::models::WeeklySlot;

/// Configuration shared by the allocator, the recurrence expander and
/// the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Lesson start times, strictly ascending.
    pub time_slots: Vec<NaiveTime>,
    /// Teaching days.
    pub weekdays: Vec<Weekday>,
    /// Instant no lesson may straddle. A grid slot at this time is never
    /// offered by the allocator.
    pub lunch: NaiveTime,
    /// Number of rooms; room ids are `1..=room_count`.
    pub room_count: u32,
    /// Length of allocated lessons (minutes).
    pub lesson_minutes: i64,
    /// Weeks of occurrences generated by the initial allocation.
    pub initial_horizon_weeks: u32,
    /// Upper bound for ad hoc weekly repeats.
    pub max_repeat_weeks: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            time_slots: (8..=19).map(|h| hm(h, 0)).collect(),
            weekdays: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
            ],
            lunch: hm(12, 0),
            room_count: 4,
            lesson_minutes: 60,
            initial_horizon_weeks: 12,
            max_repeat_weeks: 52,
        }
    }
}

impl SchedulerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ScheduleError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the time grid.
    pub fn with_time_slots(mut self, slots: Vec<NaiveTime>) -> Self {
        self.time_slots = slots;
        self
    }

    /// Sets the teaching days.
    pub fn with_weekdays(mut self, weekdays: Vec<Weekday>) -> Self {
        self.weekdays = weekdays;
        self
    }

    /// Sets the lunch-break instant.
    pub fn with_lunch(mut self, lunch: NaiveTime) -> Self {
        self.lunch = lunch;
        self
    }

    /// Sets the number of rooms.
    pub fn with_room_count(mut self, room_count: u32) -> Self {
        self.room_count = room_count;
        self
    }

    /// Sets the allocated lesson length.
    pub fn with_lesson_minutes(mut self, minutes: i64) -> Self {
        self.lesson_minutes = minutes;
        self
    }

    /// Sets the initial allocation horizon.
    pub fn with_initial_horizon(mut self, weeks: u32) -> Self {
        self.initial_horizon_weeks = weeks;
        self
    }

    /// Sets the maximum weekly repeat horizon.
    pub fn with_max_repeat_weeks(mut self, weeks: u32) -> Self {
        self.max_repeat_weeks = weeks;
        self
    }

    /// Checks internal consistency.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.time_slots.is_empty() {
            return Err(invalid("time grid has no slots"));
        }
        if self.time_slots.windows(2).any(|w| w[0] >= w[1]) {
            return Err(invalid("time grid slots must be strictly ascending"));
        }
        if self.weekdays.is_empty() {
            return Err(invalid("no teaching weekdays"));
        }
        let unique: HashSet<_> = self.weekdays.iter().collect();
        if unique.len() != self.weekdays.len() {
            return Err(invalid("duplicate teaching weekday"));
        }
        if self.room_count == 0 {
            return Err(invalid("room_count must be at least 1"));
        }
        if self.lesson_minutes <= 0 {
            return Err(invalid("lesson_minutes must be positive"));
        }
        if self.initial_horizon_weeks == 0 {
            return Err(invalid("initial_horizon_weeks must be at least 1"));
        }
        if self.max_repeat_weeks == 0 {
            return Err(invalid("max_repeat_weeks must be at least 1"));
        }
        Ok(())
    }

    /// Grid start times a lesson may be allocated to (lunch excluded).
    pub fn bookable_times(&self) -> impl Iterator<Item = NaiveTime> + '_ {
        self.time_slots.iter().copied().filter(|&t| t != self.lunch)
    }

    /// The weekly slot catalog: every weekday × every bookable time,
    /// weekday-major in configuration order.
    pub fn weekly_slots(&self) -> Vec<WeeklySlot> {
        self.weekdays
            .iter()
            .flat_map(|&day| self.bookable_times().map(move |t| WeeklySlot::new(day, t)))
            .collect()
    }

    /// Clamps a requested repeat count to `[1, max_repeat_weeks]`.
    pub fn clamp_repeat_weeks(&self, weeks: u32) -> u32 {
        weeks.clamp(1, self.max_repeat_weeks.max(1))
    }
}

fn invalid(message: &str) -> ScheduleError {
    ScheduleError::InvalidConfig(message.to_string())
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SchedulerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.room_count, 4);
        assert_eq!(config.initial_horizon_weeks, 12);
        assert_eq!(config.max_repeat_weeks, 52);
    }

    #[test]
    fn test_weekly_slots_exclude_lunch() {
        let config = SchedulerConfig::default();
        let slots = config.weekly_slots();
        // 12 grid times minus lunch, 6 weekdays
        assert_eq!(slots.len(), 11 * 6);
        assert!(slots.iter().all(|s| s.start != config.lunch));
    }

    #[test]
    fn test_clamp_repeat_weeks() {
        let config = SchedulerConfig::default();
        assert_eq!(config.clamp_repeat_weeks(0), 1);
        assert_eq!(config.clamp_repeat_weeks(10), 10);
        assert_eq!(config.clamp_repeat_weeks(500), 52);
    }

    #[test]
    fn test_validate_rejects_bad_grid() {
        let unsorted = SchedulerConfig::default().with_time_slots(vec![hm(10, 0), hm(9, 0)]);
        assert!(matches!(
            unsorted.validate(),
            Err(ScheduleError::InvalidConfig(_))
        ));

        let empty = SchedulerConfig::default().with_time_slots(vec![]);
        assert!(empty.validate().is_err());

        let no_rooms = SchedulerConfig::default().with_room_count(0);
        assert!(no_rooms.validate().is_err());

        let dup_days =
            SchedulerConfig::default().with_weekdays(vec![Weekday::Mon, Weekday::Mon]);
        assert!(dup_days.validate().is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let config = SchedulerConfig::from_json(
            r#"{"room_count": 2, "lunch": "13:00:00", "weekdays": ["Mon", "Wed"]}"#,
        )
        .unwrap();
        assert_eq!(config.room_count, 2);
        assert_eq!(config.lunch, hm(13, 0));
        assert_eq!(config.weekdays, vec![Weekday::Mon, Weekday::Wed]);
        assert_eq!(config.initial_horizon_weeks, 12);
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            SchedulerConfig::from_json("{not json"),
            Err(ScheduleError::ConfigParse(_))
        ));
        assert!(matches!(
            SchedulerConfig::from_json(r#"{"room_count": 0}"#),
            Err(ScheduleError::InvalidConfig(_))
        ));
    }
}
