//! Time-of-day windows, weekly slots and date helpers.
//!
//! # Time Model
//! Lessons live on a calendar date and occupy a half-open time-of-day
//! window `[start, end)`. Windows never cross midnight; a window whose
//! end is not after its start is empty and never overlaps anything.

use chrono::{Datelike, Days, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// A time-of-day interval [start, end).
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Interval start (inclusive).
    pub start: NaiveTime,
    /// Interval end (exclusive).
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Whether the window has positive length.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    /// Length of this window in minutes (negative for inverted windows).
    #[inline]
    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Whether a time of day falls within this window.
    #[inline]
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.start && time < self.end
    }

    /// Whether two windows overlap.
    ///
    /// Touching windows (`a.end == b.start`) do not overlap, and an empty
    /// or inverted window overlaps nothing.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.is_valid() && other.is_valid() && self.start < other.end && other.start < self.end
    }

    /// Whether `instant` lies strictly inside the window.
    ///
    /// A window ending exactly at the instant, or starting exactly at it,
    /// does not straddle it.
    pub fn straddles(&self, instant: NaiveTime) -> bool {
        self.start < instant && instant < self.end
    }

    /// Intersection with `bounds`, or `None` if nothing of positive
    /// length remains.
    pub fn clip(&self, bounds: &Self) -> Option<Self> {
        let clipped = Self::new(self.start.max(bounds.start), self.end.min(bounds.end));
        clipped.is_valid().then_some(clipped)
    }
}

/// A recurring (weekday, time-of-day) slot from the time grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeeklySlot {
    /// Day of the week.
    pub weekday: Weekday,
    /// Start time of day.
    pub start: NaiveTime,
}

impl WeeklySlot {
    /// Creates a new weekly slot.
    pub fn new(weekday: Weekday, start: NaiveTime) -> Self {
        Self { weekday, start }
    }

    /// First date on or after `anchor` that falls on this slot's weekday.
    pub fn first_date_from(&self, anchor: NaiveDate) -> Option<NaiveDate> {
        next_weekday_on_or_after(anchor, self.weekday)
    }
}

/// First date on or after `anchor` whose weekday is `weekday`.
pub fn next_weekday_on_or_after(anchor: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let from = anchor.weekday().num_days_from_monday();
    let to = weekday.num_days_from_monday();
    let offset = (to + 7 - from) % 7;
    anchor.checked_add_days(Days::new(u64::from(offset)))
}

/// The date `weeks` whole weeks after `date`.
pub fn weeks_after(date: NaiveDate, weeks: u32) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(u64::from(weeks) * 7))
}
