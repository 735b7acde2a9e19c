//! Overlap layout for calendar rendering.
//!
//! Assigns each lesson of a day to a lane so that lessons overlapping
//! in time are drawn side by side. Positions are returned as fractions
//! of the visible day window and of the cluster width, independent of
//! any rendering technology. Day and week views share the same engine.
//!
//! # Algorithm
//!
//! 1. Clip every active lesson to the day window; drop what becomes empty.
//! 2. Stable-sort by start time (ties keep input order).
//! 3. Split into clusters of transitively overlapping lessons using an
//!    end-time watermark.
//! 4. Within a cluster, give each lesson the lowest lane whose last
//!    lesson has ended by its start; open a new lane otherwise.
//!
//! Greedy interval partitioning in start order uses exactly as many lanes
//! as the peak number of simultaneous lessons, so `lane_count` is minimal.
//!
//! # Complexity
//! O(n log n + n·k) where k = lanes in the widest cluster.
//!
//! # Reference
//! Kleinberg & Tardos (2005), "Algorithm Design", Ch. 4.1 (Interval Partitioning)

use std::collections::BTreeMap;
use std::ops::Range;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::{Lesson, LessonId, TimeWindow};

/// A lesson positioned for one render pass. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedLesson {
    /// The lesson being drawn.
    pub lesson_id: LessonId,
    /// Visible start (clipped to the window).
    pub start: NaiveTime,
    /// Visible end (clipped to the window).
    pub end: NaiveTime,
    /// Index of the overlap cluster within the day.
    pub cluster: usize,
    /// Lane within the cluster (0-based).
    pub lane: usize,
    /// Lanes used by the cluster.
    pub lane_count: usize,
    /// Vertical offset from the window start (0.0..1.0).
    pub top: f64,
    /// Vertical extent (0.0..1.0).
    pub height: f64,
    /// Horizontal offset, `lane / lane_count`.
    pub left: f64,
    /// Horizontal extent, `1 / lane_count`.
    pub width: f64,
}

/// Lays out the lessons of one day within `window`.
///
/// Deleted lessons, lessons whose end is not after their start, and
/// lessons entirely outside the window are left out. The caller passes
/// only lessons of the day being drawn; see [`layout_week`] for several
/// days at once.
///
/// Results are ordered by visible start time.
pub fn layout_day<'a>(
    lessons: impl IntoIterator<Item = &'a Lesson>,
    window: TimeWindow,
) -> Vec<PlacedLesson> {
    if !window.is_valid() {
        return Vec::new();
    }

    let mut visible: Vec<(LessonId, TimeWindow)> = lessons
        .into_iter()
        .filter(|l| l.is_active() && l.window().is_valid())
        .filter_map(|l| l.window().clip(&window).map(|w| (l.id, w)))
        .collect();
    visible.sort_by_key(|(_, w)| w.start);

    let windows: Vec<TimeWindow> = visible.iter().map(|(_, w)| *w).collect();
    let total = window.minutes() as f64;
    let mut placed = Vec::with_capacity(visible.len());

    for (cluster, range) in clusters(&windows).into_iter().enumerate() {
        let (lanes, lane_count) = assign_lanes(&windows[range.clone()]);
        for (offset, lane) in lanes.into_iter().enumerate() {
            let (lesson_id, w) = visible[range.start + offset];
            placed.push(PlacedLesson {
                lesson_id,
                start: w.start,
                end: w.end,
                cluster,
                lane,
                lane_count,
                top: (w.start - window.start).num_minutes() as f64 / total,
                height: w.minutes() as f64 / total,
                left: lane as f64 / lane_count as f64,
                width: 1.0 / lane_count as f64,
            });
        }
    }

    placed
}

/// Lays out several days, one independent pass per date.
///
/// Every requested date gets an entry, empty if nothing is visible.
pub fn layout_week(
    lessons: &[Lesson],
    dates: &[NaiveDate],
    window: TimeWindow,
) -> BTreeMap<NaiveDate, Vec<PlacedLesson>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&Lesson>> =
        dates.iter().map(|&d| (d, Vec::new())).collect();
    for lesson in lessons {
        if let Some(day) = by_date.get_mut(&lesson.date()) {
            day.push(lesson);
        }
    }

    by_date
        .into_iter()
        .map(|(date, day)| (date, layout_day(day, window)))
        .collect()
}

/// Splits start-sorted windows into clusters of transitive overlap.
///
/// A window starting at or after the running end watermark opens a new
/// cluster.
pub fn clusters(sorted: &[TimeWindow]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut begin = 0;
    let mut watermark: Option<NaiveTime> = None;

    for (i, w) in sorted.iter().enumerate() {
        match watermark {
            Some(mark) if w.start < mark => watermark = Some(mark.max(w.end)),
            Some(_) => {
                ranges.push(begin..i);
                begin = i;
                watermark = Some(w.end);
            }
            None => watermark = Some(w.end),
        }
    }
    if begin < sorted.len() {
        ranges.push(begin..sorted.len());
    }

    ranges
}

/// Greedy lane assignment for start-sorted windows.
///
/// Returns the lane of each window and the number of lanes used.
pub fn assign_lanes(sorted: &[TimeWindow]) -> (Vec<usize>, usize) {
    // End of the last window placed in each lane.
    let mut lane_ends: Vec<NaiveTime> = Vec::new();
    let mut lanes = Vec::with_capacity(sorted.len());

    for w in sorted {
        match lane_ends.iter().position(|&end| end <= w.start) {
            Some(lane) => {
                lane_ends[lane] = w.end;
                lanes.push(lane);
            }
            None => {
                lane_ends.push(w.end);
                lanes.push(lane_ends.len() - 1);
            }
        }
    }

    (lanes, lane_ends.len())
}

/// Largest number of windows active at a single instant.
pub fn peak_concurrency(windows: &[TimeWindow]) -> usize {
    // Ends sort before starts at the same instant (half-open intervals).
    let mut events: Vec<(NaiveTime, i32)> = windows
        .iter()
        .filter(|w| w.is_valid())
        .flat_map(|w| [(w.start, 1), (w.end, -1)])
        .collect();
    events.sort();

    let mut active = 0i32;
    let mut peak = 0i32;
    for (_, delta) in events {
        active += delta;
        peak = peak.max(active);
    }
    peak as usize
}
