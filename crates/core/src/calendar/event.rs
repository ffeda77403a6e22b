// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Calendar event and evaluation window value types

use super::rrule::RecurrenceRule;
use chrono::{DateTime, Duration, Utc};

/// A calendar event describing a "blocked" time window.
///
/// Parsed fresh from the calendar document on every evaluation; immutable.
/// When `recurrence` is present the event is a template for a periodic
/// series, not a single occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    /// The description of the event
    pub summary: String,
    /// The instant at which the block starts
    pub start: DateTime<Utc>,
    /// The instant at which the block ends
    pub end: DateTime<Utc>,
    /// A recurrence rule for the event, if it repeats
    pub recurrence: Option<RecurrenceRule>,
}

impl CalendarEvent {
    /// Whether this event touches the given evaluation window.
    ///
    /// Both boundaries are inclusive: an event starting exactly when the
    /// window ends still blocks.
    pub fn overlaps(&self, window: &Window) -> bool {
        intervals_overlap(self.start, self.end, window.start, window.end)
    }
}

/// The evaluation query: the closed interval `[now, now + margin]` that
/// must be entirely free of blocking events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// Build a window from a reference instant and a trailing margin.
    pub fn new(now: DateTime<Utc>, margin: Duration) -> Self {
        Self {
            start: now,
            end: now + margin,
        }
    }
}

/// Inclusive interval overlap: any of the four endpoints falling inside
/// the other interval counts.
///
/// Sub-second precision is stripped from all four endpoints before
/// comparison, so millisecond jitter in stored timestamps cannot tip the
/// verdict either way.
pub(crate) fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    let (a_start, a_end) = (truncate_subsec(a_start), truncate_subsec(a_end));
    let (b_start, b_end) = (truncate_subsec(b_start), truncate_subsec(b_end));

    is_between(b_start, a_start, a_end)
        || is_between(b_end, a_start, a_end)
        || is_between(a_start, b_start, b_end)
        || is_between(a_end, b_start, b_end)
}

fn is_between(x: DateTime<Utc>, lo: DateTime<Utc>, hi: DateTime<Utc>) -> bool {
    x >= lo && x <= hi
}

fn truncate_subsec(t: DateTime<Utc>) -> DateTime<Utc> {
    t - Duration::nanoseconds(i64::from(t.timestamp_subsec_nanos()))
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
