// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The interval-overlap evaluator
//!
//! Decides whether a deployment pipeline should have promotions suspended
//! because a blocked time window is in progress or about to start.

use super::event::{CalendarEvent, Window};
use super::parser::{parse_calendar, ParseError};
use chrono::{DateTime, Duration, Utc};

/// Default lookahead margin: promotions less than an hour away from a
/// blocked window are already suspended.
pub const DEFAULT_MARGIN_SECS: i64 = 3_600;

/// Evaluates whether a pipeline should have promotions suspended due to the
/// imminent start of a blocked time window.
///
/// `ics` is an iCal document describing blocked windows (an event exists
/// only for times during which promotions must not happen). `now` is the
/// reference instant; `margin` is how much of the future beyond `now` must
/// also be free.
///
/// Returns the earliest-starting blocking event, or `None` when the buffered
/// window `[now, now + margin]` is clear. Candidates are sorted by
/// `(start, end, summary)` before the scan, so the verdict does not depend
/// on declaration order or on how recurrences expand. A malformed document
/// is an error, never a silent "not blocked".
pub fn should_block_pipeline(
    ics: &str,
    now: DateTime<Utc>,
    margin: Duration,
) -> Result<Option<CalendarEvent>, ParseError> {
    let window = Window::new(now, margin);

    let mut candidates: Vec<CalendarEvent> = Vec::new();
    for event in parse_calendar(ics)? {
        candidates.extend(flatten_event(event, now));
    }
    candidates.sort_by(|a, b| {
        (a.start, a.end, &a.summary).cmp(&(b.start, b.end, &b.summary))
    });

    Ok(candidates.into_iter().find(|e| e.overlaps(&window)))
}

/// A non-recurring event stands for itself. A recurring event is replaced
/// by up to two concrete instances: the most recent occurrence starting at
/// or before `at`, and the next one starting strictly after it. Both
/// inherit the template's duration.
fn flatten_event(mut event: CalendarEvent, at: DateTime<Utc>) -> Vec<CalendarEvent> {
    let Some(rule) = event.recurrence.take() else {
        return vec![event];
    };

    let duration = event.end - event.start;
    let mut instances = Vec::with_capacity(2);
    if let Some(previous) = rule.before(event.start, at, true) {
        instances.push(occurrence(&event, previous, duration));
    }
    if let Some(next) = rule.after(event.start, at) {
        instances.push(occurrence(&event, next, duration));
    }
    instances
}

/// A concrete instance of a recurring event. The summary carries the
/// instance's own start/end so occurrences are distinguishable in logs and
/// in the transition-disable reason.
fn occurrence(template: &CalendarEvent, start: DateTime<Utc>, duration: Duration) -> CalendarEvent {
    let end = start + duration;
    CalendarEvent {
        summary: format!("{} {} - {}", template.summary, timestamp(start), timestamp(end)),
        start,
        end,
        recurrence: None,
    }
}

/// RFC 3339 with milliseconds, e.g. `2020-05-08T22:00:00.000Z`.
fn timestamp(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
#[path = "block_tests.rs"]
mod tests;
