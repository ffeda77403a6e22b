// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! iCal parsing for change-control calendars (syntactic layer)
//!
//! Reads the RFC 5545 subset these calendars actually use: folded lines,
//! VEVENT components inside a VCALENDAR, and the DTSTART/DTEND/SUMMARY/RRULE
//! properties. Non-VEVENT components (VTIMEZONE and friends) are skipped
//! wholesale; unknown properties are ignored. Malformed input is an error,
//! never an empty calendar.

use super::event::CalendarEvent;
use super::rrule::{RecurrenceRule, RruleError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use thiserror::Error;

/// Errors that can occur while parsing a calendar document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// No `BEGIN:VCALENDAR` enclosing the document
    #[error("no VCALENDAR component found")]
    MissingCalendar,

    /// A component was opened but never closed
    #[error("unterminated {0} component")]
    Unterminated(String),

    /// A VEVENT lacked a required property
    #[error("VEVENT is missing {0}")]
    MissingProperty(&'static str),

    /// A date or date-time property value could not be read
    #[error("invalid date-time {value:?}: {source}")]
    InvalidDateTime {
        value: String,
        #[source]
        source: chrono::format::ParseError,
    },

    /// An event that ends before it starts
    #[error("event {summary:?} ends before it starts")]
    EndBeforeStart { summary: String },

    /// A recurrence rule that could not be read
    #[error("invalid recurrence rule: {0}")]
    Rrule(#[from] RruleError),
}

/// Parse every event in a calendar document, in declaration order.
pub fn parse_calendar(input: &str) -> Result<Vec<CalendarEvent>, ParseError> {
    let mut events = Vec::new();
    let mut saw_calendar = false;
    let mut in_calendar = false;
    let mut skipping: Option<(String, usize)> = None;
    let mut current: Option<EventBuilder> = None;

    for line in unfold(input) {
        let Some((name, value)) = split_property(&line) else {
            continue;
        };

        // Inside a component we don't understand: track nesting until its END
        if let Some((component, depth)) = skipping.as_mut() {
            match name.as_str() {
                "BEGIN" => *depth += 1,
                "END" if value.eq_ignore_ascii_case(component.as_str()) && *depth == 1 => {
                    skipping = None;
                }
                "END" => *depth = depth.saturating_sub(1),
                _ => {}
            }
            continue;
        }

        match (name.as_str(), value) {
            ("BEGIN", v) if v.eq_ignore_ascii_case("VCALENDAR") => {
                saw_calendar = true;
                in_calendar = true;
            }
            ("END", v) if v.eq_ignore_ascii_case("VCALENDAR") => {
                if current.is_some() {
                    return Err(ParseError::Unterminated("VEVENT".to_string()));
                }
                in_calendar = false;
            }
            ("BEGIN", v) if v.eq_ignore_ascii_case("VEVENT") => {
                if !in_calendar {
                    return Err(ParseError::MissingCalendar);
                }
                current = Some(EventBuilder::default());
            }
            ("END", v) if v.eq_ignore_ascii_case("VEVENT") => {
                if let Some(builder) = current.take() {
                    events.push(builder.finish()?);
                }
            }
            ("BEGIN", v) => {
                skipping = Some((v.to_string(), 1));
            }
            (property, value) => {
                if let Some(builder) = current.as_mut() {
                    builder.set(property, value)?;
                }
            }
        }
    }

    if let Some((component, _)) = skipping {
        return Err(ParseError::Unterminated(component));
    }
    if current.is_some() || in_calendar {
        return Err(ParseError::Unterminated(
            if current.is_some() { "VEVENT" } else { "VCALENDAR" }.to_string(),
        ));
    }
    if !saw_calendar {
        return Err(ParseError::MissingCalendar);
    }

    Ok(events)
}

#[derive(Default)]
struct EventBuilder {
    summary: Option<String>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    recurrence: Option<RecurrenceRule>,
}

impl EventBuilder {
    fn set(&mut self, property: &str, value: &str) -> Result<(), ParseError> {
        match property {
            "DTSTART" => self.start = Some(parse_datetime(value)?),
            "DTEND" => self.end = Some(parse_datetime(value)?),
            "SUMMARY" => self.summary = Some(unescape_text(value)),
            "RRULE" => self.recurrence = Some(RecurrenceRule::parse(value)?),
            // DTSTAMP, UID, X-... and the rest are not consumed
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<CalendarEvent, ParseError> {
        let start = self.start.ok_or(ParseError::MissingProperty("DTSTART"))?;
        let end = self.end.ok_or(ParseError::MissingProperty("DTEND"))?;
        // node-ical tolerates events without a SUMMARY; so do we
        let summary = self.summary.unwrap_or_default();
        if end < start {
            return Err(ParseError::EndBeforeStart { summary });
        }
        Ok(CalendarEvent {
            summary,
            start,
            end,
            recurrence: self.recurrence,
        })
    }
}

/// Undo RFC 5545 line folding: a line starting with a space or tab
/// continues the previous one.
fn unfold(input: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for line in input.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(last) = out.last_mut() {
                last.push_str(&line[1..]);
            }
        } else if !line.trim().is_empty() {
            out.push(line.to_string());
        }
    }
    out
}

/// Split a content line into (property name, value), dropping any
/// parameters between the name and the `:`.
fn split_property(line: &str) -> Option<(String, &str)> {
    let (head, value) = line.split_once(':')?;
    let name = head.split(';').next().unwrap_or(head);
    Some((name.trim().to_ascii_uppercase(), value))
}

/// Parse the date-time forms these calendars use: `YYYYMMDDTHHMMSSZ` (UTC),
/// `YYYYMMDDTHHMMSS` (floating, treated as UTC) and `YYYYMMDD` (all-day,
/// midnight UTC). TZID parameters have already been dropped; the calendars
/// this system consumes are authored in UTC.
fn parse_datetime(value: &str) -> Result<DateTime<Utc>, ParseError> {
    let v = value.trim();
    let invalid = |source| ParseError::InvalidDateTime {
        value: v.to_string(),
        source,
    };

    if let Some(stripped) = v.strip_suffix('Z').or_else(|| v.strip_suffix('z')) {
        NaiveDateTime::parse_from_str(stripped, "%Y%m%dT%H%M%S")
            .map(|dt| dt.and_utc())
            .map_err(invalid)
    } else if v.contains('T') {
        NaiveDateTime::parse_from_str(v, "%Y%m%dT%H%M%S")
            .map(|dt| dt.and_utc())
            .map_err(invalid)
    } else {
        NaiveDate::parse_from_str(v, "%Y%m%d")
            .map(|d| d.and_time(NaiveTime::MIN).and_utc())
            .map_err(invalid)
    }
}

/// Undo RFC 5545 text escaping in property values.
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(escaped) => out.push(escaped),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
