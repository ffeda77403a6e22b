// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recurrence rules (RFC 5545 RRULE subset)
//!
//! Change-control calendars only ever carry `FREQ` and `INTERVAL`, so that
//! is the subset modelled here. A rule turns a single template event into
//! an unbounded series anchored at the event's start; the two queries
//! (`before`, `after`) locate the occurrences surrounding a reference
//! instant, which is all the evaluator needs.

use chrono::{DateTime, Duration, Months, Utc};
use thiserror::Error;

/// Errors from parsing an `RRULE:` property value.
#[derive(Debug, Error)]
pub enum RruleError {
    #[error("recurrence rule has no FREQ part: {0:?}")]
    MissingFrequency(String),
    #[error("unknown recurrence frequency: {0:?}")]
    UnknownFrequency(String),
    #[error("invalid recurrence interval: {0:?}")]
    InvalidInterval(String),
    #[error("malformed recurrence rule part: {0:?}")]
    MalformedPart(String),
}

/// How often a recurring event repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// A compact periodic-repetition descriptor: every `interval` units of
/// `freq`, starting at the series anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub freq: Frequency,
    pub interval: u32,
}

impl RecurrenceRule {
    /// Parse the value of an `RRULE:` property, e.g. `FREQ=WEEKLY;INTERVAL=2`.
    ///
    /// Parts other than FREQ and INTERVAL are ignored; a missing FREQ or a
    /// zero/garbled INTERVAL is an error.
    pub fn parse(value: &str) -> Result<Self, RruleError> {
        let mut freq = None;
        let mut interval = 1u32;

        for part in value.split(';').filter(|p| !p.trim().is_empty()) {
            let (key, val) = part
                .split_once('=')
                .ok_or_else(|| RruleError::MalformedPart(part.to_string()))?;
            match key.trim().to_ascii_uppercase().as_str() {
                "FREQ" => {
                    freq = Some(match val.trim().to_ascii_uppercase().as_str() {
                        "SECONDLY" => Frequency::Secondly,
                        "MINUTELY" => Frequency::Minutely,
                        "HOURLY" => Frequency::Hourly,
                        "DAILY" => Frequency::Daily,
                        "WEEKLY" => Frequency::Weekly,
                        "MONTHLY" => Frequency::Monthly,
                        "YEARLY" => Frequency::Yearly,
                        _ => return Err(RruleError::UnknownFrequency(val.to_string())),
                    });
                }
                "INTERVAL" => {
                    interval = val
                        .trim()
                        .parse::<u32>()
                        .ok()
                        .filter(|i| *i >= 1)
                        .ok_or_else(|| RruleError::InvalidInterval(val.to_string()))?;
                }
                _ => {}
            }
        }

        let freq = freq.ok_or_else(|| RruleError::MissingFrequency(value.to_string()))?;
        Ok(Self { freq, interval })
    }

    /// Start of the latest occurrence at or before `at` (`<= at` when
    /// `inclusive`, `< at` otherwise). `None` when `at` precedes the whole
    /// series.
    pub fn before(
        &self,
        anchor: DateTime<Utc>,
        at: DateTime<Utc>,
        inclusive: bool,
    ) -> Option<DateTime<Utc>> {
        if at < anchor || (!inclusive && at == anchor) {
            return None;
        }

        if let Some(step) = self.step_seconds() {
            let n = (at - anchor).num_seconds() / step;
            let occurrence = anchor + Duration::seconds(n * step);
            if !inclusive && occurrence == at {
                if n == 0 {
                    return None;
                }
                return Some(anchor + Duration::seconds((n - 1) * step));
            }
            Some(occurrence)
        } else {
            let mut previous = None;
            for occurrence in self.month_series(anchor) {
                let past = if inclusive {
                    occurrence > at
                } else {
                    occurrence >= at
                };
                if past {
                    break;
                }
                previous = Some(occurrence);
            }
            previous
        }
    }

    /// Start of the earliest occurrence strictly after `at`. The series is
    /// unbounded, so this only fails on date arithmetic overflow.
    pub fn after(&self, anchor: DateTime<Utc>, at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if at < anchor {
            return Some(anchor);
        }

        if let Some(step) = self.step_seconds() {
            let n = (at - anchor).num_seconds() / step + 1;
            Some(anchor + Duration::seconds(n * step))
        } else {
            self.month_series(anchor).find(|occurrence| *occurrence > at)
        }
    }

    /// Step size in seconds for the fixed-width frequencies; `None` for the
    /// calendar-arithmetic ones (monthly, yearly).
    fn step_seconds(&self) -> Option<i64> {
        let unit = match self.freq {
            Frequency::Secondly => 1,
            Frequency::Minutely => 60,
            Frequency::Hourly => 3_600,
            Frequency::Daily => 86_400,
            Frequency::Weekly => 604_800,
            Frequency::Monthly | Frequency::Yearly => return None,
        };
        Some(unit * i64::from(self.interval.max(1)))
    }

    fn step_months(&self) -> u32 {
        match self.freq {
            Frequency::Monthly => self.interval.max(1),
            Frequency::Yearly => self.interval.max(1).saturating_mul(12),
            // step_seconds covers the rest
            _ => 0,
        }
    }

    /// Occurrences of a month-stepped series, in order, ending at the edge
    /// of representable time. Day-of-month is clamped the way calendar
    /// arithmetic conventionally clamps (Jan 31 + 1 month = Feb 28/29).
    fn month_series(&self, anchor: DateTime<Utc>) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        let step = self.step_months();
        (0u32..)
            .map(move |n| {
                n.checked_mul(step)
                    .and_then(|months| anchor.checked_add_months(Months::new(months)))
            })
            .take_while(Option::is_some)
            .flatten()
    }
}

#[cfg(test)]
#[path = "rrule_tests.rs"]
mod tests;
