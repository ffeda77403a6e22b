// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fail-closed fallback calendar
//!
//! When the calendar object cannot be found, promotions default to blocked
//! all the time, not open: a missing calendar must never silently re-enable
//! a pipeline.

/// A calendar whose single event spans from a far-past instant to a
/// far-future one, with a summary naming the missing location.
pub fn fallback_calendar(bucket: &str, key: &str) -> String {
    format!(
        "BEGIN:VCALENDAR\n\
         VERSION:2.0\n\
         PRODID:-//Events Calendar//iCal4j 1.0//EN\n\
         BEGIN:VEVENT\n\
         DTSTAMP:20190215T095737Z\n\
         DTSTART:19700101T000000Z\n\
         DTEND:99991231T235959Z\n\
         SUMMARY:No change control calendar was found in s3://{bucket}/{key} !\n\
         END:VEVENT\n\
         END:VCALENDAR\n"
    )
}
