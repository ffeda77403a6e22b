//! End-to-end calendar evaluation scenarios.

use chrono::{DateTime, Duration, Utc};
use dg_core::calendar::{should_block_pipeline, DEFAULT_MARGIN_SECS};

const CALENDAR: &str = "\
BEGIN:VCALENDAR
VERSION:2.0
PRODID:-//Events Calendar//iCal4j 1.0//EN

BEGIN:VEVENT
DTSTAMP:20190114T161956Z
DTSTART:20170412T070000Z
DTEND:20170419T065959Z
SUMMARY:Block1
END:VEVENT

BEGIN:VEVENT
DTSTAMP:20190114T161956Z
DTSTART:20171123T080000Z
DTEND:20171127T080000Z
SUMMARY:Block2
END:VEVENT

BEGIN:VEVENT
DTSTART:20200501T220000Z
DTEND:20200504T170000Z
RRULE:FREQ=WEEKLY;INTERVAL=1
SUMMARY:Block4
END:VEVENT

END:VCALENDAR
";

fn instant(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn evaluate(now: &str, margin_secs: i64) -> Option<String> {
    should_block_pipeline(CALENDAR, instant(now), Duration::seconds(margin_secs))
        .unwrap()
        .map(|event| event.summary)
}

#[test]
fn a_clear_instant_does_not_block() {
    assert_eq!(evaluate("2017-07-12T07:00:00Z", DEFAULT_MARGIN_SECS), None);
}

#[test]
fn a_literal_window_blocks_at_its_left_edge_with_zero_margin() {
    assert_eq!(
        evaluate("2017-04-12T07:00:00Z", 0),
        Some("Block1".to_string())
    );
}

#[test]
fn a_literal_window_blocks_at_its_right_edge() {
    assert_eq!(
        evaluate("2017-11-27T08:00:00Z", DEFAULT_MARGIN_SECS),
        Some("Block2".to_string())
    );
}

#[test]
fn a_recurring_window_blocks_with_instance_timestamps_in_the_summary() {
    assert_eq!(
        evaluate("2020-05-08T22:00:00Z", DEFAULT_MARGIN_SECS),
        Some("Block4 2020-05-08T22:00:00.000Z - 2020-05-11T17:00:00.000Z".to_string())
    );
}

#[test]
fn between_recurring_occurrences_does_not_block() {
    assert_eq!(evaluate("2020-05-14T00:00:00Z", DEFAULT_MARGIN_SECS), None);
}
