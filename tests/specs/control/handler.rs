//! End-to-end change-control handler scenarios against fake adapters.

use chrono::{DateTime, Utc};
use dg_control::{run, ControlCall, ControlConfig, FakeCalendarStore, FakeTransitionControl};
use dg_core::FakeClock;

const CALENDAR: &str = "\
BEGIN:VCALENDAR
VERSION:2.0
BEGIN:VEVENT
DTSTART:20240301T000000Z
DTEND:20240304T000000Z
SUMMARY:Quarterly close
END:VEVENT
END:VCALENDAR
";

fn instant(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn config() -> ControlConfig {
    ControlConfig::new("calendars", "freeze.ics", "delivery", "Prod")
}

#[tokio::test]
async fn a_pass_during_a_freeze_disables_promotion() {
    let store = FakeCalendarStore::new();
    store.put_object("calendars", "freeze.ics", CALENDAR);
    let transitions = FakeTransitionControl::new();
    let clock = FakeClock::at(instant("2024-03-02T12:00:00Z"));

    run(&config(), &store, &transitions, &clock).await.unwrap();

    assert_eq!(
        transitions.calls(),
        vec![ControlCall::Disable {
            pipeline: "delivery".to_string(),
            stage: "Prod".to_string(),
            reason: "Quarterly close".to_string(),
        }]
    );
}

#[tokio::test]
async fn a_pass_outside_any_freeze_enables_promotion() {
    let store = FakeCalendarStore::new();
    store.put_object("calendars", "freeze.ics", CALENDAR);
    let transitions = FakeTransitionControl::new();
    let clock = FakeClock::at(instant("2024-04-01T12:00:00Z"));

    run(&config(), &store, &transitions, &clock).await.unwrap();

    assert_eq!(
        transitions.calls(),
        vec![ControlCall::Enable {
            pipeline: "delivery".to_string(),
            stage: "Prod".to_string(),
        }]
    );
}

#[tokio::test]
async fn a_missing_calendar_fails_closed() {
    let store = FakeCalendarStore::new();
    let transitions = FakeTransitionControl::new();
    let clock = FakeClock::at(instant("2024-04-01T12:00:00Z"));

    run(&config(), &store, &transitions, &clock).await.unwrap();

    match transitions.calls().as_slice() {
        [ControlCall::Disable { reason, .. }] => {
            assert!(reason.contains("No change control calendar was found"));
        }
        other => panic!("expected a single disable call, got {other:?}"),
    }
}

#[tokio::test]
async fn repeated_passes_are_idempotent_per_verdict() {
    let store = FakeCalendarStore::new();
    store.put_object("calendars", "freeze.ics", CALENDAR);
    let transitions = FakeTransitionControl::new();
    let clock = FakeClock::at(instant("2024-03-02T12:00:00Z"));

    run(&config(), &store, &transitions, &clock).await.unwrap();
    run(&config(), &store, &transitions, &clock).await.unwrap();

    // Two identical disable calls; the pipeline side treats the second as
    // a no-op.
    assert_eq!(transitions.calls().len(), 2);
    assert!(transitions
        .calls()
        .iter()
        .all(|call| matches!(call, ControlCall::Disable { .. })));
}
