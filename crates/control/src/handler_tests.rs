// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::fake::{ControlCall, FakeCalendarStore, FakeTransitionControl};
use chrono::{DateTime, Utc};
use dg_core::clock::FakeClock;

const CALENDAR: &str = "\
BEGIN:VCALENDAR
VERSION:2.0
BEGIN:VEVENT
DTSTART:20200601T000000Z
DTEND:20200603T000000Z
SUMMARY:June freeze: no deploys
END:VEVENT
END:VCALENDAR
";

fn instant(s: &str) -> DateTime<Utc> {
    match s.parse() {
        Ok(t) => t,
        Err(e) => unreachable!("bad test timestamp {s}: {e}"),
    }
}

fn config() -> ControlConfig {
    ControlConfig::new("release-calendars", "change-control.ics", "delivery", "Release")
}

fn fixture(clock_at: &str) -> (ControlConfig, FakeCalendarStore, FakeTransitionControl, FakeClock) {
    let store = FakeCalendarStore::new();
    store.put_object("release-calendars", "change-control.ics", CALENDAR);
    (
        config(),
        store,
        FakeTransitionControl::new(),
        FakeClock::at(instant(clock_at)),
    )
}

#[tokio::test]
async fn disables_the_transition_inside_a_blocked_window() {
    let (config, store, transitions, clock) = fixture("2020-06-02T00:00:00Z");

    match run(&config, &store, &transitions, &clock).await {
        Ok(()) => {}
        Err(e) => unreachable!("run failed: {e}"),
    }

    assert_eq!(
        transitions.calls(),
        vec![ControlCall::Disable {
            pipeline: "delivery".to_string(),
            stage: "Release".to_string(),
            // ':' and ',' are not legal in a transition reason
            reason: "June freeze- no deploys".to_string(),
        }]
    );
}

#[tokio::test]
async fn enables_the_transition_outside_all_windows() {
    let (config, store, transitions, clock) = fixture("2020-07-01T00:00:00Z");

    match run(&config, &store, &transitions, &clock).await {
        Ok(()) => {}
        Err(e) => unreachable!("run failed: {e}"),
    }

    assert_eq!(
        transitions.calls(),
        vec![ControlCall::Enable {
            pipeline: "delivery".to_string(),
            stage: "Release".to_string(),
        }]
    );
}

#[tokio::test]
async fn margin_ahead_of_a_window_disables() {
    // Half an hour before the freeze starts; the one-hour margin reaches it
    let (config, store, transitions, clock) = fixture("2020-05-31T23:30:00Z");

    match run(&config, &store, &transitions, &clock).await {
        Ok(()) => {}
        Err(e) => unreachable!("run failed: {e}"),
    }

    assert!(matches!(
        transitions.calls().as_slice(),
        [ControlCall::Disable { .. }]
    ));
}

#[tokio::test]
async fn missing_calendar_fails_closed_with_the_fallback_reason() {
    let store = FakeCalendarStore::new(); // no object at all
    let transitions = FakeTransitionControl::new();
    let clock = FakeClock::at(instant("2024-01-01T00:00:00Z"));

    match run(&config(), &store, &transitions, &clock).await {
        Ok(()) => {}
        Err(e) => unreachable!("run failed: {e}"),
    }

    assert_eq!(
        transitions.calls(),
        vec![ControlCall::Disable {
            pipeline: "delivery".to_string(),
            stage: "Release".to_string(),
            reason: "No change control calendar was found in \
                     s3---release-calendars-change-control.ics !"
                .to_string(),
        }]
    );
}

#[tokio::test]
async fn store_outage_propagates_without_touching_the_transition() {
    let (config, store, transitions, clock) = fixture("2020-06-02T00:00:00Z");
    store.set_outage("access denied");

    assert!(matches!(
        run(&config, &store, &transitions, &clock).await,
        Err(HandlerError::Store(StoreError::Failed(_)))
    ));
    assert!(transitions.calls().is_empty());
}

#[tokio::test]
async fn malformed_calendar_propagates_without_touching_the_transition() {
    let store = FakeCalendarStore::new();
    store.put_object(
        "release-calendars",
        "change-control.ics",
        "BEGIN:VCALENDAR\nBEGIN:VEVENT\nDTSTART:garbage\nDTEND:20200603T000000Z\nEND:VEVENT\nEND:VCALENDAR\n",
    );
    let transitions = FakeTransitionControl::new();
    let clock = FakeClock::at(instant("2020-06-02T00:00:00Z"));

    assert!(matches!(
        run(&config(), &store, &transitions, &clock).await,
        Err(HandlerError::Calendar(_))
    ));
    assert!(transitions.calls().is_empty());
}

#[tokio::test]
async fn transition_failures_propagate() {
    let (config, store, transitions, clock) = fixture("2020-06-02T00:00:00Z");
    transitions.set_failure("throttled");

    assert!(matches!(
        run(&config, &store, &transitions, &clock).await,
        Err(HandlerError::Transition(_))
    ));
}

#[tokio::test]
async fn fetches_from_the_configured_location() {
    let (config, store, transitions, clock) = fixture("2020-07-01T00:00:00Z");

    match run(&config, &store, &transitions, &clock).await {
        Ok(()) => {}
        Err(e) => unreachable!("run failed: {e}"),
    }

    assert_eq!(
        store.calls(),
        vec![ControlCall::Fetch {
            bucket: "release-calendars".to_string(),
            key: "change-control.ics".to_string(),
        }]
    );
}

// =============================================================================
// Log output
// =============================================================================

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: std::sync::Arc<std::sync::Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run an evaluation pass with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::default();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => unreachable!("runtime construction failed: {e}"),
        };
        runtime.block_on(f())
    });

    (logs.contents(), result)
}

#[test]
fn a_missing_calendar_is_logged_as_a_warning() {
    let config = config();
    let store = FakeCalendarStore::new(); // no object at all
    let transitions = FakeTransitionControl::new();
    let clock = FakeClock::at(instant("2024-01-01T00:00:00Z"));

    let (logs, result) = with_tracing(|| run(&config, &store, &transitions, &clock));

    assert!(result.is_ok());
    assert!(
        logs.contains("calendar object not found, defaulting to closed"),
        "expected a fail-closed warning, got: {logs}"
    );
    assert!(logs.contains("s3://release-calendars/change-control.ics"));
}
