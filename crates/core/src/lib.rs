// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! dg-core: Core library for the Delivery Gate (dg) toolkit
//!
//! This crate provides:
//! - The change-control calendar evaluator: parse an iCal document and
//!   decide whether a reference instant falls inside a blocked time window
//! - The buildspec model: compose build-step documents by structural merge
//!   and render them into the wire shape a build engine consumes
//! - A clock abstraction so "now" is injectable in tests
//!
//! Everything here is pure and I/O-free. Fetching calendars and talking to
//! a deployment pipeline live behind adapter traits in `dg-control`.

pub mod buildspec;
pub mod calendar;
pub mod clock;

// Re-exports
pub use buildspec::{
    ArtifactSpec, BuildSpec, BuildSpecDocument, BuildSpecError, RenderOptions, ReportSpec,
    SimpleBuildSpecOptions, PRIMARY_ARTIFACT_NAME,
};
pub use calendar::{
    should_block_pipeline, CalendarEvent, Frequency, ParseError, RecurrenceRule, Window,
    DEFAULT_MARGIN_SECS,
};
pub use clock::{Clock, FakeClock, SystemClock};
