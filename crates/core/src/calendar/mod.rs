// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Change-control calendar evaluation
//!
//! A change-control calendar is an iCal document in which every event marks
//! a "blocked" time window: an interval during which automated promotion
//! into a deployment stage must be suspended. This module parses such
//! documents and answers the one question that matters: does a blocked
//! window touch `[now, now + margin]`?

pub mod block;
pub mod event;
pub mod parser;
pub mod rrule;

pub use block::{should_block_pipeline, DEFAULT_MARGIN_SECS};
pub use event::{CalendarEvent, Window};
pub use parser::{parse_calendar, ParseError};
pub use rrule::{Frequency, RecurrenceRule, RruleError};
