// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! dg-control: the change-control evaluation handler
//!
//! A short-lived pass, invoked periodically by an external scheduler: fetch
//! the change-control calendar, decide with `dg-core` whether the next hour
//! touches a blocked window, and enable or disable promotion into the
//! managed pipeline stage accordingly.
//!
//! All I/O sits behind adapter traits (`CalendarStore`,
//! `TransitionControl`); the caller constructs the clients and passes them
//! in. A missing calendar object fails closed: evaluation proceeds against
//! a fallback document that blocks all time.

pub mod config;
pub mod fake;
pub mod fallback;
pub mod handler;
pub mod reason;
pub mod traits;

// Re-exports
pub use config::{ConfigError, ControlConfig};
pub use fake::{ControlCall, FakeCalendarStore, FakeTransitionControl};
pub use fallback::fallback_calendar;
pub use handler::{run, HandlerError};
pub use reason::sanitize_reason;
pub use traits::{CalendarStore, StoreError, TransitionControl, TransitionError};
