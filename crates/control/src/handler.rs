// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One change-control evaluation pass

use crate::config::ControlConfig;
use crate::fallback::fallback_calendar;
use crate::reason::sanitize_reason;
use crate::traits::{CalendarStore, StoreError, TransitionControl, TransitionError};
use chrono::Duration;
use dg_core::calendar::{should_block_pipeline, ParseError, DEFAULT_MARGIN_SECS};
use dg_core::clock::Clock;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("invalid change control calendar: {0}")]
    Calendar(#[from] ParseError),
}

/// Fetch the calendar, evaluate it at the clock's current instant with the
/// default one-hour margin, and flip the stage transition accordingly.
///
/// A missing calendar object is recovered fail-closed via the fallback
/// document; every other failure propagates to the scheduler, which owns
/// retries.
pub async fn run(
    config: &ControlConfig,
    store: &impl CalendarStore,
    transitions: &impl TransitionControl,
    clock: &impl Clock,
) -> Result<(), HandlerError> {
    info!(
        bucket = %config.bucket_name,
        key = %config.object_key,
        pipeline = %config.pipeline_name,
        stage = %config.stage_name,
        "evaluating change control calendar"
    );

    let ics = match store.fetch(&config.bucket_name, &config.object_key).await {
        Ok(body) => body,
        Err(StoreError::NotFound(location)) => {
            warn!(%location, "calendar object not found, defaulting to closed");
            fallback_calendar(&config.bucket_name, &config.object_key)
        }
        Err(e) => {
            error!(error = %e, "calendar lookup failed");
            return Err(e.into());
        }
    };

    let blocking = should_block_pipeline(&ics, clock.now(), Duration::seconds(DEFAULT_MARGIN_SECS))
        .map_err(|e| {
            error!(error = %e, "change control calendar did not parse");
            HandlerError::Calendar(e)
        })?;

    match blocking {
        Some(event) => {
            let reason = sanitize_reason(&event.summary);
            info!(
                pipeline = %config.pipeline_name,
                stage = %config.stage_name,
                %reason,
                "disabling transition"
            );
            transitions
                .disable(&config.pipeline_name, &config.stage_name, &reason)
                .await?;
        }
        None => {
            info!(
                pipeline = %config.pipeline_name,
                stage = %config.stage_name,
                "enabling transition"
            );
            transitions
                .enable(&config.pipeline_name, &config.stage_name)
                .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
