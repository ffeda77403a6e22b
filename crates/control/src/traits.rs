// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapter trait definitions for the change-control handler's I/O seams
//!
//! There are no module-level client singletons here: the caller constructs
//! whatever real clients it wants (object store, pipeline API) and passes
//! them in as these capabilities.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from calendar storage lookups.
///
/// `NotFound` is the one recoverable case: the handler substitutes the
/// fail-closed fallback calendar. Everything else is fatal to the
/// invocation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The bucket or object does not exist
    #[error("calendar object not found: {0}")]
    NotFound(String),
    /// Any other storage failure
    #[error("calendar store failure: {0}")]
    Failed(String),
}

/// Adapter for fetching the change-control calendar document by location.
#[async_trait]
pub trait CalendarStore: Clone + Send + Sync + 'static {
    /// Fetch the calendar document at `bucket`/`key`.
    async fn fetch(&self, bucket: &str, key: &str) -> Result<String, StoreError>;
}

/// Errors from stage-transition updates.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("pipeline not found: {0}")]
    PipelineNotFound(String),
    #[error("transition update failed for {pipeline}.{stage}: {message}")]
    Failed {
        pipeline: String,
        stage: String,
        message: String,
    },
}

/// Adapter for controlling promotion into a deployment pipeline stage.
///
/// Both calls are idempotent: enabling an enabled transition (or disabling
/// a disabled one) is a no-op on the pipeline side.
#[async_trait]
pub trait TransitionControl: Clone + Send + Sync + 'static {
    /// Allow promotions into `stage`.
    async fn enable(&self, pipeline: &str, stage: &str) -> Result<(), TransitionError>;

    /// Suspend promotions into `stage`, tagging the transition with a
    /// human-readable reason.
    async fn disable(&self, pipeline: &str, stage: &str, reason: &str)
        -> Result<(), TransitionError>;
}
