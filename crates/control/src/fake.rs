// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake adapter implementations for testing

use crate::traits::{CalendarStore, StoreError, TransitionControl, TransitionError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Recorded call to an adapter method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCall {
    Fetch {
        bucket: String,
        key: String,
    },
    Enable {
        pipeline: String,
        stage: String,
    },
    Disable {
        pipeline: String,
        stage: String,
        reason: String,
    },
}

/// In-memory calendar store: a map of `bucket/key` to document bodies.
/// Missing entries report `NotFound`; an injected outage fails every fetch.
#[derive(Clone, Default)]
pub struct FakeCalendarStore {
    objects: Arc<Mutex<HashMap<String, String>>>,
    outage: Arc<Mutex<Option<String>>>,
    calls: Arc<Mutex<Vec<ControlCall>>>,
}

impl FakeCalendarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_object(&self, bucket: &str, key: &str, body: impl Into<String>) {
        let mut objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        objects.insert(format!("{bucket}/{key}"), body.into());
    }

    /// Make every subsequent fetch fail with a non-NotFound error.
    pub fn set_outage(&self, message: impl Into<String>) {
        let mut outage = self.outage.lock().unwrap_or_else(|e| e.into_inner());
        *outage = Some(message.into());
    }

    pub fn calls(&self) -> Vec<ControlCall> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl CalendarStore for FakeCalendarStore {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<String, StoreError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ControlCall::Fetch {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });

        if let Some(message) = self
            .outage
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            return Err(StoreError::Failed(message));
        }

        let objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        objects
            .get(&format!("{bucket}/{key}"))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("s3://{bucket}/{key}")))
    }
}

/// Records enable/disable calls; optionally fails them.
#[derive(Clone, Default)]
pub struct FakeTransitionControl {
    failure: Arc<Mutex<Option<String>>>,
    calls: Arc<Mutex<Vec<ControlCall>>>,
}

impl FakeTransitionControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent transition update fail.
    pub fn set_failure(&self, message: impl Into<String>) {
        let mut failure = self.failure.lock().unwrap_or_else(|e| e.into_inner());
        *failure = Some(message.into());
    }

    pub fn calls(&self) -> Vec<ControlCall> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn record(&self, call: ControlCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    fn check(&self, pipeline: &str, stage: &str) -> Result<(), TransitionError> {
        let failure = self.failure.lock().unwrap_or_else(|e| e.into_inner());
        match failure.as_ref() {
            Some(message) => Err(TransitionError::Failed {
                pipeline: pipeline.to_string(),
                stage: stage.to_string(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TransitionControl for FakeTransitionControl {
    async fn enable(&self, pipeline: &str, stage: &str) -> Result<(), TransitionError> {
        self.record(ControlCall::Enable {
            pipeline: pipeline.to_string(),
            stage: stage.to_string(),
        });
        self.check(pipeline, stage)
    }

    async fn disable(
        &self,
        pipeline: &str,
        stage: &str,
        reason: &str,
    ) -> Result<(), TransitionError> {
        self.record(ControlCall::Disable {
            pipeline: pipeline.to_string(),
            stage: stage.to_string(),
            reason: reason.to_string(),
        });
        self.check(pipeline, stage)
    }
}
