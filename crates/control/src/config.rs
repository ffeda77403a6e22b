// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment-driven configuration for the change-control handler

use thiserror::Error;

pub const BUCKET_NAME_VAR: &str = "CHANGE_CONTROL_BUCKET_NAME";
pub const OBJECT_KEY_VAR: &str = "CHANGE_CONTROL_OBJECT_KEY";
pub const PIPELINE_NAME_VAR: &str = "PIPELINE_NAME";
pub const STAGE_NAME_VAR: &str = "STAGE_NAME";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    MissingVar(&'static str),
}

/// Where the calendar lives and which stage transition it governs.
#[derive(Debug, Clone)]
pub struct ControlConfig {
    /// Bucket containing the change-control calendar
    pub bucket_name: String,
    /// Key of the calendar object within the bucket
    pub object_key: String,
    /// Pipeline in which promotions are managed
    pub pipeline_name: String,
    /// Stage into which transitions are managed
    pub stage_name: String,
}

impl ControlConfig {
    pub fn new(
        bucket_name: impl Into<String>,
        object_key: impl Into<String>,
        pipeline_name: impl Into<String>,
        stage_name: impl Into<String>,
    ) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            object_key: object_key.into(),
            pipeline_name: pipeline_name.into(),
            stage_name: stage_name.into(),
        }
    }

    /// Read all four required variables, failing fast on the first one
    /// missing — before any work starts.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bucket_name: require(BUCKET_NAME_VAR)?,
            object_key: require(OBJECT_KEY_VAR)?,
            pipeline_name: require(PIPELINE_NAME_VAR)?,
            stage_name: require(STAGE_NAME_VAR)?,
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
