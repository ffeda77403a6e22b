// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Buildspec merge/render model
//!
//! An in-memory representation of a CodeBuild buildspec version 0.2
//! document. Buildspecs are composed pairwise with `merge` (associative,
//! left's commands precede right's) and finalized exactly once with
//! `render`, which resolves artifact naming: until then the primary
//! artifact lives in the `secondary-artifacts` map under the reserved
//! `PRIMARY` placeholder key.
//!
//! The serde field names (`pre_build`, `base-directory`,
//! `secondary-artifacts`, ...) are the build engine's wire contract and
//! must not be renamed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Reserved placeholder key for the not-yet-named primary artifact.
pub const PRIMARY_ARTIFACT_NAME: &str = "PRIMARY";

const VERSION: &str = "0.2";

/// Errors from buildspec merge and render contract violations. Every
/// conflict is a hard error; there is no partial merge.
#[derive(Debug, Error)]
pub enum BuildSpecError {
    #[error("can't merge two different values for {key}: {left:?} vs {right:?}")]
    MergeConflict {
        key: String,
        left: String,
        right: String,
    },
    #[error("there is already an artifact with name {0}")]
    DuplicateArtifact(String),
    #[error("reports must have unique names: {0} is declared on both sides")]
    DuplicateReport(String),
    #[error("cannot merge two unnamed primary artifacts")]
    UnnamedPrimaryMerge,
    #[error("replacement name for PRIMARY artifact not supplied")]
    MissingPrimaryArtifactName,
}

/// The buildspec document tree, shaped exactly like the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSpecDocument {
    pub version: String,
    #[serde(rename = "run-as", default, skip_serializing_if = "Option::is_none")]
    pub run_as: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<EnvSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phases: Option<BTreeMap<String, PhaseSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<ArtifactsSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reports: Option<BTreeMap<String, ReportSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheSpec>,
}

impl Default for BuildSpecDocument {
    fn default() -> Self {
        Self {
            version: VERSION.to_string(),
            run_as: None,
            env: None,
            phases: None,
            artifacts: None,
            reports: None,
            cache: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EnvSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, String>>,
    #[serde(
        rename = "parameter-store",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub parameter_store: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PhaseSpec {
    #[serde(rename = "run-as", default, skip_serializing_if = "Option::is_none")]
    pub run_as: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
    #[serde(rename = "finally", default, skip_serializing_if = "Option::is_none")]
    pub finally_commands: Option<Vec<String>>,
    #[serde(
        rename = "runtime-versions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub runtime_versions: Option<BTreeMap<String, String>>,
}

impl PhaseSpec {
    pub fn with_commands(commands: Vec<String>) -> Self {
        Self {
            commands,
            ..Self::default()
        }
    }
}

/// One artifact declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ArtifactSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        rename = "base-directory",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub base_directory: Option<String>,
    #[serde(
        rename = "discard-paths",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub discard_paths: Option<String>,
}

impl ArtifactSpec {
    /// Everything under a directory, the shape `simple` emits.
    pub fn for_directory(directory: impl Into<String>) -> Self {
        Self {
            files: Some(vec!["**/*".to_string()]),
            base_directory: Some(directory.into()),
            ..Self::default()
        }
    }

    fn is_empty(&self) -> bool {
        self.files.is_none()
            && self.name.is_none()
            && self.base_directory.is_none()
            && self.discard_paths.is_none()
    }
}

/// The `artifacts` slot: an optional unnamed primary (flattened) plus the
/// named `secondary-artifacts` map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ArtifactsSpec {
    #[serde(flatten)]
    pub primary: ArtifactSpec,
    #[serde(
        rename = "secondary-artifacts",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub secondary_artifacts: Option<BTreeMap<String, ArtifactSpec>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReportSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    #[serde(
        rename = "base-directory",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub base_directory: Option<String>,
    #[serde(
        rename = "file-format",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub file_format: Option<String>,
    #[serde(
        rename = "discard-paths",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub discard_paths: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CacheSpec {
    pub paths: Vec<String>,
}

/// Options for [`BuildSpec::simple`].
#[derive(Debug, Clone, Default)]
pub struct SimpleBuildSpecOptions {
    pub install: Option<Vec<String>>,
    pub pre_build: Option<Vec<String>>,
    pub build: Option<Vec<String>>,
    /// Base directory of the primary artifact, stored under the PRIMARY
    /// placeholder until render time.
    pub artifact_directory: Option<String>,
    /// Named secondary artifacts: name to base directory.
    pub additional_artifact_directories: BTreeMap<String, String>,
    pub reports: BTreeMap<String, ReportSpec>,
}

/// Options for [`BuildSpec::render`].
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Replacement for the PRIMARY placeholder when several artifacts
    /// exist. Required in exactly that case.
    pub primary_artifact_name: Option<String>,
}

/// A composable buildspec document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
    doc: BuildSpecDocument,
}

impl BuildSpec {
    /// Wrap an already-complete document as-is.
    pub fn literal(doc: BuildSpecDocument) -> Self {
        Self { doc }
    }

    /// Minimal valid document: the version marker only.
    pub fn empty() -> Self {
        Self {
            doc: BuildSpecDocument::default(),
        }
    }

    /// Build a document from phase command lists plus artifact directory
    /// mappings. The primary directory and any additional directories all
    /// land in the secondary-artifacts map; the primary slot keeps the
    /// PRIMARY placeholder name until render time.
    pub fn simple(options: SimpleBuildSpecOptions) -> Self {
        let mut phases: BTreeMap<String, PhaseSpec> = BTreeMap::new();
        for (name, commands) in [
            ("install", options.install),
            ("pre_build", options.pre_build),
            ("build", options.build),
        ] {
            if let Some(commands) = commands {
                phases.insert(name.to_string(), PhaseSpec::with_commands(commands));
            }
        }

        let mut directories = options.additional_artifact_directories;
        if let Some(directory) = options.artifact_directory {
            directories.insert(PRIMARY_ARTIFACT_NAME.to_string(), directory);
        }
        let artifacts = (!directories.is_empty()).then(|| ArtifactsSpec {
            primary: ArtifactSpec::default(),
            secondary_artifacts: Some(
                directories
                    .into_iter()
                    .map(|(name, directory)| (name, ArtifactSpec::for_directory(directory)))
                    .collect(),
            ),
        });

        Self {
            doc: BuildSpecDocument {
                phases: (!phases.is_empty()).then_some(phases),
                artifacts,
                reports: (!options.reports.is_empty()).then_some(options.reports),
                ..BuildSpecDocument::default()
            },
        }
    }

    /// All artifact names except the PRIMARY placeholder — what callers use
    /// to learn which secondary outputs exist prior to rendering.
    pub fn additional_artifact_names(&self) -> Vec<String> {
        self.doc
            .artifacts
            .iter()
            .flat_map(|a| a.secondary_artifacts.iter())
            .flatten()
            .filter(|(name, _)| name.as_str() != PRIMARY_ARTIFACT_NAME)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Combine two documents field by field. Left's commands precede
    /// right's; keyed collections must not collide.
    pub fn merge(&self, other: &BuildSpec) -> Result<BuildSpec, BuildSpecError> {
        let a = self.doc.clone();
        let b = other.doc.clone();

        let doc = BuildSpecDocument {
            version: VERSION.to_string(),
            run_as: merge_scalar("run-as", a.run_as, b.run_as)?,
            env: merge_opt(a.env, b.env, |x, y| {
                Ok(EnvSpec {
                    variables: merge_opt(x.variables, y.variables, |m, n| {
                        merge_equal_values("env.variables", m, n)
                    })?,
                    parameter_store: merge_opt(x.parameter_store, y.parameter_store, |m, n| {
                        merge_equal_values("env.parameter-store", m, n)
                    })?,
                })
            })?,
            phases: merge_opt(a.phases, b.phases, |x, y| {
                merge_map(x, y, |name, p, q| merge_phase(name, p, q))
            })?,
            artifacts: merge_opt(a.artifacts, b.artifacts, merge_artifacts)?,
            reports: merge_opt(a.reports, b.reports, merge_reports)?,
            cache: merge_opt(a.cache, b.cache, |x, y| {
                Ok(CacheSpec {
                    paths: [x.paths, y.paths].concat(),
                })
            })?,
        };

        Ok(BuildSpec { doc })
    }

    /// Finalize the document. With exactly one artifact it is promoted to
    /// the unnamed primary shape; with several, the PRIMARY placeholder (if
    /// present) is renamed to `options.primary_artifact_name`.
    pub fn render(&self, options: RenderOptions) -> Result<BuildSpecDocument, BuildSpecError> {
        let mut doc = self.doc.clone();
        doc.artifacts = match doc.artifacts {
            Some(artifacts) => Some(render_artifacts(artifacts, options)?),
            None => None,
        };
        Ok(doc)
    }
}

fn render_artifacts(
    artifacts: ArtifactsSpec,
    options: RenderOptions,
) -> Result<ArtifactsSpec, BuildSpecError> {
    // Literal documents may already carry a rendered shape; those pass
    // through unchanged.
    let Some(mut secondary) = artifacts.secondary_artifacts else {
        return Ok(artifacts);
    };
    if !artifacts.primary.is_empty() {
        return Ok(ArtifactsSpec {
            primary: artifacts.primary,
            secondary_artifacts: Some(secondary),
        });
    }

    if secondary.len() == 1 {
        if let Some((_, artifact)) = secondary.pop_first() {
            return Ok(ArtifactsSpec {
                primary: artifact,
                secondary_artifacts: None,
            });
        }
    }

    if secondary.contains_key(PRIMARY_ARTIFACT_NAME) {
        let name = options
            .primary_artifact_name
            .ok_or(BuildSpecError::MissingPrimaryArtifactName)?;
        if secondary.contains_key(&name) {
            return Err(BuildSpecError::DuplicateArtifact(name));
        }
        if let Some(primary) = secondary.remove(PRIMARY_ARTIFACT_NAME) {
            secondary.insert(name, primary);
        }
    }

    Ok(ArtifactsSpec {
        primary: ArtifactSpec::default(),
        secondary_artifacts: Some(secondary),
    })
}

fn merge_artifacts(a: ArtifactsSpec, b: ArtifactsSpec) -> Result<ArtifactsSpec, BuildSpecError> {
    if !a.primary.is_empty() && !b.primary.is_empty() {
        return Err(BuildSpecError::UnnamedPrimaryMerge);
    }
    let primary = if a.primary.is_empty() {
        b.primary
    } else {
        a.primary
    };

    let secondary = merge_opt(a.secondary_artifacts, b.secondary_artifacts, |x, y| {
        merge_map(x, y, |name, _, _| {
            Err(BuildSpecError::DuplicateArtifact(name.to_string()))
        })
    })?;

    Ok(ArtifactsSpec {
        primary,
        secondary_artifacts: secondary,
    })
}

fn merge_reports(
    a: BTreeMap<String, ReportSpec>,
    b: BTreeMap<String, ReportSpec>,
) -> Result<BTreeMap<String, ReportSpec>, BuildSpecError> {
    merge_map(a, b, |name, _, _| {
        Err(BuildSpecError::DuplicateReport(name.to_string()))
    })
}

fn merge_phase(name: &str, a: PhaseSpec, b: PhaseSpec) -> Result<PhaseSpec, BuildSpecError> {
    Ok(PhaseSpec {
        run_as: merge_scalar(&format!("phases.{name}.run-as"), a.run_as, b.run_as)?,
        commands: [a.commands, b.commands].concat(),
        finally_commands: merge_opt(a.finally_commands, b.finally_commands, |x, y| {
            Ok([x, y].concat())
        })?,
        runtime_versions: merge_opt(a.runtime_versions, b.runtime_versions, |x, y| {
            merge_equal_values(&format!("phases.{name}.runtime-versions"), x, y)
        })?,
    })
}

/// Scalar fields must be equal if both present; a single-sided value wins.
fn merge_scalar(
    key: &str,
    a: Option<String>,
    b: Option<String>,
) -> Result<Option<String>, BuildSpecError> {
    match (a, b) {
        (Some(left), Some(right)) if left != right => Err(BuildSpecError::MergeConflict {
            key: key.to_string(),
            left,
            right,
        }),
        (a, b) => Ok(a.or(b)),
    }
}

/// Key-wise union where colliding keys must carry equal values.
fn merge_equal_values(
    context: &str,
    a: BTreeMap<String, String>,
    b: BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>, BuildSpecError> {
    merge_map(a, b, |key, left, right| {
        if left == right {
            Ok(left)
        } else {
            Err(BuildSpecError::MergeConflict {
                key: format!("{context}.{key}"),
                left,
                right,
            })
        }
    })
}

fn merge_opt<T>(
    a: Option<T>,
    b: Option<T>,
    combine: impl FnOnce(T, T) -> Result<T, BuildSpecError>,
) -> Result<Option<T>, BuildSpecError> {
    match (a, b) {
        (Some(x), Some(y)) => combine(x, y).map(Some),
        (x, y) => Ok(x.or(y)),
    }
}

fn merge_map<T>(
    a: BTreeMap<String, T>,
    b: BTreeMap<String, T>,
    mut on_collision: impl FnMut(&str, T, T) -> Result<T, BuildSpecError>,
) -> Result<BTreeMap<String, T>, BuildSpecError> {
    let mut out = a;
    for (key, value) in b {
        match out.remove(&key) {
            Some(existing) => {
                let combined = on_collision(&key, existing, value)?;
                out.insert(key, combined);
            }
            None => {
                out.insert(key, value);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "buildspec_tests.rs"]
mod tests;
