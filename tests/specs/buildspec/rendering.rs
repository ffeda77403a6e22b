//! Buildspec composition scenarios: the rendered document is the wire
//! contract consumed by the build engine, so these compare exact JSON.

use dg_core::buildspec::{BuildSpec, RenderOptions, SimpleBuildSpecOptions};
use serde_json::json;
use similar_asserts::assert_eq;

fn commands(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn a_composed_buildspec_renders_to_the_engine_schema() {
    let compile = BuildSpec::simple(SimpleBuildSpecOptions {
        install: Some(commands(&["pip install -r requirements.txt"])),
        build: Some(commands(&["make dist"])),
        artifact_directory: Some("dist".to_string()),
        ..SimpleBuildSpecOptions::default()
    });
    let docs = BuildSpec::simple(SimpleBuildSpecOptions {
        build: Some(commands(&["make docs"])),
        additional_artifact_directories: [("docs".to_string(), "build/docs".to_string())].into(),
        ..SimpleBuildSpecOptions::default()
    });

    let merged = compile.merge(&docs).unwrap();
    assert_eq!(merged.additional_artifact_names(), vec!["docs"]);

    let rendered = merged
        .render(RenderOptions {
            primary_artifact_name: Some("dist".to_string()),
        })
        .unwrap();

    assert_eq!(
        serde_json::to_value(&rendered).unwrap(),
        json!({
            "version": "0.2",
            "phases": {
                "install": { "commands": ["pip install -r requirements.txt"] },
                "build": { "commands": ["make dist", "make docs"] },
            },
            "artifacts": {
                "secondary-artifacts": {
                    "dist": { "base-directory": "dist", "files": ["**/*"] },
                    "docs": { "base-directory": "build/docs", "files": ["**/*"] },
                },
            },
        })
    );
}

#[test]
fn a_single_artifact_spec_renders_to_the_unnamed_primary_shape() {
    let spec = BuildSpec::simple(SimpleBuildSpecOptions {
        build: Some(commands(&["cargo build --release"])),
        artifact_directory: Some("target/release".to_string()),
        ..SimpleBuildSpecOptions::default()
    });

    let rendered = spec.render(RenderOptions::default()).unwrap();
    assert_eq!(
        serde_json::to_value(&rendered).unwrap(),
        json!({
            "version": "0.2",
            "phases": {
                "build": { "commands": ["cargo build --release"] },
            },
            "artifacts": {
                "base-directory": "target/release",
                "files": ["**/*"],
            },
        })
    );
}

#[test]
fn colliding_artifact_names_refuse_to_merge() {
    let spec = |dir: &str| {
        BuildSpec::simple(SimpleBuildSpecOptions {
            additional_artifact_directories: [("docs".to_string(), dir.to_string())].into(),
            ..SimpleBuildSpecOptions::default()
        })
    };

    let err = spec("a").merge(&spec("b")).unwrap_err();
    assert!(err.to_string().contains("docs"));
}
