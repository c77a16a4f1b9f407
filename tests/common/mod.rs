//! Shared fixtures for the integration suite.
//!
//! The sample workspace has two IDE projects:
//!
//! ```text
//! projects/app            app (java_binary) + app-tests (java_test)
//! projects/libs/apple     apple-api (java_library)
//! projects/libs/banana    banana-api (java_library)
//! @maven                  guava, junit (java_import)
//! ```

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use anyhow::Result;
use bzljvm::aspect::DependencyRecord;
use bzljvm::label::TargetKind;
use bzljvm::test_utils::{RecordBuilder, StaticProjectModel};

pub const APP: &str = "//projects/app:app";
pub const APP_TESTS: &str = "//projects/app:app-tests";
pub const APPLE: &str = "//projects/libs/apple:apple-api";
pub const BANANA: &str = "//projects/libs/banana:banana-api";
pub const GUAVA: &str = "@maven//:guava";
pub const JUNIT: &str = "@maven//:junit";

pub const GUAVA_JAR: &str = "external/maven/guava.jar";
pub const JUNIT_JAR: &str = "external/maven/junit.jar";
pub const RUNNER_JAR: &str = "bazel-bin/TestRunner/Runner_deploy-ijar.jar";

/// Aspect records of the sample workspace.
pub fn sample_records() -> Vec<DependencyRecord> {
    vec![
        RecordBuilder::new(APP, TargetKind::JavaBinary)
            .deps(&[APPLE, GUAVA])
            .source("projects/app/src/main/java/demo/App.java")
            .jar("bazel-bin/projects/app/app.jar")
            .build(),
        RecordBuilder::new(APP_TESTS, TargetKind::JavaTest)
            .deps(&[APP, JUNIT])
            .source("projects/app/src/test/java/demo/AppTest.java")
            .build(),
        RecordBuilder::new(APPLE, TargetKind::JavaLibrary)
            .deps(&[BANANA, GUAVA])
            .source("projects/libs/apple/src/main/java/demo/Apple.java")
            .jar("bazel-bin/projects/libs/apple/libapple-api.jar")
            .build(),
        RecordBuilder::new(BANANA, TargetKind::JavaLibrary)
            .source("projects/libs/banana/src/main/java/demo/Banana.java")
            .jar("bazel-bin/projects/libs/banana/libbanana-api.jar")
            .build(),
        RecordBuilder::new(GUAVA, TargetKind::JavaImport)
            .jar_with_source(GUAVA_JAR, "external/maven/guava-sources.jar")
            .build(),
        RecordBuilder::new(JUNIT, TargetKind::JavaImport).jar(JUNIT_JAR).build(),
    ]
}

/// IDE projects of the sample workspace.
pub fn sample_model() -> StaticProjectModel {
    StaticProjectModel::new()
        .with_project("app", "projects/app", [APP, APP_TESTS])
        .with_project("libs", "projects/libs", [APPLE, BANANA])
}

/// Write records as the JSON array the CLI reads.
pub fn write_records(dir: &Path, records: &[DependencyRecord]) -> Result<PathBuf> {
    let path = dir.join("aspect-records.json");
    std::fs::write(&path, serde_json::to_string_pretty(records)?)?;
    Ok(path)
}
