use std::sync::Arc;

use anyhow::Result;
use bzljvm::classpath::{
    ClasspathEntry, NoProgress, Project, ResolvedClasspath, WorkspaceClasspath,
};
use bzljvm::config::ResolverConfig;
use bzljvm::core::BzlError;
use bzljvm::label::TargetKind;
use bzljvm::test_utils::{
    ManualClock, RecordBuilder, RecordingRecordSource, StaticImplicitDependencies,
    StaticProjectModel,
};

use crate::common::{
    APP, APP_TESTS, GUAVA, GUAVA_JAR, JUNIT_JAR, RUNNER_JAR, sample_model, sample_records,
};

fn workspace_with(
    config: &ResolverConfig,
    model: StaticProjectModel,
    source: Arc<RecordingRecordSource>,
) -> WorkspaceClasspath {
    WorkspaceClasspath::new(
        config,
        Arc::new(model),
        source,
        Arc::new(StaticImplicitDependencies::new([RUNNER_JAR])),
        Arc::new(ManualClock::new(0)),
    )
}

async fn resolve_app(config: &ResolverConfig) -> Result<Arc<ResolvedClasspath>> {
    let source = Arc::new(RecordingRecordSource::with_flat(sample_records()));
    let workspace = workspace_with(config, sample_model(), source);
    Ok(workspace.classpath(&Project::new("app"), Arc::new(NoProgress)).await?)
}

#[tokio::test]
async fn test_app_project_classpath() -> Result<()> {
    let resolved = resolve_app(&ResolverConfig::default()).await?;

    assert!(resolved.is_complete());

    let main: Vec<&str> = resolved.main_entries().keys().map(String::as_str).collect();
    assert_eq!(main, vec![GUAVA_JAR, "libs"]);
    assert_eq!(
        resolved.main_entries().get(GUAVA_JAR),
        Some(&ClasspathEntry::jar(
            GUAVA_JAR,
            Some("external/maven/guava-sources.jar".to_string()),
            false
        ))
    );

    // junit is only reachable from the test target
    let test: Vec<&str> = resolved.test_entries().keys().map(String::as_str).collect();
    assert_eq!(test, vec![JUNIT_JAR]);

    assert_eq!(resolved.project_references(), &[Project::new("libs")]);
    assert_eq!(resolved.implicit_deps().len(), 1);

    let flat: Vec<&str> = resolved.entries().into_iter().map(ClasspathEntry::key).collect();
    assert_eq!(flat, vec![GUAVA_JAR, "libs", JUNIT_JAR, RUNNER_JAR]);
    Ok(())
}

#[tokio::test]
async fn test_classpath_serializes_to_json() -> Result<()> {
    let resolved = resolve_app(&ResolverConfig::default()).await?;
    let json = serde_json::to_value(resolved.as_ref())?;

    assert_eq!(json["is_complete"], serde_json::Value::Bool(true));
    assert_eq!(json["main_entries"][GUAVA_JAR]["type"], "jar");
    assert_eq!(json["main_entries"]["libs"]["type"], "project");
    assert_eq!(json["test_entries"][JUNIT_JAR]["is_test"], true);
    Ok(())
}

#[tokio::test]
async fn test_missing_aspect_data_marks_incomplete() -> Result<()> {
    let model = sample_model().with_project("tools", "tools", ["//tools:codegen"]);
    let source = Arc::new(RecordingRecordSource::with_flat(sample_records()));
    let workspace = workspace_with(&ResolverConfig::default(), model, source);

    let resolved = workspace.classpath(&Project::new("tools"), Arc::new(NoProgress)).await?;
    assert!(!resolved.is_complete());
    assert!(resolved.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_malformed_jar_flushes_configured_targets() -> Result<()> {
    let records = vec![
        RecordBuilder::new(APP, TargetKind::JavaLibrary)
            .deps(&["@maven//:broken", GUAVA])
            .source("projects/app/src/main/java/demo/App.java")
            .build(),
        RecordBuilder::new("@maven//:broken", TargetKind::JavaImport).malformed_jar().build(),
        RecordBuilder::new(GUAVA, TargetKind::JavaImport).jar(GUAVA_JAR).build(),
    ];
    let model = StaticProjectModel::new().with_project("app", "projects/app", [APP]);

    let source = Arc::new(RecordingRecordSource::with_flat(records.clone()));
    let lenient = workspace_with(&ResolverConfig::default(), model.clone(), source.clone());
    let resolved = lenient.classpath(&Project::new("app"), Arc::new(NoProgress)).await?;

    assert!(!resolved.is_complete());
    assert!(resolved.main_entries().contains_key(GUAVA_JAR));
    assert_eq!(source.flush_count(), 1);
    assert_eq!(source.flushed_labels(), vec![bzljvm::label::Label::new(APP)]);

    let strict_config = ResolverConfig {
        strict: true,
        ..ResolverConfig::default()
    };
    let strict =
        workspace_with(&strict_config, model, Arc::new(RecordingRecordSource::with_flat(records)));
    let err = strict.classpath(&Project::new("app"), Arc::new(NoProgress)).await.unwrap_err();
    assert!(matches!(err, BzlError::MalformedDependencyEntry { .. }));
    Ok(())
}

#[tokio::test]
async fn test_test_only_project_reference() -> Result<()> {
    // the libs project is only reachable from the test target
    let records = vec![
        RecordBuilder::new(APP, TargetKind::JavaLibrary)
            .source("projects/app/src/main/java/demo/App.java")
            .build(),
        RecordBuilder::new(APP_TESTS, TargetKind::JavaTest)
            .deps(&[APP, "//projects/libs/testing:fixtures"])
            .source("projects/app/src/test/java/demo/AppTest.java")
            .build(),
        RecordBuilder::new("//projects/libs/testing:fixtures", TargetKind::JavaLibrary)
            .source("projects/libs/testing/src/Fixtures.java")
            .build(),
    ];
    let source = Arc::new(RecordingRecordSource::with_flat(records));
    let workspace = workspace_with(&ResolverConfig::default(), sample_model(), source);

    let resolved = workspace.classpath(&Project::new("app"), Arc::new(NoProgress)).await?;
    assert!(resolved.main_entries().is_empty());
    assert_eq!(
        resolved.test_entries().get("libs"),
        Some(&ClasspathEntry::project(Project::new("libs"), true))
    );
    assert_eq!(resolved.project_references(), &[Project::new("libs")]);
    Ok(())
}
