use std::sync::Arc;

use anyhow::Result;
use bzljvm::classpath::{NoProgress, Project, WorkspaceClasspath};
use bzljvm::config::ResolverConfig;
use bzljvm::test_utils::{ManualClock, RecordingRecordSource, StaticImplicitDependencies};

use crate::common::{RUNNER_JAR, sample_model, sample_records};

const TTL_MILLIS: i64 = 300_000;

struct Fixture {
    workspace: Arc<WorkspaceClasspath>,
    source: Arc<RecordingRecordSource>,
    clock: Arc<ManualClock>,
}

fn fixture() -> Fixture {
    let source = Arc::new(RecordingRecordSource::with_flat(sample_records()));
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let workspace = WorkspaceClasspath::new(
        &ResolverConfig::default(),
        Arc::new(sample_model()),
        source.clone(),
        Arc::new(StaticImplicitDependencies::new([RUNNER_JAR])),
        clock.clone(),
    );
    Fixture {
        workspace: Arc::new(workspace),
        source,
        clock,
    }
}

#[tokio::test]
async fn test_cached_within_ttl_and_refetched_after() -> Result<()> {
    let fx = fixture();
    let app = Project::new("app");

    let first = fx.workspace.classpath(&app, Arc::new(NoProgress)).await?;
    fx.clock.advance(TTL_MILLIS);
    let second = fx.workspace.classpath(&app, Arc::new(NoProgress)).await?;
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(fx.source.fetch_count(), 1);

    fx.clock.advance(1);
    let third = fx.workspace.classpath(&app, Arc::new(NoProgress)).await?;
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(first.as_ref(), third.as_ref());
    assert_eq!(fx.source.fetch_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_invalidate_forces_recompute() -> Result<()> {
    let fx = fixture();
    let app = Project::new("app");
    let libs = Project::new("libs");

    let app_before = fx.workspace.classpath(&app, Arc::new(NoProgress)).await?;
    let libs_before = fx.workspace.classpath(&libs, Arc::new(NoProgress)).await?;
    assert_eq!(fx.source.fetch_count(), 2);

    assert!(fx.workspace.invalidate(&app));
    let app_after = fx.workspace.classpath(&app, Arc::new(NoProgress)).await?;
    let libs_after = fx.workspace.classpath(&libs, Arc::new(NoProgress)).await?;

    assert!(!Arc::ptr_eq(&app_before, &app_after));
    assert!(Arc::ptr_eq(&libs_before, &libs_after));
    assert_eq!(fx.source.fetch_count(), 3);

    fx.workspace.close();
    assert!(fx.workspace.cache().is_empty());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_resolve_once() -> Result<()> {
    let fx = fixture();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let workspace = Arc::clone(&fx.workspace);
        handles.push(tokio::spawn(async move {
            workspace.classpath(&Project::new("app"), Arc::new(NoProgress)).await
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await??);
    }

    assert_eq!(fx.source.fetch_count(), 1);
    assert!(results.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    Ok(())
}

#[tokio::test]
async fn test_projects_are_cached_independently() -> Result<()> {
    let fx = fixture();
    let app_project = Project::new("app");
    let libs_project = Project::new("libs");
    let (app, libs) = tokio::join!(
        fx.workspace.classpath(&app_project, Arc::new(NoProgress)),
        fx.workspace.classpath(&libs_project, Arc::new(NoProgress))
    );

    assert!(app?.is_complete());
    assert!(libs?.is_complete());
    assert_eq!(fx.workspace.cache().len(), 2);
    Ok(())
}
