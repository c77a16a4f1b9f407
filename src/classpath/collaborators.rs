//! Interfaces to the systems around classpath resolution.
//!
//! The resolver never talks to Bazel or the IDE directly. Everything it needs
//! from them comes through these traits, which the hosting tool implements
//! (and which tests replace with fakes from `test_utils`).

use std::sync::atomic::{AtomicBool, Ordering};

use super::entry::{ClasspathEntry, Project};
use crate::aspect::AspectRecords;
use crate::core::BzlError;
use crate::label::{Label, TargetKind};

/// Knowledge about the IDE projects of the open workspace.
pub trait ProjectModel: Send + Sync {
    /// The project whose source folders contain `source_path`, if any.
    fn owner_project_for_source_path(&self, source_path: &str) -> Option<Project>;

    /// Targets configured (activated) for a project.
    fn configured_targets(&self, project: &Project) -> Result<Vec<Label>, BzlError>;

    /// Workspace-relative source files of a project.
    fn source_paths(&self, _project: &Project) -> Vec<String> {
        Vec::new()
    }
}

/// Supplies dependencies Bazel adds by convention rather than declaration.
pub trait ImplicitDependencies: Send + Sync {
    /// Implicit entries for a target of the given kind.
    fn implicit_dependencies_for(&self, label: &Label, kind: &TargetKind) -> Vec<ClasspathEntry>;
}

/// Source of aspect records, typically backed by `bazel build --aspects`.
pub trait AspectRecordSource: Send + Sync {
    /// Records reachable from each of `targets`.
    fn fetch_records(&self, targets: &[Label]) -> Result<AspectRecords, BzlError>;

    /// Forget any cached aspect output for `labels` so the next fetch recomputes it.
    fn flush_aspect_cache(&self, labels: &[Label]);
}

/// Wall-clock time in milliseconds.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn current_time_millis(&self) -> i64;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_time_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A caller-supplied progress monitor checked between targets.
pub trait WorkProgress: Send + Sync {
    /// Whether the caller wants the resolution abandoned.
    fn is_cancelled(&self) -> bool;
}

/// Progress monitor that never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl WorkProgress for NoProgress {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// A progress monitor backed by a flag another thread can raise.
#[derive(Debug, Default)]
pub struct CancellationFlag {
    cancelled: AtomicBool,
}

impl CancellationFlag {
    /// A flag that has not been raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask running resolutions to stop at the next target boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

impl WorkProgress for CancellationFlag {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
