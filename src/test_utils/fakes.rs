//! In-memory implementations of the classpath collaborator traits.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::aspect::{AspectRecords, DependencyRecord};
use crate::classpath::{
    AspectRecordSource, ClasspathEntry, Clock, ImplicitDependencies, Project, ProjectModel,
};
use crate::core::BzlError;
use crate::label::{Label, TargetKind};

#[derive(Debug, Clone)]
struct StaticProject {
    project: Project,
    source_prefix: String,
    targets: Vec<Label>,
}

/// A fixed set of projects, each owning the sources under one directory.
#[derive(Debug, Clone, Default)]
pub struct StaticProjectModel {
    projects: Vec<StaticProject>,
    sources: BTreeMap<String, Vec<String>>,
}

impl StaticProjectModel {
    /// A workspace without projects.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a project owning every source below `source_prefix`.
    #[must_use]
    pub fn with_project<I, S>(mut self, name: &str, source_prefix: &str, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.projects.push(StaticProject {
            project: Project::new(name),
            source_prefix: source_prefix.trim_end_matches('/').to_string(),
            targets: targets.into_iter().map(Label::new).collect(),
        });
        self
    }

    /// Register a source file of a project, returned by `source_paths`.
    #[must_use]
    pub fn with_source(mut self, project: &str, path: &str) -> Self {
        self.sources.entry(project.to_string()).or_default().push(path.to_string());
        self
    }
}

impl ProjectModel for StaticProjectModel {
    fn owner_project_for_source_path(&self, source_path: &str) -> Option<Project> {
        self.projects
            .iter()
            .filter(|candidate| {
                source_path == candidate.source_prefix
                    || source_path
                        .strip_prefix(&candidate.source_prefix)
                        .is_some_and(|rest| rest.starts_with('/'))
            })
            .max_by_key(|candidate| candidate.source_prefix.len())
            .map(|candidate| candidate.project.clone())
    }

    fn configured_targets(&self, project: &Project) -> Result<Vec<Label>, BzlError> {
        self.projects
            .iter()
            .find(|candidate| candidate.project == *project)
            .map(|candidate| candidate.targets.clone())
            .ok_or_else(|| BzlError::Other {
                message: format!("unknown project '{project}'"),
            })
    }

    fn source_paths(&self, project: &Project) -> Vec<String> {
        self.sources.get(project.name()).cloned().unwrap_or_default()
    }
}

#[derive(Debug)]
enum RecordSupply {
    Flat(Vec<DependencyRecord>),
    Fixed(AspectRecords),
    Failing(String),
}

/// An [`AspectRecordSource`] that serves canned records and remembers every
/// call made to it.
#[derive(Debug)]
pub struct RecordingRecordSource {
    supply: RecordSupply,
    fetches: AtomicUsize,
    flushes: Mutex<Vec<Vec<Label>>>,
}

impl Default for RecordingRecordSource {
    fn default() -> Self {
        Self::with_records(AspectRecords::new())
    }
}

impl RecordingRecordSource {
    /// Serve records computed from a flat list, for whichever targets are requested.
    pub fn with_flat(records: Vec<DependencyRecord>) -> Self {
        Self::from_supply(RecordSupply::Flat(records))
    }

    /// Serve exactly `records` on every fetch.
    pub fn with_records(records: AspectRecords) -> Self {
        Self::from_supply(RecordSupply::Fixed(records))
    }

    /// Fail every fetch with `reason`.
    pub fn failing(reason: &str) -> Self {
        Self::from_supply(RecordSupply::Failing(reason.to_string()))
    }

    fn from_supply(supply: RecordSupply) -> Self {
        Self {
            supply,
            fetches: AtomicUsize::new(0),
            flushes: Mutex::new(Vec::new()),
        }
    }

    /// Number of `fetch_records` calls so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of `flush_aspect_cache` calls so far.
    pub fn flush_count(&self) -> usize {
        self.flushes.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Every label flushed so far, in call order.
    pub fn flushed_labels(&self) -> Vec<Label> {
        self.flushes.lock().unwrap_or_else(PoisonError::into_inner).iter().flatten().cloned().collect()
    }
}

impl AspectRecordSource for RecordingRecordSource {
    fn fetch_records(&self, targets: &[Label]) -> Result<AspectRecords, BzlError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match &self.supply {
            RecordSupply::Failing(reason) => Err(BzlError::Other {
                message: reason.clone(),
            }),
            RecordSupply::Fixed(records) => Ok(records.clone()),
            RecordSupply::Flat(flat) => Ok(AspectRecords::from_flat(flat.clone()).select(targets)),
        }
    }

    fn flush_aspect_cache(&self, labels: &[Label]) {
        self.flushes.lock().unwrap_or_else(PoisonError::into_inner).push(labels.to_vec());
    }
}

/// Returns the same jars, flagged test-only, for every test target.
#[derive(Debug, Clone, Default)]
pub struct StaticImplicitDependencies {
    jars: Vec<String>,
}

impl StaticImplicitDependencies {
    /// Inject `jars` into every test target.
    pub fn new<I, S>(jars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            jars: jars.into_iter().map(Into::into).collect(),
        }
    }
}

impl ImplicitDependencies for StaticImplicitDependencies {
    fn implicit_dependencies_for(&self, _label: &Label, kind: &TargetKind) -> Vec<ClasspathEntry> {
        if !kind.is_testable() {
            return Vec::new();
        }
        self.jars.iter().map(|jar| ClasspathEntry::jar(jar.clone(), None, true)).collect()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_millis: AtomicI64,
}

impl ManualClock {
    /// Start at `now_millis`.
    pub fn new(now_millis: i64) -> Self {
        Self {
            now_millis: AtomicI64::new(now_millis),
        }
    }

    /// Jump to an absolute time.
    pub fn set(&self, now_millis: i64) {
        self.now_millis.store(now_millis, Ordering::SeqCst);
    }

    /// Move forward by `millis`.
    pub fn advance(&self, millis: i64) {
        self.now_millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn current_time_millis(&self) -> i64 {
        self.now_millis.load(Ordering::SeqCst)
    }
}
