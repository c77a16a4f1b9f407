//! Implicit test dependencies.
//!
//! `java_test` targets run under Bazel's test runner, which is never declared
//! as a dependency. Unless the workspace sets `--explicit_java_test_deps`, the
//! IDE needs the runner's interface jar on the test classpath to compile and
//! launch tests the way Bazel does.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::collaborators::ImplicitDependencies;
use super::entry::ClasspathEntry;
use crate::constants::{TEST_RUNNER_IJAR_DIR, TEST_RUNNER_IJAR_FILE, TEST_RUNNER_SEARCH_DEPTH};
use crate::label::{Label, TargetKind};

/// Finds the Bazel test runner jar under `bazel-bin`.
#[derive(Debug, Clone)]
pub struct TestRunnerImplicitDependencies {
    bazel_bin_dir: PathBuf,
    explicit_java_test_deps: bool,
}

impl TestRunnerImplicitDependencies {
    /// Look for the runner below `bazel_bin_dir`.
    pub fn new(bazel_bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            bazel_bin_dir: bazel_bin_dir.into(),
            explicit_java_test_deps: false,
        }
    }

    /// When set, tests declare their runner dependencies themselves and
    /// nothing is injected.
    #[must_use]
    pub const fn with_explicit_java_test_deps(mut self, explicit: bool) -> Self {
        self.explicit_java_test_deps = explicit;
        self
    }

    fn find_runner_jar(&self, label: &Label) -> Option<PathBuf> {
        let runner_dir = self.bazel_bin_dir.join(TEST_RUNNER_IJAR_DIR);
        if !runner_dir.is_dir() {
            tracing::warn!(
                "Could not add implicit test deps to target [{}], directory [{}] does not exist",
                label,
                runner_dir.display()
            );
            return None;
        }

        WalkDir::new(&runner_dir)
            .max_depth(TEST_RUNNER_SEARCH_DEPTH)
            .follow_links(true)
            .into_iter()
            .filter_map(Result::ok)
            .find(|entry| {
                entry.file_type().is_file() && entry.file_name() == TEST_RUNNER_IJAR_FILE
            })
            .map(|entry| canonical_or_raw(entry.path()))
    }
}

fn canonical_or_raw(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

impl ImplicitDependencies for TestRunnerImplicitDependencies {
    fn implicit_dependencies_for(&self, label: &Label, kind: &TargetKind) -> Vec<ClasspathEntry> {
        if self.explicit_java_test_deps {
            tracing::debug!("explicit_java_test_deps is set, no implicit deps for {}", label);
            return Vec::new();
        }

        match self.find_runner_jar(label) {
            Some(jar) => {
                tracing::debug!("Adding test runner {} to {} target {}", jar.display(), kind, label);
                vec![ClasspathEntry::jar(jar.to_string_lossy(), None, true)]
            }
            None => Vec::new(),
        }
    }
}

/// Adds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImplicitDependencies;

impl ImplicitDependencies for NoImplicitDependencies {
    fn implicit_dependencies_for(&self, _label: &Label, _kind: &TargetKind) -> Vec<ClasspathEntry> {
        Vec::new()
    }
}
