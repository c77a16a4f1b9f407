//! Global constants used throughout the bzljvm codebase.
//!
//! Label syntax markers, cache lifetimes, and the well-known Bazel output
//! locations consulted when discovering implicit test dependencies.

use std::time::Duration;

/// Default lifetime of a cached project classpath (5 minutes).
///
/// Change detection for BUILD files is the caller's job; this only bounds how
/// long a classpath can go stale when nobody invalidates it.
pub const DEFAULT_CLASSPATH_CACHE_TTL: Duration = Duration::from_secs(300);

/// Prefix that marks a label as living in an external repository.
pub const EXTERNAL_REPO_PREFIX: &str = "@";

/// Separator between the repository/package part of a label and its target.
pub const TARGET_SEPARATOR: char = ':';

/// Marker that introduces the package path of a label.
pub const PACKAGE_PREFIX: &str = "//";

/// Suffix of a recursive package pattern (`//a/...`).
pub const RECURSIVE_SUFFIX: &str = "...";

/// Target names that select every target of a package (`//a:all`, `//a:*`).
pub const WILDCARD_TARGET_NAMES: [&str; 3] = ["all", "*", "all-targets"];

/// Location of the Bazel test runner ijar relative to `bazel-bin`.
pub const TEST_RUNNER_IJAR_DIR: &str = "external/bazel_tools/tools/jdk/_ijar/TestRunner";

/// File name of the test runner interface jar.
pub const TEST_RUNNER_IJAR_FILE: &str = "Runner_deploy-ijar.jar";

/// How deep to walk below [`TEST_RUNNER_IJAR_DIR`] looking for the runner jar.
pub const TEST_RUNNER_SEARCH_DEPTH: usize = 5;

/// Default name of the resolver configuration file.
pub const CONFIG_FILE_NAME: &str = "bzljvm.toml";

/// Environment variable that forces strict (test-mode) resolution.
pub const STRICT_ENV_VAR: &str = "BZLJVM_STRICT";
