//! bzljvm - Bazel dependency graphs and JVM classpath resolution
//!
//! The engine behind an IDE integration for Bazel monorepos. It ingests the
//! per-target metadata produced by a Bazel aspect, builds a directed graph
//! over build labels, answers reachability and ordering queries on it, and
//! resolves the merged, deduplicated classpath of each IDE project.
//!
//! # Architecture Overview
//!
//! ```text
//! aspect records ──► GraphBuilder ──► LabelGraph (roots, leaves, order, cycles)
//!        │
//!        └─────────► ClasspathResolver ──► ClasspathCache ──► IDE
//!                     (strategies)          (per project, TTL)
//! ```
//!
//! The crate never runs Bazel and never touches IDE state itself. Everything
//! it needs from the outside comes through the traits in
//! [`classpath::collaborators`].
//!
//! # Core Modules
//!
//! - [`label`] - Bazel label values and rule kinds
//! - [`aspect`] - decoded aspect output records
//! - [`graph`] - the label graph, its builder and ordering algorithms
//! - [`classpath`] - classpath strategies, resolver, cache and workspace context
//! - [`config`] - `bzljvm.toml` resolver settings
//! - [`core`] - error types and user-facing error rendering
//! - [`cli`] - the diagnostic command-line front end
//!
//! # Example
//!
//! ```rust,no_run
//! use bzljvm::aspect::parse_records;
//! use bzljvm::graph::GraphBuilder;
//! use bzljvm::label::Label;
//!
//! # fn main() -> anyhow::Result<()> {
//! let records = parse_records(
//!     r#"[{"label": "//app:app", "kind": "java_binary", "deps": ["//lib:lib"]},
//!         {"label": "//lib:lib", "kind": "java_library"}]"#,
//! )?;
//! let graph = GraphBuilder::new().build(&records);
//!
//! assert!(graph.is_dependency(&Label::new("//app"), &Label::new("//lib"), None, false));
//! let order = graph.order_labels(&[Label::new("//app"), Label::new("//lib")], false);
//! assert_eq!(order, vec![Label::new("//lib"), Label::new("//app")]);
//! # Ok(())
//! # }
//! ```

// Core functionality modules
pub mod aspect;
pub mod classpath;
pub mod config;
pub mod constants;
pub mod core;
pub mod graph;
pub mod label;

// Command-line front end
pub mod cli;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
