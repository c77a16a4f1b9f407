//! JVM classpath resolution.
//!
//! Turns the aspect records of a project's activated targets into a
//! [`ResolvedClasspath`]: jars needed by main code, jars only needed by tests,
//! references to sibling projects that provide dependencies from source, and
//! implicit entries such as Bazel's test runner.
//!
//! The pieces, from the bottom up:
//!
//! - [`entry`]: classpath entries and the builder enforcing "main wins over test"
//! - [`collaborators`]: traits for the IDE project model, aspect output,
//!   implicit dependencies, time and cancellation
//! - [`strategy`]: aspect-based and source-derived ways to resolve one target
//! - [`resolver`]: runs strategies over every activated target of a project
//! - [`cache`]: per-project results with a time-to-live
//! - [`workspace`]: ties it all together for one open workspace
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bzljvm::classpath::{NoProgress, Project, SystemClock, WorkspaceClasspath};
//! use bzljvm::classpath::implicit::TestRunnerImplicitDependencies;
//! use bzljvm::config::ResolverConfig;
//! # use bzljvm::classpath::{AspectRecordSource, ProjectModel};
//!
//! # async fn example(
//! #     model: Arc<dyn ProjectModel>,
//! #     records: Arc<dyn AspectRecordSource>,
//! # ) -> anyhow::Result<()> {
//! let config = ResolverConfig::default();
//! let workspace = WorkspaceClasspath::new(
//!     &config,
//!     model,
//!     records,
//!     Arc::new(TestRunnerImplicitDependencies::new("bazel-bin")),
//!     Arc::new(SystemClock),
//! );
//!
//! let classpath = workspace.classpath(&Project::new("app"), Arc::new(NoProgress)).await?;
//! if !classpath.is_complete() {
//!     println!("classpath may be incomplete");
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod collaborators;
pub mod entry;
pub mod implicit;
pub mod resolver;
pub mod strategy;
pub mod type_index;
pub mod workspace;

pub use cache::ClasspathCache;
pub use collaborators::{
    AspectRecordSource, CancellationFlag, Clock, ImplicitDependencies, NoProgress, ProjectModel,
    SystemClock, WorkProgress,
};
pub use entry::{ClasspathBuilder, ClasspathEntry, Project, ResolvedClasspath};
pub use resolver::ClasspathResolver;
pub use strategy::{
    AspectClasspathStrategy, ClasspathRequest, ClasspathStrategy, SourceDerivedClasspathStrategy,
    StrategyOutcome,
};
pub use type_index::{InMemoryTypeIndex, TypeIndex};
pub use workspace::WorkspaceClasspath;
