//! The workspace-scoped owner of classpath state.
//!
//! One [`WorkspaceClasspath`] is created when a workspace is opened and dropped
//! (or [closed](WorkspaceClasspath::close)) when it goes away. It owns the cache,
//! the resolver and the collaborators, so two workspaces never share state.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::cache::ClasspathCache;
use super::collaborators::{
    AspectRecordSource, Clock, ImplicitDependencies, ProjectModel, WorkProgress,
};
use super::entry::{Project, ResolvedClasspath};
use super::resolver::ClasspathResolver;
use super::strategy::{AspectClasspathStrategy, SourceDerivedClasspathStrategy};
use super::type_index::TypeIndex;
use crate::config::ResolverConfig;
use crate::core::BzlError;
use crate::label::Label;

/// Cached, cancellable classpath computation for the projects of one workspace.
pub struct WorkspaceClasspath {
    cache: ClasspathCache,
    resolver: Arc<ClasspathResolver>,
    project_model: Arc<dyn ProjectModel>,
    record_source: Arc<dyn AspectRecordSource>,
    strict: bool,
}

impl WorkspaceClasspath {
    /// Wire up the aspect strategy and an empty cache.
    pub fn new(
        config: &ResolverConfig,
        project_model: Arc<dyn ProjectModel>,
        record_source: Arc<dyn AspectRecordSource>,
        implicit_deps: Arc<dyn ImplicitDependencies>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let aspect = AspectClasspathStrategy::new(
            Arc::clone(&project_model),
            implicit_deps,
            Arc::clone(&record_source),
            config.strict,
        );

        Self {
            cache: ClasspathCache::new(config.cache_ttl(), clock),
            resolver: Arc::new(ClasspathResolver::new(vec![Arc::new(aspect)], config.strict)),
            project_model,
            record_source,
            strict: config.strict,
        }
    }

    /// Fall back to deriving jars from source imports when aspect data does
    /// not fully resolve a target.
    #[must_use]
    pub fn with_type_index(mut self, type_index: Arc<dyn TypeIndex>) -> Self {
        let derived = SourceDerivedClasspathStrategy::new(Arc::clone(&self.project_model), type_index);
        self.resolver = Arc::new(self.resolver.as_ref().clone().with_strategy(Arc::new(derived)));
        self
    }

    /// The underlying cache.
    pub const fn cache(&self) -> &ClasspathCache {
        &self.cache
    }

    /// The underlying resolver.
    pub fn resolver(&self) -> &ClasspathResolver {
        &self.resolver
    }

    /// The classpath of `project`, served from the cache when fresh.
    ///
    /// Outside strict mode a failed resolution yields an empty classpath
    /// flagged incomplete, which is not cached so the next call retries.
    /// Cancellation is always returned as an error.
    pub async fn classpath(
        &self,
        project: &Project,
        progress: Arc<dyn WorkProgress>,
    ) -> Result<Arc<ResolvedClasspath>, BzlError> {
        let result = self.cache.get_or_compute(project, || self.compute(project, progress)).await;

        match result {
            Ok(resolved) => Ok(resolved),
            Err(error) if self.strict || error.is_fatal() => Err(error),
            Err(error) => {
                tracing::warn!("Unable to compute classpath for project {}: {}", project, error);
                Ok(Arc::new(ResolvedClasspath::incomplete()))
            }
        }
    }

    /// Run the resolution on the blocking pool: fetching aspect records and
    /// looking up implicit jars touch Bazel and the filesystem.
    async fn compute(
        &self,
        project: &Project,
        progress: Arc<dyn WorkProgress>,
    ) -> Result<ResolvedClasspath, BzlError> {
        let owned = project.clone();
        let project_model = Arc::clone(&self.project_model);
        let record_source = Arc::clone(&self.record_source);
        let resolver = Arc::clone(&self.resolver);

        tokio::task::spawn_blocking(move || {
            compute_blocking(
                &owned,
                project_model.as_ref(),
                record_source.as_ref(),
                &resolver,
                progress.as_ref(),
            )
        })
        .await
        .map_err(|error| BzlError::ResolutionFailure {
            project: project.name().to_string(),
            reason: format!("classpath task failed: {error}"),
        })?
    }

    /// Forget the cached classpath of `project`, e.g. after its BUILD file
    /// changed. Returns whether anything was cached.
    pub fn invalidate(&self, project: &Project) -> bool {
        self.cache.invalidate(project)
    }

    /// Drop all cached state. The workspace stays usable.
    pub fn close(&self) {
        let (hits, misses) = self.cache.stats();
        tracing::debug!(
            "Closing workspace classpath cache ({} entries, {} hits, {} misses)",
            self.cache.len(),
            hits,
            misses
        );
        self.cache.clear();
    }
}

fn compute_blocking(
    project: &Project,
    project_model: &dyn ProjectModel,
    record_source: &dyn AspectRecordSource,
    resolver: &ClasspathResolver,
    progress: &dyn WorkProgress,
) -> Result<ResolvedClasspath, BzlError> {
    let targets = project_model.configured_targets(project).map_err(|error| {
        BzlError::ResolutionFailure {
            project: project.name().to_string(),
            reason: format!("could not read configured targets: {error}"),
        }
    })?;
    if targets.is_empty() {
        tracing::debug!("Project {} has no configured targets", project);
    }

    let records = record_source.fetch_records(&targets).map_err(|error| {
        BzlError::ResolutionFailure {
            project: project.name().to_string(),
            reason: format!("could not fetch aspect records: {error}"),
        }
    })?;

    let activated: BTreeSet<Label> = targets.into_iter().collect();
    resolver.resolve_project(project, &activated, &records, progress)
}

impl std::fmt::Debug for WorkspaceClasspath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceClasspath")
            .field("cache", &self.cache)
            .field("strategies", &self.resolver.strategy_names())
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}
