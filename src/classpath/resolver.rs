//! Assembling a project classpath from per-target strategy results.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::collaborators::WorkProgress;
use super::entry::{ClasspathBuilder, Project, ResolvedClasspath};
use super::strategy::{ClasspathRequest, ClasspathStrategy, StrategyOutcome};
use crate::aspect::AspectRecords;
use crate::core::BzlError;
use crate::label::Label;

/// Runs the configured strategies over a project's activated targets.
#[derive(Clone)]
pub struct ClasspathResolver {
    strategies: Vec<Arc<dyn ClasspathStrategy>>,
    strict: bool,
}

impl ClasspathResolver {
    /// Create a resolver. Strategies are tried in order for every target.
    pub fn new(strategies: Vec<Arc<dyn ClasspathStrategy>>, strict: bool) -> Self {
        Self {
            strategies,
            strict,
        }
    }

    /// Append a strategy tried after the existing ones.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Arc<dyn ClasspathStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Names of the configured strategies, in the order they run.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|strategy| strategy.name()).collect()
    }

    /// Whether strategy errors propagate instead of degrading the classpath.
    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    /// Resolve the classpath of a single target.
    pub fn resolve(
        &self,
        project: &Project,
        target: &Label,
        activated_targets: &BTreeSet<Label>,
        records: &AspectRecords,
    ) -> Result<ResolvedClasspath, BzlError> {
        let mut builder = ClasspathBuilder::new();
        self.resolve_target_into(project, target, activated_targets, records, &mut builder)?;
        Ok(builder.build())
    }

    /// Resolve the union classpath of every activated target of a project.
    ///
    /// `progress` is checked before each target; a cancelled resolution
    /// returns [`BzlError::Cancelled`] and produces nothing.
    pub fn resolve_project(
        &self,
        project: &Project,
        activated_targets: &BTreeSet<Label>,
        records: &AspectRecords,
        progress: &dyn WorkProgress,
    ) -> Result<ResolvedClasspath, BzlError> {
        let mut builder = ClasspathBuilder::new();

        for target in activated_targets {
            if progress.is_cancelled() {
                tracing::info!("Classpath computation for project {} cancelled", project);
                return Err(BzlError::Cancelled {
                    project: project.name().to_string(),
                });
            }
            self.resolve_target_into(project, target, activated_targets, records, &mut builder)?;
        }

        let resolved = builder.build();
        tracing::debug!(
            "Resolved {} classpath entries for project {} (complete: {})",
            resolved.len(),
            project,
            resolved.is_complete()
        );
        Ok(resolved)
    }

    fn resolve_target_into(
        &self,
        project: &Project,
        target: &Label,
        activated_targets: &BTreeSet<Label>,
        records: &AspectRecords,
        builder: &mut ClasspathBuilder,
    ) -> Result<(), BzlError> {
        let request = ClasspathRequest {
            project,
            target,
            activated_targets,
            records,
        };

        for strategy in &self.strategies {
            match strategy.classpath_for_target(&request, builder) {
                Ok(StrategyOutcome::Complete) => return Ok(()),
                Ok(StrategyOutcome::Incomplete) => {
                    tracing::trace!(
                        "Strategy '{}' left target {} incomplete",
                        strategy.name(),
                        target
                    );
                }
                Err(error) if self.strict || error.is_fatal() => return Err(error),
                Err(error) => {
                    tracing::error!(
                        "Strategy '{}' failed for target {}: {}",
                        strategy.name(),
                        target,
                        error
                    );
                    break;
                }
            }
        }

        builder.mark_incomplete();
        Ok(())
    }
}
