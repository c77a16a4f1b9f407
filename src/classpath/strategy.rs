//! Pluggable ways of computing a target's classpath.
//!
//! The resolver runs its strategies in order for each activated target and
//! stops at the first one that reports [`StrategyOutcome::Complete`].
//! [`AspectClasspathStrategy`] is the primary one and works from the aspect
//! records; [`SourceDerivedClasspathStrategy`] is a fallback that guesses jars
//! from the types a project's sources import.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use super::collaborators::{AspectRecordSource, ImplicitDependencies, ProjectModel};
use super::entry::{ClasspathBuilder, ClasspathEntry, Project};
use super::type_index::TypeIndex;
use crate::aspect::{AspectRecords, DependencyRecord};
use crate::core::BzlError;
use crate::label::Label;

/// Everything a strategy knows about the target being resolved.
#[derive(Debug, Clone, Copy)]
pub struct ClasspathRequest<'a> {
    /// The project the classpath is for.
    pub project: &'a Project,
    /// The target currently being resolved.
    pub target: &'a Label,
    /// All targets activated for the project; also the labels flushed when a
    /// record turns out to be malformed.
    pub activated_targets: &'a BTreeSet<Label>,
    /// Aspect records fetched for the activated targets.
    pub records: &'a AspectRecords,
}

impl ClasspathRequest<'_> {
    /// Whether the target itself is a test, which makes all its contributions test-only.
    pub fn is_test_target(&self) -> bool {
        self.records.kind_of(self.target).is_some_and(|kind| kind.is_testable())
    }
}

/// Whether a strategy fully resolved a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyOutcome {
    /// Nothing more to do for this target.
    Complete,
    /// Entries may be missing; the next strategy gets a turn.
    Incomplete,
}

/// A way of contributing classpath entries for one target.
pub trait ClasspathStrategy: Send + Sync {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    /// Add the target's entries to `builder`.
    fn classpath_for_target(
        &self,
        request: &ClasspathRequest<'_>,
        builder: &mut ClasspathBuilder,
    ) -> Result<StrategyOutcome, BzlError>;
}

/// Resolves classpaths from aspect records.
pub struct AspectClasspathStrategy {
    project_model: Arc<dyn ProjectModel>,
    implicit_deps: Arc<dyn ImplicitDependencies>,
    record_source: Arc<dyn AspectRecordSource>,
    strict: bool,
}

impl AspectClasspathStrategy {
    /// Create the strategy. In strict mode malformed entries are errors
    /// instead of being skipped.
    pub fn new(
        project_model: Arc<dyn ProjectModel>,
        implicit_deps: Arc<dyn ImplicitDependencies>,
        record_source: Arc<dyn AspectRecordSource>,
        strict: bool,
    ) -> Self {
        Self {
            project_model,
            implicit_deps,
            record_source,
            strict,
        }
    }

    fn owning_project(&self, sources: &[String]) -> Option<Project> {
        sources.iter().find_map(|source| self.project_model.owner_project_for_source_path(source))
    }

    /// Add generated jars, then output jars.
    fn add_target_jars(
        &self,
        request: &ClasspathRequest<'_>,
        record: &DependencyRecord,
        is_test_target: bool,
        builder: &mut ClasspathBuilder,
    ) -> Result<(), BzlError> {
        for jar_set in record.generated_jars.iter().chain(&record.jars) {
            let Some(jar) = jar_set.class_jar() else {
                let error = BzlError::MalformedDependencyEntry {
                    target: record.label.to_string(),
                    reason: "jar set has no class jar".to_string(),
                };
                let configured: Vec<Label> = request.activated_targets.iter().cloned().collect();
                self.record_source.flush_aspect_cache(&configured);

                if self.strict {
                    return Err(error);
                }
                tracing::warn!(
                    "{}; flushed aspect data for {} configured target(s) of project {}",
                    error,
                    configured.len(),
                    request.project
                );
                builder.request_flush();
                continue;
            };

            builder.add_entry(ClasspathEntry::jar(jar, jar_set.source_jar.clone(), is_test_target));
        }
        Ok(())
    }
}

impl ClasspathStrategy for AspectClasspathStrategy {
    fn name(&self) -> &'static str {
        "aspect"
    }

    fn classpath_for_target(
        &self,
        request: &ClasspathRequest<'_>,
        builder: &mut ClasspathBuilder,
    ) -> Result<StrategyOutcome, BzlError> {
        let Some(records) = request.records.records_for(request.target) else {
            tracing::warn!(
                "{}, skipping",
                BzlError::MissingAspectData {
                    target: request.target.to_string()
                }
            );
            return Ok(StrategyOutcome::Incomplete);
        };

        let is_test_target = request.is_test_target();
        let mut projects_added: HashSet<String> = HashSet::new();

        for record in records {
            let activated = request.activated_targets.contains(&record.label);

            // represented in the IDE by its sources
            if activated && record.kind.is_library_like() {
                continue;
            }

            if record.kind.is_testable() {
                builder.add_implicit(
                    self.implicit_deps.implicit_dependencies_for(&record.label, &record.kind),
                );
                continue;
            }

            if activated && !record.kind.is_import() {
                tracing::debug!(
                    "Found unsupported target type {} as dependency {}; only java_library and java_import are fully supported",
                    record.kind,
                    record.label
                );
            }

            match self.owning_project(&record.sources) {
                None => self.add_target_jars(request, record, is_test_target, builder)?,
                Some(owner) if owner != *request.project => {
                    if projects_added.insert(owner.name().to_string()) {
                        builder.add_entry(ClasspathEntry::project(owner.clone(), is_test_target));
                    }
                    builder.add_project_reference(owner);
                }
                Some(_) => {
                    // e.g. java_import jars checked into the project itself
                    if !record.kind.is_library_like() && !record.kind.is_testable() {
                        self.add_target_jars(request, record, is_test_target, builder)?;
                    }
                }
            }
        }

        Ok(StrategyOutcome::Complete)
    }
}

/// Derives jar entries from the imports in a project's sources.
pub struct SourceDerivedClasspathStrategy {
    project_model: Arc<dyn ProjectModel>,
    type_index: Arc<dyn TypeIndex>,
}

impl SourceDerivedClasspathStrategy {
    /// Create the strategy over a type index.
    pub fn new(project_model: Arc<dyn ProjectModel>, type_index: Arc<dyn TypeIndex>) -> Self {
        Self {
            project_model,
            type_index,
        }
    }
}

impl ClasspathStrategy for SourceDerivedClasspathStrategy {
    fn name(&self) -> &'static str {
        "source-derived"
    }

    fn classpath_for_target(
        &self,
        request: &ClasspathRequest<'_>,
        builder: &mut ClasspathBuilder,
    ) -> Result<StrategyOutcome, BzlError> {
        let sources = self.project_model.source_paths(request.project);
        if sources.is_empty() {
            return Ok(StrategyOutcome::Incomplete);
        }

        let is_test_target = request.is_test_target();
        let mut unresolved = 0usize;

        for source in &sources {
            for type_name in self.type_index.imports_of(source) {
                let jars = self.type_index.jars_for_type(&type_name);
                if jars.is_empty() {
                    tracing::debug!("Type {} imported by {} is not in any known jar", type_name, source);
                    unresolved += 1;
                    continue;
                }
                for jar in jars {
                    builder.add_entry(ClasspathEntry::jar(jar, None, is_test_target));
                }
            }
        }

        tracing::debug!(
            "Source-derived classpath for {}: {} unresolved type(s)",
            request.project,
            unresolved
        );

        Ok(if unresolved == 0 {
            StrategyOutcome::Complete
        } else {
            StrategyOutcome::Incomplete
        })
    }
}
