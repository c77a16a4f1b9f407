//! Fluent construction of [`DependencyRecord`]s.

use crate::aspect::{DependencyRecord, OutputJarSet};
use crate::label::{Label, TargetKind};

/// Builds a [`DependencyRecord`] one field at a time.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: DependencyRecord,
}

impl RecordBuilder {
    /// Start a record with no deps, sources or jars.
    pub fn new(label: &str, kind: TargetKind) -> Self {
        Self {
            record: DependencyRecord::new(label, kind),
        }
    }

    /// Add a declared dependency.
    #[must_use]
    pub fn dep(mut self, label: &str) -> Self {
        self.record.deps.push(Label::new(label));
        self
    }

    /// Add several declared dependencies.
    #[must_use]
    pub fn deps(mut self, labels: &[&str]) -> Self {
        self.record.deps.extend(labels.iter().map(Label::new));
        self
    }

    /// Add a source file.
    #[must_use]
    pub fn source(mut self, path: &str) -> Self {
        self.record.sources.push(path.to_string());
        self
    }

    /// Add an output jar.
    #[must_use]
    pub fn jar(mut self, jar: &str) -> Self {
        self.record.jars.push(OutputJarSet::new(jar));
        self
    }

    /// Add an output jar with its source jar.
    #[must_use]
    pub fn jar_with_source(mut self, jar: &str, source_jar: &str) -> Self {
        self.record.jars.push(OutputJarSet::new(jar).with_source_jar(source_jar));
        self
    }

    /// Add a generated jar.
    #[must_use]
    pub fn generated_jar(mut self, jar: &str) -> Self {
        self.record.generated_jars.push(OutputJarSet::new(jar));
        self
    }

    /// Add a jar set without a class jar.
    #[must_use]
    pub fn malformed_jar(mut self) -> Self {
        self.record.jars.push(OutputJarSet::default());
        self
    }

    /// Finish the record.
    pub fn build(self) -> DependencyRecord {
        self.record
    }
}
