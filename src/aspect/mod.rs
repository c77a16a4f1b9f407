//! Aspect output records.
//!
//! The Bazel aspect emits one JSON document per analyzed target describing its
//! rule kind, sources, dependencies and output jars. This module holds the
//! already-decoded form of those documents ([`DependencyRecord`]) and the
//! per-target grouping the classpath resolver consumes ([`AspectRecords`]).
//!
//! ```json
//! {
//!   "label": "//projects/libs/apple:apple-api",
//!   "kind": "java_library",
//!   "dependencies": ["@maven//:com_google_guava_guava"],
//!   "sources": ["projects/libs/apple/src/main/java/demo/Apple.java"],
//!   "jars": [{ "jar": "bazel-bin/projects/libs/apple/libapple-api.jar",
//!              "interface_jar": "bazel-bin/projects/libs/apple/libapple-api-hjar.jar",
//!              "source_jar": "bazel-bin/projects/libs/apple/libapple-api-src.jar" }],
//!   "generated_jars": []
//! }
//! ```

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::BzlError;
use crate::label::{Label, TargetKind};

/// One output jar produced by a target, with its optional companions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputJarSet {
    /// The class jar. A set without one is malformed.
    #[serde(default)]
    pub jar: Option<String>,
    /// Header/interface jar used for compilation.
    #[serde(default)]
    pub interface_jar: Option<String>,
    /// Source jar attached for navigation and debugging.
    #[serde(default)]
    pub source_jar: Option<String>,
}

impl OutputJarSet {
    /// Build a jar set with only the class jar.
    pub fn new(jar: impl Into<String>) -> Self {
        Self {
            jar: Some(jar.into()),
            ..Self::default()
        }
    }

    /// Attach a source jar.
    #[must_use]
    pub fn with_source_jar(mut self, source_jar: impl Into<String>) -> Self {
        self.source_jar = Some(source_jar.into());
        self
    }

    /// The class jar, if present and non-empty.
    pub fn class_jar(&self) -> Option<&str> {
        self.jar.as_deref().filter(|jar| !jar.trim().is_empty())
    }
}

/// Aspect data for a single target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
    /// The target this record describes.
    pub label: Label,
    /// The rule kind.
    #[serde(default)]
    pub kind: TargetKind,
    /// Declared dependencies, in declaration order.
    #[serde(default, alias = "dependencies")]
    pub deps: Vec<Label>,
    /// Workspace-relative source files.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Output jars.
    #[serde(default)]
    pub jars: Vec<OutputJarSet>,
    /// Jars produced by annotation processors and other generators.
    #[serde(default)]
    pub generated_jars: Vec<OutputJarSet>,
}

impl DependencyRecord {
    /// Create an empty record of the given kind.
    pub fn new(label: impl Into<Label>, kind: TargetKind) -> Self {
        Self {
            label: label.into(),
            kind,
            deps: Vec::new(),
            sources: Vec::new(),
            jars: Vec::new(),
            generated_jars: Vec::new(),
        }
    }
}

/// Dependency records grouped by the activated target they were fetched for.
///
/// Each target maps to every record reachable from it, its own record
/// included.
#[derive(Debug, Clone, Default)]
pub struct AspectRecords {
    by_target: BTreeMap<Label, Vec<DependencyRecord>>,
}

impl AspectRecords {
    /// Create an empty record set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Group a flat list of records by computing, for each record, the records
    /// reachable through its declared dependencies.
    ///
    /// Dependencies with no record of their own are skipped.
    pub fn from_flat(records: Vec<DependencyRecord>) -> Self {
        let index: HashMap<Label, DependencyRecord> =
            records.into_iter().map(|record| (record.label.clone(), record)).collect();

        let mut by_target = BTreeMap::new();
        for (target, record) in &index {
            let mut seen: HashSet<&Label> = HashSet::from([target]);
            let mut queue: VecDeque<&DependencyRecord> = VecDeque::from([record]);
            let mut reachable = Vec::new();

            while let Some(current) = queue.pop_front() {
                reachable.push(current.clone());
                for dep in &current.deps {
                    if seen.insert(dep)
                        && let Some(dep_record) = index.get(dep)
                    {
                        queue.push_back(dep_record);
                    }
                }
            }

            by_target.insert(target.clone(), reachable);
        }

        Self {
            by_target,
        }
    }

    /// The subset of these records belonging to `targets`.
    ///
    /// Targets without records are left out, which the resolver reports as
    /// missing aspect data.
    pub fn select(&self, targets: &[Label]) -> Self {
        let by_target = targets
            .iter()
            .filter_map(|target| {
                self.by_target.get(target).map(|records| (target.clone(), records.clone()))
            })
            .collect();
        Self {
            by_target,
        }
    }

    /// Record the dependency records fetched for a target.
    pub fn insert(&mut self, target: Label, records: Vec<DependencyRecord>) {
        self.by_target.insert(target, records);
    }

    /// Records reachable from a target, if the target was fetched.
    pub fn records_for(&self, target: &Label) -> Option<&[DependencyRecord]> {
        self.by_target.get(target).map(Vec::as_slice)
    }

    /// The target's own record.
    pub fn own_record(&self, target: &Label) -> Option<&DependencyRecord> {
        self.records_for(target)?.iter().find(|record| &record.label == target)
    }

    /// The rule kind of a fetched target.
    pub fn kind_of(&self, target: &Label) -> Option<&TargetKind> {
        self.own_record(target).map(|record| &record.kind)
    }

    /// Targets that have records.
    pub fn targets(&self) -> impl Iterator<Item = &Label> {
        self.by_target.keys()
    }

    /// Every distinct record across all targets, in label order.
    pub fn unique_records(&self) -> Vec<&DependencyRecord> {
        let mut unique: BTreeMap<&Label, &DependencyRecord> = BTreeMap::new();
        for record in self.by_target.values().flatten() {
            unique.entry(&record.label).or_insert(record);
        }
        unique.into_values().collect()
    }

    /// Number of targets with records.
    pub fn len(&self) -> usize {
        self.by_target.len()
    }

    /// Whether no target has records.
    pub fn is_empty(&self) -> bool {
        self.by_target.is_empty()
    }
}

/// Decode a JSON array of aspect records.
pub fn parse_records(json: &str) -> Result<Vec<DependencyRecord>, BzlError> {
    serde_json::from_str(json).map_err(|e| BzlError::RecordsParseError {
        file: "<memory>".to_string(),
        reason: e.to_string(),
    })
}

/// Read and decode a JSON file of aspect records.
pub async fn load_records(path: &Path) -> Result<Vec<DependencyRecord>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read aspect records from {}", path.display()))?;

    let records: Vec<DependencyRecord> =
        serde_json::from_str(&content).map_err(|e| BzlError::RecordsParseError {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;

    tracing::debug!("Loaded {} aspect records from {}", records.len(), path.display());
    Ok(records)
}
