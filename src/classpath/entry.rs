//! Classpath entries and the resolved classpath.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An IDE project in the open workspace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Project {
    name: String,
}

impl Project {
    /// Create a project handle.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
        }
    }

    /// The project name; unique within a workspace.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One contribution to a classpath.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClasspathEntry {
    /// A jar on disk.
    Jar {
        /// Path of the class jar
        path: String,
        /// Companion source jar
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_jar: Option<String>,
        /// Whether the jar is only needed by tests
        is_test: bool,
    },
    /// Another project in the workspace, referenced by source.
    Project {
        /// The referenced project
        project: Project,
        /// Whether only tests need the project
        is_test: bool,
    },
}

impl ClasspathEntry {
    /// A jar entry.
    pub fn jar(path: impl Into<String>, source_jar: Option<String>, is_test: bool) -> Self {
        Self::Jar {
            path: path.into(),
            source_jar,
            is_test,
        }
    }

    /// A project reference entry.
    pub const fn project(project: Project, is_test: bool) -> Self {
        Self::Project {
            project,
            is_test,
        }
    }

    /// Deduplication key: the jar path or the project name.
    pub fn key(&self) -> &str {
        match self {
            Self::Jar {
                path, ..
            } => path,
            Self::Project {
                project, ..
            } => project.name(),
        }
    }

    /// Whether the entry only serves test code.
    pub const fn is_test(&self) -> bool {
        match self {
            Self::Jar {
                is_test, ..
            }
            | Self::Project {
                is_test, ..
            } => *is_test,
        }
    }
}

/// The classpath computed for one project.
///
/// Built by [`ClasspathBuilder`], immutable afterwards. A refreshed classpath
/// replaces the old one; it is never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedClasspath {
    main_entries: BTreeMap<String, ClasspathEntry>,
    test_entries: BTreeMap<String, ClasspathEntry>,
    project_references: Vec<Project>,
    implicit_deps: Vec<ClasspathEntry>,
    is_complete: bool,
    #[serde(skip)]
    flush_requested: bool,
}

impl ResolvedClasspath {
    /// An empty classpath flagged incomplete.
    ///
    /// Returned when resolution could not run at all.
    pub fn incomplete() -> Self {
        Self {
            main_entries: BTreeMap::new(),
            test_entries: BTreeMap::new(),
            project_references: Vec::new(),
            implicit_deps: Vec::new(),
            is_complete: false,
            flush_requested: false,
        }
    }

    /// Entries needed by production code, keyed by jar path or project name.
    pub fn main_entries(&self) -> &BTreeMap<String, ClasspathEntry> {
        &self.main_entries
    }

    /// Entries only needed by tests.
    pub fn test_entries(&self) -> &BTreeMap<String, ClasspathEntry> {
        &self.test_entries
    }

    /// Projects this project references, in discovery order, without duplicates.
    pub fn project_references(&self) -> &[Project] {
        &self.project_references
    }

    /// Entries injected by build conventions (test runner jars).
    pub fn implicit_deps(&self) -> &[ClasspathEntry] {
        &self.implicit_deps
    }

    /// `false` when aspect data was missing for some target or a strategy could
    /// not fully resolve it. Consumers show a "classpath may be incomplete" hint.
    pub const fn is_complete(&self) -> bool {
        self.is_complete
    }

    /// Whether resolution flushed the aspect cache for this project. Such a
    /// classpath was built from data known to be stale and must not be cached.
    pub const fn flush_requested(&self) -> bool {
        self.flush_requested
    }

    /// The flat classpath: main entries, then test entries, then implicit ones.
    pub fn entries(&self) -> Vec<&ClasspathEntry> {
        self.main_entries
            .values()
            .chain(self.test_entries.values())
            .chain(self.implicit_deps.iter())
            .collect()
    }

    /// Total number of entries in [`entries`](Self::entries).
    pub fn len(&self) -> usize {
        self.main_entries.len() + self.test_entries.len() + self.implicit_deps.len()
    }

    /// Whether the classpath has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Accumulates entries while a classpath is being resolved.
#[derive(Debug)]
pub struct ClasspathBuilder {
    main_entries: BTreeMap<String, ClasspathEntry>,
    test_entries: BTreeMap<String, ClasspathEntry>,
    project_references: Vec<Project>,
    implicit_deps: Vec<ClasspathEntry>,
    is_complete: bool,
    flush_requested: bool,
}

impl Default for ClasspathBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClasspathBuilder {
    /// Start an empty, complete classpath.
    pub fn new() -> Self {
        Self {
            main_entries: BTreeMap::new(),
            test_entries: BTreeMap::new(),
            project_references: Vec::new(),
            implicit_deps: Vec::new(),
            is_complete: true,
            flush_requested: false,
        }
    }

    /// Add an entry, letting main entries win over test entries.
    ///
    /// A main entry evicts a test entry with the same key. A test entry is
    /// dropped when a main entry with its key already exists.
    pub fn add_entry(&mut self, entry: ClasspathEntry) {
        let key = entry.key().to_string();
        if entry.is_test() {
            if !self.main_entries.contains_key(&key) {
                self.test_entries.insert(key, entry);
            }
        } else {
            self.test_entries.remove(&key);
            self.main_entries.insert(key, entry);
        }
    }

    /// Record a project reference once.
    pub fn add_project_reference(&mut self, project: Project) {
        if !self.project_references.iter().any(|existing| existing.name() == project.name()) {
            self.project_references.push(project);
        }
    }

    /// Append implicit entries. Duplicates among implicit entries collapse;
    /// explicit entries are not consulted.
    pub fn add_implicit(&mut self, entries: impl IntoIterator<Item = ClasspathEntry>) {
        for entry in entries {
            if !self.implicit_deps.iter().any(|existing| existing.key() == entry.key()) {
                self.implicit_deps.push(entry);
            }
        }
    }

    /// Flag the classpath as possibly missing entries.
    pub fn mark_incomplete(&mut self) {
        self.is_complete = false;
    }

    /// Note that the aspect cache was flushed; implies incomplete.
    pub fn request_flush(&mut self) {
        self.is_complete = false;
        self.flush_requested = true;
    }

    /// Whether nothing has flagged the classpath incomplete yet.
    pub const fn is_complete(&self) -> bool {
        self.is_complete
    }

    /// Whether a project already has a reference entry.
    pub fn references_project(&self, name: &str) -> bool {
        self.project_references.iter().any(|project| project.name() == name)
    }

    /// Freeze into a [`ResolvedClasspath`].
    pub fn build(self) -> ResolvedClasspath {
        ResolvedClasspath {
            main_entries: self.main_entries,
            test_entries: self.test_entries,
            project_references: self.project_references,
            implicit_deps: self.implicit_deps,
            is_complete: self.is_complete,
            flush_requested: self.flush_requested,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jar(path: &str, is_test: bool) -> ClasspathEntry {
        ClasspathEntry::jar(path, None, is_test)
    }

    #[test]
    fn test_main_wins_over_test() {
        let mut builder = ClasspathBuilder::new();
        builder.add_entry(jar("guava.jar", true));
        builder.add_entry(jar("guava.jar", false));
        builder.add_entry(jar("guava.jar", true));

        let resolved = builder.build();
        assert_eq!(resolved.main_entries().len(), 1);
        assert!(resolved.test_entries().is_empty());
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn test_entries_order_main_test_implicit() {
        let mut builder = ClasspathBuilder::new();
        builder.add_implicit([jar("runner.jar", true)]);
        builder.add_entry(jar("junit.jar", true));
        builder.add_entry(jar("b.jar", false));
        builder.add_entry(jar("a.jar", false));
        // implicit entries are not deduplicated against explicit ones
        builder.add_implicit([jar("junit.jar", true), jar("runner.jar", true)]);

        let resolved = builder.build();
        let keys: Vec<&str> = resolved.entries().into_iter().map(ClasspathEntry::key).collect();
        assert_eq!(keys, vec!["a.jar", "b.jar", "junit.jar", "runner.jar", "junit.jar"]);
        assert!(resolved.is_complete());
    }

    #[test]
    fn test_project_references_are_unique() {
        let mut builder = ClasspathBuilder::new();
        builder.add_project_reference(Project::new("libs"));
        builder.add_project_reference(Project::new("core"));
        builder.add_project_reference(Project::new("libs"));

        assert!(builder.references_project("core"));
        let resolved = builder.build();
        let names: Vec<&str> = resolved.project_references().iter().map(Project::name).collect();
        assert_eq!(names, vec!["libs", "core"]);
    }

    #[test]
    fn test_project_entry_key() {
        let entry = ClasspathEntry::project(Project::new("apple"), false);
        assert_eq!(entry.key(), "apple");
        assert!(!entry.is_test());
    }

    #[test]
    fn test_request_flush_marks_incomplete() {
        let mut builder = ClasspathBuilder::new();
        builder.add_entry(jar("a.jar", false));
        builder.request_flush();

        let resolved = builder.build();
        assert!(resolved.flush_requested());
        assert!(!resolved.is_complete());
        assert!(!ResolvedClasspath::incomplete().flush_requested());

        let json = serde_json::to_value(&resolved).unwrap();
        assert!(json.get("flush_requested").is_none());
    }

    #[test]
    fn test_incomplete_is_empty() {
        let resolved = ResolvedClasspath::incomplete();
        assert!(!resolved.is_complete());
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_serializes_entries() {
        let entry = ClasspathEntry::jar("a.jar", Some("a-src.jar".to_string()), false);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "jar");
        assert_eq!(json["source_jar"], "a-src.jar");
    }
}
