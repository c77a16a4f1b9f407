//! Type lookups for the source-derived classpath strategy.

use std::collections::HashMap;

/// Maps source files to the types they import, and types to the jars that
/// define them.
///
/// A real index is produced by crawling built jars and source trees; this
/// crate only consumes it.
pub trait TypeIndex: Send + Sync {
    /// Fully qualified type names referenced by a source file.
    fn imports_of(&self, source_path: &str) -> Vec<String>;

    /// Jars that contain a type. Empty when the type is unknown.
    fn jars_for_type(&self, type_name: &str) -> Vec<String>;
}

/// A [`TypeIndex`] held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTypeIndex {
    imports: HashMap<String, Vec<String>>,
    locations: HashMap<String, Vec<String>>,
}

impl InMemoryTypeIndex {
    /// An empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the imports of a source file.
    #[must_use]
    pub fn with_source<I, S>(mut self, source_path: impl Into<String>, imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.imports.entry(source_path.into()).or_default().extend(imports.into_iter().map(Into::into));
        self
    }

    /// Record that `jar` defines `type_name`.
    #[must_use]
    pub fn with_type(mut self, type_name: impl Into<String>, jar: impl Into<String>) -> Self {
        let jars = self.locations.entry(type_name.into()).or_default();
        let jar = jar.into();
        if !jars.contains(&jar) {
            jars.push(jar);
        }
        self
    }
}

impl TypeIndex for InMemoryTypeIndex {
    fn imports_of(&self, source_path: &str) -> Vec<String> {
        self.imports.get(source_path).cloned().unwrap_or_default()
    }

    fn jars_for_type(&self, type_name: &str) -> Vec<String> {
        self.locations.get(type_name).cloned().unwrap_or_default()
    }
}
