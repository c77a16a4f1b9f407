//! Bazel labels and rule kinds.
//!
//! A [`Label`] identifies a package (`//a/b/c`) or a target (`//a/b/c:name`),
//! optionally in an external repository (`@maven//:com_google_guava`). Labels
//! are normalized once, when records are ingested; the graph and classpath
//! algorithms only ever compare them by string equality.
//!
//! [`Label::new`] accepts any string and is what the graph uses for synthetic
//! or already-validated labels. [`Label::parse`] validates user input.

pub mod kind;

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{
    EXTERNAL_REPO_PREFIX, PACKAGE_PREFIX, RECURSIVE_SUFFIX, TARGET_SEPARATOR, WILDCARD_TARGET_NAMES,
};
use crate::core::BzlError;

pub use kind::TargetKind;

static LABEL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:@[A-Za-z0-9_.~+\-]*//)?(?://)?[^:\\]*(?::[^:\\]+)?$")
        .expect("label pattern is a valid regex")
});

/// A Bazel label.
///
/// Cloning is cheap: the text is shared.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Label(Arc<str>);

impl Label {
    /// Wrap a label string without validating it.
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(Arc::from(label.as_ref()))
    }

    /// Parse and validate a label string.
    ///
    /// `//` alone (the root package) is accepted. Empty labels, labels that end
    /// with `:` or `/`, and labels containing backslashes are rejected.
    pub fn parse(label: &str) -> Result<Self, BzlError> {
        let trimmed = label.trim();
        let invalid = |reason: &str| BzlError::InvalidLabel {
            label: label.to_string(),
            reason: reason.to_string(),
        };

        if trimmed.is_empty() {
            return Err(invalid("label is empty"));
        }
        if trimmed == PACKAGE_PREFIX {
            return Ok(Self::new(trimmed));
        }
        if trimmed.ends_with(TARGET_SEPARATOR) {
            return Err(invalid("label cannot end with ':'"));
        }
        if trimmed.ends_with('/') {
            return Err(invalid("label cannot end with '/'"));
        }
        if trimmed.contains('\\') {
            return Err(invalid("label cannot contain '\\'"));
        }
        if !LABEL_PATTERN.is_match(trimmed) {
            return Err(invalid("label is not of the form [@repo]//package[:target]"));
        }

        Ok(Self::new(trimmed))
    }

    /// The label text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the label lives in an external repository (`@repo//...`).
    pub fn is_external(&self) -> bool {
        self.0.starts_with(EXTERNAL_REPO_PREFIX)
    }

    /// Repository name of an external label, without `@` and `//`.
    pub fn repository_name(&self) -> Option<&str> {
        if !self.is_external() {
            return None;
        }
        let end = self.0.find(PACKAGE_PREFIX)?;
        Some(&self.0[EXTERNAL_REPO_PREFIX.len()..end])
    }

    /// The label without its repository prefix, e.g. `//a/b:c` for `@r//a/b:c`.
    fn local_part(&self) -> &str {
        if self.is_external()
            && let Some(start) = self.0.find(PACKAGE_PREFIX)
        {
            return &self.0[start..];
        }
        &self.0
    }

    /// Package path without the leading `//` or target, e.g. `a/b` for `//a/b:c`.
    pub fn package_path(&self) -> &str {
        let local = self.local_part();
        let local = local.strip_prefix(PACKAGE_PREFIX).unwrap_or(local);
        let local = match local.rfind(TARGET_SEPARATOR) {
            Some(i) => &local[..i],
            None => local,
        };
        local.strip_suffix("/...").or_else(|| local.strip_suffix("...")).unwrap_or(local)
    }

    /// The package-level label: the label with its `:target` suffix removed.
    ///
    /// External labels are already canonical and come back unchanged.
    pub fn package_label(&self) -> Self {
        if self.is_external() {
            return self.clone();
        }
        match self.0.rfind(TARGET_SEPARATOR) {
            Some(i) => Self::new(&self.0[..i]),
            None => self.clone(),
        }
    }

    /// The target name; for a default target this is the last package segment.
    ///
    /// Returns `None` for `...` patterns.
    pub fn target_name(&self) -> Option<&str> {
        let local = self.local_part();
        if local.ends_with(RECURSIVE_SUFFIX) {
            return None;
        }
        if let Some(i) = local.rfind(TARGET_SEPARATOR) {
            return Some(&local[i + 1..]);
        }
        let path = self.package_path();
        Some(path.rsplit('/').next().unwrap_or(path))
    }

    /// Whether the label names one target rather than a pattern such as
    /// `//a/...`, `//a:all` or `//a:*`.
    ///
    /// `//a/all` is concrete: it is the default target of package `a/all`.
    pub fn is_concrete(&self) -> bool {
        let local = self.local_part();
        if local.ends_with(RECURSIVE_SUFFIX) {
            return false;
        }
        match local.rsplit_once(TARGET_SEPARATOR) {
            Some((_, name)) => !WILDCARD_TARGET_NAMES.contains(&name),
            None => true,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label({})", self.0)
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Label> for String {
    fn from(value: Label) -> Self {
        value.0.to_string()
    }
}

impl AsRef<str> for Label {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Anything that can be placed in a label ordering.
///
/// [`LabelGraph::order_labels`](crate::graph::LabelGraph::order_labels) sorts
/// arbitrary nodes (packages selected for import, projects) by the label each
/// one carries.
pub trait HasLabel {
    /// The label this node represents.
    fn label(&self) -> &Label;
}

impl HasLabel for Label {
    fn label(&self) -> &Label {
        self
    }
}
