//! Building a [`LabelGraph`] from aspect records.

use serde::{Deserialize, Serialize};

use super::LabelGraph;
use crate::aspect::DependencyRecord;
use crate::label::Label;

/// Whether edges to external-repository labels are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalDeps {
    /// Keep edges to `@repo//...` labels.
    #[default]
    Include,
    /// Drop them; the graph only covers the workspace itself.
    Exclude,
}

/// Turns dependency records into a [`LabelGraph`].
///
/// At package granularity (the default) every label is reduced to its
/// package before an edge is added. Edges between two targets of the same
/// package collapse to a self-edge and are dropped, so a package graph cannot
/// express two packages that depend on each other through different targets.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    include_target_granularity: bool,
    external_deps: ExternalDeps,
}

impl GraphBuilder {
    /// A builder producing a package-level graph that keeps external edges.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `:target` suffixes instead of collapsing to packages.
    #[must_use]
    pub const fn with_target_granularity(mut self, include_target_granularity: bool) -> Self {
        self.include_target_granularity = include_target_granularity;
        self
    }

    /// Choose how edges to external labels are handled.
    #[must_use]
    pub const fn with_external_deps(mut self, external_deps: ExternalDeps) -> Self {
        self.external_deps = external_deps;
        self
    }

    fn normalize(&self, label: &Label) -> Label {
        if self.include_target_granularity || label.is_external() {
            label.clone()
        } else {
            label.package_label()
        }
    }

    /// Build a graph from records.
    ///
    /// The resulting graph does not depend on record order.
    pub fn build<'a, I>(&self, records: I) -> LabelGraph
    where
        I: IntoIterator<Item = &'a DependencyRecord>,
    {
        let mut graph = LabelGraph::new();
        let mut collapsed = 0usize;

        for record in records {
            let source = self.normalize(&record.label);
            for dep in &record.deps {
                if self.external_deps == ExternalDeps::Exclude && dep.is_external() {
                    continue;
                }

                let dep = self.normalize(dep);
                if dep == source {
                    collapsed += 1;
                    tracing::trace!("Dropping intra-package edge {} -> {}", record.label, dep);
                    continue;
                }

                graph.add_dependency(source.clone(), dep);
            }
        }

        tracing::debug!(
            "Built label graph with {} labels and {} edges ({} intra-package edges dropped)",
            graph.label_count(),
            graph.edge_count(),
            collapsed
        );
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::TargetKind;

    fn record(label: &str, deps: &[&str]) -> DependencyRecord {
        let mut record = DependencyRecord::new(label, TargetKind::JavaLibrary);
        record.deps = deps.iter().map(|d| Label::new(d)).collect();
        record
    }

    fn build_graph(records: &[DependencyRecord], include_target_granularity: bool) -> LabelGraph {
        GraphBuilder::new().with_target_granularity(include_target_granularity).build(records)
    }

    fn sample() -> Vec<DependencyRecord> {
        vec![
            record("//app:server", &["//lib/core:api", "//app:util", "@maven//:guava"]),
            record("//app:util", &["//lib/core:impl"]),
            record("//lib/core:api", &["//lib/core:impl"]),
        ]
    }

    #[test]
    fn test_package_granularity_strips_targets_and_self_edges() {
        let records = sample();
        let graph = build_graph(&records, false);

        let app = Label::new("//app");
        let deps: Vec<&str> =
            graph.dependencies_of(&app).unwrap().iter().map(Label::as_str).collect();
        assert_eq!(deps, vec!["//lib/core", "@maven//:guava"]);

        // //lib/core:api -> //lib/core:impl collapsed away
        assert!(graph.dependencies_of(&Label::new("//lib/core")).is_none());
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.root_labels().contains(&app));
    }

    #[test]
    fn test_target_granularity_keeps_targets() {
        let records = sample();
        let graph = build_graph(&records, true);

        assert!(graph.is_dependency(
            &Label::new("//app:server"),
            &Label::new("//lib/core:impl"),
            None,
            true
        ));
        assert_eq!(graph.edge_count(), 5);
    }

    #[test]
    fn test_exclude_external_deps() {
        let records = sample();
        let graph = GraphBuilder::new().with_external_deps(ExternalDeps::Exclude).build(&records);
        assert!(!graph.contains(&Label::new("@maven//:guava")));
    }

    #[test]
    fn test_record_order_does_not_change_shape() {
        let mut records = sample();
        let forward = build_graph(&records, false);
        records.reverse();
        let backward = build_graph(&records, false);

        assert_eq!(forward.depends_on_map(), backward.depends_on_map());
        assert_eq!(forward.root_labels(), backward.root_labels());
        assert_eq!(forward.leaf_labels(true), backward.leaf_labels(true));
    }
}
