//! Label dependency graph.
//!
//! [`LabelGraph`] is a directed graph over Bazel [`Label`]s where an edge
//! `a -> b` means "`a` depends on `b`". It is built incrementally (usually by
//! [`GraphBuilder`]) and answers three kinds of questions:
//!
//! - which labels are roots (nothing depends on them) and leaves (they depend
//!   on nothing), read straight from sets maintained on every edge insertion;
//! - whether one label transitively depends on another ([`LabelGraph::is_dependency`]);
//! - how to order an arbitrary subset so dependencies come first
//!   ([`LabelGraph::order_labels`], see [`ordering`]).
//!
//! Graphs of monorepos routinely reach 100k+ edges, and at package
//! granularity two packages can end up depending on each other even though
//! Bazel accepts the underlying targets. Reachability therefore tracks the
//! labels on the current walk and treats a revisit as "not a dependency on
//! this path" after logging it, instead of failing or recursing forever.

pub mod builder;
pub mod ordering;
pub mod project_order;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::label::Label;

pub use builder::{ExternalDeps, GraphBuilder};
pub use ordering::OrderingStrategy;
pub use project_order::ProjectOrderResolver;

/// Memoized reachability answers keyed by `(label, candidate)`.
///
/// One memo belongs to one logical query session (for example one call to
/// [`LabelGraph::order_labels`]) and is dropped afterwards. It is not meant to
/// be shared between threads; each concurrent reader brings its own.
#[derive(Debug, Default)]
pub struct DependencyMemo {
    answers: HashMap<(Label, Label), bool>,
}

impl DependencyMemo {
    /// Create an empty memo.
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, label: &Label, candidate: &Label) -> Option<bool> {
        // Tuple keys need owned labels; clones only bump a refcount.
        self.answers.get(&(label.clone(), candidate.clone())).copied()
    }

    fn record(&mut self, label: &Label, candidate: &Label, answer: bool) {
        self.answers.insert((label.clone(), candidate.clone()), answer);
    }

    /// Number of memoized answers.
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    /// Whether nothing has been memoized yet.
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

/// Outcome of stepping onto a label during a reachability walk.
enum Visit {
    /// The answer for this label is already known.
    Known(bool),
    /// The label was pushed onto the walk and its dependencies must be explored.
    Descend,
}

/// A label on the current walk and the dependencies still to explore.
struct Frame<'a> {
    label: &'a Label,
    pending: std::collections::btree_set::Iter<'a, Label>,
}

/// Directed dependency graph over labels.
#[derive(Debug, Clone, Default)]
pub struct LabelGraph {
    /// label -> labels it depends on
    depends_on: BTreeMap<Label, BTreeSet<Label>>,
    /// label -> labels that depend on it
    used_by: BTreeMap<Label, BTreeSet<Label>>,
    roots: BTreeSet<Label>,
    leaves: BTreeSet<Label>,
    leaves_ignoring_externals: BTreeSet<Label>,
    edge_count: usize,
}

impl LabelGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `source` depends on `dep`.
    ///
    /// Root and leaf sets are updated in place. Adding the same edge again
    /// changes nothing.
    pub fn add_dependency(&mut self, source: Label, dep: Label) {
        let added = self.depends_on.entry(source.clone()).or_default().insert(dep.clone());
        self.used_by.entry(dep.clone()).or_default().insert(source.clone());
        if added {
            self.edge_count += 1;
        }

        // dep is depended upon, so it can no longer be a root; source is
        // a root only while nothing depends on it
        self.roots.remove(&dep);
        if !self.used_by.contains_key(&source) {
            self.roots.insert(source.clone());
        }

        // source has an outgoing edge now; an edge to an external label does
        // not count when externals are ignored
        self.leaves.remove(&source);
        if !dep.is_external() {
            self.leaves_ignoring_externals.remove(&source);
        } else if !source.is_external() && !self.has_local_dependency(&source) {
            self.leaves_ignoring_externals.insert(source.clone());
        }

        if !self.depends_on.contains_key(&dep) {
            self.leaves.insert(dep.clone());
            if !dep.is_external() {
                self.leaves_ignoring_externals.insert(dep);
            }
        }
    }

    fn has_local_dependency(&self, label: &Label) -> bool {
        self.depends_on
            .get(label)
            .is_some_and(|deps| deps.iter().any(|dep| !dep.is_external()))
    }

    /// Labels nothing else depends on.
    pub fn root_labels(&self) -> &BTreeSet<Label> {
        &self.roots
    }

    /// Labels with no outgoing dependencies.
    ///
    /// With `ignore_externals`, external labels are never leaves and an edge to
    /// an external label does not stop its source from being one.
    pub fn leaf_labels(&self, ignore_externals: bool) -> &BTreeSet<Label> {
        if ignore_externals {
            &self.leaves_ignoring_externals
        } else {
            &self.leaves
        }
    }

    /// Direct dependencies of a label.
    pub fn dependencies_of(&self, label: &Label) -> Option<&BTreeSet<Label>> {
        self.depends_on.get(label)
    }

    /// Labels that directly depend on a label.
    pub fn dependents_of(&self, label: &Label) -> Option<&BTreeSet<Label>> {
        self.used_by.get(label)
    }

    /// The full forward adjacency map.
    pub fn depends_on_map(&self) -> &BTreeMap<Label, BTreeSet<Label>> {
        &self.depends_on
    }

    /// The full reverse adjacency map.
    pub fn used_by_map(&self) -> &BTreeMap<Label, BTreeSet<Label>> {
        &self.used_by
    }

    /// Whether the label appears on either side of any edge.
    pub fn contains(&self, label: &Label) -> bool {
        self.depends_on.contains_key(label) || self.used_by.contains_key(label)
    }

    /// Number of distinct labels in the graph.
    pub fn label_count(&self) -> usize {
        let mut labels: HashSet<&Label> = self.depends_on.keys().collect();
        labels.extend(self.used_by.keys());
        labels.len()
    }

    /// Number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Whether `candidate` is a direct or transitive dependency of `label`.
    ///
    /// Pass a memo to reuse answers across many queries over the same region
    /// of the graph; without one, a fresh memo is used for this call only.
    ///
    /// When `follow_external_transitives` is false the walk never descends
    /// into external labels, so an external `label` is never considered to
    /// depend on anything. A direct edge to an external `candidate` is still
    /// found.
    ///
    /// A label reached again while it is still on the current walk ends that
    /// branch with `false` and logs a warning naming the cycle.
    pub fn is_dependency(
        &self,
        label: &Label,
        candidate: &Label,
        memo: Option<&mut DependencyMemo>,
        follow_external_transitives: bool,
    ) -> bool {
        let mut local_memo = DependencyMemo::new();
        let memo = memo.unwrap_or(&mut local_memo);

        let mut path: Vec<Frame<'_>> = Vec::new();
        let mut on_path: HashSet<&Label> = HashSet::new();

        // The caller's label may not outlive this call, so start from the
        // graph's own copy of it.
        let Some((start, _)) = self.depends_on.get_key_value(label) else {
            return false;
        };
        match self.visit(start, candidate, memo, follow_external_transitives, &mut path, &mut on_path) {
            Visit::Known(answer) => return answer,
            Visit::Descend => {}
        }

        let mut found = false;
        while let Some(frame) = path.last_mut() {
            let Some(dep) = frame.pending.next() else {
                if let Some(done) = path.pop() {
                    on_path.remove(done.label);
                    memo.record(done.label, candidate, false);
                }
                continue;
            };

            if dep == candidate {
                found = true;
                break;
            }

            match self.visit(dep, candidate, memo, follow_external_transitives, &mut path, &mut on_path)
            {
                Visit::Known(true) => {
                    found = true;
                    break;
                }
                Visit::Known(false) | Visit::Descend => {}
            }
        }

        if found {
            // everything still on the walk reaches the candidate through it
            for frame in &path {
                memo.record(frame.label, candidate, true);
            }
        }

        found
    }

    fn visit<'a>(
        &'a self,
        label: &'a Label,
        candidate: &Label,
        memo: &mut DependencyMemo,
        follow_external_transitives: bool,
        path: &mut Vec<Frame<'a>>,
        on_path: &mut HashSet<&'a Label>,
    ) -> Visit {
        if !follow_external_transitives && label.is_external() {
            return Visit::Known(false);
        }

        if let Some(answer) = memo.get(label, candidate) {
            return Visit::Known(answer);
        }

        if on_path.contains(label) {
            let cycle = path
                .iter()
                .map(|frame| frame.label.as_str())
                .chain(std::iter::once(label.as_str()))
                .collect::<Vec<_>>()
                .join(" -> ");
            tracing::warn!(
                "Cyclic dependency path detected at '{}': {}. Treating it as not a dependency on this path",
                label,
                cycle
            );
            return Visit::Known(false);
        }

        let Some(deps) = self.depends_on.get(label) else {
            memo.record(label, candidate, false);
            return Visit::Known(false);
        };

        on_path.insert(label);
        path.push(Frame {
            label,
            pending: deps.iter(),
        });
        Visit::Descend
    }

    /// Strongly connected groups of labels that depend on each other.
    ///
    /// Each group is sorted; groups are sorted by their first label. A label
    /// with an edge to itself forms a group of one.
    pub fn find_cycles(&self) -> Vec<Vec<Label>> {
        let mut graph: DiGraph<&Label, ()> = DiGraph::new();
        let mut node_map: HashMap<&Label, NodeIndex> = HashMap::new();

        for (source, deps) in &self.depends_on {
            let source_idx = *node_map.entry(source).or_insert_with(|| graph.add_node(source));
            for dep in deps {
                let dep_idx = *node_map.entry(dep).or_insert_with(|| graph.add_node(dep));
                graph.add_edge(source_idx, dep_idx, ());
            }
        }

        let mut cycles: Vec<Vec<Label>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component.first().is_some_and(|&idx| graph.contains_edge(idx, idx))
            })
            .map(|component| {
                let mut labels: Vec<Label> =
                    component.into_iter().map(|idx| graph[idx].clone()).collect();
                labels.sort();
                labels
            })
            .collect();
        cycles.sort();

        if !cycles.is_empty() {
            tracing::debug!("Found {} dependency cycle(s) in label graph", cycles.len());
        }
        cycles
    }
}
