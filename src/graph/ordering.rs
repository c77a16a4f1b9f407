//! Ordering a selection of labels so dependencies come first.
//!
//! Callers typically select a handful of packages out of a graph with tens of
//! thousands of labels (the packages a user imports into the IDE) and need
//! them in build order. Only the selected labels are ordered; the rest of the
//! graph is consulted through [`LabelGraph::is_dependency`] with one memo
//! shared across the whole operation.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use super::{DependencyMemo, LabelGraph};
use crate::label::HasLabel;

/// Algorithm used by [`LabelGraph::order_labels_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderingStrategy {
    /// Kahn's algorithm over the subgraph induced by the selection, breaking
    /// ties by input position. Falls back to [`OrderingStrategy::Insertion`]
    /// if the selection contains a cycle.
    #[default]
    Topological,
    /// Repeated insertion passes: each label is placed right before the first
    /// already-placed label that depends on it. Runs at most one pass per
    /// selected label and stops early once a pass changes nothing.
    Insertion,
}

impl std::str::FromStr for OrderingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "topological" | "kahn" => Ok(Self::Topological),
            "insertion" | "legacy" => Ok(Self::Insertion),
            other => Err(format!("unknown ordering strategy '{other}'")),
        }
    }
}

impl LabelGraph {
    /// Order `selected` so no node comes before a node it depends on.
    ///
    /// Nodes with no ordering constraint between them keep their input order.
    pub fn order_labels<N: HasLabel + Clone>(
        &self,
        selected: &[N],
        follow_external_transitives: bool,
    ) -> Vec<N> {
        self.order_labels_with(selected, follow_external_transitives, OrderingStrategy::default())
    }

    /// Order `selected` with an explicit algorithm.
    pub fn order_labels_with<N: HasLabel + Clone>(
        &self,
        selected: &[N],
        follow_external_transitives: bool,
        strategy: OrderingStrategy,
    ) -> Vec<N> {
        let mut memo = DependencyMemo::new();
        let ordered = match strategy {
            OrderingStrategy::Topological => {
                match self.kahn_order(selected, follow_external_transitives, &mut memo) {
                    Some(order) => order,
                    None => {
                        tracing::warn!(
                            "Selected labels contain a dependency cycle, falling back to insertion ordering"
                        );
                        self.insertion_order(selected, follow_external_transitives, &mut memo)
                    }
                }
            }
            OrderingStrategy::Insertion => {
                self.insertion_order(selected, follow_external_transitives, &mut memo)
            }
        };

        tracing::trace!(
            "Ordered {} labels using {} memoized reachability answers",
            ordered.len(),
            memo.len()
        );
        ordered
    }

    /// Returns `None` when the induced subgraph is cyclic.
    fn kahn_order<N: HasLabel + Clone>(
        &self,
        selected: &[N],
        follow_external_transitives: bool,
        memo: &mut DependencyMemo,
    ) -> Option<Vec<N>> {
        let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(selected.len(), 0);
        let nodes: Vec<NodeIndex> = (0..selected.len()).map(|i| graph.add_node(i)).collect();

        // edge j -> i when i depends on j, so j is emitted first
        for (i, node) in selected.iter().enumerate() {
            for (j, other) in selected.iter().enumerate() {
                if i != j
                    && self.is_dependency(
                        node.label(),
                        other.label(),
                        Some(&mut *memo),
                        follow_external_transitives,
                    )
                {
                    graph.update_edge(nodes[j], nodes[i], ());
                }
            }
        }

        let mut in_degree: Vec<usize> = nodes
            .iter()
            .map(|&idx| graph.neighbors_directed(idx, Direction::Incoming).count())
            .collect();

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|&(_, &degree)| degree == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut ordered = Vec::with_capacity(selected.len());
        while let Some(Reverse(i)) = ready.pop() {
            ordered.push(selected[i].clone());
            for next in graph.neighbors_directed(nodes[i], Direction::Outgoing) {
                let j = graph[next];
                in_degree[j] -= 1;
                if in_degree[j] == 0 {
                    ready.push(Reverse(j));
                }
            }
        }

        (ordered.len() == selected.len()).then_some(ordered)
    }

    fn insertion_order<N: HasLabel + Clone>(
        &self,
        selected: &[N],
        follow_external_transitives: bool,
        memo: &mut DependencyMemo,
    ) -> Vec<N> {
        let mut current: Vec<N> = selected.to_vec();

        for pass in 0..selected.len() {
            let mut ordered: Vec<N> = Vec::with_capacity(current.len());
            for node in &current {
                let position = ordered.iter().position(|placed| {
                    self.is_dependency(
                        placed.label(),
                        node.label(),
                        Some(&mut *memo),
                        follow_external_transitives,
                    )
                });
                match position {
                    Some(index) => ordered.insert(index, node.clone()),
                    None => ordered.push(node.clone()),
                }
            }

            let settled = ordered.iter().map(HasLabel::label).eq(current.iter().map(HasLabel::label));
            current = ordered;
            if settled {
                tracing::trace!("Insertion ordering settled after {} pass(es)", pass + 1);
                break;
            }
        }

        current
    }
}
