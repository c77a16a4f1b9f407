//! Import ordering for packages selected in the IDE.

use super::{GraphBuilder, OrderingStrategy};
use crate::aspect::AspectRecords;
use crate::label::HasLabel;

/// Orders packages picked for import so upstream packages are imported first.
#[derive(Debug, Clone, Default)]
pub struct ProjectOrderResolver {
    strategy: OrderingStrategy,
}

impl ProjectOrderResolver {
    /// Create a resolver using the given ordering algorithm.
    pub const fn new(strategy: OrderingStrategy) -> Self {
        Self {
            strategy,
        }
    }

    /// Order `selected` by package dependencies found in `records`.
    ///
    /// Without aspect data there is nothing to order by, and the selection is
    /// returned as given. External subgraphs are never walked.
    pub fn compute_package_order<N: HasLabel + Clone>(
        &self,
        selected: &[N],
        records: Option<&AspectRecords>,
    ) -> Vec<N> {
        let Some(records) = records else {
            tracing::debug!(
                "No aspect data available, keeping selection order for {} package(s)",
                selected.len()
            );
            return selected.to_vec();
        };

        let graph = GraphBuilder::new().build(records.unique_records());
        let ordered = graph.order_labels_with(selected, false, self.strategy);

        tracing::debug!(
            "Package import order: {}",
            ordered.iter().map(|node| node.label().as_str()).collect::<Vec<_>>().join(", ")
        );
        ordered
    }
}
