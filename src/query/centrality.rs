//! Centrality scores grouped by layer.

use serde::Serialize;

use crate::graph::analytics::{self, Measure};
use crate::graph::simple::WeightedGraph;
use crate::graph::{GraphResult, MultiLayerGraph};

use super::{ByLayer, NodeSummary};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredNode {
    #[serde(flatten)]
    pub node: NodeSummary,
    pub centrality: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CentralityResults {
    pub measure: Measure,
    #[serde(flatten)]
    pub layers: ByLayer<ScoredNode>,
}

/// Score every node with `measure`, each layer sorted by score descending.
pub fn analyze(
    graph: &MultiLayerGraph,
    measure: Measure,
    max_iterations: usize,
) -> GraphResult<CentralityResults> {
    let simple = WeightedGraph::from_multilayer(graph);
    let scores = analytics::centrality(&simple, measure, max_iterations)?;

    let mut layers = ByLayer::default();
    for (i, score) in scores.into_iter().enumerate() {
        let Some(node) = graph.node(simple.id(i)) else {
            continue;
        };
        layers.get_mut(node.layer()).push(ScoredNode {
            node: NodeSummary::of(node),
            centrality: score,
        });
    }
    for bucket in [&mut layers.entity, &mut layers.event, &mut layers.risk] {
        bucket.sort_by(|a, b| b.centrality.total_cmp(&a.centrality));
    }
    Ok(CentralityResults { measure, layers })
}
