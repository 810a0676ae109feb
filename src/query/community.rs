//! Community partition grouped by layer and by community.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::graph::community::{self, CommunityMethod};
use crate::graph::simple::WeightedGraph;
use crate::graph::{Layer, MultiLayerGraph};

use super::{ByLayer, NodeSummary};

/// Members of one community within a single layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerCommunity {
    pub id: usize,
    pub size: usize,
    pub nodes: Vec<NodeSummary>,
}

/// One community across all layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Community {
    pub id: usize,
    pub size: usize,
    pub entities: Vec<NodeSummary>,
    pub events: Vec<NodeSummary>,
    pub risks: Vec<NodeSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommunityResults {
    pub method: CommunityMethod,
    #[serde(flatten)]
    pub layers: ByLayer<LayerCommunity>,
    pub combined: Vec<Community>,
}

impl CommunityResults {
    pub fn community_count(&self) -> usize {
        self.combined.len()
    }
}

/// Partition the collapsed graph. Every listing is sorted by size
/// descending, ties by community id.
pub fn detect(graph: &MultiLayerGraph, method: CommunityMethod, seed: u64) -> CommunityResults {
    let simple = WeightedGraph::from_multilayer(graph);
    let partition = community::detect(&simple, method, seed);

    let mut combined: BTreeMap<usize, Community> = BTreeMap::new();
    let mut per_layer: BTreeMap<(Layer, usize), Vec<NodeSummary>> = BTreeMap::new();
    for (i, &cid) in partition.iter().enumerate() {
        let Some(node) = graph.node(simple.id(i)) else {
            continue;
        };
        let summary = NodeSummary::of(node);
        let entry = combined.entry(cid).or_insert_with(|| Community {
            id: cid,
            ..Community::default()
        });
        entry.size += 1;
        match node.layer() {
            Layer::Entity => entry.entities.push(summary.clone()),
            Layer::Event => entry.events.push(summary.clone()),
            Layer::Risk => entry.risks.push(summary.clone()),
        }
        per_layer.entry((node.layer(), cid)).or_default().push(summary);
    }

    let mut layers: ByLayer<LayerCommunity> = ByLayer::default();
    for ((layer, id), nodes) in per_layer {
        layers.get_mut(layer).push(LayerCommunity {
            id,
            size: nodes.len(),
            nodes,
        });
    }
    for bucket in [&mut layers.entity, &mut layers.event, &mut layers.risk] {
        bucket.sort_by(|a, b| b.size.cmp(&a.size));
    }
    let mut combined: Vec<Community> = combined.into_values().collect();
    combined.sort_by(|a, b| b.size.cmp(&a.size));

    CommunityResults {
        method,
        layers,
        combined,
    }
}
