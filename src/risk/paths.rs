//! Inspection of stored risk transmission paths.

use std::collections::HashMap;

use petgraph::algo::astar;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use tracing::warn;

use crate::model::{Risk, RiskType};
use crate::store::DataStore;

/// Label reported when a hop has no recorded relation.
const FALLBACK_RELATION: &str = "connected_to";

/// One hop between two risks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskPathStep {
    pub source_id: String,
    pub source_title: String,
    pub source_type: RiskType,
    pub target_id: String,
    pub target_title: String,
    pub target_type: RiskType,
    /// Entity names along the stored transmission path, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<String>>,
    pub strength: f64,
    pub relationship: String,
}

fn step(store: &DataStore, source: &Risk, target: &Risk, with_path: bool) -> RiskPathStep {
    let path = if with_path {
        source.transmission_paths.get(&target.id).map(|ids| {
            ids.iter()
                .filter_map(|id| store.entity(id))
                .map(|e| e.name)
                .collect()
        })
    } else {
        None
    };
    RiskPathStep {
        source_id: source.id.clone(),
        source_title: source.title.clone(),
        source_type: source.risk_type,
        target_id: target.id.clone(),
        target_title: target.title.clone(),
        target_type: target.risk_type,
        path,
        strength: source.transmissions.get(&target.id).copied().unwrap_or(0.5),
        relationship: source
            .risk_relationships
            .get(&target.id)
            .map_or(FALLBACK_RELATION, |r| r.as_str())
            .to_string(),
    }
}

/// Every stored transmission path, from each risk's side.
pub fn transmission_paths(store: &DataStore) -> Vec<RiskPathStep> {
    let mut out = Vec::new();
    for risk in store.all_risks() {
        for target_id in risk.transmission_paths.keys() {
            if let Some(target) = store.risk(target_id) {
                out.push(step(store, &risk, &target, true));
            }
        }
    }
    out
}

/// Path from one risk to another.
///
/// Returns the stored transmission path when the two are directly linked.
/// Otherwise searches the directed risk-relation graph, where a hop costs
/// `1 - strength` (1.0 without a recorded strength), and returns one step
/// per hop. Empty when either risk is unknown or no path exists.
pub fn risk_path(store: &DataStore, source_id: &str, target_id: &str) -> Vec<RiskPathStep> {
    let (Some(source), Some(target)) = (store.risk(source_id), store.risk(target_id)) else {
        warn!(source = source_id, target = target_id, "risk path endpoint not found");
        return Vec::new();
    };
    if source.transmission_paths.contains_key(target_id) {
        return vec![step(store, &source, &target, true)];
    }

    let risks = store.all_risks();
    let by_id: HashMap<&str, &Risk> = risks.iter().map(|r| (r.id.as_str(), r)).collect();
    let mut graph: DiGraph<&str, f64> = DiGraph::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();
    for risk in &risks {
        let from = node_for(&mut graph, &mut index, risk.id.as_str());
        for related in &risk.related_risks {
            let to = node_for(&mut graph, &mut index, related.as_str());
            let cost = risk
                .transmissions
                .get(related)
                .map_or(1.0, |s| (1.0 - s).max(0.0));
            graph.add_edge(from, to, cost);
        }
    }

    let (Some(&from), Some(&to)) = (index.get(source_id), index.get(target_id)) else {
        return Vec::new();
    };
    let Some((_, hops)) = astar(&graph, from, |n| n == to, |e| *e.weight(), |_| 0.0) else {
        return Vec::new();
    };

    hops.windows(2)
        .filter_map(|pair| {
            let current = by_id.get(graph[pair[0]])?;
            let next = by_id.get(graph[pair[1]])?;
            Some(step(store, current, next, false))
        })
        .collect()
}

fn node_for<'r>(
    graph: &mut DiGraph<&'r str, f64>,
    index: &mut HashMap<&'r str, NodeIndex>,
    id: &'r str,
) -> NodeIndex {
    *index.entry(id).or_insert_with(|| graph.add_node(id))
}
