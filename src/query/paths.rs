//! Path search results with node display fields.

use serde::Serialize;

use crate::graph::traverse::{self, PathHop};
use crate::graph::{GraphResult, MultiLayerGraph};

use super::NodeSummary;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    pub nodes: Vec<NodeSummary>,
    pub edges: Vec<PathHop>,
    pub length: usize,
}

/// Simple paths of at most `max_length` hops, shortest first.
pub fn find(
    graph: &MultiLayerGraph,
    source: &str,
    target: &str,
    max_length: usize,
) -> GraphResult<Vec<PathResult>> {
    let paths = traverse::find_paths(graph, source, target, max_length)?;
    Ok(paths
        .into_iter()
        .map(|path| PathResult {
            length: path.len(),
            nodes: path
                .nodes
                .iter()
                .filter_map(|id| graph.node(id))
                .map(NodeSummary::of)
                .collect(),
            edges: path.hops,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeLayer, GraphEdge, GraphNode, Layer};
    use crate::model::{Entity, Event, EventType, Risk, RiskType};
    use chrono::NaiveDate;

    #[test]
    fn crosses_layers_with_display_fields() {
        let mut g = MultiLayerGraph::new();
        g.add_node(GraphNode::Entity(Entity::with_id("bank", "Bank X", "ORG")));
        let mut event = Event::new(
            "Fine issued",
            "",
            EventType::RegulatoryLegal,
            NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(),
        );
        event.id = "ev".into();
        g.add_node(GraphNode::Event(event));
        let mut risk = Risk::new("Regulatory pressure", "", RiskType::Regulatory, 3, 0.7);
        risk.id = "r".into();
        g.add_node(GraphNode::Risk(risk));
        g.add_edge("ev", "bank", GraphEdge::new("involves", EdgeLayer::EventToEntity, 0.5));
        g.add_edge("ev", "r", GraphEdge::new("triggers", EdgeLayer::EventToRisk, 1.0));

        // bank <- ev -> r has no directed route either way.
        assert!(find(&g, "bank", "r", 3).unwrap().is_empty());

        let paths = find(&g, "ev", "r", 3).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].length, 1);
        assert_eq!(paths[0].nodes[0].layer, Layer::Event);
        assert_eq!(paths[0].nodes[0].date, NaiveDate::from_ymd_opt(2025, 2, 3));
        assert_eq!(paths[0].nodes[1].severity, Some(3));
        assert_eq!(paths[0].edges[0].edge_type, "triggers");
    }
}
