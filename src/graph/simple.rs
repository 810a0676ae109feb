//! Undirected weighted collapse of the combined graph.
//!
//! Direction and parallel edges are dropped: each node pair keeps one edge
//! carrying the highest weight seen. Self-loops are discarded.

use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use super::MultiLayerGraph;

#[derive(Debug, Default, Clone)]
pub struct WeightedGraph {
    graph: UnGraph<String, f64>,
    index: HashMap<String, NodeIndex>,
}

impl WeightedGraph {
    pub fn from_multilayer(graph: &MultiLayerGraph) -> Self {
        let mut out = Self::default();
        for node in graph.nodes() {
            out.add_node(node.id());
        }
        for e in graph.edges() {
            out.add_edge(e.source, e.target, e.edge.weight);
        }
        out
    }

    /// Build from explicit nodes and edges; edge endpoints are added as
    /// needed.
    pub fn from_edges<'a>(
        nodes: impl IntoIterator<Item = &'a str>,
        edges: impl IntoIterator<Item = (&'a str, &'a str, f64)>,
    ) -> Self {
        let mut out = Self::default();
        for id in nodes {
            out.add_node(id);
        }
        for (a, b, w) in edges {
            out.add_edge(a, b, w);
        }
        out
    }

    fn add_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.to_string());
        self.index.insert(id.to_string(), idx);
        idx
    }

    fn add_edge(&mut self, a: &str, b: &str, weight: f64) {
        if a == b {
            return;
        }
        let ia = self.add_node(a);
        let ib = self.add_node(b);
        match self.graph.find_edge(ia, ib) {
            Some(e) => {
                if self.graph[e] < weight {
                    self.graph[e] = weight;
                }
            }
            None => {
                self.graph.add_edge(ia, ib, weight);
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node id at dense position `i` (0..node_count).
    pub fn id(&self, i: usize) -> &str {
        &self.graph[NodeIndex::new(i)]
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).map(|idx| idx.index())
    }

    /// Neighbours of dense position `i` with edge weights.
    pub fn neighbors(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let idx = NodeIndex::new(i);
        self.graph.edges(idx).map(move |e| {
            let other = if e.source() == idx { e.target() } else { e.source() };
            (other.index(), *e.weight())
        })
    }

    pub fn degree(&self, i: usize) -> usize {
        self.graph.edges(NodeIndex::new(i)).count()
    }

    pub fn weighted_degree(&self, i: usize) -> f64 {
        self.neighbors(i).map(|(_, w)| w).sum()
    }

    pub fn total_weight(&self) -> f64 {
        self.graph.edge_weights().sum()
    }

    /// Edges as dense position pairs with weights.
    pub fn edge_list(&self) -> Vec<(usize, usize, f64)> {
        self.graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index(), *e.weight()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeLayer, GraphEdge, GraphNode};
    use crate::model::Entity;

    #[test]
    fn collapse_keeps_max_weight_and_drops_loops() {
        let mut g = MultiLayerGraph::new();
        for id in ["a", "b"] {
            g.add_node(GraphNode::Entity(Entity::with_id(id, id, "ORG")));
        }
        g.add_edge("a", "b", GraphEdge::new("owns", EdgeLayer::Entity, 0.3));
        g.add_edge("b", "a", GraphEdge::new("supplies", EdgeLayer::Entity, 0.8));
        g.add_edge("a", "a", GraphEdge::new("self", EdgeLayer::Entity, 1.0));

        let simple = WeightedGraph::from_multilayer(&g);
        assert_eq!(simple.node_count(), 2);
        assert_eq!(simple.edge_count(), 1);
        let a = simple.position("a").unwrap();
        assert_eq!(simple.neighbors(a).collect::<Vec<_>>(), vec![(1, 0.8)]);
    }

    #[test]
    fn isolated_nodes_are_kept() {
        let simple = WeightedGraph::from_edges(["x", "y", "z"], [("x", "y", 1.0)]);
        assert_eq!(simple.node_count(), 3);
        assert_eq!(simple.degree(simple.position("z").unwrap()), 0);
        assert_eq!(simple.weighted_degree(0), 1.0);
    }
}
