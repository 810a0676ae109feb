//! The combined multi-layer graph.
//!
//! Uses a `petgraph` directed graph with parallel edges allowed, plus an
//! id → `NodeIndex` map for O(1) node lookups.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use super::{EdgeLayer, GraphEdge, GraphNode, Layer};

/// Directed multigraph over entity, event, and risk nodes.
#[derive(Debug, Default, Clone)]
pub struct MultiLayerGraph {
    graph: DiGraph<GraphNode, GraphEdge>,
    index: HashMap<String, NodeIndex>,
}

/// An edge with its endpoint ids resolved.
#[derive(Debug, Clone, Copy)]
pub struct EdgeView<'g> {
    pub source: &'g str,
    pub target: &'g str,
    /// Position among parallel edges from `source` to `target`.
    pub key: usize,
    pub edge: &'g GraphEdge,
}

impl MultiLayerGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node unless one with the same id exists. Returns its index.
    pub fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&idx) = self.index.get(node.id()) {
            return idx;
        }
        let id = node.id().to_string();
        let idx = self.graph.add_node(node);
        self.index.insert(id, idx);
        idx
    }

    /// Add an edge between two existing nodes. Returns `None` and adds
    /// nothing when either endpoint is missing.
    pub fn add_edge(&mut self, source: &str, target: &str, edge: GraphEdge) -> Option<EdgeIndex> {
        let a = *self.index.get(source)?;
        let b = *self.index.get(target)?;
        Some(self.graph.add_edge(a, b, edge))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Whether an edge of `edge_type` already runs from `source` to `target`.
    pub fn has_edge_of_type(&self, source: &str, target: &str, edge_type: &str) -> bool {
        self.edges_from_to(source, target)
            .iter()
            .any(|e| e.edge_type == edge_type)
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).map(|&idx| &self.graph[idx])
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_weights()
    }

    pub fn nodes_in(&self, layer: Layer) -> impl Iterator<Item = &GraphNode> {
        self.nodes().filter(move |n| n.layer() == layer)
    }

    pub fn layer_count(&self, layer: Layer) -> usize {
        self.nodes_in(layer).count()
    }

    pub fn edges_in(&self, layer: EdgeLayer) -> usize {
        self.graph
            .edge_weights()
            .filter(|e| e.layer == layer)
            .count()
    }

    /// Edges in insertion order with their parallel-edge keys.
    pub fn edges(&self) -> Vec<EdgeView<'_>> {
        let mut keys: HashMap<(NodeIndex, NodeIndex), usize> = HashMap::new();
        self.graph
            .edge_references()
            .map(|e| {
                let key = keys.entry((e.source(), e.target())).or_insert(0);
                let view = EdgeView {
                    source: self.graph[e.source()].id(),
                    target: self.graph[e.target()].id(),
                    key: *key,
                    edge: e.weight(),
                };
                *key += 1;
                view
            })
            .collect()
    }

    /// Parallel edges from `source` to `target`, in insertion order.
    pub fn edges_from_to(&self, source: &str, target: &str) -> Vec<&GraphEdge> {
        let (Some(&a), Some(&b)) = (self.index.get(source), self.index.get(target)) else {
            return Vec::new();
        };
        let mut edges: Vec<(EdgeIndex, &GraphEdge)> = self
            .graph
            .edges_connecting(a, b)
            .map(|e| (e.id(), e.weight()))
            .collect();
        edges.sort_by_key(|(id, _)| *id);
        edges.into_iter().map(|(_, e)| e).collect()
    }

    /// Ids of out-neighbours of `id`, deduplicated, in edge insertion order.
    pub fn successors(&self, id: &str) -> Vec<&str> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id(), e.target()))
            .collect();
        edges.sort_by_key(|(eid, _)| *eid);
        let mut out: Vec<&str> = Vec::new();
        for (_, target) in edges {
            let target = self.graph[target].id();
            if !out.contains(&target) {
                out.push(target);
            }
        }
        out
    }
}
