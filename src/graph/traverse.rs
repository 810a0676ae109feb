//! Bounded simple-path search between two nodes.
//!
//! Paths run along edge direction. When none exist from source to target,
//! the search is retried from target to source and the results are flipped,
//! so every hop records whether it walks its edge backwards.

use petgraph::algo::all_simple_paths;
use petgraph::graphmap::DiGraphMap;
use serde::Serialize;

use crate::error::GraphError;

use super::{EdgeLayer, GraphResult, MultiLayerGraph};

/// One edge along a path, in the edge's own direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathHop {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    pub layer: EdgeLayer,
    /// Set when the path walks this edge from target to source.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub reversed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphPath {
    pub nodes: Vec<String>,
    pub hops: Vec<PathHop>,
}

impl GraphPath {
    /// Number of edges.
    pub fn len(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// All simple paths of at most `max_length` edges, shortest first.
pub fn find_paths(
    graph: &MultiLayerGraph,
    source: &str,
    target: &str,
    max_length: usize,
) -> GraphResult<Vec<GraphPath>> {
    let resolve = |id: &str| {
        graph
            .node(id)
            .map(|n| n.id())
            .ok_or_else(|| GraphError::NodeNotFound { id: id.to_string() })
    };
    let (from, to) = (resolve(source)?, resolve(target)?);
    if max_length == 0 || from == to {
        return Ok(Vec::new());
    }

    let mut map: DiGraphMap<&str, ()> = DiGraphMap::new();
    for node in graph.nodes() {
        map.add_node(node.id());
    }
    for e in graph.edges() {
        map.add_edge(e.source, e.target, ());
    }

    let mut found = simple_paths(&map, from, to, max_length);
    if found.is_empty() {
        found = simple_paths(&map, to, from, max_length);
        for path in &mut found {
            path.reverse();
        }
    }

    let mut paths: Vec<GraphPath> = found
        .into_iter()
        .map(|nodes| GraphPath {
            hops: nodes
                .windows(2)
                .filter_map(|pair| hop(graph, pair[0], pair[1]))
                .collect(),
            nodes: nodes.into_iter().map(str::to_string).collect(),
        })
        .collect();
    paths.sort_by_key(GraphPath::len);
    Ok(paths)
}

fn simple_paths<'g>(
    map: &DiGraphMap<&'g str, ()>,
    from: &'g str,
    to: &'g str,
    max_length: usize,
) -> Vec<Vec<&'g str>> {
    all_simple_paths::<Vec<&str>, _>(map, from, to, 0, Some(max_length - 1)).collect()
}

fn hop(graph: &MultiLayerGraph, from: &str, to: &str) -> Option<PathHop> {
    if let Some(edge) = graph.edges_from_to(from, to).first() {
        return Some(PathHop {
            source: from.to_string(),
            target: to.to_string(),
            edge_type: edge.edge_type.clone(),
            layer: edge.layer,
            reversed: false,
        });
    }
    let edge = graph.edges_from_to(to, from).into_iter().next()?;
    Some(PathHop {
        source: to.to_string(),
        target: from.to_string(),
        edge_type: edge.edge_type.clone(),
        layer: edge.layer,
        reversed: true,
    })
}
