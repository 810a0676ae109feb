//! Centrality measures over a [`WeightedGraph`].
//!
//! Every function returns one score per dense node position. Edge weights
//! are read as distances by betweenness and closeness, and as connection
//! strength by eigenvector centrality.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::Serialize;

use crate::error::GraphError;

use super::GraphResult;
use super::simple::WeightedGraph;

/// Selectable centrality measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    #[default]
    Degree,
    Betweenness,
    Closeness,
    Eigenvector,
}

impl Measure {
    /// Parse a selector; anything unrecognised selects degree.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "betweenness" => Measure::Betweenness,
            "closeness" => Measure::Closeness,
            "eigenvector" => Measure::Eigenvector,
            _ => Measure::Degree,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Measure::Degree => "degree",
            Measure::Betweenness => "betweenness",
            Measure::Closeness => "closeness",
            Measure::Eigenvector => "eigenvector",
        }
    }
}

/// Compute `measure` for every node.
pub fn centrality(
    graph: &WeightedGraph,
    measure: Measure,
    max_iterations: usize,
) -> GraphResult<Vec<f64>> {
    match measure {
        Measure::Degree => Ok(degree_centrality(graph)),
        Measure::Betweenness => Ok(betweenness_centrality(graph)),
        Measure::Closeness => Ok(closeness_centrality(graph)),
        Measure::Eigenvector => eigenvector_centrality(graph, max_iterations),
    }
}

// ---------------------------------------------------------------------------
// Degree centrality
// ---------------------------------------------------------------------------

/// Degree divided by `n - 1`. A lone node scores 1.
pub fn degree_centrality(graph: &WeightedGraph) -> Vec<f64> {
    let n = graph.node_count();
    if n <= 1 {
        return vec![1.0; n];
    }
    let scale = 1.0 / (n - 1) as f64;
    (0..n).map(|i| graph.degree(i) as f64 * scale).collect()
}

// ---------------------------------------------------------------------------
// Shortest paths
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    dist: f64,
    node: usize,
    pred: Option<usize>,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    // Reversed so `BinaryHeap` pops the nearest node first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Single-source Dijkstra recording settle order, shortest-path counts, and
/// predecessor lists.
struct ShortestPaths {
    order: Vec<usize>,
    sigma: Vec<f64>,
    preds: Vec<Vec<usize>>,
    dist: Vec<Option<f64>>,
}

fn dijkstra(graph: &WeightedGraph, source: usize) -> ShortestPaths {
    let n = graph.node_count();
    let mut sp = ShortestPaths {
        order: Vec::new(),
        sigma: vec![0.0; n],
        preds: vec![Vec::new(); n],
        dist: vec![None; n],
    };
    let mut seen: Vec<Option<f64>> = vec![None; n];
    let mut heap = BinaryHeap::new();
    sp.sigma[source] = 1.0;
    seen[source] = Some(0.0);
    heap.push(Candidate {
        dist: 0.0,
        node: source,
        pred: None,
    });

    while let Some(Candidate { dist, node, pred }) = heap.pop() {
        if sp.dist[node].is_some() {
            continue;
        }
        if let Some(p) = pred {
            sp.sigma[node] += sp.sigma[p];
        }
        sp.order.push(node);
        sp.dist[node] = Some(dist);
        for (next, w) in graph.neighbors(node) {
            let alt = dist + w;
            if sp.dist[next].is_some() {
                continue;
            }
            match seen[next] {
                Some(d) if alt > d => {}
                Some(d) if alt == d => {
                    sp.sigma[next] += sp.sigma[node];
                    sp.preds[next].push(node);
                }
                _ => {
                    seen[next] = Some(alt);
                    sp.sigma[next] = 0.0;
                    sp.preds[next] = vec![node];
                    heap.push(Candidate {
                        dist: alt,
                        node: next,
                        pred: Some(node),
                    });
                }
            }
        }
    }
    sp
}

// ---------------------------------------------------------------------------
// Betweenness centrality
// ---------------------------------------------------------------------------

/// Brandes' algorithm over weighted shortest paths, normalised by
/// `1 / ((n - 1)(n - 2))` when `n > 2`.
pub fn betweenness_centrality(graph: &WeightedGraph) -> Vec<f64> {
    let n = graph.node_count();
    let mut scores = vec![0.0; n];
    for s in 0..n {
        let sp = dijkstra(graph, s);
        let mut delta = vec![0.0; n];
        for &w in sp.order.iter().rev() {
            for &v in &sp.preds[w] {
                delta[v] += sp.sigma[v] / sp.sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                scores[w] += delta[w];
            }
        }
    }
    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        for score in &mut scores {
            *score *= scale;
        }
    }
    scores
}

// ---------------------------------------------------------------------------
// Closeness centrality
// ---------------------------------------------------------------------------

/// Reachable-count over total distance, scaled by the reachable fraction
/// of the graph (Wasserman-Faust). Unreachable or isolated nodes score 0.
pub fn closeness_centrality(graph: &WeightedGraph) -> Vec<f64> {
    let n = graph.node_count();
    (0..n)
        .map(|u| {
            let sp = dijkstra(graph, u);
            let reached: Vec<f64> = sp.dist.iter().flatten().copied().collect();
            let total: f64 = reached.iter().sum();
            let others = reached.len() as f64 - 1.0;
            if total > 0.0 && n > 1 {
                (others / total) * (others / (n - 1) as f64)
            } else {
                0.0
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Eigenvector centrality
// ---------------------------------------------------------------------------

/// Power iteration on `A + I` with Euclidean normalisation. Converged when
/// the summed absolute change drops below `n * 1e-6`.
pub fn eigenvector_centrality(
    graph: &WeightedGraph,
    max_iterations: usize,
) -> GraphResult<Vec<f64>> {
    let n = graph.node_count();
    if n == 0 {
        return Ok(Vec::new());
    }
    let tolerance = n as f64 * 1e-6;
    let mut x = vec![1.0 / n as f64; n];
    for _ in 0..max_iterations {
        let mut next = x.clone();
        for (a, b, w) in graph.edge_list() {
            next[a] += x[b] * w;
            next[b] += x[a] * w;
        }
        let norm = next.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Ok(next);
        }
        for v in &mut next {
            *v /= norm;
        }
        let change: f64 = next.iter().zip(&x).map(|(a, b)| (a - b).abs()).sum();
        x = next;
        if change < tolerance {
            return Ok(x);
        }
    }
    Err(GraphError::NotConverged {
        iterations: max_iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn star() -> WeightedGraph {
        WeightedGraph::from_edges(
            ["hub", "l1", "l2", "l3", "l4"],
            [
                ("hub", "l1", 1.0),
                ("hub", "l2", 1.0),
                ("hub", "l3", 1.0),
                ("hub", "l4", 1.0),
            ],
        )
    }

    fn path() -> WeightedGraph {
        WeightedGraph::from_edges(["a", "b", "c"], [("a", "b", 1.0), ("b", "c", 1.0)])
    }

    fn hub_dominates(scores: &[f64]) {
        for leaf in &scores[1..] {
            assert!(scores[0] > *leaf, "{scores:?}");
        }
    }

    #[test]
    fn degree_on_star() {
        let scores = degree_centrality(&star());
        assert_eq!(scores[0], 1.0);
        assert_eq!(scores[1], 0.25);
        hub_dominates(&scores);
    }

    #[test]
    fn degree_of_single_node() {
        let g = WeightedGraph::from_edges(["only"], []);
        assert_eq!(degree_centrality(&g), vec![1.0]);
    }

    #[test]
    fn betweenness_on_path_and_star() {
        let scores = betweenness_centrality(&path());
        assert_eq!(scores, vec![0.0, 1.0, 0.0]);
        let scores = betweenness_centrality(&star());
        assert!((scores[0] - 1.0).abs() < 1e-12);
        assert_eq!(scores[1], 0.0);
    }

    #[test]
    fn betweenness_splits_equal_paths() {
        // Square a-b-d, a-c-d: b and c each carry half of the a-d paths.
        let g = WeightedGraph::from_edges(
            ["a", "b", "c", "d"],
            [("a", "b", 1.0), ("a", "c", 1.0), ("b", "d", 1.0), ("c", "d", 1.0)],
        );
        let scores = betweenness_centrality(&g);
        assert!((scores[1] - scores[2]).abs() < 1e-12);
        assert!((scores[1] - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn closeness_on_path() {
        let scores = closeness_centrality(&path());
        assert_eq!(scores[1], 1.0);
        assert!((scores[0] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn closeness_of_isolated_node_is_zero() {
        let g = WeightedGraph::from_edges(["a", "b", "z"], [("a", "b", 1.0)]);
        let scores = closeness_centrality(&g);
        assert_eq!(scores[2], 0.0);
        assert!((scores[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn eigenvector_on_star() {
        let scores = eigenvector_centrality(&star(), 100).unwrap();
        hub_dominates(&scores);
        let norm: f64 = scores.iter().map(|v| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn eigenvector_reports_non_convergence() {
        let err = eigenvector_centrality(&star(), 1).unwrap_err();
        assert!(matches!(err, GraphError::NotConverged { iterations: 1 }));
    }

    #[test]
    fn unknown_measure_is_degree() {
        assert_eq!(Measure::from_name("pagerank"), Measure::Degree);
        assert_eq!(Measure::from_name("Closeness"), Measure::Closeness);
    }
}
