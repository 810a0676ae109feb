//! Community detection over a [`WeightedGraph`].
//!
//! ## Modularity
//!
//! Q = Σc [ Lc / m - (dc / 2m)² ]
//!
//! Where:
//! - Lc = total weight of edges inside community c
//! - dc = summed weighted degree of c's members
//! - m = total edge weight
//!
//! [`louvain`] greedily moves nodes to the neighbouring community with the
//! largest modularity gain, then aggregates communities into super-nodes and
//! repeats. Nodes are visited in index order, so results are deterministic.
//! [`label_propagation`] adopts the most frequent neighbour label until every
//! node already holds one, visiting nodes in a seeded random order.

use std::collections::{BTreeMap, HashMap};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;

use super::simple::WeightedGraph;

/// Round limit for both the local-moving and label passes.
const MAX_PASSES: usize = 1000;
/// Gains at or below this are treated as no improvement.
const MIN_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunityMethod {
    #[default]
    Louvain,
    LabelPropagation,
}

impl CommunityMethod {
    /// Parse a selector; anything unrecognised selects Louvain.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "label_propagation" | "label-propagation" => CommunityMethod::LabelPropagation,
            _ => CommunityMethod::Louvain,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CommunityMethod::Louvain => "louvain",
            CommunityMethod::LabelPropagation => "label_propagation",
        }
    }
}

/// Partition `graph` with `method`. Community ids are dense and numbered in
/// order of first appearance by node index.
pub fn detect(graph: &WeightedGraph, method: CommunityMethod, seed: u64) -> Vec<usize> {
    match method {
        CommunityMethod::Louvain => louvain(graph),
        CommunityMethod::LabelPropagation => label_propagation(graph, seed),
    }
}

/// Renumber labels densely in order of first appearance.
fn compact(labels: &[usize]) -> Vec<usize> {
    let mut ids: HashMap<usize, usize> = HashMap::new();
    labels
        .iter()
        .map(|&l| {
            let next = ids.len();
            *ids.entry(l).or_insert(next)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Louvain
// ---------------------------------------------------------------------------

/// One level of the (possibly aggregated) graph.
struct Level {
    adj: Vec<BTreeMap<usize, f64>>,
    /// Weight of edges folded inside each super-node.
    internal: Vec<f64>,
}

impl Level {
    fn from_graph(graph: &WeightedGraph) -> Self {
        let n = graph.node_count();
        let mut adj = vec![BTreeMap::new(); n];
        for (a, b, w) in graph.edge_list() {
            *adj[a].entry(b).or_insert(0.0) += w;
            *adj[b].entry(a).or_insert(0.0) += w;
        }
        Self {
            adj,
            internal: vec![0.0; n],
        }
    }

    fn len(&self) -> usize {
        self.adj.len()
    }

    fn strength(&self, i: usize) -> f64 {
        self.adj[i].values().sum::<f64>() + 2.0 * self.internal[i]
    }

    /// Move nodes until no single move improves modularity. Returns the
    /// community of each node and whether anything moved.
    fn local_moving(&self, m: f64) -> (Vec<usize>, bool) {
        let n = self.len();
        let strength: Vec<f64> = (0..n).map(|i| self.strength(i)).collect();
        let mut community: Vec<usize> = (0..n).collect();
        let mut total = strength.clone();
        let mut moved_any = false;

        for _ in 0..MAX_PASSES {
            let mut moved = false;
            for i in 0..n {
                let current = community[i];
                total[current] -= strength[i];

                let mut links: BTreeMap<usize, f64> = BTreeMap::new();
                for (&j, &w) in &self.adj[i] {
                    *links.entry(community[j]).or_insert(0.0) += w;
                }
                let gain = |c: usize, w: f64| w - total[c] * strength[i] / (2.0 * m);

                let mut best = current;
                let mut best_gain = gain(current, links.get(&current).copied().unwrap_or(0.0));
                for (&c, &w) in &links {
                    let g = gain(c, w);
                    if g > best_gain + MIN_GAIN {
                        best = c;
                        best_gain = g;
                    }
                }

                total[best] += strength[i];
                if best != current {
                    community[i] = best;
                    moved = true;
                    moved_any = true;
                }
            }
            if !moved {
                break;
            }
        }
        (community, moved_any)
    }

    /// Collapse each community into one node.
    fn aggregate(&self, community: &[usize], count: usize) -> Level {
        let mut adj = vec![BTreeMap::new(); count];
        let mut internal = vec![0.0; count];
        for (i, neighbours) in self.adj.iter().enumerate() {
            let ci = community[i];
            internal[ci] += self.internal[i];
            for (&j, &w) in neighbours {
                let cj = community[j];
                if ci == cj {
                    // Each inner edge is seen from both ends.
                    internal[ci] += w / 2.0;
                } else {
                    *adj[ci].entry(cj).or_insert(0.0) += w;
                }
            }
        }
        Level { adj, internal }
    }
}

/// Multi-level Louvain partition.
pub fn louvain(graph: &WeightedGraph) -> Vec<usize> {
    let n = graph.node_count();
    let m = graph.total_weight();
    if n == 0 || m <= 0.0 {
        return (0..n).collect();
    }

    let mut membership: Vec<usize> = (0..n).collect();
    let mut level = Level::from_graph(graph);
    loop {
        let (community, moved) = level.local_moving(m);
        if !moved {
            break;
        }
        let community = compact(&community);
        let count = community.iter().max().map_or(0, |c| c + 1);
        for slot in &mut membership {
            *slot = community[*slot];
        }
        if count == level.len() {
            break;
        }
        level = level.aggregate(&community, count);
    }
    compact(&membership)
}

/// Modularity of a partition.
pub fn modularity(graph: &WeightedGraph, community: &[usize]) -> f64 {
    let m = graph.total_weight();
    if m <= 0.0 {
        return 0.0;
    }
    let mut inner: HashMap<usize, f64> = HashMap::new();
    let mut degree: HashMap<usize, f64> = HashMap::new();
    for (a, b, w) in graph.edge_list() {
        if community[a] == community[b] {
            *inner.entry(community[a]).or_insert(0.0) += w;
        }
    }
    for (i, &c) in community.iter().enumerate() {
        *degree.entry(c).or_insert(0.0) += graph.weighted_degree(i);
    }
    degree
        .iter()
        .map(|(c, d)| inner.get(c).copied().unwrap_or(0.0) / m - (d / (2.0 * m)).powi(2))
        .sum()
}

// ---------------------------------------------------------------------------
// Label propagation
// ---------------------------------------------------------------------------

/// Asynchronous label propagation with a seeded visiting order. A node only
/// changes label when its current one is not among the most frequent in its
/// neighbourhood; ties among the others are broken by the same generator.
pub fn label_propagation(graph: &WeightedGraph, seed: u64) -> Vec<usize> {
    let n = graph.node_count();
    let mut labels: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut order: Vec<usize> = (0..n).collect();

    for _ in 0..MAX_PASSES {
        order.shuffle(&mut rng);
        let mut changed = false;
        for &i in &order {
            let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
            for (j, _) in graph.neighbors(i) {
                *counts.entry(labels[j]).or_insert(0) += 1;
            }
            let Some(&top) = counts.values().max() else {
                continue;
            };
            if counts.get(&labels[i]) == Some(&top) {
                continue;
            }
            let best: Vec<usize> = counts
                .iter()
                .filter(|&(_, &c)| c == top)
                .map(|(&l, _)| l)
                .collect();
            if let Some(&label) = best.choose(&mut rng) {
                labels[i] = label;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    compact(&labels)
}
