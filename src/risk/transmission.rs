//! Risk-to-risk correlation and transmission over the entity graph.
//!
//! Risks sharing affected entities are `correlated_with` each other. Risks
//! without shared entities are linked when the entity-relationship graph
//! connects them; the causal direction follows the risk hierarchy.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use petgraph::algo::astar;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::model::{Relationship, Risk, RiskRelation};

/// Undirected entity graph built from relationships, weighted by confidence.
#[derive(Debug, Default)]
pub struct EntityGraph {
    graph: UnGraph<String, f64>,
    index: HashMap<String, NodeIndex>,
}

impl EntityGraph {
    pub fn from_relationships(relationships: &[Relationship]) -> Self {
        let mut eg = Self::default();
        for rel in relationships {
            let a = eg.node(&rel.source_id);
            let b = eg.node(&rel.target_id);
            eg.graph.update_edge(a, b, rel.confidence);
        }
        eg
    }

    fn node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.to_string());
        self.index.insert(id.to_string(), idx);
        idx
    }

    /// Fewest-hop path between two entities, as entity ids.
    pub fn shortest_path(&self, from: &str, to: &str) -> Option<Vec<String>> {
        let from_idx = *self.index.get(from)?;
        let to_idx = *self.index.get(to)?;
        let (_, path) = astar(&self.graph, from_idx, |n| n == to_idx, |_| 1usize, |_| 0usize)?;
        Some(path.into_iter().map(|i| self.graph[i].clone()).collect())
    }

    /// Shortest path between any entity of `from` and any entity of `to`;
    /// the first one found wins ties.
    pub fn shortest_between(&self, from: &[String], to: &[String]) -> Option<Vec<String>> {
        let mut best: Option<Vec<String>> = None;
        for a in from {
            for b in to {
                let Some(path) = self.shortest_path(a, b) else {
                    continue;
                };
                if best.as_ref().is_none_or(|p| path.len() < p.len()) {
                    best = Some(path);
                }
            }
        }
        best
    }
}

/// Strength of a transmission along a path of `hops` edges.
pub fn transmission_strength(hops: usize) -> f64 {
    if hops == 0 { 0.5 } else { 1.0 / hops as f64 }
}

/// Relation from `a` toward `b` by hierarchy rank.
pub fn causal_relation(a: &Risk, b: &Risk) -> RiskRelation {
    match a.risk_type.rank().cmp(&b.risk_type.rank()) {
        Ordering::Less => RiskRelation::MayCause,
        Ordering::Greater => RiskRelation::MayBeCausedBy,
        Ordering::Equal => RiskRelation::MayInfluence,
    }
}

/// Outcome counts of one transmission pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransmissionSummary {
    pub correlated: usize,
    pub transmitted: usize,
}

/// Compute correlations and transmissions for every unordered pair of risks.
///
/// Weights and paths are stored on both risks of a pair.
pub fn model_transmission(risks: &mut [Risk], graph: &EntityGraph) -> TransmissionSummary {
    let mut summary = TransmissionSummary::default();
    for j in 1..risks.len() {
        let (left, right) = risks.split_at_mut(j);
        let r2 = &mut right[0];
        for r1 in left.iter_mut() {
            if r1.id == r2.id {
                continue;
            }
            match link_pair(r1, r2, graph) {
                PairLink::Correlated => summary.correlated += 1,
                PairLink::Transmitted => summary.transmitted += 1,
                PairLink::Unlinked => {}
            }
        }
    }
    summary
}

enum PairLink {
    Correlated,
    Transmitted,
    Unlinked,
}

fn link_pair(r1: &mut Risk, r2: &mut Risk, graph: &EntityGraph) -> PairLink {
    let e1: HashSet<&str> = r1.entities.iter().map(String::as_str).collect();
    let shared = r2
        .entities
        .iter()
        .filter(|e| e1.contains(e.as_str()))
        .count();

    if shared > 0 {
        let correlation = shared as f64 / r1.entities.len().min(r2.entities.len()) as f64;
        r1.add_related_risk(&r2.id, RiskRelation::CorrelatedWith);
        r2.add_related_risk(&r1.id, RiskRelation::CorrelatedWith);
        r1.correlations.insert(r2.id.clone(), correlation);
        r2.correlations.insert(r1.id.clone(), correlation);
        return PairLink::Correlated;
    }

    let Some(path) = graph.shortest_between(&r1.entities, &r2.entities) else {
        return PairLink::Unlinked;
    };
    let strength = transmission_strength(path.len().saturating_sub(1));
    let relation = causal_relation(r1, r2);
    r1.add_related_risk(&r2.id, relation);
    r2.add_related_risk(&r1.id, relation.inverse());
    r1.transmissions.insert(r2.id.clone(), strength);
    r2.transmissions.insert(r1.id.clone(), strength);
    let mut reversed = path.clone();
    reversed.reverse();
    r1.transmission_paths.insert(r2.id.clone(), path);
    r2.transmission_paths.insert(r1.id.clone(), reversed);
    PairLink::Transmitted
}
