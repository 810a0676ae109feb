//! Assemble the combined graph from the store.
//!
//! Layers are added in order: entities and their relationships, events with
//! `involves` and evolution edges, then risks with `affects`, `triggers`, and
//! risk-to-risk edges. Every reference to a missing node is skipped.

use tracing::{debug, info};

use crate::model::{Entity, Event, Relationship, Risk};
use crate::store::DataStore;

use super::{EdgeLayer, GraphEdge, GraphNode, Layer, MultiLayerGraph};

/// Weight of an `involves` edge, which carries a role rather than a score.
pub const INVOLVES_WEIGHT: f64 = 0.5;

/// Build the full graph from every record in `store`.
pub fn build_graph(store: &DataStore) -> MultiLayerGraph {
    let entities = store.all_entities();
    let relationships = store.all_relationships();
    let events = store.all_events();
    let risks = store.all_risks();

    let mut graph = MultiLayerGraph::new();
    add_entity_layer(&mut graph, entities, &relationships);
    add_event_layer(&mut graph, events);
    add_risk_layer(&mut graph, risks);

    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        entities = graph.layer_count(Layer::Entity),
        events = graph.layer_count(Layer::Event),
        risks = graph.layer_count(Layer::Risk),
        "built combined knowledge graph"
    );
    graph
}

fn add_entity_layer(
    graph: &mut MultiLayerGraph,
    entities: Vec<Entity>,
    relationships: &[Relationship],
) {
    for entity in entities {
        graph.add_node(GraphNode::Entity(entity));
    }
    for rel in relationships {
        let edge = GraphEdge::new(rel.rel_type.clone(), EdgeLayer::Entity, rel.confidence)
            .with_attribute("id", rel.id.clone())
            .with_attribute("mention_count", rel.mentions.len());
        if graph.add_edge(&rel.source_id, &rel.target_id, edge).is_none() {
            debug!(relationship = %rel.id, "skipping relationship with missing endpoint");
        }
    }
}

fn add_event_layer(graph: &mut MultiLayerGraph, events: Vec<Event>) {
    for event in &events {
        graph.add_node(GraphNode::Event(event.clone()));
    }
    for event in &events {
        for entity_id in &event.entities {
            let edge = GraphEdge::new("involves", EdgeLayer::EventToEntity, INVOLVES_WEIGHT)
                .with_attribute("role", event.role_of(entity_id).as_str());
            if graph.add_edge(&event.id, entity_id, edge).is_none() {
                debug!(
                    event = %event.id,
                    entity = %entity_id,
                    "skipping unresolved entity reference"
                );
            }
        }
    }
    // Links are stored on both events; each predecessor → successor pair is
    // added once.
    for event in &events {
        for link in &event.predecessors {
            add_evolution_edge(graph, &link.event_id, &event.id, &link.relation, link.similarity);
        }
        for link in &event.successors {
            add_evolution_edge(graph, &event.id, &link.event_id, &link.relation, link.similarity);
        }
    }
}

fn add_evolution_edge(
    graph: &mut MultiLayerGraph,
    from: &str,
    to: &str,
    relation: &str,
    similarity: f64,
) {
    if graph.has_edge_of_type(from, to, relation) {
        return;
    }
    let edge = GraphEdge::new(relation, EdgeLayer::Event, similarity);
    if graph.add_edge(from, to, edge).is_none() {
        debug!(from, to, "skipping evolution link to missing event");
    }
}

fn add_risk_layer(graph: &mut MultiLayerGraph, risks: Vec<Risk>) {
    for risk in &risks {
        graph.add_node(GraphNode::Risk(risk.clone()));
    }
    for risk in &risks {
        for entity_id in &risk.entities {
            let impact = risk.impact_on(entity_id);
            let edge = GraphEdge::new("affects", EdgeLayer::RiskToEntity, impact);
            if graph.add_edge(&risk.id, entity_id, edge).is_none() {
                debug!(
                    risk = %risk.id,
                    entity = %entity_id,
                    "skipping unresolved entity reference"
                );
            }
        }
        for event_id in &risk.events {
            let edge = GraphEdge::new(
                "triggers",
                EdgeLayer::EventToRisk,
                risk.correlation_with_event(event_id),
            );
            if graph.add_edge(event_id, &risk.id, edge).is_none() {
                debug!(risk = %risk.id, event = %event_id, "skipping unresolved event reference");
            }
        }
    }
    for risk in &risks {
        for related in &risk.related_risks {
            let edge = GraphEdge::new(
                risk.relation_to(related).as_str(),
                EdgeLayer::Risk,
                risk.link_weight(related),
            );
            if graph.add_edge(&risk.id, related, edge).is_none() {
                debug!(risk = %risk.id, related = %related, "skipping unresolved risk reference");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityRole, EventType, EvolutionLink, RiskRelation, RiskType};
    use chrono::NaiveDate;

    fn seeded() -> DataStore {
        let store = DataStore::memory_only();
        store.save_entity(Entity::with_id("a", "Alpha", "ORG")).unwrap();
        store.save_entity(Entity::with_id("b", "Beta", "ORG")).unwrap();
        store
            .save_relationship(Relationship::new("a", "b", "owns").with_confidence(0.8))
            .unwrap();
        store
            .save_relationship(Relationship::new("a", "ghost", "owns"))
            .unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let mut e1 = Event::new("first", "", EventType::MarketMovement, date);
        e1.id = "e1".into();
        e1.add_entity("a", EntityRole::MainActor);
        e1.add_entity("ghost", EntityRole::Participant);
        let mut e2 = Event::new("second", "", EventType::MarketMovement, date.succ_opt().unwrap());
        e2.id = "e2".into();
        e2.add_entity("b", EntityRole::Participant);
        let link = |id: &str| EvolutionLink {
            event_id: id.into(),
            relation: "continues".into(),
            similarity: 0.6,
        };
        e1.upsert_successor(link("e2"));
        e2.upsert_predecessor(link("e1"));
        store.save_event(e1).unwrap();
        store.save_event(e2).unwrap();

        let mut r1 = Risk::new("r1", "", RiskType::Market, 2, 0.3);
        r1.id = "r1".into();
        r1.add_entity("a", 0.9);
        r1.add_event("e1", 1.0);
        let mut r2 = Risk::new("r2", "", RiskType::Credit, 2, 0.3);
        r2.id = "r2".into();
        r2.add_entity("a", 0.4);
        r1.add_related_risk("r2", RiskRelation::CorrelatedWith);
        r2.add_related_risk("r1", RiskRelation::CorrelatedWith);
        r1.correlations.insert("r2".into(), 1.0);
        r2.correlations.insert("r1".into(), 1.0);
        store.save_risk(r1).unwrap();
        store.save_risk(r2).unwrap();
        store
    }

    #[test]
    fn builds_all_layers() {
        let g = build_graph(&seeded());
        assert_eq!(g.layer_count(Layer::Entity), 2);
        assert_eq!(g.layer_count(Layer::Event), 2);
        assert_eq!(g.layer_count(Layer::Risk), 2);
        assert_eq!(g.edges_in(EdgeLayer::Entity), 1);
        assert_eq!(g.edges_in(EdgeLayer::EventToEntity), 2);
        assert_eq!(g.edges_in(EdgeLayer::Event), 1);
        assert_eq!(g.edges_in(EdgeLayer::RiskToEntity), 2);
        assert_eq!(g.edges_in(EdgeLayer::EventToRisk), 1);
        assert_eq!(g.edges_in(EdgeLayer::Risk), 2);
    }

    #[test]
    fn edge_weights_follow_records() {
        let g = build_graph(&seeded());
        assert_eq!(g.edges_from_to("a", "b")[0].weight, 0.8);
        assert_eq!(g.edges_from_to("r1", "a")[0].weight, 0.9);
        assert_eq!(g.edges_from_to("r1", "r2")[0].edge_type, "correlated_with");
        assert_eq!(g.edges_from_to("e1", "e2")[0].weight, 0.6);
        let involves = g.edges_from_to("e1", "a")[0];
        assert_eq!(involves.attributes["role"], "main_actor");
    }

    #[test]
    fn rebuild_is_stable() {
        let store = seeded();
        let first = build_graph(&store);
        let second = build_graph(&store);
        assert_eq!(first.node_count(), second.node_count());
        assert_eq!(first.edge_count(), second.edge_count());
    }
}
