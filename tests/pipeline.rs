//! End-to-end tests for the finrisk-kg pipeline.
//!
//! These tests run news through event modeling, risk identification, and
//! graph building, then check the query surface against known structures.

use std::collections::HashSet;

use chrono::{NaiveDate, TimeZone, Utc};

use finrisk_kg::config::EngineConfig;
use finrisk_kg::engine::Engine;
use finrisk_kg::events::cluster::cluster_news;
use finrisk_kg::graph::analytics::degree_centrality;
use finrisk_kg::graph::builder::build_graph;
use finrisk_kg::graph::simple::WeightedGraph;
use finrisk_kg::graph::traverse::find_paths;
use finrisk_kg::graph::{EdgeLayer, GraphEdge, GraphNode, Layer, MultiLayerGraph};
use finrisk_kg::model::{
    Entity, EventType, NewsItem, Relationship, Risk, RiskRelation, RiskType,
};
use finrisk_kg::query::{SearchResults, Status};
use finrisk_kg::risk::transmission::{EntityGraph, model_transmission};
use finrisk_kg::similarity::jaccard;

fn test_engine() -> Engine {
    Engine::new(EngineConfig::default()).unwrap()
}

fn news(id: &str, day: u32, hour: u32, title: &str, content: &str, entities: &[&str]) -> NewsItem {
    let mut item = NewsItem::new(
        title,
        content,
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap(),
    )
    .with_entities(entities.iter().copied());
    item.id = id.into();
    item
}

/// Bank X and Regulator Y, three same-day regulatory stories.
fn seed_regulatory(engine: &Engine) {
    engine
        .ingest_entities(vec![
            Entity::with_id("bank", "Bank X", "ORG").with_subtype("Bank"),
            Entity::with_id("reg", "Regulator Y", "ORG").with_subtype("Regulator"),
        ])
        .unwrap();
    engine
        .ingest_relationships(vec![
            Relationship::new("reg", "bank", "regulates").with_confidence(0.9),
        ])
        .unwrap();
    let content = "Regulatory change announced with new compliance cost; \
                   a regulatory crackdown on Bank X follows.";
    engine
        .ingest_news(
            (0..3)
                .map(|i| {
                    news(
                        &format!("n{i}"),
                        10,
                        8 + i,
                        "Regulator Y takes regulatory action against Bank X",
                        content,
                        &["bank", "reg"],
                    )
                })
                .collect(),
        )
        .unwrap();
}

fn risk(id: &str, risk_type: RiskType, entities: &[&str]) -> Risk {
    let mut risk = Risk::new(id, "", risk_type, 2, 0.5);
    risk.id = id.into();
    for e in entities {
        risk.add_entity(e, 0.5);
    }
    risk
}

#[test]
fn jaccard_is_symmetric() {
    let a: HashSet<&str> = ["x", "y", "z"].into_iter().collect();
    let b: HashSet<&str> = ["y", "z", "w"].into_iter().collect();
    let empty: HashSet<&str> = HashSet::new();
    assert_eq!(jaccard(&a, &b), jaccard(&b, &a));
    assert_eq!(jaccard(&a, &a), 1.0);
    assert_eq!(jaccard(&a, &empty), 0.0);
    assert_eq!(jaccard(&empty, &empty), 0.0);
}

#[test]
fn overlapping_same_day_news_cluster_together() {
    let items = vec![
        news("a", 10, 9, "", "", &["E1", "E2", "E3"]),
        news("b", 10, 10, "", "", &["E2", "E3", "E4"]),
        news("c", 10, 11, "", "", &["Z1", "Z2"]),
        news("d", 10, 12, "", "", &["Z1", "Z2"]),
    ];
    let clusters = cluster_news(&items, 0.3);
    let with_a = clusters.iter().find(|c| c.contains(&0)).unwrap();
    assert!(with_a.contains(&1));
    assert!(!with_a.contains(&2));
    assert!(!with_a.contains(&3));
}

#[test]
fn shared_entity_correlation_is_symmetric() {
    let mut risks = vec![
        risk("r1", RiskType::Credit, &["A", "B"]),
        risk("r2", RiskType::Market, &["B", "C"]),
    ];
    let summary = model_transmission(&mut risks, &EntityGraph::default());
    assert_eq!(summary.correlated, 1);
    assert_eq!(risks[0].correlations["r2"], 0.5);
    assert_eq!(risks[1].correlations["r1"], 0.5);
    assert_eq!(risks[0].related_risks, vec!["r2"]);
    assert_eq!(risks[1].related_risks, vec!["r1"]);
    assert_eq!(risks[0].relation_to("r2"), RiskRelation::CorrelatedWith);
}

#[test]
fn market_risk_may_cause_regulatory_risk() {
    let mut risks = vec![
        risk("market", RiskType::Market, &["A"]),
        risk("regulatory", RiskType::Regulatory, &["C"]),
    ];
    let graph = EntityGraph::from_relationships(&[
        Relationship::new("A", "B", "supplies"),
        Relationship::new("B", "C", "owns"),
    ]);
    let summary = model_transmission(&mut risks, &graph);
    assert_eq!(summary.transmitted, 1);
    assert_eq!(risks[0].relation_to("regulatory"), RiskRelation::MayCause);
    assert_eq!(risks[1].relation_to("market"), RiskRelation::MayBeCausedBy);
    assert_eq!(risks[0].transmissions["regulatory"], 0.5);
    assert_eq!(risks[0].transmission_paths["regulatory"], vec!["A", "B", "C"]);
}

#[test]
fn path_search_respects_hop_bound() {
    let mut g = MultiLayerGraph::new();
    for id in ["A", "B", "C"] {
        g.add_node(GraphNode::Entity(Entity::with_id(id, id, "ORG")));
    }
    g.add_edge("A", "B", GraphEdge::new("owns", EdgeLayer::Entity, 1.0));
    g.add_edge("B", "C", GraphEdge::new("owns", EdgeLayer::Entity, 1.0));

    let paths = find_paths(&g, "A", "C", 2).unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].len(), 2);
    assert_eq!(paths[0].nodes, vec!["A", "B", "C"]);
    assert!(find_paths(&g, "A", "C", 1).unwrap().is_empty());
}

#[test]
fn star_hub_has_highest_degree() {
    let g = WeightedGraph::from_edges(
        ["hub", "a", "b", "c", "d"],
        [("hub", "a", 1.0), ("hub", "b", 1.0), ("hub", "c", 1.0), ("hub", "d", 1.0)],
    );
    let scores = degree_centrality(&g);
    let hub = g.position("hub").unwrap();
    for (i, score) in scores.iter().enumerate() {
        if i != hub {
            assert!(scores[hub] > *score);
        }
    }
}

#[test]
fn regulatory_news_yields_regulatory_risk() {
    let engine = test_engine();
    seed_regulatory(&engine);
    let summary = engine.process_all();
    assert_eq!(summary.events_created, 1);

    let events = engine.store().all_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EventType::RegulatoryLegal);
    assert_eq!(events[0].news_sources.len(), 3);

    let risks = engine.store().all_risks();
    let regulatory = risks
        .iter()
        .find(|r| r.risk_type == RiskType::Regulatory)
        .expect("regulatory risk");
    assert!(regulatory.severity >= 1);
    assert_eq!(regulatory.risk_type.label(), "Regulatory Risk Event");
    assert_eq!(regulatory.impact_on("bank"), 0.9);
    assert_eq!(regulatory.impact_on("reg"), 0.2);
    assert_eq!(regulatory.correlation_with_event(&events[0].id), 1.0);
}

#[test]
fn graph_links_all_three_layers() {
    let engine = test_engine();
    seed_regulatory(&engine);
    let summary = engine.process_all();

    let graph = engine.graphs().current().unwrap();
    assert_eq!(summary.nodes, graph.node_count());
    assert_eq!(graph.layer_count(Layer::Entity), 2);
    assert_eq!(graph.layer_count(Layer::Event), 1);
    assert!(graph.layer_count(Layer::Risk) >= 1);
    assert_eq!(graph.edges_in(EdgeLayer::Entity), 1);
    assert_eq!(graph.edges_in(EdgeLayer::EventToEntity), 2);
    assert!(graph.edges_in(EdgeLayer::RiskToEntity) >= 2);
    assert!(graph.edges_in(EdgeLayer::EventToRisk) >= 1);
}

#[test]
fn rebuilding_unchanged_data_is_stable() {
    let engine = test_engine();
    seed_regulatory(&engine);
    engine.process_all();
    let first = engine.build();
    let second = engine.build();
    assert_eq!(first.node_count(), second.node_count());
    assert_eq!(first.edge_count(), second.edge_count());

    let direct = build_graph(engine.store());
    assert_eq!(direct.edge_count(), first.edge_count());
}

#[test]
fn reprocessing_creates_nothing_new() {
    let engine = test_engine();
    seed_regulatory(&engine);
    let first = engine.process_all();
    let second = engine.process_all();
    assert_eq!(second.events_created, 0);
    assert_eq!(second.risks_created, 0);
    assert_eq!(first.nodes, second.nodes);
    assert_eq!(first.edges, second.edges);
}

#[test]
fn later_event_links_to_earlier_one() {
    let engine = test_engine();
    seed_regulatory(&engine);
    engine.process_all();
    engine
        .ingest_news(vec![news(
            "n9",
            12,
            9,
            "Regulator Y widens regulatory action against Bank X",
            "Another regulatory change adds compliance cost.",
            &["bank", "reg"],
        )])
        .unwrap();
    let summary = engine.process_all();
    assert_eq!(summary.events_created, 1);

    let mut events = engine.store().all_events();
    events.sort_by_key(|e| e.event_date);
    assert_eq!(events[1].predecessors.len(), 1);
    assert_eq!(events[1].predecessors[0].event_id, events[0].id);
    assert_eq!(events[0].successors[0].event_id, events[1].id);
    assert_eq!(engine.graphs().current().unwrap().edges_in(EdgeLayer::Event), 1);
}

#[test]
fn queries_answer_over_processed_data() {
    let engine = test_engine();
    seed_regulatory(&engine);
    engine.process_all();

    let vis = engine.visualization("entity");
    assert_eq!(vis.status, Status::Success);
    assert_eq!(vis.results.nodes.len(), 2);
    assert_eq!(vis.results.edges.len(), 1);

    let centrality = engine.centrality("degree");
    assert!(centrality.is_success());
    assert_eq!(centrality.results.layers.entity[0].node.id, "bank");

    let communities = engine.communities("louvain");
    assert!(communities.is_success());
    let total: usize = communities.results.combined.iter().map(|c| c.size).sum();
    assert_eq!(total, engine.graphs().current().unwrap().node_count());

    let event_id = engine.store().all_events()[0].id.clone();
    let paths = engine.find_paths(&event_id, "bank", Some(2));
    assert!(paths.is_success());
    assert_eq!(paths.results[0].length, 1);
    assert_eq!(paths.results[0].nodes[0].layer, Layer::Event);

    let search = engine.search("entities", "bank x");
    match search.results {
        SearchResults::Entities(hits) => assert_eq!(hits[0].id, "bank"),
        other => panic!("unexpected results: {other:?}"),
    }

    let metrics = engine.risk_metrics();
    assert!(metrics.is_success());
    assert!(metrics.results.total_risks >= 1);
}

#[test]
fn unknown_node_path_query_is_empty_not_error() {
    let engine = test_engine();
    seed_regulatory(&engine);
    engine.process_all();
    let response = engine.find_paths("bank", "nobody", None);
    assert_eq!(response.status, Status::Empty);
    assert!(response.results.is_empty());
    assert!(response.message.is_some());
}

#[test]
fn event_date_in_search_results() {
    let engine = test_engine();
    seed_regulatory(&engine);
    engine.process_all();
    match engine.search("events", "regulat").results {
        SearchResults::Events(hits) => {
            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].date, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
            assert_eq!(hits[0].event_type, "regulatory_legal");
        }
        other => panic!("unexpected results: {other:?}"),
    }
}
