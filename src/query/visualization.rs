//! Layer-filtered projection of the graph document for display.

use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::QueryError;
use crate::graph::document::DocumentNode;
use crate::graph::{EdgeLayer, GraphDocument, Layer};

/// `all` or a single layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayerFilter {
    #[default]
    All,
    Only(Layer),
}

impl LayerFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            LayerFilter::All => "all",
            LayerFilter::Only(layer) => layer.as_str(),
        }
    }

    fn includes(self, layer: Layer) -> bool {
        match self {
            LayerFilter::All => true,
            LayerFilter::Only(l) => l == layer,
        }
    }

    fn shows(self, edge: EdgeLayer) -> bool {
        match self {
            LayerFilter::All => true,
            LayerFilter::Only(l) => edge.shown_in(l),
        }
    }
}

impl FromStr for LayerFilter {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(LayerFilter::All)
        } else {
            s.parse().map(LayerFilter::Only)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisNode {
    pub id: String,
    pub layer: Layer,
    pub label: String,
    /// Hover text.
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisEdge {
    /// `{source}-{target}-{key}`.
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    pub layer: EdgeLayer,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LayerCount {
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VisualizationData {
    pub nodes: Vec<VisNode>,
    pub edges: Vec<VisEdge>,
    /// Node count per layer over the whole document.
    pub layers: BTreeMap<Layer, LayerCount>,
}

/// Project `doc` onto `filter`. Returns `None` when no node passes.
pub fn project(doc: &GraphDocument, filter: LayerFilter) -> Option<VisualizationData> {
    let mut layers: BTreeMap<Layer, LayerCount> =
        Layer::ALL.iter().map(|&l| (l, LayerCount::default())).collect();
    for node in &doc.nodes {
        if let Some(c) = layers.get_mut(&node.layer) {
            c.count += 1;
        }
    }

    let nodes: Vec<VisNode> = doc
        .nodes
        .iter()
        .filter(|n| filter.includes(n.layer))
        .map(vis_node)
        .collect();
    if nodes.is_empty() {
        return None;
    }

    let included: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let edges = doc
        .edges
        .iter()
        .filter(|e| included.contains(e.source.as_str()) && included.contains(e.target.as_str()))
        .filter(|e| filter.shows(e.layer))
        .map(|e| VisEdge {
            id: format!("{}-{}-{}", e.source, e.target, e.key),
            source: e.source.clone(),
            target: e.target.clone(),
            label: e.edge_type.clone(),
            edge_type: e.edge_type.clone(),
            layer: e.layer,
            weight: e.weight,
        })
        .collect();

    Some(VisualizationData {
        nodes,
        edges,
        layers,
    })
}

/// Message for a projection that matched nothing.
pub fn no_data_message(filter: LayerFilter) -> String {
    format!(
        "No {} data available. Process data to build the graph.",
        filter.as_str()
    )
}

fn vis_node(node: &DocumentNode) -> VisNode {
    let attrs = &node.attributes;
    let text = |key: &str| attrs.get(key).and_then(Value::as_str).unwrap_or_default().to_string();
    let mut fields = Map::new();
    let mut copy = |from: &str, to: &str| {
        if let Some(v) = attrs.get(from) {
            fields.insert(to.to_string(), v.clone());
        }
    };

    let (label, title, kind) = match node.layer {
        Layer::Entity => {
            copy("subtype", "subtype");
            copy("mention_count", "mentions");
            let name = text("name");
            let entity_type = text("entity_type");
            (name.clone(), format!("{name}: {entity_type}"), entity_type)
        }
        Layer::Event => {
            copy("event_date", "date");
            copy("entity_count", "entities");
            (text("title"), text("description"), text("event_type"))
        }
        Layer::Risk => {
            copy("severity", "severity");
            copy("likelihood", "likelihood");
            copy("impact_areas", "impact_areas");
            (text("title"), text("description"), text("risk_type"))
        }
    };

    VisNode {
        id: node.id.clone(),
        layer: node.layer,
        label,
        title,
        kind,
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphEdge, GraphNode, MultiLayerGraph};
    use crate::model::{Entity, Risk, RiskType};

    fn doc() -> GraphDocument {
        let mut g = MultiLayerGraph::new();
        g.add_node(GraphNode::Entity(
            Entity::with_id("bank", "Bank X", "ORG").with_subtype("Bank"),
        ));
        g.add_node(GraphNode::Entity(Entity::with_id("reg", "Regulator Y", "ORG")));
        let mut risk = Risk::new("Regulatory pressure", "Fines", RiskType::Regulatory, 2, 0.6);
        risk.id = "r1".into();
        g.add_node(GraphNode::Risk(risk));
        g.add_edge("reg", "bank", GraphEdge::new("regulates", EdgeLayer::Entity, 0.9));
        g.add_edge("r1", "bank", GraphEdge::new("affects", EdgeLayer::RiskToEntity, 0.9));
        GraphDocument::from_graph(&g)
    }

    #[test]
    fn filter_parsing() {
        assert_eq!("all".parse::<LayerFilter>().unwrap(), LayerFilter::All);
        assert_eq!(
            "Event".parse::<LayerFilter>().unwrap(),
            LayerFilter::Only(Layer::Event)
        );
        assert!("graph".parse::<LayerFilter>().is_err());
    }

    #[test]
    fn all_keeps_everything() {
        let data = project(&doc(), LayerFilter::All).unwrap();
        assert_eq!(data.nodes.len(), 3);
        assert_eq!(data.edges.len(), 2);
        assert_eq!(data.layers[&Layer::Entity].count, 2);
        assert_eq!(data.layers[&Layer::Event].count, 0);
        assert_eq!(data.edges[0].id, "reg-bank-0");
    }

    #[test]
    fn entity_layer_drops_cross_layer_edges() {
        let data = project(&doc(), LayerFilter::Only(Layer::Entity)).unwrap();
        assert_eq!(data.nodes.len(), 2);
        assert_eq!(data.edges.len(), 1);
        let bank = data.nodes.iter().find(|n| n.id == "bank").unwrap();
        assert_eq!(bank.title, "Bank X: ORG");
        assert_eq!(bank.fields["subtype"], "Bank");
        assert_eq!(bank.fields["mentions"], 0);
    }

    #[test]
    fn risk_layer_needs_both_endpoints() {
        // The affects edge points at an entity, which the risk layer omits.
        let data = project(&doc(), LayerFilter::Only(Layer::Risk)).unwrap();
        assert_eq!(data.nodes.len(), 1);
        assert!(data.edges.is_empty());
        assert_eq!(data.nodes[0].kind, "Regulatory Risk Event");
        assert_eq!(data.nodes[0].fields["severity"], 2);
    }

    #[test]
    fn empty_layer_yields_none() {
        let filter = LayerFilter::Only(Layer::Event);
        assert!(project(&doc(), filter).is_none());
        assert_eq!(
            no_data_message(filter),
            "No event data available. Process data to build the graph."
        );
    }
}
