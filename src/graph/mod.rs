//! Multi-layer knowledge graph: entities, events, and risks in one directed
//! multigraph.
//!
//! - [`builder`] materializes the three layers and their cross-layer edges
//! - [`index`] holds the combined graph ([`MultiLayerGraph`])
//! - [`cache`] owns the current graph and serializes rebuilds
//! - [`document`] is the persisted JSON form of the combined graph
//! - [`simple`], [`analytics`], [`community`], [`traverse`] run algorithms
//!   over it

pub mod analytics;
pub mod builder;
pub mod cache;
pub mod community;
pub mod document;
pub mod index;
pub mod simple;
pub mod traverse;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{GraphError, QueryError};
use crate::model::{Entity, Event, Risk};

pub use cache::GraphStore;
pub use document::GraphDocument;
pub use index::MultiLayerGraph;

/// Result type for graph operations.
pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// One of the three node layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Entity,
    Event,
    Risk,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Entity, Layer::Event, Layer::Risk];

    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Entity => "entity",
            Layer::Event => "event",
            Layer::Risk => "risk",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layer {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "entity" => Ok(Layer::Entity),
            "event" => Ok(Layer::Event),
            "risk" => Ok(Layer::Risk),
            _ => Err(QueryError::UnknownLayer {
                layer: s.to_string(),
            }),
        }
    }
}

/// Layer tag on an edge. Same-layer edges carry the node layer; cross-layer
/// edges carry a composite tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeLayer {
    Entity,
    Event,
    Risk,
    EventToEntity,
    RiskToEntity,
    EventToRisk,
}

impl EdgeLayer {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeLayer::Entity => "entity",
            EdgeLayer::Event => "event",
            EdgeLayer::Risk => "risk",
            EdgeLayer::EventToEntity => "event_to_entity",
            EdgeLayer::RiskToEntity => "risk_to_entity",
            EdgeLayer::EventToRisk => "event_to_risk",
        }
    }

    /// Whether a projection of `layer` shows this edge: same-layer edges,
    /// `{layer}_to_entity`, and `event_to_{layer}`.
    pub fn shown_in(self, layer: Layer) -> bool {
        match layer {
            Layer::Entity => matches!(self, EdgeLayer::Entity | EdgeLayer::EventToEntity),
            Layer::Event => matches!(self, EdgeLayer::Event | EdgeLayer::EventToEntity),
            Layer::Risk => matches!(
                self,
                EdgeLayer::Risk | EdgeLayer::RiskToEntity | EdgeLayer::EventToRisk
            ),
        }
    }
}

impl fmt::Display for EdgeLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the combined graph: exactly one record.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphNode {
    Entity(Entity),
    Event(Event),
    Risk(Risk),
}

impl GraphNode {
    pub fn id(&self) -> &str {
        match self {
            GraphNode::Entity(e) => &e.id,
            GraphNode::Event(e) => &e.id,
            GraphNode::Risk(r) => &r.id,
        }
    }

    pub fn layer(&self) -> Layer {
        match self {
            GraphNode::Entity(_) => Layer::Entity,
            GraphNode::Event(_) => Layer::Event,
            GraphNode::Risk(_) => Layer::Risk,
        }
    }

    /// Name for entities, title otherwise.
    pub fn label(&self) -> &str {
        match self {
            GraphNode::Entity(e) => &e.name,
            GraphNode::Event(e) => &e.title,
            GraphNode::Risk(r) => &r.title,
        }
    }

    /// Flat attribute map written to the graph document. Values nested in a
    /// record's free-form `attributes` that are not primitives are
    /// stringified.
    pub fn document_attributes(&self) -> Map<String, Value> {
        let mut out = Map::new();
        out.insert("type".into(), self.layer().as_str().into());
        match self {
            GraphNode::Entity(e) => {
                out.insert("name".into(), e.name.clone().into());
                out.insert("entity_type".into(), e.entity_type.clone().into());
                out.insert("subtype".into(), e.subtype.clone().into());
                out.insert("attributes".into(), stringify_nested(&e.attributes));
                out.insert("mention_count".into(), e.mentions.len().into());
            }
            GraphNode::Event(e) => {
                out.insert("title".into(), e.title.clone().into());
                out.insert("description".into(), e.description.clone().into());
                out.insert("event_type".into(), e.event_type.as_str().into());
                out.insert("event_date".into(), e.event_date.to_string().into());
                out.insert("attributes".into(), stringify_nested(&e.attributes));
                out.insert("entity_count".into(), e.entities.len().into());
            }
            GraphNode::Risk(r) => {
                out.insert("title".into(), r.title.clone().into());
                out.insert("description".into(), r.description.clone().into());
                out.insert("risk_type".into(), r.risk_type.label().into());
                out.insert("severity".into(), r.severity.into());
                out.insert("likelihood".into(), r.likelihood.into());
                out.insert("attributes".into(), stringify_nested(&r.attributes));
                out.insert("impact_areas".into(), r.impact_areas.clone().into());
            }
        }
        out
    }
}

fn stringify_nested(attributes: &Map<String, Value>) -> Value {
    let flat = attributes
        .iter()
        .map(|(k, v)| {
            let v = match v {
                Value::Array(_) | Value::Object(_) => Value::String(v.to_string()),
                other => other.clone(),
            };
            (k.clone(), v)
        })
        .collect();
    Value::Object(flat)
}

/// Edge payload: type label, layer tag, weight, and extra attributes such as
/// an entity's role in an event.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub edge_type: String,
    pub layer: EdgeLayer,
    pub weight: f64,
    pub attributes: Map<String, Value>,
}

impl GraphEdge {
    pub fn new(edge_type: impl Into<String>, layer: EdgeLayer, weight: f64) -> Self {
        Self {
            edge_type: edge_type.into(),
            layer,
            weight,
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }
}
