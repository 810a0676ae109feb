//! Read-side operations over the combined graph and the store.
//!
//! Every operation here is pure over its inputs; the [`Engine`](crate::engine::Engine)
//! wraps results in a [`QueryResponse`] so callers always receive a
//! well-formed envelope.

pub mod centrality;
pub mod community;
pub mod paths;
pub mod search;
pub mod visualization;

use chrono::NaiveDate;
use serde::Serialize;

use crate::graph::{GraphNode, Layer};

pub use centrality::CentralityResults;
pub use community::CommunityResults;
pub use paths::PathResult;
pub use search::{SearchKind, SearchResults};
pub use visualization::{LayerFilter, VisualizationData};

/// Message returned when nothing has been processed into the graph.
pub const NO_GRAPH_DATA: &str = "No graph data available. Process data to build the graph.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Empty,
    Error,
}

/// Envelope returned by every presentation operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse<T> {
    pub status: Status,
    pub results: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> QueryResponse<T> {
    pub fn success(results: T) -> Self {
        Self {
            status: Status::Success,
            results,
            message: None,
        }
    }

    /// Nothing matched; `results` is still well formed.
    pub fn empty(results: T, message: impl Into<String>) -> Self {
        Self {
            status: Status::Empty,
            results,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

impl<T: Default> QueryResponse<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            results: T::default(),
            message: Some(message.into()),
        }
    }
}

/// Compact, layer-tagged description of a graph node.
///
/// Entities carry `subtype`, events `date`, risks `severity`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSummary {
    pub id: String,
    pub layer: Layer,
    /// Entity name, or event/risk title.
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<u8>,
}

impl NodeSummary {
    pub fn of(node: &GraphNode) -> Self {
        let mut summary = Self {
            id: node.id().to_string(),
            layer: node.layer(),
            label: node.label().to_string(),
            kind: String::new(),
            subtype: None,
            date: None,
            severity: None,
        };
        match node {
            GraphNode::Entity(e) => {
                summary.kind = e.entity_type.clone();
                summary.subtype = e.subtype.clone();
            }
            GraphNode::Event(e) => {
                summary.kind = e.event_type.as_str().to_string();
                summary.date = Some(e.event_date);
            }
            GraphNode::Risk(r) => {
                summary.kind = r.risk_type.label().to_string();
                summary.severity = Some(r.severity);
            }
        }
        summary
    }
}

/// Per-layer buckets shared by centrality and community results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ByLayer<T> {
    pub entity: Vec<T>,
    pub event: Vec<T>,
    pub risk: Vec<T>,
}

impl<T> Default for ByLayer<T> {
    fn default() -> Self {
        Self {
            entity: Vec::new(),
            event: Vec::new(),
            risk: Vec::new(),
        }
    }
}

impl<T> ByLayer<T> {
    pub fn get(&self, layer: Layer) -> &[T] {
        match layer {
            Layer::Entity => &self.entity,
            Layer::Event => &self.event,
            Layer::Risk => &self.risk,
        }
    }

    pub fn get_mut(&mut self, layer: Layer) -> &mut Vec<T> {
        match layer {
            Layer::Entity => &mut self.entity,
            Layer::Event => &mut self.event,
            Layer::Risk => &mut self.risk,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entity.is_empty() && self.event.is_empty() && self.risk.is_empty()
    }
}
