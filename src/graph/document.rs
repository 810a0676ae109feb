//! Serialized form of the combined graph.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::GraphError;

use super::{EdgeLayer, GraphResult, Layer, MultiLayerGraph};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    pub id: String,
    pub layer: Layer,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEdge {
    pub source: String,
    pub target: String,
    pub key: String,
    pub layer: EdgeLayer,
    #[serde(rename = "type")]
    pub edge_type: String,
    pub weight: f64,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Nodes with their attributes and edges with source, target, key, layer,
/// type, and weight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<DocumentNode>,
    pub edges: Vec<DocumentEdge>,
}

impl GraphDocument {
    pub fn from_graph(graph: &MultiLayerGraph) -> Self {
        let nodes = graph
            .nodes()
            .map(|n| DocumentNode {
                id: n.id().to_string(),
                layer: n.layer(),
                attributes: n.document_attributes(),
            })
            .collect();
        let edges = graph
            .edges()
            .into_iter()
            .map(|e| DocumentEdge {
                source: e.source.to_string(),
                target: e.target.to_string(),
                key: e.key.to_string(),
                layer: e.edge.layer,
                edge_type: e.edge.edge_type.clone(),
                weight: e.edge.weight,
                attributes: e.edge.attributes.clone(),
            })
            .collect();
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn write_to(&self, path: &Path) -> GraphResult<()> {
        let doc_err = |message: String| GraphError::Document {
            path: path.display().to_string(),
            message,
        };
        let json = serde_json::to_string_pretty(self).map_err(|e| doc_err(e.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| doc_err(e.to_string()))?;
        }
        fs::write(path, json).map_err(|e| doc_err(e.to_string()))?;
        info!(
            path = %path.display(),
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "saved graph document"
        );
        Ok(())
    }

    pub fn read_from(path: &Path) -> GraphResult<Self> {
        let doc_err = |message: String| GraphError::Document {
            path: path.display().to_string(),
            message,
        };
        let json = fs::read_to_string(path).map_err(|e| doc_err(e.to_string()))?;
        serde_json::from_str(&json).map_err(|e| doc_err(e.to_string()))
    }
}
