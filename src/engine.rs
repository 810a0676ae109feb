//! Engine facade: top-level API for the finrisk-kg system.
//!
//! The `Engine` owns the configuration, the record store, and the graph
//! cache, and provides the public interface for ingesting records, running
//! the processing stages, and querying the results.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::EngineConfig;
use crate::error::{FinRiskResult, StoreError};
use crate::events::EventModeler;
use crate::graph::analytics::Measure;
use crate::graph::community::CommunityMethod;
use crate::graph::{EdgeLayer, GraphDocument, GraphStore, Layer, MultiLayerGraph};
use crate::model::{Entity, NewsItem, Relationship};
use crate::query::visualization::{self, LayerFilter, VisualizationData};
use crate::query::{
    self, CentralityResults, CommunityResults, PathResult, QueryResponse, SearchKind,
    SearchResults,
};
use crate::risk::RiskAnalyzer;
use crate::risk::metrics::RiskMetrics;
use crate::risk::paths::RiskPathStep;
use crate::store::{DataStore, StoreStats};

/// Records accepted by [`Engine::ingest`], as produced by extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestBundle {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub news: Vec<NewsItem>,
}

/// Outcome of [`Engine::process_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessSummary {
    pub events_created: usize,
    pub risks_created: usize,
    pub nodes: usize,
    pub edges: usize,
}

/// The finrisk-kg engine.
pub struct Engine {
    config: EngineConfig,
    store: DataStore,
    graphs: GraphStore,
}

impl Engine {
    /// Create an engine; persistent when the config names a data directory.
    pub fn new(config: EngineConfig) -> FinRiskResult<Self> {
        config.validate()?;
        let store = match &config.data_dir {
            Some(dir) => DataStore::open(dir)?,
            None => DataStore::memory_only(),
        };
        let graphs = GraphStore::new(store.graph_file());
        info!(
            persistent = store.is_persistent(),
            "initializing finrisk-kg engine"
        );
        Ok(Self {
            config,
            store,
            graphs,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn graphs(&self) -> &GraphStore {
        &self.graphs
    }

    // -----------------------------------------------------------------------
    // Ingestion
    // -----------------------------------------------------------------------

    pub fn ingest_entities(&self, entities: Vec<Entity>) -> FinRiskResult<usize> {
        let count = entities.len();
        for entity in entities {
            self.store.save_entity(entity)?;
        }
        Ok(count)
    }

    pub fn ingest_relationships(&self, relationships: Vec<Relationship>) -> FinRiskResult<usize> {
        let count = relationships.len();
        for relationship in relationships {
            self.store.save_relationship(relationship)?;
        }
        Ok(count)
    }

    pub fn ingest_news(&self, news: Vec<NewsItem>) -> FinRiskResult<usize> {
        let count = news.len();
        for item in news {
            self.store.save_news(item)?;
        }
        Ok(count)
    }

    /// Save every record in `bundle`. Returns the store counts afterwards.
    pub fn ingest(&self, bundle: IngestBundle) -> FinRiskResult<StoreStats> {
        let entities = self.ingest_entities(bundle.entities)?;
        let relationships = self.ingest_relationships(bundle.relationships)?;
        let news = self.ingest_news(bundle.news)?;
        info!(entities, relationships, news, "ingested records");
        Ok(self.store.stats())
    }

    // -----------------------------------------------------------------------
    // Processing stages
    // -----------------------------------------------------------------------

    /// Cluster processed news into events and link their evolution.
    pub fn model_events(&self) -> Vec<String> {
        EventModeler::new(&self.store, &self.config).model_all()
    }

    /// Identify risks for unprocessed events and model transmission.
    pub fn identify_risks(&self) -> FinRiskResult<Vec<String>> {
        Ok(RiskAnalyzer::new(&self.store, &self.config).identify_all()?)
    }

    /// Rebuild the combined graph from the store.
    pub fn build(&self) -> Arc<MultiLayerGraph> {
        self.graphs.rebuild(&self.store)
    }

    /// Events, then risks, then the graph. A failing stage is logged and
    /// the later stages still run.
    pub fn process_all(&self) -> ProcessSummary {
        let events = self.model_events();
        let risks = self.identify_risks().unwrap_or_else(|e| {
            error!(error = %e, "risk identification failed");
            Vec::new()
        });
        let graph = self.build();
        let summary = ProcessSummary {
            events_created: events.len(),
            risks_created: risks.len(),
            nodes: graph.node_count(),
            edges: graph.edge_count(),
        };
        info!(
            events = summary.events_created,
            risks = summary.risks_created,
            nodes = summary.nodes,
            edges = summary.edges,
            "processing complete"
        );
        summary
    }

    /// The current graph, built on first use. `None` when there is nothing
    /// to show.
    fn graph(&self) -> Option<Arc<MultiLayerGraph>> {
        Some(self.graphs.get_or_build(&self.store)).filter(|g| !g.is_empty())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Nodes and edges of one layer (or `all`), ready for display.
    ///
    /// Falls back to the saved graph document when the store builds an
    /// empty graph.
    pub fn visualization(&self, layer: &str) -> QueryResponse<VisualizationData> {
        let filter: LayerFilter = match layer.parse() {
            Ok(f) => f,
            Err(e) => return QueryResponse::error(e.to_string()),
        };
        let doc = match self.graph() {
            Some(graph) => GraphDocument::from_graph(&graph),
            None => match self.graphs.saved_document() {
                Ok(Some(doc)) if !doc.is_empty() => {
                    warn!("graph is empty, showing saved graph document");
                    doc
                }
                Ok(_) | Err(_) => {
                    return QueryResponse::empty(VisualizationData::default(), query::NO_GRAPH_DATA);
                }
            },
        };
        match visualization::project(&doc, filter) {
            Some(data) => QueryResponse::success(data),
            None => QueryResponse::empty(
                VisualizationData::default(),
                visualization::no_data_message(filter),
            ),
        }
    }

    /// Centrality per layer. Unknown measures fall back to degree.
    pub fn centrality(&self, measure: &str) -> QueryResponse<CentralityResults> {
        let measure = Measure::from_name(measure);
        let Some(graph) = self.graph() else {
            return QueryResponse::empty(
                CentralityResults {
                    measure,
                    ..Default::default()
                },
                query::NO_GRAPH_DATA,
            );
        };
        match query::centrality::analyze(&graph, measure, self.config.max_power_iterations) {
            Ok(results) => QueryResponse::success(results),
            Err(e) => {
                error!(measure = measure.as_str(), error = %e, "centrality analysis failed");
                QueryResponse::error(e.to_string())
            }
        }
    }

    /// Communities per layer and combined. Unknown methods fall back to
    /// Louvain.
    pub fn communities(&self, method: &str) -> QueryResponse<CommunityResults> {
        let method = CommunityMethod::from_name(method);
        let Some(graph) = self.graph() else {
            return QueryResponse::empty(
                CommunityResults {
                    method,
                    ..Default::default()
                },
                query::NO_GRAPH_DATA,
            );
        };
        let results =
            query::community::detect(&graph, method, self.config.label_propagation_seed);
        info!(
            method = method.as_str(),
            communities = results.community_count(),
            "detected communities"
        );
        QueryResponse::success(results)
    }

    /// Simple paths between two nodes, at most `max_length` hops (the
    /// configured default when `None`). Endpoints are node ids or entity
    /// names.
    pub fn find_paths(
        &self,
        source: &str,
        target: &str,
        max_length: Option<usize>,
    ) -> QueryResponse<Vec<PathResult>> {
        let Some(graph) = self.graph() else {
            return QueryResponse::empty(Vec::new(), query::NO_GRAPH_DATA);
        };
        let max_length = max_length.unwrap_or(self.config.max_path_length);
        let source = self.resolve_node(&graph, source);
        let target = self.resolve_node(&graph, target);
        match query::paths::find(&graph, &source, &target, max_length) {
            Ok(paths) if paths.is_empty() => QueryResponse::empty(
                paths,
                format!("No paths from {source} to {target} within {max_length} hops"),
            ),
            Ok(paths) => QueryResponse::success(paths),
            Err(e) => QueryResponse::empty(Vec::new(), e.to_string()),
        }
    }

    /// A node id as given, or the id of the entity with that name.
    fn resolve_node(&self, graph: &MultiLayerGraph, key: &str) -> String {
        if graph.contains(key) {
            return key.to_string();
        }
        match self.store.find_entity_by_name(key) {
            Some(entity) => entity.id,
            None => key.to_string(),
        }
    }

    /// Keyword search over entities, events, or risks.
    pub fn search(&self, kind: &str, term: &str) -> QueryResponse<SearchResults> {
        let kind: SearchKind = match kind.parse() {
            Ok(k) => k,
            Err(e) => return QueryResponse::error(e.to_string()),
        };
        let results = query::search::search(&self.store, kind, term);
        if results.is_empty() {
            QueryResponse::empty(results, format!("No {kind} match \"{term}\""))
        } else {
            QueryResponse::success(results)
        }
    }

    /// Every stored risk-to-risk transmission path.
    pub fn risk_transmission_paths(&self) -> QueryResponse<Vec<RiskPathStep>> {
        let steps = RiskAnalyzer::new(&self.store, &self.config).transmission_paths();
        if steps.is_empty() {
            QueryResponse::empty(steps, "No risk transmission paths recorded")
        } else {
            QueryResponse::success(steps)
        }
    }

    /// The route from one risk to another through recorded risk relations.
    pub fn risk_path(&self, source: &str, target: &str) -> QueryResponse<Vec<RiskPathStep>> {
        let missing = [source, target]
            .into_iter()
            .find(|id| self.store.risk(id).is_none());
        if let Some(missing) = missing {
            let err = StoreError::NotFound {
                kind: "risk",
                id: missing.to_string(),
            };
            return QueryResponse::empty(Vec::new(), err.to_string());
        }
        let steps = RiskAnalyzer::new(&self.store, &self.config).risk_path(source, target);
        if steps.is_empty() {
            QueryResponse::empty(steps, format!("No risk path from {source} to {target}"))
        } else {
            QueryResponse::success(steps)
        }
    }

    pub fn risk_metrics(&self) -> QueryResponse<RiskMetrics> {
        let metrics = RiskAnalyzer::new(&self.store, &self.config).metrics();
        if metrics.total_risks == 0 {
            QueryResponse::empty(metrics, "No risks identified yet")
        } else {
            QueryResponse::success(metrics)
        }
    }

    /// Record counts and, when a graph has been built, its size per layer.
    pub fn info(&self) -> EngineInfo {
        let graph = self.graphs.current();
        let layer = |l: Layer| graph.as_ref().map_or(0, |g| g.layer_count(l));
        EngineInfo {
            persistent: self.store.is_persistent(),
            data_dir: self
                .store
                .data_dir()
                .map(|d| d.display().to_string()),
            records: self.store.stats(),
            graph_nodes: graph.as_ref().map_or(0, |g| g.node_count()),
            graph_edges: graph.as_ref().map_or(0, |g| g.edge_count()),
            entity_nodes: layer(Layer::Entity),
            event_nodes: layer(Layer::Event),
            risk_nodes: layer(Layer::Risk),
            cross_layer_edges: graph.as_ref().map_or(0, |g| {
                [
                    EdgeLayer::EventToEntity,
                    EdgeLayer::RiskToEntity,
                    EdgeLayer::EventToRisk,
                ]
                .into_iter()
                .map(|l| g.edges_in(l))
                .sum()
            }),
            graph_generation: self.graphs.generation(),
        }
    }
}

/// Summary information about the engine state.
#[derive(Debug, Clone, Serialize)]
pub struct EngineInfo {
    pub persistent: bool,
    pub data_dir: Option<String>,
    pub records: StoreStats,
    pub graph_nodes: usize,
    pub graph_edges: usize,
    pub entity_nodes: usize,
    pub event_nodes: usize,
    pub risk_nodes: usize,
    pub cross_layer_edges: usize,
    pub graph_generation: u64,
}

impl std::fmt::Display for EngineInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "finrisk-kg engine info")?;
        writeln!(f, "  persistent:     {}", self.persistent)?;
        if let Some(dir) = &self.data_dir {
            writeln!(f, "  data dir:       {dir}")?;
        }
        writeln!(f, "  entities:       {}", self.records.entities)?;
        writeln!(f, "  relationships:  {}", self.records.relationships)?;
        writeln!(f, "  news:           {}", self.records.news)?;
        writeln!(f, "  events:         {}", self.records.events)?;
        writeln!(f, "  risks:          {}", self.records.risks)?;
        writeln!(
            f,
            "  graph:          {} nodes ({} entity, {} event, {} risk), {} edges ({} cross-layer)",
            self.graph_nodes,
            self.entity_nodes,
            self.event_nodes,
            self.risk_nodes,
            self.graph_edges,
            self.cross_layer_edges
        )?;
        Ok(())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("store", &self.store.stats())
            .field("graph_generation", &self.graphs.generation())
            .finish()
    }
}
