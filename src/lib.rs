//! # finrisk-kg
//!
//! A three-layer financial risk knowledge graph: entities extracted from
//! news, the events they take part in, and the risks those events imply.
//!
//! ## Architecture
//!
//! - **Records** (`model`): entities, relationships, news, events, risks
//! - **Storage** (`store`): concurrent in-memory maps with optional redb backing
//! - **Event modeling** (`events`): same-day clustering, typing, roles, evolution links
//! - **Risk analysis** (`risk`): rule-table identification, correlation and transmission
//! - **Graph** (`graph`): combined petgraph multigraph, centrality, communities, paths
//! - **Queries** (`query`): layer projections and search, wrapped in a status envelope
//!
//! ## Library usage
//!
//! ```no_run
//! use finrisk_kg::config::EngineConfig;
//! use finrisk_kg::engine::Engine;
//!
//! let engine = Engine::new(EngineConfig::default()).unwrap();
//! engine.process_all();
//! let response = engine.centrality("degree");
//! println!("{}", serde_json::to_string_pretty(&response).unwrap());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod graph;
pub mod model;
pub mod query;
pub mod risk;
pub mod rules;
pub mod similarity;
pub mod store;
