//! Rich diagnostic error types for the finrisk-kg engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the finrisk-kg engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum FinRiskError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("I/O error: {source}")]
    #[diagnostic(
        code(finrisk::store::io),
        help(
            "A filesystem operation failed. Check that the data directory exists, \
             has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("redb transaction error: {message}")]
    #[diagnostic(
        code(finrisk::store::redb),
        help(
            "The embedded database encountered a transaction error. \
             Try running with a fresh data directory and re-ingesting."
        )
    )]
    Redb { message: String },

    #[error("serialization error: {message}")]
    #[diagnostic(
        code(finrisk::store::serde),
        help(
            "Failed to serialize or deserialize a record. \
             The stored format may have changed between versions."
        )
    )]
    Serialization { message: String },

    #[error("{kind} not found: {id}")]
    #[diagnostic(
        code(finrisk::store::not_found),
        help("The referenced record does not exist in the store. Verify the id is correct.")
    )]
    NotFound { kind: &'static str, id: String },
}

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("node not found: {id}")]
    #[diagnostic(
        code(finrisk::graph::node_not_found),
        help("The id has no node in the combined graph. Rebuild the graph after ingesting it.")
    )]
    NodeNotFound { id: String },

    #[error("power iteration did not converge after {iterations} iterations")]
    #[diagnostic(
        code(finrisk::graph::not_converged),
        help(
            "Eigenvector centrality needs a graph whose adjacency has a dominant eigenvalue. \
             Try degree or closeness centrality, or raise `max_power_iterations`."
        )
    )]
    NotConverged { iterations: usize },

    #[error("graph document error at {path}: {message}")]
    #[diagnostic(
        code(finrisk::graph::document),
        help("The serialized graph could not be written or read. Check the data directory.")
    )]
    Document { path: String, message: String },
}

// ---------------------------------------------------------------------------
// Query errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum QueryError {
    #[error("unknown layer: \"{layer}\"")]
    #[diagnostic(
        code(finrisk::query::unknown_layer),
        help("Valid layers are: all, entity, event, risk.")
    )]
    UnknownLayer { layer: String },

    #[error("unknown search kind: \"{kind}\"")]
    #[diagnostic(
        code(finrisk::query::unknown_search_kind),
        help("Valid search kinds are: entities, events, risks.")
    )]
    UnknownSearchKind { kind: String },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(finrisk::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(finrisk::config::parse),
        help("Check the TOML syntax in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(finrisk::config::write),
        help("Ensure you have write permissions to the config location.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {message}")]
    #[diagnostic(
        code(finrisk::config::invalid),
        help("Thresholds must lie in [0, 1] and window/iteration counts must be positive.")
    )]
    Invalid { message: String },
}

/// Convenience result type for top-level operations.
pub type FinRiskResult<T> = std::result::Result<T, FinRiskError>;
