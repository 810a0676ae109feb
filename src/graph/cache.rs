//! Owner of the current combined graph.
//!
//! Readers share an `Arc` snapshot. Rebuilds are serialized by a mutex. A
//! caller of [`GraphStore::rebuild`] reuses another caller's result only when
//! that build read the store after the request was made.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tracing::{debug, error, warn};

use crate::store::DataStore;

use super::builder::build_graph;
use super::{GraphDocument, GraphResult, MultiLayerGraph};

pub struct GraphStore {
    current: RwLock<Option<Arc<MultiLayerGraph>>>,
    rebuild: Mutex<()>,
    generation: AtomicU64,
    /// Rebuild requests issued so far.
    requested: AtomicU64,
    /// Highest request the current graph was built after.
    covered: AtomicU64,
    document_path: Option<PathBuf>,
}

impl GraphStore {
    /// `document_path` receives the serialized graph after every rebuild
    /// that produced a non-empty graph.
    pub fn new(document_path: Option<PathBuf>) -> Self {
        Self {
            current: RwLock::new(None),
            rebuild: Mutex::new(()),
            generation: AtomicU64::new(0),
            requested: AtomicU64::new(0),
            covered: AtomicU64::new(0),
            document_path,
        }
    }

    /// The current graph, if one has been built.
    pub fn current(&self) -> Option<Arc<MultiLayerGraph>> {
        self.current.read().expect("graph lock poisoned").clone()
    }

    /// Number of completed rebuilds.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Rebuild from `store`, reflecting every write made before the call.
    ///
    /// A caller that blocked on the lock takes the finished graph only when
    /// that build started after its request.
    pub fn rebuild(&self, store: &DataStore) -> Arc<MultiLayerGraph> {
        let ticket = self.requested.fetch_add(1, Ordering::AcqRel) + 1;
        let _guard = self.rebuild.lock().expect("graph rebuild lock poisoned");
        if self.covered.load(Ordering::Acquire) >= ticket {
            if let Some(graph) = self.current() {
                debug!(ticket, "reusing rebuild that started after request");
                return graph;
            }
        }
        self.rebuild_locked(store)
    }

    /// The current graph, building it first when there is none or it is
    /// empty.
    pub fn get_or_build(&self, store: &DataStore) -> Arc<MultiLayerGraph> {
        // Generation is read before the snapshot; a rebuild publishes the
        // graph before bumping it.
        let seen = self.generation();
        if let Some(graph) = self.current().filter(|g| !g.is_empty()) {
            return graph;
        }
        let _guard = self.rebuild.lock().expect("graph rebuild lock poisoned");
        if self.generation() != seen {
            if let Some(graph) = self.current() {
                return graph;
            }
        }
        self.rebuild_locked(store)
    }

    fn rebuild_locked(&self, store: &DataStore) -> Arc<MultiLayerGraph> {
        let through = self.requested.load(Ordering::Acquire);
        let graph = Arc::new(build_graph(store));
        self.install(Arc::clone(&graph), through);
        graph
    }

    /// Publish `graph`, built after request `through`. Caller holds the
    /// rebuild lock.
    fn install(&self, graph: Arc<MultiLayerGraph>, through: u64) {
        match &self.document_path {
            Some(_) if graph.is_empty() => debug!("empty graph, keeping saved document"),
            Some(path) => {
                if let Err(e) = GraphDocument::from_graph(&graph).write_to(path) {
                    error!(error = %e, "failed to save graph document");
                }
            }
            None => {}
        }
        *self.current.write().expect("graph lock poisoned") = Some(graph);
        self.covered.store(through, Ordering::Release);
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// The last written graph document, used when no graph can be built.
    pub fn saved_document(&self) -> GraphResult<Option<GraphDocument>> {
        let Some(path) = &self.document_path else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        match GraphDocument::read_from(path) {
            Ok(doc) => Ok(Some(doc)),
            Err(e) => {
                warn!(error = %e, "could not read saved graph document");
                Err(e)
            }
        }
    }
}
