//! Record storage for entities, relationships, news, events and risks.
//!
//! Two tiers serve different needs:
//!
//! - [`MemStore`](mem::MemStore): every collection held in a concurrent hashmap (DashMap)
//! - [`DurableStore`](durable::DurableStore): optional redb backing, one table per kind
//!
//! [`DataStore`] composes them: writes go to redb first (when configured)
//! and then to memory; reads are always served from memory.

pub mod durable;
pub mod mem;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::StoreError;
use crate::model::{Entity, Event, NewsItem, Relationship, Risk};

use self::durable::DurableStore;
use self::mem::MemStore;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// File name of the serialized combined graph inside the data directory.
pub const GRAPH_FILE: &str = "knowledge_graph.json";

/// A storable record kind.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Human-readable kind, used in logs and errors.
    const KIND: &'static str;
    /// redb table name.
    const TABLE: &'static str;

    fn id(&self) -> &str;
}

macro_rules! impl_record {
    ($ty:ty, $kind:literal, $table:literal) => {
        impl Record for $ty {
            const KIND: &'static str = $kind;
            const TABLE: &'static str = $table;

            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

impl_record!(Entity, "entity", "entities");
impl_record!(Relationship, "relationship", "relationships");
impl_record!(NewsItem, "news", "news");
impl_record!(Event, "event", "events");
impl_record!(Risk, "risk", "risks");

/// Record counts per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub entities: usize,
    pub relationships: usize,
    pub news: usize,
    pub events: usize,
    pub risks: usize,
}

/// All persisted collections, memory-first with optional redb backing.
#[derive(Debug)]
pub struct DataStore {
    entities: MemStore<Entity>,
    relationships: MemStore<Relationship>,
    news: MemStore<NewsItem>,
    events: MemStore<Event>,
    risks: MemStore<Risk>,
    durable: Option<DurableStore>,
    data_dir: Option<PathBuf>,
}

impl DataStore {
    /// Create a memory-only store (no persistence).
    pub fn memory_only() -> Self {
        Self {
            entities: MemStore::new(),
            relationships: MemStore::new(),
            news: MemStore::new(),
            events: MemStore::new(),
            risks: MemStore::new(),
            durable: None,
            data_dir: None,
        }
    }

    /// Open a persistent store in `data_dir` and load every collection.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        let durable = DurableStore::open(data_dir)?;
        let store = Self {
            durable: Some(durable),
            data_dir: Some(data_dir.to_path_buf()),
            ..Self::memory_only()
        };
        store.load()?;
        let stats = store.stats();
        info!(
            dir = %data_dir.display(),
            entities = stats.entities,
            relationships = stats.relationships,
            news = stats.news,
            events = stats.events,
            risks = stats.risks,
            "loaded data store"
        );
        Ok(store)
    }

    fn load(&self) -> StoreResult<()> {
        let Some(durable) = &self.durable else {
            return Ok(());
        };
        load_into(durable, &self.entities)?;
        load_into(durable, &self.relationships)?;
        load_into(durable, &self.news)?;
        load_into(durable, &self.events)?;
        load_into(durable, &self.risks)?;
        Ok(())
    }

    fn save<T: Record>(&self, mem: &MemStore<T>, record: T) -> StoreResult<()> {
        if let Some(durable) = &self.durable {
            durable.put(&record)?;
        }
        mem.put(record);
        Ok(())
    }

    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Location of the serialized combined graph, if persistent.
    pub fn graph_file(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|d| d.join(GRAPH_FILE))
    }

    pub fn is_persistent(&self) -> bool {
        self.durable.is_some()
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            entities: self.entities.len(),
            relationships: self.relationships.len(),
            news: self.news.len(),
            events: self.events.len(),
            risks: self.risks.len(),
        }
    }

    // -- entities --------------------------------------------------------

    pub fn save_entity(&self, entity: Entity) -> StoreResult<()> {
        self.save(&self.entities, entity)
    }

    pub fn entity(&self, id: &str) -> Option<Entity> {
        self.entities.get(id)
    }

    pub fn all_entities(&self) -> Vec<Entity> {
        self.entities.all()
    }

    /// Case-insensitive exact name lookup.
    pub fn find_entity_by_name(&self, name: &str) -> Option<Entity> {
        let needle = name.to_lowercase();
        self.entities
            .filter(|e| e.name.to_lowercase() == needle)
            .into_iter()
            .next()
    }

    // -- relationships ---------------------------------------------------

    pub fn save_relationship(&self, relationship: Relationship) -> StoreResult<()> {
        self.save(&self.relationships, relationship)
    }

    pub fn all_relationships(&self) -> Vec<Relationship> {
        self.relationships.all()
    }

    /// Relationships whose both endpoints are in `entity_ids`.
    pub fn relationships_between(&self, entity_ids: &[String]) -> Vec<Relationship> {
        let ids: HashSet<&str> = entity_ids.iter().map(String::as_str).collect();
        self.relationships.filter(|r| {
            ids.contains(r.source_id.as_str()) && ids.contains(r.target_id.as_str())
        })
    }

    // -- news ------------------------------------------------------------

    pub fn save_news(&self, news: NewsItem) -> StoreResult<()> {
        self.save(&self.news, news)
    }

    pub fn news(&self, id: &str) -> Option<NewsItem> {
        self.news.get(id)
    }

    /// News items that went through extraction.
    pub fn processed_news(&self) -> Vec<NewsItem> {
        self.news.filter(|n| n.processed)
    }

    // -- events ----------------------------------------------------------

    pub fn save_event(&self, event: Event) -> StoreResult<()> {
        self.save(&self.events, event)
    }

    pub fn event(&self, id: &str) -> Option<Event> {
        self.events.get(id)
    }

    pub fn all_events(&self) -> Vec<Event> {
        self.events.all()
    }

    // -- risks -----------------------------------------------------------

    pub fn save_risk(&self, risk: Risk) -> StoreResult<()> {
        self.save(&self.risks, risk)
    }

    pub fn risk(&self, id: &str) -> Option<Risk> {
        self.risks.get(id)
    }

    pub fn all_risks(&self) -> Vec<Risk> {
        self.risks.all()
    }
}

fn load_into<T: Record>(durable: &DurableStore, mem: &MemStore<T>) -> StoreResult<()> {
    for record in durable.load_all::<T>()? {
        mem.put(record);
    }
    Ok(())
}
