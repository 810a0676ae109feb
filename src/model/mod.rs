//! Domain records: entities, relationships, news items, events, and risks.
//!
//! Records reference each other by string id; the [`DataStore`](crate::store::DataStore)
//! owns them. A reference that no longer resolves is skipped by every consumer.

pub mod entity;
pub mod event;
pub mod news;
pub mod risk;

pub use entity::{Entity, Evidence, Mention, Relationship};
pub use event::{EntityRole, Event, EventRelation, EventType, EvolutionLink};
pub use news::NewsItem;
pub use risk::{Risk, RiskRelation, RiskType};

/// Free-form attribute map carried by every record.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Generate a fresh record id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
