//! Case-insensitive keyword search over stored records.
//!
//! Entities match on name; events and risks on title or description.
//! Ranking:
//! - entities: exact name match first, then most mentioned
//! - events: title match first, then earliest date, then most entities
//! - risks: title match first, then highest severity, then likelihood

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::QueryError;
use crate::model::RiskType;
use crate::store::DataStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Entities,
    Events,
    Risks,
}

impl SearchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchKind::Entities => "entities",
            SearchKind::Events => "events",
            SearchKind::Risks => "risks",
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchKind {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "entities" | "entity" => Ok(SearchKind::Entities),
            "events" | "event" => Ok(SearchKind::Events),
            "risks" | "risk" => Ok(SearchKind::Risks),
            _ => Err(QueryError::UnknownSearchKind {
                kind: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityHit {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub subtype: Option<String>,
    pub mentions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventHit {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub date: NaiveDate,
    pub entities: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskHit {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub risk_type: RiskType,
    pub severity: u8,
    pub likelihood: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchResults {
    Entities(Vec<EntityHit>),
    Events(Vec<EventHit>),
    Risks(Vec<RiskHit>),
}

impl Default for SearchResults {
    fn default() -> Self {
        SearchResults::Entities(Vec::new())
    }
}

impl SearchResults {
    pub fn len(&self) -> usize {
        match self {
            SearchResults::Entities(v) => v.len(),
            SearchResults::Events(v) => v.len(),
            SearchResults::Risks(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn search(store: &DataStore, kind: SearchKind, term: &str) -> SearchResults {
    let term = term.to_lowercase();
    let hit = |text: &str| text.to_lowercase().contains(&term);
    match kind {
        SearchKind::Entities => {
            let mut hits: Vec<EntityHit> = store
                .all_entities()
                .into_iter()
                .filter(|e| hit(&e.name))
                .map(|e| EntityHit {
                    mentions: e.mentions.len(),
                    id: e.id,
                    name: e.name,
                    entity_type: e.entity_type,
                    subtype: e.subtype,
                })
                .collect();
            hits.sort_by_key(|h| (h.name.to_lowercase() != term, std::cmp::Reverse(h.mentions)));
            SearchResults::Entities(hits)
        }
        SearchKind::Events => {
            let mut hits: Vec<EventHit> = store
                .all_events()
                .into_iter()
                .filter(|e| hit(&e.title) || hit(&e.description))
                .map(|e| EventHit {
                    event_type: e.event_type.as_str().to_string(),
                    entities: e.entities.len(),
                    id: e.id,
                    title: e.title,
                    description: e.description,
                    date: e.event_date,
                })
                .collect();
            hits.sort_by_key(|h| (!hit(&h.title), h.date, std::cmp::Reverse(h.entities)));
            SearchResults::Events(hits)
        }
        SearchKind::Risks => {
            let mut hits: Vec<RiskHit> = store
                .all_risks()
                .into_iter()
                .filter(|r| hit(&r.title) || hit(&r.description))
                .map(|r| RiskHit {
                    id: r.id,
                    title: r.title,
                    description: r.description,
                    risk_type: r.risk_type,
                    severity: r.severity,
                    likelihood: r.likelihood,
                })
                .collect();
            hits.sort_by(|a, b| {
                (!hit(&a.title))
                    .cmp(&!hit(&b.title))
                    .then(b.severity.cmp(&a.severity))
                    .then(b.likelihood.total_cmp(&a.likelihood))
            });
            SearchResults::Risks(hits)
        }
    }
}
