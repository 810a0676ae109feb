//! News items as handed over by the extraction stage.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::new_id;

/// A processed news article with its referenced entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub url: String,
    pub published_at: DateTime<Utc>,
    /// Entity ids found by extraction.
    #[serde(default)]
    pub entities: Vec<String>,
    /// Events this item was folded into.
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub processed: bool,
}

impl NewsItem {
    /// Create an unprocessed news item with a fresh id.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            content: content.into(),
            source: String::new(),
            url: String::new(),
            published_at,
            entities: Vec::new(),
            events: Vec::new(),
            processed: false,
        }
    }

    /// Attach extracted entity ids and mark the item processed.
    pub fn with_entities<I, S>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entities = entities.into_iter().map(Into::into).collect();
        self.processed = true;
        self
    }

    /// Calendar date used to group same-day news.
    pub fn date(&self) -> NaiveDate {
        self.published_at.date_naive()
    }

    /// Title and body joined, as scanned by the rule tables.
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.content)
    }

    /// Back-reference an event. Returns false if it was already referenced.
    pub fn link_event(&mut self, event_id: &str) -> bool {
        if self.events.iter().any(|e| e == event_id) {
            return false;
        }
        self.events.push(event_id.to_string());
        true
    }
}
