//! Event modeling: news clustering, event synthesis, and evolution linking.
//!
//! Runs over every processed news item in the store. Each calendar date is
//! handled independently; a failure on one date is logged and the run
//! continues with the next.

pub mod builder;
pub mod cluster;
pub mod evolution;
pub mod roles;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{error, info};

use crate::config::EngineConfig;
use crate::model::NewsItem;
use crate::store::{DataStore, StoreResult};

/// Drives event modeling over a [`DataStore`].
pub struct EventModeler<'a> {
    store: &'a DataStore,
    config: &'a EngineConfig,
}

impl<'a> EventModeler<'a> {
    pub fn new(store: &'a DataStore, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    /// Model events for every date, then link evolution across all events.
    /// News already folded into an event is not clustered again.
    /// Returns the ids of newly created events.
    pub fn model_all(&self) -> Vec<String> {
        let pending: Vec<NewsItem> = self
            .store
            .processed_news()
            .into_iter()
            .filter(|n| n.events.is_empty())
            .collect();
        let mut created = Vec::new();
        for (date, items) in group_by_date(pending) {
            match self.model_date(date, &items) {
                Ok(ids) => {
                    info!(%date, events = ids.len(), "modeled events");
                    created.extend(ids);
                }
                Err(e) => error!(%date, error = %e, "event modeling failed"),
            }
        }

        match self.link_evolution() {
            Ok(linked) => info!(events = linked, "modeled event evolution"),
            Err(e) => error!(error = %e, "event evolution linking failed"),
        }
        created
    }

    fn model_date(&self, date: NaiveDate, items: &[NewsItem]) -> StoreResult<Vec<String>> {
        let mut ids = Vec::new();
        for members in cluster::cluster_news(items, self.config.cluster_threshold) {
            let cluster: Vec<NewsItem> = members.iter().map(|&i| items[i].clone()).collect();
            let Some(event) = builder::build_event(self.store, date, &cluster) else {
                continue;
            };
            let event_id = event.id.clone();
            self.store.save_event(event)?;
            for mut news in cluster {
                if news.link_event(&event_id) {
                    self.store.save_news(news)?;
                }
            }
            ids.push(event_id);
        }
        Ok(ids)
    }

    /// Link evolution over the whole event collection and persist every
    /// event whose links were touched. Returns how many were touched.
    pub fn link_evolution(&self) -> StoreResult<usize> {
        let mut events = self.store.all_events();
        if events.len() < 2 {
            return Ok(0);
        }
        let touched = evolution::link_events(&mut events, self.config);
        for &idx in &touched {
            self.store.save_event(events[idx].clone())?;
        }
        Ok(touched.len())
    }
}

/// Bucket news by publication date, each bucket ordered by time then id.
fn group_by_date(news: Vec<NewsItem>) -> BTreeMap<NaiveDate, Vec<NewsItem>> {
    let mut groups: BTreeMap<NaiveDate, Vec<NewsItem>> = BTreeMap::new();
    for item in news {
        groups.entry(item.date()).or_default().push(item);
    }
    for items in groups.values_mut() {
        items.sort_by(|a, b| {
            a.published_at
                .cmp(&b.published_at)
                .then_with(|| a.id.cmp(&b.id))
        });
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Entity;
    use chrono::{TimeZone, Utc};

    #[test]
    fn groups_by_calendar_date() {
        let a = NewsItem::new("a", "", Utc.with_ymd_and_hms(2025, 3, 10, 23, 0, 0).unwrap());
        let b = NewsItem::new("b", "", Utc.with_ymd_and_hms(2025, 3, 10, 1, 0, 0).unwrap());
        let c = NewsItem::new("c", "", Utc.with_ymd_and_hms(2025, 3, 11, 1, 0, 0).unwrap());
        let groups = group_by_date(vec![a, b, c]);
        assert_eq!(groups.len(), 2);
        let first: Vec<&str> = groups
            .values()
            .next()
            .unwrap()
            .iter()
            .map(|n| n.title.as_str())
            .collect();
        assert_eq!(first, vec!["b", "a"]);
    }

    #[test]
    fn modeling_back_references_news() {
        let store = DataStore::memory_only();
        let config = EngineConfig::default();
        store.save_entity(Entity::with_id("e1", "Acme", "ORG")).unwrap();
        let at = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let news = NewsItem::new("Acme merger", "", at).with_entities(["e1"]);
        let news_id = news.id.clone();
        store.save_news(news).unwrap();

        let created = EventModeler::new(&store, &config).model_all();
        assert_eq!(created.len(), 1);
        assert_eq!(store.news(&news_id).unwrap().events, created);
    }

    #[test]
    fn rerun_does_not_duplicate_events() {
        let store = DataStore::memory_only();
        let config = EngineConfig::default();
        store.save_entity(Entity::with_id("e1", "Acme", "ORG")).unwrap();
        let news = NewsItem::new("Acme", "", Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap())
            .with_entities(["e1"]);
        store.save_news(news).unwrap();
        let modeler = EventModeler::new(&store, &config);
        assert_eq!(modeler.model_all().len(), 1);
        assert!(modeler.model_all().is_empty());
        assert_eq!(store.all_events().len(), 1);
    }

    #[test]
    fn unprocessed_news_is_ignored() {
        let store = DataStore::memory_only();
        let config = EngineConfig::default();
        store.save_entity(Entity::with_id("e1", "Acme", "ORG")).unwrap();
        let at = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let mut news = NewsItem::new("Acme", "", at).with_entities(["e1"]);
        news.processed = false;
        store.save_news(news).unwrap();
        assert!(EventModeler::new(&store, &config).model_all().is_empty());
    }
}
