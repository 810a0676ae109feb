//! Risk identification and risk-to-risk transmission.

pub mod identify;
pub mod metrics;
pub mod paths;
pub mod transmission;

use std::collections::HashSet;

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::store::{DataStore, StoreResult};

use self::transmission::{EntityGraph, TransmissionSummary};

/// Drives risk identification and transmission modeling over a [`DataStore`].
pub struct RiskAnalyzer<'a> {
    store: &'a DataStore,
    config: &'a EngineConfig,
}

impl<'a> RiskAnalyzer<'a> {
    pub fn new(store: &'a DataStore, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    /// Identify risks for every event that no stored risk references yet,
    /// then recompute transmission across all risks.
    /// Returns the ids of newly created risks.
    pub fn identify_all(&self) -> StoreResult<Vec<String>> {
        let covered: HashSet<String> = self
            .store
            .all_risks()
            .into_iter()
            .flat_map(|r| r.events)
            .collect();

        let mut created = Vec::new();
        for event in self.store.all_events() {
            if covered.contains(&event.id) {
                debug!(event = %event.id, "risks already identified");
                continue;
            }
            let risks =
                identify::identify_from_event(self.store, &event, self.config.min_risk_matches);
            if !risks.is_empty() {
                info!(event = %event.id, risks = risks.len(), "identified risks");
            }
            for risk in risks {
                created.push(risk.id.clone());
                self.store.save_risk(risk)?;
            }
        }

        let summary = self.model_transmission()?;
        info!(
            created = created.len(),
            correlated = summary.correlated,
            transmitted = summary.transmitted,
            "risk identification complete"
        );
        Ok(created)
    }

    /// Recompute correlations and transmissions for every stored risk pair.
    pub fn model_transmission(&self) -> StoreResult<TransmissionSummary> {
        let mut risks = self.store.all_risks();
        if risks.len() < 2 {
            return Ok(TransmissionSummary::default());
        }
        let graph = EntityGraph::from_relationships(&self.store.all_relationships());
        let summary = transmission::model_transmission(&mut risks, &graph);
        for risk in risks {
            self.store.save_risk(risk)?;
        }
        Ok(summary)
    }

    pub fn transmission_paths(&self) -> Vec<paths::RiskPathStep> {
        paths::transmission_paths(self.store)
    }

    pub fn risk_path(&self, source_id: &str, target_id: &str) -> Vec<paths::RiskPathStep> {
        paths::risk_path(self.store, source_id, target_id)
    }

    pub fn metrics(&self) -> metrics::RiskMetrics {
        metrics::compute(self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, EntityRole, Event, EventType, NewsItem};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn seeded() -> DataStore {
        let store = DataStore::memory_only();
        store
            .save_entity(Entity::with_id("bank", "Bank X", "ORG").with_subtype("Bank"))
            .unwrap();
        let mut news = NewsItem::new(
            "Bank X faces default risk",
            "Credit rating downgrade and bankruptcy fears; market crash and stock volatility",
            Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap(),
        )
        .with_entities(["bank"]);
        news.id = "n1".into();
        store.save_news(news).unwrap();
        let mut event = Event::new(
            "Market Movement Event: Bank X",
            "Bank X faces default risk",
            EventType::MarketMovement,
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        );
        event.add_entity("bank", EntityRole::MainActor);
        event.news_sources = vec!["n1".into()];
        store.save_event(event).unwrap();
        store
    }

    #[test]
    fn identifies_once_per_event() {
        let store = seeded();
        let config = EngineConfig::default();
        let analyzer = RiskAnalyzer::new(&store, &config);
        let first = analyzer.identify_all().unwrap();
        assert!(!first.is_empty());
        assert!(analyzer.identify_all().unwrap().is_empty());
        assert_eq!(store.all_risks().len(), first.len());
    }

    #[test]
    fn risks_from_one_event_correlate() {
        let store = seeded();
        let config = EngineConfig::default();
        let created = RiskAnalyzer::new(&store, &config).identify_all().unwrap();
        assert_eq!(created.len(), 2);
        let risk = store.risk(&created[0]).unwrap();
        assert_eq!(risk.correlations.get(&created[1]), Some(&1.0));
    }
}
