//! Aggregate statistics over the stored risks.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{Risk, RiskType};
use crate::store::DataStore;

const TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub name: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeverityShare {
    pub level: u8,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityExposure {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub subtype: Option<String>,
    pub risk_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSummary {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub risk_type: RiskType,
    pub severity: u8,
    pub likelihood: f64,
}

/// Risk counts for one calendar date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyRisks {
    pub total: usize,
    pub by_category: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RiskMetrics {
    pub total_risks: usize,
    /// Sorted by count, largest first.
    pub risk_categories: Vec<CategoryShare>,
    /// Levels 1 through 5, always present.
    pub severity_distribution: Vec<SeverityShare>,
    pub entity_risk_exposure: Vec<EntityExposure>,
    pub highest_severity_risks: Vec<RiskSummary>,
    /// Risk category to event type to count of linked events.
    pub risk_event_correlation: BTreeMap<String, BTreeMap<String, usize>>,
    pub risk_over_time: BTreeMap<NaiveDate, DailyRisks>,
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 * 1000.0 / total as f64).round() / 10.0
}

/// Compute [`RiskMetrics`] over every stored risk.
pub fn compute(store: &DataStore) -> RiskMetrics {
    let risks = store.all_risks();
    let total = risks.len();
    if total == 0 {
        return RiskMetrics::default();
    }

    let mut risk_categories: Vec<CategoryShare> = RiskType::ALL
        .iter()
        .map(|&t| (t, risks.iter().filter(|r| r.risk_type == t).count()))
        .filter(|&(_, count)| count > 0)
        .map(|(t, count)| CategoryShare {
            name: t.category().to_string(),
            count,
            percentage: percentage(count, total),
        })
        .collect();
    risk_categories.sort_by(|a, b| b.count.cmp(&a.count));

    let severity_distribution = (1..=5u8)
        .map(|level| {
            let count = risks.iter().filter(|r| r.severity == level).count();
            SeverityShare {
                level,
                count,
                percentage: percentage(count, total),
            }
        })
        .collect();

    RiskMetrics {
        total_risks: total,
        risk_categories,
        severity_distribution,
        entity_risk_exposure: entity_exposure(store, &risks),
        highest_severity_risks: highest_severity(&risks),
        risk_event_correlation: event_correlation(store, &risks),
        risk_over_time: over_time(store, &risks),
    }
}

fn entity_exposure(store: &DataStore, risks: &[Risk]) -> Vec<EntityExposure> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for risk in risks {
        for entity_id in &risk.entities {
            *counts.entry(entity_id.as_str()).or_default() += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .filter_map(|(id, risk_count)| {
            let entity = store.entity(id)?;
            Some(EntityExposure {
                id: entity.id,
                name: entity.name,
                entity_type: entity.entity_type,
                subtype: entity.subtype,
                risk_count,
            })
        })
        .take(TOP_N)
        .collect()
}

fn highest_severity(risks: &[Risk]) -> Vec<RiskSummary> {
    let mut sorted: Vec<&Risk> = risks.iter().collect();
    sorted.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| b.likelihood.total_cmp(&a.likelihood))
    });
    sorted
        .into_iter()
        .take(TOP_N)
        .map(|r| RiskSummary {
            id: r.id.clone(),
            title: r.title.clone(),
            risk_type: r.risk_type,
            severity: r.severity,
            likelihood: r.likelihood,
        })
        .collect()
}

fn event_correlation(
    store: &DataStore,
    risks: &[Risk],
) -> BTreeMap<String, BTreeMap<String, usize>> {
    let mut out: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    for risk in risks {
        let row = out.entry(risk.risk_type.category().to_string()).or_default();
        for event in risk.events.iter().filter_map(|id| store.event(id)) {
            *row.entry(event.event_type.as_str().to_string()).or_default() += 1;
        }
    }
    out
}

/// Buckets by the date of each risk's first resolvable event, falling back
/// to its creation date.
fn over_time(store: &DataStore, risks: &[Risk]) -> BTreeMap<NaiveDate, DailyRisks> {
    let mut event_dates: HashMap<String, NaiveDate> = HashMap::new();
    let mut out: BTreeMap<NaiveDate, DailyRisks> = BTreeMap::new();
    for risk in risks {
        let date = risk
            .events
            .iter()
            .find_map(|id| {
                if let Some(date) = event_dates.get(id) {
                    return Some(*date);
                }
                let date = store.event(id)?.event_date;
                event_dates.insert(id.clone(), date);
                Some(date)
            })
            .unwrap_or_else(|| risk.created_at.date_naive());
        let bucket = out.entry(date).or_default();
        bucket.total += 1;
        *bucket
            .by_category
            .entry(risk.risk_type.category().to_string())
            .or_default() += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, Event, EventType};

    fn risk(id: &str, risk_type: RiskType, severity: u8, entities: &[&str]) -> Risk {
        let mut r = Risk::new(id, "", risk_type, severity, 0.3);
        r.id = id.to_string();
        for e in entities {
            r.add_entity(e, 0.5);
        }
        r
    }

    #[test]
    fn empty_store_has_zero_totals() {
        let metrics = compute(&DataStore::memory_only());
        assert_eq!(metrics.total_risks, 0);
        assert!(metrics.risk_categories.is_empty());
    }

    #[test]
    fn categories_and_severity_shares() {
        let store = DataStore::memory_only();
        store.save_entity(Entity::with_id("bank", "Bank X", "ORG")).unwrap();
        store.save_risk(risk("a", RiskType::Market, 2, &["bank"])).unwrap();
        store.save_risk(risk("b", RiskType::Market, 5, &["bank"])).unwrap();
        store.save_risk(risk("c", RiskType::Credit, 2, &["ghost"])).unwrap();

        let m = compute(&store);
        assert_eq!(m.total_risks, 3);
        assert_eq!(m.risk_categories[0].name, "Market Risk");
        assert_eq!(m.risk_categories[0].count, 2);
        assert_eq!(m.risk_categories[0].percentage, 66.7);
        assert_eq!(m.risk_categories[1].percentage, 33.3);
        assert_eq!(m.severity_distribution.len(), 5);
        assert_eq!(m.severity_distribution[1].count, 2);
        assert_eq!(m.severity_distribution[0].percentage, 0.0);
        assert_eq!(m.highest_severity_risks[0].id, "b");
        assert_eq!(m.entity_risk_exposure.len(), 1);
        assert_eq!(m.entity_risk_exposure[0].risk_count, 2);
    }

    #[test]
    fn correlates_risk_categories_with_event_types() {
        let store = DataStore::memory_only();
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let mut event = Event::new("e", "", EventType::MergerAcquisition, date);
        event.id = "ev".into();
        store.save_event(event).unwrap();
        let mut r = risk("a", RiskType::Strategic, 2, &[]);
        r.add_event("ev", 1.0);
        store.save_risk(r).unwrap();

        let m = compute(&store);
        assert_eq!(m.risk_event_correlation["Strategic Risk"]["merger_acquisition"], 1);
        assert_eq!(m.risk_over_time[&date].total, 1);
    }
}
