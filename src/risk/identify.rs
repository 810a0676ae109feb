//! Spawn risks from event text.

use tracing::debug;

use crate::model::{Event, Risk, RiskType};
use crate::rules::{propagation, risk_patterns};
use crate::store::DataStore;

/// `round(count / 2)` clamped to 1..=5.
pub fn severity_for(count: usize) -> u8 {
    (count as f64 / 2.0).round().clamp(1.0, 5.0) as u8
}

/// `count / 10` clamped to [0.1, 0.9].
pub fn likelihood_for(count: usize) -> f64 {
    (count as f64 / 10.0).clamp(0.1, 0.9)
}

/// Identify every risk category triggered by `event` and its source news.
///
/// Nothing is produced when none of the event's news items resolve.
pub fn identify_from_event(store: &DataStore, event: &Event, min_matches: usize) -> Vec<Risk> {
    let news: Vec<_> = event
        .news_sources
        .iter()
        .filter_map(|id| store.news(id))
        .collect();
    if news.is_empty() {
        debug!(event = %event.id, "no resolvable news, skipping risk identification");
        return Vec::new();
    }

    let mut text = format!("{} {} ", event.title, event.description);
    for item in &news {
        text.push_str(&item.title);
        text.push(' ');
        text.push_str(&item.content);
        text.push(' ');
    }
    let text = text.to_lowercase();

    risk_patterns::triggered(&text, min_matches)
        .into_iter()
        .map(|score| {
            let mut risk = Risk::new(
                risk_title(store, event, score.category),
                risk_description(event, score.category, &score.indicators),
                score.category,
                severity_for(score.count),
                likelihood_for(score.count),
            );
            risk.add_event(&event.id, 1.0);
            for entity_id in &event.entities {
                match store.entity(entity_id) {
                    Some(entity) => {
                        risk.add_entity(entity_id, propagation::impact(&entity, score.category))
                    }
                    None => debug!(entity = %entity_id, "skipping unresolved entity reference"),
                }
            }
            risk.impact_areas = score
                .category
                .impact_areas()
                .iter()
                .map(|s| s.to_string())
                .collect();
            risk
        })
        .collect()
}

/// `"{Category} for {A and B | Financial system} from {Event Type} Event"`.
fn risk_title(store: &DataStore, event: &Event, risk_type: RiskType) -> String {
    let names: Vec<String> = event
        .entities
        .iter()
        .take(2)
        .filter_map(|id| store.entity(id))
        .map(|e| e.name)
        .collect();
    let subject = if names.is_empty() {
        "Financial system".to_string()
    } else {
        names.join(" and ")
    };
    format!(
        "{} for {subject} from {} Event",
        risk_type.category(),
        event.event_type.title_case()
    )
}

fn risk_description(event: &Event, risk_type: RiskType, indicators: &[String]) -> String {
    let mut out = format!(
        "Risk identified from event: {}. Event details: {}. ",
        event.title, event.description
    );
    if !indicators.is_empty() {
        out.push_str(&format!("Risk indicators found: {}. ", indicators.join(", ")));
    }
    out.push_str(risk_type.explanation());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, EntityRole, EventType, NewsItem};
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn severity_and_likelihood_bounds() {
        assert_eq!(severity_for(2), 1);
        assert_eq!(severity_for(3), 2);
        assert_eq!(severity_for(6), 3);
        assert_eq!(severity_for(40), 5);
        assert_eq!(likelihood_for(0), 0.1);
        assert_eq!(likelihood_for(4), 0.4);
        assert_eq!(likelihood_for(20), 0.9);
    }

    fn fixture() -> (DataStore, Event) {
        let store = DataStore::memory_only();
        store
            .save_entity(Entity::with_id("bank", "Bank X", "ORG").with_subtype("Bank"))
            .unwrap();
        store
            .save_entity(Entity::with_id("reg", "Regulator Y", "ORG").with_subtype("Regulator"))
            .unwrap();
        let mut news = NewsItem::new(
            "Regulator Y announces regulatory change",
            "New compliance cost for Bank X; regulatory crackdown expected",
            Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap(),
        );
        news.id = "n1".into();
        store.save_news(news).unwrap();

        let mut event = Event::new(
            "Regulatory/Legal Event: Bank X and Regulator Y",
            "Regulator Y announces regulatory change",
            EventType::RegulatoryLegal,
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        );
        event.add_entity("bank", EntityRole::AffectedEntity);
        event.add_entity("reg", EntityRole::Regulator);
        event.add_entity("ghost", EntityRole::Participant);
        event.news_sources = vec!["n1".into()];
        (store, event)
    }

    #[test]
    fn regulatory_risk_with_table_impacts() {
        let (store, event) = fixture();
        let risks = identify_from_event(&store, &event, 2);
        let risk = risks
            .iter()
            .find(|r| r.risk_type == RiskType::Regulatory)
            .expect("regulatory risk");
        assert!(risk.severity >= 1);
        assert_eq!(risk.entity_impacts.get("bank"), Some(&0.9));
        assert_eq!(risk.entity_impacts.get("reg"), Some(&0.2));
        assert!(!risk.entities.contains(&"ghost".to_string()));
        assert_eq!(risk.events, vec![event.id.clone()]);
        assert_eq!(
            risk.title,
            "Regulatory Risk for Bank X and Regulator Y from Regulatory Legal Event"
        );
        assert!(risk.description.starts_with("Risk identified from event: "));
        assert!(risk.description.ends_with(RiskType::Regulatory.explanation()));
        assert_eq!(risk.impact_areas[0], "Regulatory Compliance");
    }

    #[test]
    fn event_without_news_yields_nothing() {
        let (store, mut event) = fixture();
        event.news_sources = vec!["missing".into()];
        assert!(identify_from_event(&store, &event, 2).is_empty());
    }
}
