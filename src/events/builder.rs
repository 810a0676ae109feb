//! Turn a news cluster into an [`Event`].

use std::collections::HashSet;

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use crate::model::{Entity, Event, EventType, NewsItem};
use crate::store::DataStore;

use super::cluster::classify_items;
use super::roles::assign_role;

/// Keyword patterns between two entity names, checked in order.
const TEMPORAL_CUES: [(&str, &str); 5] = [
    ("before", "preceded"),
    ("after", "followed"),
    ("following", "followed"),
    ("led to", "caused"),
    ("caused", "caused"),
];

/// `A`, `A and B`, `A, B, and C`, or `Financial markets`.
pub fn entity_phrase(names: &[&str]) -> String {
    match names {
        [] => "Financial markets".to_string(),
        [a] => (*a).to_string(),
        [a, b] => format!("{a} and {b}"),
        [a, b, c, ..] => format!("{a}, {b}, and {c}"),
    }
}

/// Build an event from one cluster of same-day news.
///
/// Returns `None` when none of the referenced entities resolve.
pub fn build_event(store: &DataStore, date: NaiveDate, cluster: &[NewsItem]) -> Option<Event> {
    let mut seen = HashSet::new();
    let mut entities: Vec<Entity> = Vec::new();
    for id in cluster.iter().flat_map(|n| n.entities.iter()) {
        if !seen.insert(id.as_str()) {
            continue;
        }
        match store.entity(id) {
            Some(entity) => entities.push(entity),
            None => debug!(entity = %id, "skipping unresolved entity reference"),
        }
    }
    if entities.is_empty() {
        return None;
    }
    // Stable: equally mentioned entities keep first-seen order.
    entities.sort_by(|a, b| b.mention_count().cmp(&a.mention_count()));

    let event_type = classify_items(cluster);
    let (title, description) = title_and_description(cluster, &entities, event_type);

    let mut event = Event::new(title, description, event_type, date);
    let news_ids: HashSet<&str> = cluster.iter().map(|n| n.id.as_str()).collect();
    for entity in &entities {
        event.add_entity(&entity.id, assign_role(entity, &news_ids));
    }
    add_relationships(store, &mut event, &entities, cluster);
    event.news_sources = cluster.iter().map(|n| n.id.clone()).collect();
    Some(event)
}

fn title_and_description(
    cluster: &[NewsItem],
    entities: &[Entity],
    event_type: EventType,
) -> (String, String) {
    let names: Vec<&str> = entities.iter().take(3).map(|e| e.name.as_str()).collect();
    let phrase = entity_phrase(&names);
    let display = event_type.display_name();
    let title = format!("{display} Event: {phrase}");

    let mut recent: Vec<&NewsItem> = cluster.iter().collect();
    recent.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    let mut used = HashSet::new();
    let parts: Vec<&str> = recent
        .into_iter()
        .take(3)
        .map(|n| n.title.as_str())
        .filter(|t| !t.is_empty() && used.insert(*t))
        .collect();

    let description = if parts.is_empty() {
        format!(
            "Event involving {phrase} related to {}",
            display.to_lowercase()
        )
    } else {
        parts.join(" | ")
    };
    (title, description)
}

/// Copy stored relationships among participants, then add temporal
/// relations detected from keyword cues between entity names.
fn add_relationships(
    store: &DataStore,
    event: &mut Event,
    entities: &[Entity],
    cluster: &[NewsItem],
) {
    for rel in store.relationships_between(&event.entities) {
        event.add_relationship(rel.source_id, rel.target_id, rel.rel_type);
    }

    for (i, first) in entities.iter().enumerate() {
        for second in &entities[i + 1..] {
            let relation = cluster
                .iter()
                .filter(|n| n.entities.contains(&first.id) && n.entities.contains(&second.id))
                .find_map(|n| temporal_relation(&first.name, &second.name, &n.text()));
            if let Some(label) = relation {
                event.add_relationship(first.id.clone(), second.id.clone(), label);
            }
        }
    }
}

/// Temporal label when `first ... cue ... second` appears in `text`.
pub fn temporal_relation(first: &str, second: &str, text: &str) -> Option<&'static str> {
    let text = text.to_lowercase();
    let a = regex::escape(&first.to_lowercase());
    let b = regex::escape(&second.to_lowercase());
    TEMPORAL_CUES.iter().find_map(|(cue, label)| {
        let pattern = format!(r"{a}.*{}.*{b}", regex::escape(cue));
        match Regex::new(&pattern) {
            Ok(re) if re.is_match(&text) => Some(*label),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Relationship;
    use chrono::{TimeZone, Utc};

    fn at(hour: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, 0, 0).unwrap()
    }

    #[test]
    fn entity_phrase_forms() {
        assert_eq!(entity_phrase(&[]), "Financial markets");
        assert_eq!(entity_phrase(&["A"]), "A");
        assert_eq!(entity_phrase(&["A", "B"]), "A and B");
        assert_eq!(entity_phrase(&["A", "B", "C", "D"]), "A, B, and C");
    }

    #[test]
    fn temporal_cues_in_order() {
        assert_eq!(
            temporal_relation("Fed", "Bank X", "The Fed hiked rates before Bank X cut lending"),
            Some("preceded")
        );
        assert_eq!(
            temporal_relation("Acme", "Globex", "Acme stock fell following Globex results"),
            Some("followed")
        );
        assert_eq!(
            temporal_relation("Acme", "Globex", "Globex fell after Acme results"),
            None
        );
    }

    #[test]
    fn builds_event_with_roles_and_relations() {
        let store = DataStore::memory_only();
        let mut bank = Entity::with_id("bank", "Bank X", "ORG").with_subtype("Bank");
        bank.add_mention("n1", "Bank X faces a probe.", 0.9);
        bank.add_mention("n2", "Bank X responds.", 0.9);
        let reg = Entity::with_id("reg", "Regulator Y", "ORG").with_subtype("Regulator");
        store.save_entity(bank).unwrap();
        store.save_entity(reg).unwrap();
        store
            .save_relationship(Relationship::new("reg", "bank", "investigates"))
            .unwrap();

        let mut n1 = NewsItem::new("Probe opened", "Regulator Y opens lawsuit", at(9))
            .with_entities(["bank", "reg", "ghost"]);
        n1.id = "n1".into();
        let mut n2 = NewsItem::new("Bank responds", "Bank X after Regulator Y court date", at(11))
            .with_entities(["bank", "reg"]);
        n2.id = "n2".into();

        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let event = build_event(&store, date, &[n1, n2]).unwrap();

        assert_eq!(event.entities, vec!["bank".to_string(), "reg".to_string()]);
        assert_eq!(event.title, "Regulatory/Legal Event: Bank X and Regulator Y");
        assert_eq!(event.description, "Bank responds | Probe opened");
        assert_eq!(event.role_of("bank"), crate::model::EntityRole::MainActor);
        assert_eq!(event.role_of("reg"), crate::model::EntityRole::Regulator);
        assert!(event.relationships.iter().any(|r| r.rel_type == "investigates"));
        assert!(
            event
                .relationships
                .iter()
                .any(|r| r.source_id == "bank" && r.target_id == "reg" && r.rel_type == "followed")
        );
        assert_eq!(event.news_sources, vec!["n1".to_string(), "n2".to_string()]);
    }

    #[test]
    fn unresolved_cluster_yields_nothing() {
        let store = DataStore::memory_only();
        let news = NewsItem::new("t", "c", at(9)).with_entities(["ghost"]);
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert!(build_event(&store, date, &[news]).is_none());
    }
}
