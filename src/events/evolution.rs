//! Predecessor/successor linking of events across a rolling window.

use std::collections::HashSet;

use chrono::Duration;

use crate::config::EngineConfig;
use crate::model::{Event, EvolutionLink};
use crate::rules::event_types;
use crate::similarity::jaccard;

/// Combined similarity: weighted entity overlap plus weighted type equality.
pub fn event_similarity(a: &Event, b: &Event, entity_weight: f64) -> f64 {
    let ea: HashSet<&str> = a.entities.iter().map(String::as_str).collect();
    let eb: HashSet<&str> = b.entities.iter().map(String::as_str).collect();
    let type_match = if a.event_type == b.event_type { 1.0 } else { 0.0 };
    entity_weight * jaccard(&ea, &eb) + (1.0 - entity_weight) * type_match
}

/// Label for an `earlier -> later` link.
///
/// A known cause-effect type pair wins; otherwise heavy entity carry-over
/// yields `continues` (same type) or `evolves_into`; otherwise `follows`.
pub fn relation_label(earlier: &Event, later: &Event, continuation_overlap: f64) -> String {
    if let Some(label) = event_types::cause_effect(earlier.event_type, later.event_type) {
        return label.to_string();
    }
    let before: HashSet<&str> = earlier.entities.iter().map(String::as_str).collect();
    let after: HashSet<&str> = later.entities.iter().map(String::as_str).collect();
    let shared = before.intersection(&after).count();
    if shared as f64 > continuation_overlap * before.len() as f64 {
        if earlier.event_type == later.event_type {
            return "continues".to_string();
        }
        return "evolves_into".to_string();
    }
    "follows".to_string()
}

/// Link every event to its strictly earlier predecessors inside the window.
///
/// Events are sorted by date in place. Links are upserted on both sides, so
/// rerunning over unchanged events changes nothing. Returns the indices of
/// events that received at least one link.
pub fn link_events(events: &mut [Event], config: &EngineConfig) -> Vec<usize> {
    events.sort_by(|a, b| a.event_date.cmp(&b.event_date).then_with(|| a.id.cmp(&b.id)));
    let window = Duration::try_days(config.evolution_window_days);

    let mut links = Vec::new();
    for i in 1..events.len() {
        let later = &events[i];
        // `None` when the window reaches past the calendar: no lower bound.
        let earliest = window.and_then(|w| later.event_date.checked_sub_signed(w));
        for earlier in &events[..i] {
            if earlier.event_date >= later.event_date {
                continue;
            }
            if earliest.is_some_and(|earliest| earlier.event_date < earliest) {
                continue;
            }
            let similarity = event_similarity(later, earlier, config.evolution_entity_weight);
            if similarity < config.evolution_threshold {
                continue;
            }
            let relation = relation_label(earlier, later, config.continuation_overlap);
            links.push((earlier.id.clone(), i, relation, similarity));
        }
    }

    let mut touched = HashSet::new();
    for (earlier_id, later_idx, relation, similarity) in links {
        let later_id = events[later_idx].id.clone();
        events[later_idx].upsert_predecessor(EvolutionLink {
            event_id: earlier_id.clone(),
            relation: relation.clone(),
            similarity,
        });
        touched.insert(later_idx);
        if let Some(idx) = events.iter().position(|e| e.id == earlier_id) {
            events[idx].upsert_successor(EvolutionLink {
                event_id: later_id,
                relation,
                similarity,
            });
            touched.insert(idx);
        }
    }
    let mut touched: Vec<usize> = touched.into_iter().collect();
    touched.sort_unstable();
    touched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventType;
    use chrono::NaiveDate;

    fn event(id: &str, day: u32, event_type: EventType, entities: &[&str]) -> Event {
        let mut e = Event::new(id, "", event_type, NaiveDate::from_ymd_opt(2025, 3, day).unwrap());
        e.id = id.to_string();
        e.entities = entities.iter().map(|s| s.to_string()).collect();
        e
    }

    #[test]
    fn similarity_weights_entities_and_type() {
        let a = event("a", 1, EventType::MarketMovement, &["x", "y"]);
        let b = event("b", 2, EventType::MarketMovement, &["y", "z"]);
        let expected = 0.7 * (1.0 / 3.0) + 0.3;
        assert!((event_similarity(&a, &b, 0.7) - expected).abs() < 1e-12);
    }

    #[test]
    fn cause_effect_label_takes_precedence() {
        let policy = event("a", 1, EventType::MonetaryPolicy, &["fed", "bank"]);
        let market = event("b", 2, EventType::MarketMovement, &["fed", "bank"]);
        assert_eq!(relation_label(&policy, &market, 0.7), "causes");
    }

    #[test]
    fn overlap_labels() {
        let a = event("a", 1, EventType::DebtFinancing, &["x", "y"]);
        let same = event("b", 2, EventType::DebtFinancing, &["x", "y", "z"]);
        let other = event("c", 2, EventType::EquityFinancing, &["x", "y"]);
        let thin = event("d", 2, EventType::EquityFinancing, &["x", "q", "r"]);
        assert_eq!(relation_label(&a, &same, 0.7), "continues");
        assert_eq!(relation_label(&a, &other, 0.7), "evolves_into");
        assert_eq!(relation_label(&a, &thin, 0.7), "follows");
    }

    #[test]
    fn links_only_strictly_earlier_events_within_window() {
        let config = EngineConfig::default();
        let mut events = vec![
            event("late", 19, EventType::MarketMovement, &["x"]),
            event("same_day", 10, EventType::MarketMovement, &["x"]),
            event("base", 10, EventType::MarketMovement, &["x"]),
            event("next", 12, EventType::MarketMovement, &["x"]),
        ];
        link_events(&mut events, &config);
        let by_id = |id: &str| events.iter().find(|e| e.id == id).unwrap().clone();

        let base = by_id("base");
        let same_day = by_id("same_day");
        assert!(base.predecessors.is_empty());
        assert!(same_day.predecessors.is_empty());

        let next = by_id("next");
        let preds: Vec<&str> = next.predecessors.iter().map(|l| l.event_id.as_str()).collect();
        assert_eq!(preds, vec!["base", "same_day"]);
        assert_eq!(next.predecessors[0].relation, "continues");

        // The 19th is within seven days of the 12th but not of the 10th.
        let late = by_id("late");
        let preds: Vec<&str> = late.predecessors.iter().map(|l| l.event_id.as_str()).collect();
        assert_eq!(preds, vec!["next"]);
        assert_eq!(by_id("base").successors.len(), 1);
    }

    #[test]
    fn relinking_is_idempotent() {
        let config = EngineConfig::default();
        let mut events = vec![
            event("a", 1, EventType::MarketMovement, &["x"]),
            event("b", 2, EventType::MarketMovement, &["x"]),
        ];
        link_events(&mut events, &config);
        let once = events.clone();
        link_events(&mut events, &config);
        assert_eq!(events, once);
    }

    #[test]
    fn window_edge_is_inclusive() {
        let config = EngineConfig::default();
        let mut events = vec![
            event("start", 3, EventType::MarketMovement, &["x"]),
            event("edge", 10, EventType::MarketMovement, &["x"]),
            event("past", 11, EventType::MarketMovement, &["x"]),
        ];
        link_events(&mut events, &config);
        let preds = |id: &str| -> Vec<String> {
            events
                .iter()
                .find(|e| e.id == id)
                .unwrap()
                .predecessors
                .iter()
                .map(|l| l.event_id.clone())
                .collect()
        };
        // Seven days back from the 10th is the 3rd; the 11th is one day past it.
        assert_eq!(preds("edge"), vec!["start"]);
        assert_eq!(preds("past"), vec!["edge"]);
    }

    #[test]
    fn oversized_window_means_no_lower_bound() {
        let config = EngineConfig {
            evolution_window_days: i64::MAX,
            ..Default::default()
        };
        let mut events = vec![
            event("a", 10, EventType::MarketMovement, &["x"]),
            event("b", 12, EventType::MarketMovement, &["x"]),
        ];
        let touched = link_events(&mut events, &config);
        assert_eq!(touched, vec![0, 1]);
        assert_eq!(events[1].predecessors[0].event_id, "a");
    }
}
