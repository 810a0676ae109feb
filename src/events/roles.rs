//! Participant role heuristics.

use std::collections::HashSet;

use crate::model::{Entity, EntityRole};

const EXECUTIVE_TITLES: [&str; 4] = ["CEO", "CFO", "Chief", "Chairman"];
const REGULATORY_SUBTYPES: [&str; 3] = ["Regulator", "Central Bank", "Government"];

/// Subject/object mention counts of an entity within a set of news items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MentionPositions {
    pub subject: usize,
    pub object: usize,
}

/// Count, over mentions from `news_ids`, how often each sentence naming the
/// entity opens with that name (subject) versus names it later (object).
pub fn mention_positions(entity: &Entity, news_ids: &HashSet<&str>) -> MentionPositions {
    let name = entity.name.to_lowercase();
    let mut positions = MentionPositions::default();
    if name.is_empty() {
        return positions;
    }
    for mention in &entity.mentions {
        if !news_ids.contains(mention.news_id.as_str()) {
            continue;
        }
        let context = mention.context.to_lowercase();
        for sentence in context.split(['.', '!', '?']) {
            if !sentence.contains(&name) {
                continue;
            }
            if sentence.trim_start().starts_with(&name) {
                positions.subject += 1;
            } else {
                positions.object += 1;
            }
        }
    }
    positions
}

/// Role of `entity` in an event built from `news_ids`.
pub fn assign_role(entity: &Entity, news_ids: &HashSet<&str>) -> EntityRole {
    if entity.is_person() && EXECUTIVE_TITLES.iter().any(|t| entity.name.contains(t)) {
        return EntityRole::DecisionMaker;
    }
    if entity
        .subtype
        .as_deref()
        .is_some_and(|s| REGULATORY_SUBTYPES.contains(&s))
    {
        return EntityRole::Regulator;
    }
    let positions = mention_positions(entity, news_ids);
    match positions.subject.cmp(&positions.object) {
        std::cmp::Ordering::Greater => EntityRole::MainActor,
        std::cmp::Ordering::Less => EntityRole::AffectedEntity,
        std::cmp::Ordering::Equal => EntityRole::Participant,
    }
}
