//! Entities and the relationships between them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Attributes, new_id};

/// A single sighting of an entity in a news item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    /// News item the mention came from.
    pub news_id: String,
    /// Sentence or snippet around the mention.
    #[serde(default)]
    pub context: String,
    /// Extraction confidence in [0.0, 1.0].
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

fn default_confidence() -> f64 {
    1.0
}

/// A financial entity (company, regulator, person, product, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    /// Coarse category from extraction, e.g. `ORG`, `PERSON`, `PRODUCT`.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Domain refinement, e.g. `Bank`, `Regulator`, `Central Bank`.
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
    /// Mentions in arrival order; only ever appended to.
    #[serde(default)]
    pub mentions: Vec<Mention>,
}

impl Entity {
    /// Create an entity with a fresh id.
    pub fn new(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self::with_id(new_id(), name, entity_type)
    }

    /// Create an entity with a caller-supplied id.
    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        entity_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            entity_type: entity_type.into(),
            subtype: None,
            attributes: Attributes::new(),
            mentions: Vec::new(),
        }
    }

    /// Set the subtype.
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    /// Append a mention.
    pub fn add_mention(
        &mut self,
        news_id: impl Into<String>,
        context: impl Into<String>,
        confidence: f64,
    ) {
        self.mentions.push(Mention {
            news_id: news_id.into(),
            context: context.into(),
            confidence: confidence.clamp(0.0, 1.0),
            timestamp: Utc::now(),
        });
    }

    pub fn mention_count(&self) -> usize {
        self.mentions.len()
    }

    /// Subtype if present, otherwise the coarse type.
    pub fn category(&self) -> &str {
        self.subtype.as_deref().unwrap_or(&self.entity_type)
    }

    pub fn is_person(&self) -> bool {
        self.entity_type.eq_ignore_ascii_case("PERSON")
    }
}

/// Evidence that supports a relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub news_id: String,
    #[serde(default)]
    pub context: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

/// A directed, typed edge between two entities.
///
/// Many relationships may exist between the same pair with different types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(rename = "type")]
    pub rel_type: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub mentions: Vec<Evidence>,
}

impl Relationship {
    /// Create a relationship with a fresh id and full confidence.
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        rel_type: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            rel_type: rel_type.into(),
            confidence: 1.0,
            attributes: Attributes::new(),
            mentions: Vec::new(),
        }
    }

    /// Set the confidence score.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Record supporting evidence.
    pub fn add_mention(&mut self, news_id: impl Into<String>, context: impl Into<String>) {
        self.mentions.push(Evidence {
            news_id: news_id.into(),
            context: context.into(),
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_prefers_subtype() {
        let bank = Entity::new("Bank X", "ORG").with_subtype("Bank");
        assert_eq!(bank.category(), "Bank");
        let plain = Entity::new("Acme", "ORG");
        assert_eq!(plain.category(), "ORG");
    }

    #[test]
    fn deserializes_with_missing_optionals() {
        let json = r#"{"id":"e1","name":"SEC","type":"ORG"}"#;
        let entity: Entity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.name, "SEC");
        assert!(entity.subtype.is_none());
        assert!(entity.mentions.is_empty());
    }

    #[test]
    fn missing_name_is_malformed() {
        let json = r#"{"id":"e1","type":"ORG"}"#;
        assert!(serde_json::from_str::<Entity>(json).is_err());
    }

    #[test]
    fn relationship_confidence_clamped() {
        let rel = Relationship::new("a", "b", "owns").with_confidence(1.7);
        assert_eq!(rel.confidence, 1.0);
    }
}
