//! Risks identified from events, and the relations between them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Attributes, new_id};

/// Fixed risk taxonomy, in hierarchy order (lowest rank first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskType {
    #[serde(rename = "Market Risk Event")]
    Market,
    #[serde(rename = "Credit Risk Event")]
    Credit,
    #[serde(rename = "Liquidity Risk Event")]
    Liquidity,
    #[serde(rename = "Operational Risk Event")]
    Operational,
    #[serde(rename = "Legal Risk Event")]
    Legal,
    #[serde(rename = "Strategic Risk Event")]
    Strategic,
    #[serde(rename = "Reputation Risk Event")]
    Reputation,
    #[serde(rename = "Regulatory Risk Event")]
    Regulatory,
}

impl RiskType {
    pub const ALL: [RiskType; 8] = [
        RiskType::Market,
        RiskType::Credit,
        RiskType::Liquidity,
        RiskType::Operational,
        RiskType::Legal,
        RiskType::Strategic,
        RiskType::Reputation,
        RiskType::Regulatory,
    ];

    /// Full label, e.g. `Market Risk Event`.
    pub fn label(self) -> &'static str {
        match self {
            RiskType::Market => "Market Risk Event",
            RiskType::Credit => "Credit Risk Event",
            RiskType::Liquidity => "Liquidity Risk Event",
            RiskType::Operational => "Operational Risk Event",
            RiskType::Legal => "Legal Risk Event",
            RiskType::Strategic => "Strategic Risk Event",
            RiskType::Reputation => "Reputation Risk Event",
            RiskType::Regulatory => "Regulatory Risk Event",
        }
    }

    /// Label without the trailing ` Event`, as used in risk titles.
    pub fn category(self) -> &'static str {
        let label = self.label();
        label.strip_suffix(" Event").unwrap_or(label)
    }

    /// Position in the transmission hierarchy, 1 (Market) to 8 (Regulatory).
    /// A lower-ranked risk may cause a higher-ranked one.
    pub fn rank(self) -> u8 {
        match self {
            RiskType::Market => 1,
            RiskType::Credit => 2,
            RiskType::Liquidity => 3,
            RiskType::Operational => 4,
            RiskType::Legal => 5,
            RiskType::Strategic => 6,
            RiskType::Reputation => 7,
            RiskType::Regulatory => 8,
        }
    }

    pub fn explanation(self) -> &'static str {
        match self {
            RiskType::Market => {
                "Market risk involves potential losses due to market movements and volatility."
            }
            RiskType::Credit => {
                "Credit risk involves potential losses due to counterparty default or credit deterioration."
            }
            RiskType::Liquidity => {
                "Liquidity risk involves potential losses or operational issues due to inability to meet cash flow needs."
            }
            RiskType::Operational => {
                "Operational risk involves potential losses due to failed internal processes, people, systems, or external events."
            }
            RiskType::Legal => {
                "Legal risk involves potential losses due to legal actions, regulatory violations, or contractual issues."
            }
            RiskType::Strategic => {
                "Strategic risk involves potential losses due to failed business decisions or implementation."
            }
            RiskType::Reputation => {
                "Reputation risk involves potential losses due to damage to company image or brand."
            }
            RiskType::Regulatory => {
                "Regulatory risk involves potential losses due to regulatory changes or compliance failures."
            }
        }
    }

    pub fn impact_areas(self) -> [&'static str; 3] {
        match self {
            RiskType::Market => [
                "Financial Markets",
                "Investment Performance",
                "Asset Valuations",
            ],
            RiskType::Credit => [
                "Debt Servicing",
                "Counterparty Exposure",
                "Credit Ratings",
            ],
            RiskType::Liquidity => ["Cash Flow", "Funding Access", "Asset Liquidity"],
            RiskType::Operational => [
                "Business Operations",
                "Systems & Technology",
                "People & Process",
            ],
            RiskType::Legal => ["Legal Liability", "Compliance", "Corporate Governance"],
            RiskType::Strategic => [
                "Business Strategy",
                "Competitive Position",
                "Business Model",
            ],
            RiskType::Reputation => ["Brand Value", "Customer Trust", "Public Perception"],
            RiskType::Regulatory => [
                "Regulatory Compliance",
                "Policy Environment",
                "Licensing",
            ],
        }
    }
}

impl fmt::Display for RiskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RiskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RiskType::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(s) || t.category().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown risk type: {s}"))
    }
}

/// Label on a risk-to-risk edge, read from the owning risk's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskRelation {
    /// Both risks affect at least one common entity.
    CorrelatedWith,
    MayCause,
    MayBeCausedBy,
    MayInfluence,
    RelatedTo,
}

impl RiskRelation {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskRelation::CorrelatedWith => "correlated_with",
            RiskRelation::MayCause => "may_cause",
            RiskRelation::MayBeCausedBy => "may_be_caused_by",
            RiskRelation::MayInfluence => "may_influence",
            RiskRelation::RelatedTo => "related_to",
        }
    }

    /// The label as seen from the other risk.
    pub fn inverse(self) -> Self {
        match self {
            RiskRelation::MayCause => RiskRelation::MayBeCausedBy,
            RiskRelation::MayBeCausedBy => RiskRelation::MayCause,
            other => other,
        }
    }
}

impl fmt::Display for RiskRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A financial risk spawned from one or more events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub risk_type: RiskType,
    /// 1 (lowest) to 5 (highest).
    pub severity: u8,
    /// Probability in [0.0, 1.0].
    pub likelihood: f64,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub entity_impacts: BTreeMap<String, f64>,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub event_correlations: BTreeMap<String, f64>,
    #[serde(default)]
    pub related_risks: Vec<String>,
    #[serde(default)]
    pub risk_relationships: BTreeMap<String, RiskRelation>,
    /// Shared-entity correlation with other risks, stored on both sides.
    #[serde(default)]
    pub correlations: BTreeMap<String, f64>,
    /// Entity-path transmission strength to other risks, stored on both sides.
    #[serde(default)]
    pub transmissions: BTreeMap<String, f64>,
    /// Shortest entity chain to each transmission partner.
    #[serde(default)]
    pub transmission_paths: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub impact_areas: Vec<String>,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Risk {
    /// Create a risk; severity is clamped to 1..=5 and likelihood to [0, 1].
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        risk_type: RiskType,
        severity: u8,
        likelihood: f64,
    ) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            description: description.into(),
            risk_type,
            severity: severity.clamp(1, 5),
            likelihood: likelihood.clamp(0.0, 1.0),
            entities: Vec::new(),
            entity_impacts: BTreeMap::new(),
            events: Vec::new(),
            event_correlations: BTreeMap::new(),
            related_risks: Vec::new(),
            risk_relationships: BTreeMap::new(),
            correlations: BTreeMap::new(),
            transmissions: BTreeMap::new(),
            transmission_paths: BTreeMap::new(),
            impact_areas: Vec::new(),
            attributes: Attributes::new(),
            created_at: Utc::now(),
        }
    }

    pub fn add_entity(&mut self, entity_id: &str, impact: f64) {
        if self.entities.iter().any(|e| e == entity_id) {
            return;
        }
        self.entities.push(entity_id.to_string());
        self.entity_impacts
            .insert(entity_id.to_string(), impact.clamp(0.0, 1.0));
    }

    pub fn add_event(&mut self, event_id: &str, correlation: f64) {
        if self.events.iter().any(|e| e == event_id) {
            return;
        }
        self.events.push(event_id.to_string());
        self.event_correlations
            .insert(event_id.to_string(), correlation.clamp(0.0, 1.0));
    }

    /// Record a related risk. The first label recorded for a risk sticks.
    pub fn add_related_risk(&mut self, risk_id: &str, relation: RiskRelation) {
        if self.related_risks.iter().any(|r| r == risk_id) {
            return;
        }
        self.related_risks.push(risk_id.to_string());
        self.risk_relationships.insert(risk_id.to_string(), relation);
    }

    /// Impact weight on an entity, 1.0 when unrecorded.
    pub fn impact_on(&self, entity_id: &str) -> f64 {
        self.entity_impacts.get(entity_id).copied().unwrap_or(1.0)
    }

    /// Correlation with a triggering event, 1.0 when unrecorded.
    pub fn correlation_with_event(&self, event_id: &str) -> f64 {
        self.event_correlations
            .get(event_id)
            .copied()
            .unwrap_or(1.0)
    }

    pub fn relation_to(&self, risk_id: &str) -> RiskRelation {
        self.risk_relationships
            .get(risk_id)
            .copied()
            .unwrap_or(RiskRelation::RelatedTo)
    }

    /// Strongest recorded link weight to another risk: correlation, then
    /// transmission strength, then 0.5.
    pub fn link_weight(&self, risk_id: &str) -> f64 {
        self.correlations
            .get(risk_id)
            .or_else(|| self.transmissions.get(risk_id))
            .copied()
            .unwrap_or(0.5)
    }
}
