//! Events: clusters of same-day news about the same entities.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Attributes, new_id};

/// Fixed event taxonomy. Declaration order is the classifier's tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    MarketMovement,
    CompanyFinancial,
    MergerAcquisition,
    CorporateGovernance,
    RegulatoryLegal,
    DebtFinancing,
    EquityFinancing,
    DividendCapitalReturn,
    EconomicIndicator,
    MonetaryPolicy,
    FiscalPolicy,
    InternationalTrade,
    Geopolitical,
    TechnologyInnovation,
    CommodityPrice,
}

impl EventType {
    pub const ALL: [EventType; 15] = [
        EventType::MarketMovement,
        EventType::CompanyFinancial,
        EventType::MergerAcquisition,
        EventType::CorporateGovernance,
        EventType::RegulatoryLegal,
        EventType::DebtFinancing,
        EventType::EquityFinancing,
        EventType::DividendCapitalReturn,
        EventType::EconomicIndicator,
        EventType::MonetaryPolicy,
        EventType::FiscalPolicy,
        EventType::InternationalTrade,
        EventType::Geopolitical,
        EventType::TechnologyInnovation,
        EventType::CommodityPrice,
    ];

    /// Stable snake_case identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::MarketMovement => "market_movement",
            EventType::CompanyFinancial => "company_financial",
            EventType::MergerAcquisition => "merger_acquisition",
            EventType::CorporateGovernance => "corporate_governance",
            EventType::RegulatoryLegal => "regulatory_legal",
            EventType::DebtFinancing => "debt_financing",
            EventType::EquityFinancing => "equity_financing",
            EventType::DividendCapitalReturn => "dividend_capital_return",
            EventType::EconomicIndicator => "economic_indicator",
            EventType::MonetaryPolicy => "monetary_policy",
            EventType::FiscalPolicy => "fiscal_policy",
            EventType::InternationalTrade => "international_trade",
            EventType::Geopolitical => "geopolitical",
            EventType::TechnologyInnovation => "technology_innovation",
            EventType::CommodityPrice => "commodity_price",
        }
    }

    /// Human-readable name used in event titles.
    pub fn display_name(self) -> &'static str {
        match self {
            EventType::MarketMovement => "Market Movement",
            EventType::CompanyFinancial => "Financial Results",
            EventType::MergerAcquisition => "Merger & Acquisition",
            EventType::CorporateGovernance => "Corporate Governance",
            EventType::RegulatoryLegal => "Regulatory/Legal",
            EventType::DebtFinancing => "Debt Financing",
            EventType::EquityFinancing => "Equity Financing",
            EventType::DividendCapitalReturn => "Dividend & Capital Return",
            EventType::EconomicIndicator => "Economic Indicator",
            EventType::MonetaryPolicy => "Monetary Policy",
            EventType::FiscalPolicy => "Fiscal Policy",
            EventType::InternationalTrade => "International Trade",
            EventType::Geopolitical => "Geopolitical",
            EventType::TechnologyInnovation => "Technology & Innovation",
            EventType::CommodityPrice => "Commodity Price",
        }
    }

    /// Identifier with underscores replaced and each word capitalised,
    /// e.g. `regulatory_legal` becomes `Regulatory Legal`.
    pub fn title_case(self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown event type: {s}"))
    }
}

/// Role an entity plays within one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityRole {
    #[default]
    Participant,
    MainActor,
    AffectedEntity,
    DecisionMaker,
    Regulator,
}

impl EntityRole {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityRole::Participant => "participant",
            EntityRole::MainActor => "main_actor",
            EntityRole::AffectedEntity => "affected_entity",
            EntityRole::DecisionMaker => "decision_maker",
            EntityRole::Regulator => "regulator",
        }
    }
}

impl fmt::Display for EntityRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity-to-entity triple scoped to one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRelation {
    pub source_id: String,
    pub target_id: String,
    #[serde(rename = "type")]
    pub rel_type: String,
}

/// One side of a predecessor/successor link between events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionLink {
    /// The event on the other end of the link.
    pub event_id: String,
    #[serde(rename = "type")]
    pub relation: String,
    pub similarity: f64,
}

/// A financial event synthesised from a cluster of news items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub event_type: EventType,
    pub event_date: NaiveDate,
    /// Participant entity ids, most-mentioned first.
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub roles: BTreeMap<String, EntityRole>,
    #[serde(default)]
    pub relationships: Vec<EventRelation>,
    #[serde(default)]
    pub news_sources: Vec<String>,
    /// Links to strictly earlier events.
    #[serde(default)]
    pub predecessors: Vec<EvolutionLink>,
    /// Links to strictly later events.
    #[serde(default)]
    pub successors: Vec<EvolutionLink>,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        event_type: EventType,
        event_date: NaiveDate,
    ) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            description: description.into(),
            event_type,
            event_date,
            entities: Vec::new(),
            roles: BTreeMap::new(),
            relationships: Vec::new(),
            news_sources: Vec::new(),
            predecessors: Vec::new(),
            successors: Vec::new(),
            attributes: Attributes::new(),
            created_at: Utc::now(),
        }
    }

    /// Add a participant. The first role recorded for an entity sticks.
    pub fn add_entity(&mut self, entity_id: &str, role: EntityRole) {
        if self.entities.iter().any(|e| e == entity_id) {
            return;
        }
        self.entities.push(entity_id.to_string());
        self.roles.insert(entity_id.to_string(), role);
    }

    /// Role of a participant, `Participant` when unrecorded.
    pub fn role_of(&self, entity_id: &str) -> EntityRole {
        self.roles.get(entity_id).copied().unwrap_or_default()
    }

    pub fn add_relationship(
        &mut self,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        rel_type: impl Into<String>,
    ) {
        self.relationships.push(EventRelation {
            source_id: source_id.into(),
            target_id: target_id.into(),
            rel_type: rel_type.into(),
        });
    }

    /// Insert or replace the predecessor link to `link.event_id`.
    pub fn upsert_predecessor(&mut self, link: EvolutionLink) {
        upsert_link(&mut self.predecessors, link);
    }

    /// Insert or replace the successor link to `link.event_id`.
    pub fn upsert_successor(&mut self, link: EvolutionLink) {
        upsert_link(&mut self.successors, link);
    }
}

fn upsert_link(links: &mut Vec<EvolutionLink>, link: EvolutionLink) {
    match links.iter_mut().find(|l| l.event_id == link.event_id) {
        Some(existing) => *existing = link,
        None => links.push(link),
    }
}
