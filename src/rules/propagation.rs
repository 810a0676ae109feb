//! Propagation table: how strongly a risk category lands on an entity category.

use crate::model::{Entity, RiskType};

/// Fallback impact when neither the category nor `DEFAULT_<type>` has a row.
pub const DEFAULT_IMPACT: f64 = 0.5;

/// Row order: Market, Credit, Liquidity, Operational, Legal, Strategic,
/// Reputation, Regulatory (the `RiskType` declaration order).
const PROPAGATION: &[(&str, [f64; 8])] = &[
    ("Company", [0.7, 0.8, 0.8, 0.9, 0.7, 0.9, 0.8, 0.7]),
    ("Bank", [0.8, 0.9, 0.9, 0.8, 0.7, 0.7, 0.9, 0.9]),
    ("Insurance", [0.7, 0.6, 0.7, 0.8, 0.8, 0.7, 0.8, 0.8]),
    ("Asset Manager", [0.9, 0.6, 0.8, 0.7, 0.6, 0.8, 0.9, 0.7]),
    ("Regulator", [0.3, 0.3, 0.3, 0.6, 0.4, 0.5, 0.7, 0.2]),
    ("Central Bank", [0.5, 0.4, 0.5, 0.6, 0.5, 0.6, 0.8, 0.4]),
    ("Government", [0.6, 0.7, 0.5, 0.6, 0.5, 0.7, 0.8, 0.4]),
    ("Exchange", [0.9, 0.5, 0.8, 0.9, 0.6, 0.7, 0.8, 0.8]),
    ("DEFAULT_ORG", [0.7, 0.7, 0.6, 0.8, 0.7, 0.8, 0.8, 0.7]),
    ("DEFAULT_PERSON", [0.3, 0.3, 0.2, 0.4, 0.7, 0.5, 0.8, 0.3]),
    ("DEFAULT_PRODUCT", [0.8, 0.5, 0.7, 0.6, 0.5, 0.7, 0.6, 0.5]),
];

fn column(risk_type: RiskType) -> usize {
    usize::from(risk_type.rank() - 1)
}

fn lookup(key: &str, risk_type: RiskType) -> Option<f64> {
    PROPAGATION
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, row)| row[column(risk_type)])
}

/// Impact weight of `risk_type` on `entity`.
///
/// Looks up the subtype (or type when there is no subtype), then
/// `DEFAULT_<type>`, then [`DEFAULT_IMPACT`].
pub fn impact(entity: &Entity, risk_type: RiskType) -> f64 {
    lookup(entity.category(), risk_type)
        .or_else(|| lookup(&format!("DEFAULT_{}", entity.entity_type), risk_type))
        .unwrap_or(DEFAULT_IMPACT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_regulatory_uses_table_entry() {
        let bank = Entity::new("Bank X", "ORG").with_subtype("Bank");
        assert_eq!(impact(&bank, RiskType::Regulatory), 0.9);
        assert_eq!(impact(&bank, RiskType::Legal), 0.7);
    }

    #[test]
    fn regulator_is_barely_touched_by_regulation() {
        let reg = Entity::new("Regulator Y", "ORG").with_subtype("Regulator");
        assert_eq!(impact(&reg, RiskType::Regulatory), 0.2);
    }

    #[test]
    fn falls_back_to_default_type_row() {
        let person = Entity::new("Jane Doe", "PERSON").with_subtype("Analyst");
        assert_eq!(impact(&person, RiskType::Reputation), 0.8);
    }

    #[test]
    fn unknown_type_gets_generic_default() {
        let place = Entity::new("Atlantis", "GPE");
        assert_eq!(impact(&place, RiskType::Market), DEFAULT_IMPACT);
    }
}
