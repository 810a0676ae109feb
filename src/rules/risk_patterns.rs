//! Risk-category indicator table.

use std::sync::LazyLock;

use crate::model::RiskType;

use super::{RuleScore, RuleTable};

const RISK_PATTERNS: &[(RiskType, &[&str])] = &[
    (
        RiskType::Market,
        &[
            r"(market|stock|index|bond)\s+(crash|collapse|volatility|correction)",
            r"(interest rate|yield|spread)\s+(rise|increase|jump|spike|volatility)",
            r"(bull|bear)\s+market",
            r"market\s+uncertainty",
            r"(valuation|bubble|overvaluation|undervaluation)",
        ],
    ),
    (
        RiskType::Credit,
        &[
            r"(default|bankruptcy|insolvency|restructuring)",
            r"(debt|loan)\s+(problem|issue|concern)",
            r"(credit|debt)\s+rating\s+(downgrade|cut|lower)",
            r"(non-performing|bad)\s+(loan|debt)",
            r"debt\s+burden",
        ],
    ),
    (
        RiskType::Liquidity,
        &[
            r"(liquidity|cash|funding)\s+(problem|issue|concern|crisis|squeeze)",
            r"(unable|difficulty)\s+to\s+(raise|secure)\s+(funding|capital|money)",
            r"(frozen|dry up|seized)\s+(credit|market|funding)",
            r"(bank|financial)\s+run",
            r"(withdraw|redemption)\s+surge",
        ],
    ),
    (
        RiskType::Operational,
        &[
            r"(operational|system|technical)\s+(failure|breakdown|outage|disruption)",
            r"(cyber|security)\s+(attack|breach|incident|threat)",
            r"(fraud|misconduct|corruption|scandal)",
            r"(human|employee)\s+error",
            r"(natural disaster|fire|flood|earthquake|pandemic|supply chain)\s+(disruption|issue)",
        ],
    ),
    (
        RiskType::Legal,
        &[
            r"(lawsuit|litigation|legal action|sue|sued)",
            r"(fine|penalty|sanction)",
            r"(regulatory|compliance|legal)\s+(violation|breach|issue|problem)",
            r"(investigation|probe|inquiry)",
            r"(settlement|judgment)\s+against",
        ],
    ),
    (
        RiskType::Strategic,
        &[
            r"(strategic|strategy)\s+(failure|mistake|error)",
            r"(competition|competitor)\s+(pressure|threat)",
            r"(merger|acquisition|partnership)\s+(failure|problem|issue)",
            r"(business model|strategy)\s+(change|shift)",
            r"(enter|exit)\s+(market|business|industry)",
        ],
    ),
    (
        RiskType::Reputation,
        &[
            r"(reputation|reputational)\s+(damage|harm|crisis|issue)",
            r"(public|customer|consumer)\s+(backlash|criticism|protest)",
            r"(scandal|controversy)",
            r"(social media|PR)\s+(crisis|disaster|backlash)",
            r"(boycott|public relations)\s+issue",
        ],
    ),
    (
        RiskType::Regulatory,
        &[
            r"(regulation|regulatory)\s+(change|reform|tightening|new)",
            r"(compliance|regulatory)\s+(cost|burden|requirement)",
            r"(legislation|law|rule)\s+(change|new|proposed)",
            r"(regulatory|government)\s+(crackdown|enforcement)",
            r"(license|permit|approval)\s+(revoke|suspend|deny|delay)",
        ],
    ),
];

pub static RISK_RULES: LazyLock<RuleTable<RiskType>> =
    LazyLock::new(|| RuleTable::compile(RISK_PATTERNS));

/// Categories whose match count reaches `min_matches`, in table order.
pub fn triggered(text: &str, min_matches: usize) -> Vec<RuleScore<RiskType>> {
    RISK_RULES
        .scores(text)
        .into_iter()
        .filter(|s| s.count >= min_matches)
        .collect()
}
