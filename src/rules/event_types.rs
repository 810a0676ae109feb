//! Event-type indicator table and the evolution cause-effect table.

use std::sync::LazyLock;

use crate::model::EventType;

use super::RuleTable;

const EVENT_PATTERNS: &[(EventType, &[&str])] = &[
    (
        EventType::MarketMovement,
        &[
            r"(rise|fall|drop|jump|plunge|surge|soar|tumble|spike|crash)",
            r"(gain|lose|increase|decrease)\s+\d+(\.\d+)?\s*(%|percent)",
            r"(bull|bear)\s+market",
            r"market\s+(correction|rally|collapse|rebound)",
            r"(stock|share|bond|market)s?\s+(fall|rise|drop|jump|plunge|surge|soar|tumble)",
        ],
    ),
    (
        EventType::CompanyFinancial,
        &[
            r"(report|announce|disclose|reveal)\s+\w+\s+earnings",
            r"(quarterly|annual)\s+(results|earnings|report)",
            r"(profit|revenue|sales)\s+(up|down|rise|fall|drop|jump|plunge|surge|soar|tumble)",
            r"(beat|miss|exceed|fall short of)\s+(forecast|expectation|estimate)",
            r"(raise|lower|cut)\s+(guidance|forecast|outlook)",
        ],
    ),
    (
        EventType::MergerAcquisition,
        &[
            r"(merger|acquisition|takeover|buyout)",
            r"(acquire|buy|purchase)\s+\w+\s+(company|business|unit|division|stake)",
            r"(sell|divest)\s+\w+\s+(company|business|unit|division|stake)",
            r"(offer|bid)\s+to\s+(buy|acquire|take over)",
            r"merger\s+agreement",
        ],
    ),
    (
        EventType::CorporateGovernance,
        &[
            r"(appoint|name|elect|hire)\s+\w+\s+(CEO|CFO|COO|CTO|chairman|director|board member)",
            r"(resign|step down|depart|leave)\s+\w+\s+(CEO|CFO|COO|CTO|chairman|director|position)",
            r"(board|shareholder)\s+meeting",
            r"(vote|approval|rejection)\s+of\s+(proposal|resolution)",
            r"corporate\s+restructuring",
        ],
    ),
    (
        EventType::RegulatoryLegal,
        &[
            r"(lawsuit|litigation|legal action|court|judge|trial|sue|charged|settlement)",
            r"(investigation|probe|inquiry)\s+by\s+(SEC|FTC|DOJ|regulator)",
            r"(fine|penalty|sanction)\s+of\s+\$?\d+",
            r"(regulatory|legal|compliance)\s+(issue|problem|violation|action)",
            r"(approve|reject|clear|block)\s+\w+\s+(merger|acquisition|deal)",
        ],
    ),
    (
        EventType::DebtFinancing,
        &[
            r"(debt|bond|note|loan)\s+(issue|offering|sale)",
            r"(raise|borrow)\s+\$?\d+\s+\w+\s+(capital|fund|financing)",
            r"(refinance|restructure)\s+\w+\s+debt",
            r"(credit|debt)\s+rating\s+(upgrade|downgrade)",
            r"default\s+on\s+(debt|loan|bond|payment)",
        ],
    ),
    (
        EventType::EquityFinancing,
        &[
            r"(IPO|initial public offering)",
            r"(secondary|follow-on)\s+offering",
            r"(stock|share)\s+(issue|offering|sale|buyback|repurchase)",
            r"(raise|seek)\s+\$?\d+\s+\w+\s+(equity|capital)",
            r"private\s+placement",
        ],
    ),
    (
        EventType::DividendCapitalReturn,
        &[
            r"(announce|declare|pay)\s+\w+\s+dividend",
            r"(raise|increase|cut|reduce|suspend|cancel)\s+\w+\s+dividend",
            r"special\s+dividend",
            r"(stock|share)\s+split",
            r"capital\s+return",
        ],
    ),
    (
        EventType::EconomicIndicator,
        &[
            r"(GDP|gross domestic product)",
            r"(inflation|CPI|consumer price index)",
            r"(unemployment|jobs|labor|employment)\s+(report|data|figure)",
            r"(interest rate|fed rate|benchmark rate)",
            r"(housing|retail sales|industrial production|manufacturing)\s+data",
        ],
    ),
    (
        EventType::MonetaryPolicy,
        &[
            r"(Fed|ECB|BOJ|central bank)\s+(meeting|decision)",
            r"(raise|cut|increase|decrease|hold|maintain)\s+\w+\s+interest\s+rate",
            r"(hawkish|dovish)\s+\w+\s+(stance|policy|outlook)",
            r"(monetary|policy)\s+(tightening|easing)",
            r"quantitative\s+(easing|tightening)",
        ],
    ),
    (
        EventType::FiscalPolicy,
        &[
            r"(tax|tariff)\s+(cut|increase|reform|change)",
            r"(government|federal)\s+(spending|budget|deficit)",
            r"fiscal\s+(stimulus|policy|reform)",
            r"infrastructure\s+(plan|bill|package)",
            r"economic\s+stimulus",
        ],
    ),
    (
        EventType::InternationalTrade,
        &[
            r"(trade|tariff)\s+(war|dispute|tension|negotiation|agreement|deal)",
            r"(import|export)\s+(restriction|ban|quota|duty)",
            r"(impose|lift)\s+\w+\s+tariff",
            r"trade\s+deficit",
            r"currency\s+(manipulation|devaluation)",
        ],
    ),
    (
        EventType::Geopolitical,
        &[
            r"(war|conflict|tension|attack|sanction)",
            r"(political|diplomatic)\s+(crisis|tension|relation)",
            r"(election|vote|referendum)",
            r"(terrorism|terrorist)\s+(attack|threat)",
            r"(natural disaster|hurricane|earthquake|flood|wildfire)",
        ],
    ),
    (
        EventType::TechnologyInnovation,
        &[
            r"(launch|release|unveil|introduce)\s+\w+\s+(product|service)",
            r"(patent|intellectual property|technology)\s+(filing|approval|litigation)",
            r"research\s+and\s+development",
            r"(AI|artificial intelligence|machine learning|blockchain|crypto)",
            r"(data breach|cybersecurity|hack|attack)",
        ],
    ),
    (
        EventType::CommodityPrice,
        &[
            r"(oil|gold|silver|natural gas|commodity)\s+price\s+(rise|fall|drop|jump|plunge|surge|soar|tumble)",
            r"OPEC\s+(meeting|decision|cut|increase)",
            r"(supply|demand)\s+(issue|concern|disruption)",
            r"(inventory|stockpile)\s+(build|draw)",
            r"(production|output)\s+(increase|decrease|cut)",
        ],
    ),
];

/// Compiled event-type indicators, in classifier order.
pub static EVENT_RULES: LazyLock<RuleTable<EventType>> =
    LazyLock::new(|| RuleTable::compile(EVENT_PATTERNS));

/// Classify lowercased text; `MarketMovement` when nothing matches.
pub fn classify(text: &str) -> EventType {
    EVENT_RULES.best(text).unwrap_or(EventType::MarketMovement)
}

/// Label for an (earlier, later) event-type pair with a known causal reading.
pub fn cause_effect(earlier: EventType, later: EventType) -> Option<&'static str> {
    use EventType::*;
    let label = match (earlier, later) {
        (MonetaryPolicy, MarketMovement) => "causes",
        (FiscalPolicy, MarketMovement) => "causes",
        (EconomicIndicator, MarketMovement) => "influences",
        (Geopolitical, MarketMovement) => "triggers",
        (CommodityPrice, CompanyFinancial) => "impacts",
        (RegulatoryLegal, CompanyFinancial) => "affects",
        (MergerAcquisition, MarketMovement) => "leads_to",
        (CompanyFinancial, MarketMovement) => "drives",
        (InternationalTrade, CommodityPrice) => "affects",
        (TechnologyInnovation, CompanyFinancial) => "enables",
        _ => return None,
    };
    Some(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_follows_taxonomy_order() {
        let order: Vec<EventType> = EVENT_RULES.scores("").iter().map(|s| s.category).collect();
        assert_eq!(order, EventType::ALL.to_vec());
    }

    #[test]
    fn classifies_regulatory_text() {
        let text = "regulator y opens probe; lawsuit filed in court after compliance violation";
        assert_eq!(classify(text), EventType::RegulatoryLegal);
    }

    #[test]
    fn classifies_merger_text() {
        let text = "acme agrees to a takeover; merger agreement signed";
        assert_eq!(classify(text), EventType::MergerAcquisition);
    }

    #[test]
    fn empty_text_defaults_to_market_movement() {
        assert_eq!(classify("quiet day, nothing to report"), EventType::MarketMovement);
    }

    #[test]
    fn cause_effect_is_directional() {
        assert_eq!(
            cause_effect(EventType::MonetaryPolicy, EventType::MarketMovement),
            Some("causes")
        );
        assert_eq!(cause_effect(EventType::MarketMovement, EventType::MonetaryPolicy), None);
    }
}
