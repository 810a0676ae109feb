//! Data-driven regex rule tables for event classification and risk scoring.
//!
//! A table is an ordered list of `(category, patterns)` rows. Scoring counts
//! non-overlapping matches of every pattern against an already-lowercased
//! text; ties between categories go to the row listed first.

pub mod event_types;
pub mod propagation;
pub mod risk_patterns;

use std::collections::BTreeSet;

use regex::Regex;

/// One category and its indicator patterns.
#[derive(Debug)]
pub struct Rule<C> {
    pub category: C,
    pub patterns: Vec<Regex>,
}

/// Ordered rule table.
#[derive(Debug)]
pub struct RuleTable<C> {
    rules: Vec<Rule<C>>,
}

/// Per-category match result.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleScore<C> {
    pub category: C,
    pub count: usize,
    /// Distinct matched substrings, sorted.
    pub indicators: Vec<String>,
}

impl<C: Copy> RuleTable<C> {
    /// Compile a table from `(category, pattern sources)` rows.
    ///
    /// Panics on an invalid pattern; tables are static data.
    pub fn compile(rows: &[(C, &[&str])]) -> Self {
        let rules = rows
            .iter()
            .map(|(category, sources)| Rule {
                category: *category,
                patterns: sources
                    .iter()
                    .map(|src| Regex::new(src).expect("static rule pattern"))
                    .collect(),
            })
            .collect();
        Self { rules }
    }

    /// Score every category, in table order.
    pub fn scores(&self, text: &str) -> Vec<RuleScore<C>> {
        self.rules
            .iter()
            .map(|rule| {
                let mut count = 0;
                let mut indicators = BTreeSet::new();
                for pattern in &rule.patterns {
                    for m in pattern.find_iter(text) {
                        count += 1;
                        if !m.as_str().is_empty() {
                            indicators.insert(m.as_str().to_string());
                        }
                    }
                }
                RuleScore {
                    category: rule.category,
                    count,
                    indicators: indicators.into_iter().collect(),
                }
            })
            .collect()
    }

    /// Highest-scoring category with at least one match; the earliest row wins ties.
    pub fn best(&self, text: &str) -> Option<C> {
        let mut best: Option<(C, usize)> = None;
        for score in self.scores(text) {
            let better = match best {
                Some((_, top)) => score.count > top,
                None => score.count > 0,
            };
            if better {
                best = Some((score.category, score.count));
            }
        }
        best.map(|(category, _)| category)
    }
}
