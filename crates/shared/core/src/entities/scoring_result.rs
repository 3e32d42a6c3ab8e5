use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Output of a scoring strategy, either for one decision or for a whole session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub total_score: Decimal,

    /// Unweighted realized P&L
    pub total_pnl: Decimal,

    /// Name and version of the scoring rules that produced this result
    pub rule_version: String,

    /// Score components (e.g. "weighted_pnl", "mdd_penalty")
    pub breakdown: BTreeMap<String, Decimal>,

    pub metadata: BTreeMap<String, String>,
}

impl ScoringResult {
    pub fn new(total_score: Decimal, total_pnl: Decimal, rule_version: impl Into<String>) -> Self {
        Self {
            total_score,
            total_pnl,
            rule_version: rule_version.into(),
            breakdown: BTreeMap::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Zero result, used for decisions with no exposure
    pub fn zero(rule_version: impl Into<String>) -> Self {
        Self::new(Decimal::ZERO, Decimal::ZERO, rule_version)
    }

    pub fn with_component(mut self, name: impl Into<String>, value: Decimal) -> Self {
        self.breakdown.insert(name.into(), value);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.metadata.insert(key.into(), value.to_string());
        self
    }

    pub fn component(&self, name: &str) -> Decimal {
        self.breakdown.get(name).copied().unwrap_or(Decimal::ZERO)
    }
}
