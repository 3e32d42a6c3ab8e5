use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::values::{DecisionId, Price, Quantity, SessionId, Timestamp};

/// What the player chose to do on a bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionType {
    Buy,
    Sell,
    Skip,
}

impl DecisionType {
    /// Exposure direction: +1 for BUY, -1 for SELL, 0 for SKIP
    pub fn direction(&self) -> Decimal {
        match self {
            DecisionType::Buy => Decimal::ONE,
            DecisionType::Sell => Decimal::NEGATIVE_ONE,
            DecisionType::Skip => Decimal::ZERO,
        }
    }

    /// True for decisions that move money (BUY and SELL)
    pub fn is_trade(&self) -> bool {
        !matches!(self, DecisionType::Skip)
    }
}

impl fmt::Display for DecisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DecisionType::Buy => "BUY",
            DecisionType::Sell => "SELL",
            DecisionType::Skip => "SKIP",
        };
        f.write_str(s)
    }
}

/// A recorded, executed decision.
///
/// Unique per `(session_id, frame_index)` and immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDecision {
    pub id: DecisionId,
    pub session_id: SessionId,
    pub frame_index: usize,
    pub decision_type: DecisionType,

    /// Execution price (frame close for SKIP)
    pub price: Price,

    /// Zero for SKIP
    pub quantity: Quantity,

    /// Fee charged against the balance
    pub fee: Decimal,

    /// Timestamp reported by the client
    pub client_timestamp: Timestamp,

    /// Server time the decision was accepted
    pub decision_time: Timestamp,

    /// Milliseconds between the frame being presented and the decision
    pub response_time_ms: i64,

    /// Realized P&L (non-zero only for SELL)
    pub realized_pnl: Decimal,

    /// Score contribution computed by the scoring strategy
    pub score_contribution: Decimal,
}

impl GameDecision {
    /// Traded notional, `None` when it does not fit a Decimal
    pub fn notional(&self) -> Option<Decimal> {
        self.price.checked_mul(self.quantity)
    }
}
