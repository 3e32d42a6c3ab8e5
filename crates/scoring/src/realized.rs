//! Realized-P&L scoring
//!
//! Scores only what the player actually booked: a decision's contribution is
//! its realized P&L minus the fee penalty on its notional. Needs no future
//! bars, so it can score every decision including the last frame.

use arena_core::{Frame, GameDecision, GameSession, ScoringResult};
use arena_ports::{Scoring, ScoringParams, StrategyError, StrategyResult};
use rust_decimal::Decimal;

use crate::session::fold_session;

pub const REALIZED_PNL: &str = "realized-pnl";

#[derive(Debug, Clone, Default)]
pub struct RealizedPnlScoring;

impl RealizedPnlScoring {
    pub fn new() -> Self {
        Self
    }
}

impl Scoring for RealizedPnlScoring {
    fn name(&self) -> &str {
        REALIZED_PNL
    }

    fn rule_version(&self) -> &str {
        "realized-pnl/v1"
    }

    fn min_future_data_points(&self) -> usize {
        0
    }

    fn calculate_score(
        &self,
        decision: &GameDecision,
        _future_window: &[Frame],
        params: &ScoringParams,
        _seed: u64,
    ) -> StrategyResult<ScoringResult> {
        let fee_penalty = if decision.decision_type.is_trade() {
            decision
                .notional()
                .and_then(|notional| notional.checked_mul(params.risk_penalty.fee_penalty))
                .ok_or_else(|| {
                    StrategyError::InvalidInput(format!(
                        "fee penalty on frame {} overflows",
                        decision.frame_index
                    ))
                })?
        } else {
            Decimal::ZERO
        };
        let total_score = decision.realized_pnl.checked_sub(fee_penalty).ok_or_else(|| {
            StrategyError::InvalidInput(format!(
                "score on frame {} overflows",
                decision.frame_index
            ))
        })?;

        Ok(ScoringResult::new(
            total_score,
            decision.realized_pnl,
            self.rule_version(),
        )
        .with_component("realized_pnl", decision.realized_pnl)
        .with_component("fee_penalty", fee_penalty))
    }

    fn aggregate(
        &self,
        session: &GameSession,
        decisions: &[GameDecision],
        open_position_pnl: Decimal,
        _params: &ScoringParams,
    ) -> ScoringResult {
        fold_session(self.rule_version(), session, decisions, open_position_pnl)
    }
}
