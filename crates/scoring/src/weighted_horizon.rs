//! Weighted multi-horizon scoring
//!
//! Scores a decision by what the price did after it over several look-ahead
//! horizons, weights each horizon, then subtracts risk penalties:
//!
//! ```text
//! delta_i   = (close[window_i - 1] - price) * quantity * direction
//! raw       = Σ weight_i * delta_i
//! penalties = mdd * maxDrawdown(window) + sigma * stdev(returns) + fee * notional
//! score     = raw - penalties
//! ```
//!
//! Windows longer than the available future are clipped. The penalty window
//! is the longest configured horizon.

use arena_core::{Frame, GameDecision, GameSession, ScoringResult};
use arena_ports::{Scoring, ScoringParams, StrategyError, StrategyResult};
use log::trace;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::session::fold_session;
use crate::stats;

pub const WEIGHTED_HORIZON: &str = "weighted-horizon";

/// Configuration for [`WeightedHorizonScoring`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightedHorizonConfig {
    /// Fewer future frames than this fails with `InsufficientData`
    pub min_future_data_points: usize,
    pub rule_version: String,
}

impl Default for WeightedHorizonConfig {
    fn default() -> Self {
        Self {
            min_future_data_points: 1,
            rule_version: format!("{WEIGHTED_HORIZON}/v1"),
        }
    }
}

/// Default scoring strategy
#[derive(Debug, Clone, Default)]
pub struct WeightedHorizonScoring {
    config: WeightedHorizonConfig,
}

impl WeightedHorizonScoring {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: WeightedHorizonConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WeightedHorizonConfig {
        &self.config
    }

    /// Horizon with the largest absolute contribution; seeded pick among ties
    fn dominant_window(contributions: &[(usize, Decimal)], seed: u64) -> Option<usize> {
        let best = contributions.iter().map(|(_, v)| v.abs()).max()?;
        let tied: Vec<usize> = contributions
            .iter()
            .filter(|(_, v)| v.abs() == best)
            .map(|(w, _)| *w)
            .collect();

        if tied.len() == 1 {
            return tied.first().copied();
        }
        let mut rng = StdRng::seed_from_u64(seed);
        tied.choose(&mut rng).copied()
    }
}

impl Scoring for WeightedHorizonScoring {
    fn name(&self) -> &str {
        WEIGHTED_HORIZON
    }

    fn rule_version(&self) -> &str {
        &self.config.rule_version
    }

    fn min_future_data_points(&self) -> usize {
        self.config.min_future_data_points
    }

    fn calculate_score(
        &self,
        decision: &GameDecision,
        future_window: &[Frame],
        params: &ScoringParams,
        seed: u64,
    ) -> StrategyResult<ScoringResult> {
        params.validate()?;
        self.ensure_window(future_window)?;

        let direction = decision.decision_type.direction();
        if direction.is_zero() || future_window.is_empty() {
            return Ok(ScoringResult::new(
                Decimal::ZERO,
                decision.realized_pnl,
                self.rule_version(),
            )
            .with_component("weighted_pnl", Decimal::ZERO));
        }

        let exposure = decision.quantity * direction;
        let mut raw_weighted_pnl = Decimal::ZERO;
        let mut contributions = Vec::with_capacity(params.window_sizes.len());

        for (window, weight) in params.window_sizes.iter().zip(&params.weights) {
            let horizon = (*window).min(future_window.len());
            let exit = future_window[horizon - 1].close;
            let weighted = exit
                .checked_sub(decision.price)
                .and_then(|diff| diff.checked_mul(exposure))
                .and_then(|pnl| pnl.checked_mul(*weight))
                .ok_or_else(|| overflow(decision, "weighted pnl"))?;
            raw_weighted_pnl = raw_weighted_pnl
                .checked_add(weighted)
                .ok_or_else(|| overflow(decision, "weighted pnl"))?;
            contributions.push((*window, weighted));
        }

        let horizon = params.max_window().min(future_window.len());
        let penalty_window = &future_window[..horizon];
        let window_mdd = stats::max_drawdown(decision.price, penalty_window);
        let window_sigma = stats::stdev(&stats::returns(decision.price, penalty_window));

        let risk = &params.risk_penalty;
        let mdd_penalty = risk.mdd_penalty * window_mdd;
        let sigma_penalty = risk.sigma_penalty * window_sigma;
        let fee_penalty = decision
            .notional()
            .and_then(|notional| notional.checked_mul(risk.fee_penalty))
            .ok_or_else(|| overflow(decision, "fee penalty"))?;
        let total_score = raw_weighted_pnl
            .checked_sub(mdd_penalty + sigma_penalty)
            .and_then(|score| score.checked_sub(fee_penalty))
            .ok_or_else(|| overflow(decision, "total score"))?;

        trace!(
            "Scored frame {} ({}): raw={}, mdd={}, sigma={}, fee={}",
            decision.frame_index,
            decision.decision_type,
            raw_weighted_pnl,
            mdd_penalty,
            sigma_penalty,
            fee_penalty
        );

        let mut result = ScoringResult::new(total_score, decision.realized_pnl, self.rule_version())
            .with_component("weighted_pnl", raw_weighted_pnl)
            .with_component("mdd_penalty", mdd_penalty)
            .with_component("sigma_penalty", sigma_penalty)
            .with_component("fee_penalty", fee_penalty)
            .with_component("window_max_drawdown", window_mdd)
            .with_component("window_sigma", window_sigma)
            .with_metadata("horizon", horizon);

        if let Some(window) = Self::dominant_window(&contributions, seed) {
            result = result.with_metadata("dominant_window", window);
        }

        Ok(result)
    }

    fn aggregate(
        &self,
        session: &GameSession,
        decisions: &[GameDecision],
        open_position_pnl: Decimal,
        params: &ScoringParams,
    ) -> ScoringResult {
        fold_session(self.rule_version(), session, decisions, open_position_pnl)
            .with_metadata("max_window", params.max_window())
    }
}

impl From<WeightedHorizonConfig> for WeightedHorizonScoring {
    fn from(config: WeightedHorizonConfig) -> Self {
        Self::with_config(config)
    }
}

fn overflow(decision: &GameDecision, term: &str) -> StrategyError {
    StrategyError::InvalidInput(format!(
        "{} on frame {} overflows at price {} and quantity {}",
        term, decision.frame_index, decision.price, decision.quantity
    ))
}
