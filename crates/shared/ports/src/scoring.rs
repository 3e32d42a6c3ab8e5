use arena_core::{Frame, GameDecision, GameSession, ScoringResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{StrategyError, StrategyResult};

/// Penalty coefficients subtracted from the raw weighted P&L
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskPenalty {
    /// Multiplies the max drawdown observed in the window (fraction)
    pub mdd_penalty: Decimal,
    /// Multiplies the standard deviation of bar-to-bar returns in the window
    pub sigma_penalty: Decimal,
    /// Multiplies the traded notional
    pub fee_penalty: Decimal,
}

impl RiskPenalty {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Per-session scoring parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringParams {
    /// Look-ahead horizons in bars
    pub window_sizes: Vec<usize>,
    /// One weight per horizon
    pub weights: Vec<Decimal>,
    pub risk_penalty: RiskPenalty,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            window_sizes: vec![1, 5, 10],
            weights: vec![Decimal::new(5, 1), Decimal::new(3, 1), Decimal::new(2, 1)],
            risk_penalty: RiskPenalty::default(),
        }
    }
}

impl ScoringParams {
    /// Check that horizons and weights pair up and are usable
    pub fn validate(&self) -> StrategyResult<()> {
        if self.window_sizes.len() != self.weights.len() {
            return Err(StrategyError::InvalidInput(format!(
                "{} window sizes but {} weights",
                self.window_sizes.len(),
                self.weights.len()
            )));
        }
        if self.window_sizes.iter().any(|w| *w == 0) {
            return Err(StrategyError::InvalidInput(
                "window sizes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Longest configured horizon
    pub fn max_window(&self) -> usize {
        self.window_sizes.iter().copied().max().unwrap_or(0)
    }
}

/// Port for scoring strategies
///
/// A strategy scores single decisions against the bars that followed them
/// and folds a session's decision history into the final score. Both
/// operations must be pure: identical inputs and seed give identical output.
pub trait Scoring: Send + Sync {
    /// Strategy name used for registry lookup
    fn name(&self) -> &str;

    /// Rule version stamped on every result
    fn rule_version(&self) -> &str;

    /// Minimum number of future frames `calculate_score` needs
    fn min_future_data_points(&self) -> usize;

    /// Score one decision against the frames after its bar
    fn calculate_score(
        &self,
        decision: &GameDecision,
        future_window: &[Frame],
        params: &ScoringParams,
        seed: u64,
    ) -> StrategyResult<ScoringResult>;

    /// Fold a finished session into its final score
    ///
    /// `open_position_pnl` is the mark-to-market P&L of a position still open
    /// at finalization, valued at the last seen bar.
    fn aggregate(
        &self,
        session: &GameSession,
        decisions: &[GameDecision],
        open_position_pnl: Decimal,
        params: &ScoringParams,
    ) -> ScoringResult;

    /// Fail with `InsufficientData` if the window is shorter than the minimum
    fn ensure_window(&self, future_window: &[Frame]) -> StrategyResult<()> {
        let required = self.min_future_data_points();
        if future_window.len() < required {
            return Err(StrategyError::InsufficientData {
                strategy: self.name().to_string(),
                required,
                available: future_window.len(),
            });
        }
        Ok(())
    }
}
