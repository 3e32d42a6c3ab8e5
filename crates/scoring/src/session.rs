//! Session-level folding shared by the scoring strategies

use arena_core::{GameDecision, GameSession, ScoringResult};
use rust_decimal::Decimal;

/// Fold a finished session's decisions into a final result.
///
/// The total score is the sum of the per-decision contributions plus the
/// mark-to-market P&L of any position still open. `total_pnl` stays the
/// session's unweighted realized P&L.
pub fn fold_session(
    rule_version: &str,
    session: &GameSession,
    decisions: &[GameDecision],
    open_position_pnl: Decimal,
) -> ScoringResult {
    let decision_score: Decimal = decisions.iter().map(|d| d.score_contribution).sum();
    let realized_pnl: Decimal = decisions.iter().map(|d| d.realized_pnl).sum();
    let fees: Decimal = decisions.iter().map(|d| d.fee).sum();
    let trades = decisions
        .iter()
        .filter(|d| d.decision_type.is_trade())
        .count();

    let total_score = decision_score + open_position_pnl;

    ScoringResult::new(total_score, session.total_pnl, rule_version)
        .with_component("decision_score", decision_score)
        .with_component("realized_pnl", realized_pnl)
        .with_component("open_position_pnl", open_position_pnl)
        .with_component("fees", fees)
        .with_component("win_rate", session.win_rate())
        .with_component("max_drawdown", session.max_drawdown)
        .with_metadata("decisions", decisions.len())
        .with_metadata("trades", trades)
        .with_metadata("frames_played", session.current_frame_index)
        .with_metadata("total_frames", session.total_frames)
}
