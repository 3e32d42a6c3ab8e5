use arena_core::{GameDecision, GameSession, Segment};
use arena_ports::{Scoring, ScoringParams};
use log::debug;
use rust_decimal::Decimal;

/// Mark-to-market P&L of the open position at the last bar the player saw
pub fn open_position_pnl(session: &GameSession, segment: &Segment) -> Decimal {
    let Some(position) = session.open_position.as_ref() else {
        return Decimal::ZERO;
    };
    session
        .last_seen_frame_index()
        .and_then(|i| segment.get(i))
        .map(|frame| position.unrealized_pnl(frame.close))
        .unwrap_or(Decimal::ZERO)
}

/// Attach the final score. Called exactly once, when a session reaches a
/// terminal state.
pub fn finalize(
    session: &mut GameSession,
    decisions: &[GameDecision],
    segment: &Segment,
    scoring: &dyn Scoring,
    params: &ScoringParams,
) {
    let open_pnl = open_position_pnl(session, segment);
    let result = scoring.aggregate(session, decisions, open_pnl, params);

    debug!(
        "Finalized session {} ({}): score={}, pnl={}, open={}",
        session.id, session.status, result.total_score, result.total_pnl, open_pnl
    );
    session.score = Some(result);
}
