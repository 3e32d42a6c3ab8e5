//! Ranked views over finalized sessions
//!
//! Ordering: total score desc, max drawdown asc, last update asc, then
//! session id asc so equal sessions still rank deterministically.

use arena_core::{GameSession, SegmentId, SessionId, SessionStatus, Timestamp, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaderboardScope {
    Global,
    User(UserId),
    Segment(SegmentId),
}

impl LeaderboardScope {
    pub fn includes(&self, session: &GameSession) -> bool {
        match self {
            LeaderboardScope::Global => true,
            LeaderboardScope::User(user_id) => session.user_id == *user_id,
            LeaderboardScope::Segment(segment_id) => session.segment_id == *segment_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based
    pub rank: usize,
    pub session_id: SessionId,
    pub user_id: UserId,
    pub segment_id: SegmentId,
    pub status: SessionStatus,
    pub total_score: Decimal,
    pub total_pnl: Decimal,
    pub max_drawdown: Decimal,
    pub updated_at: Timestamp,
}

/// Leaderboard ordering between two sessions
pub fn compare(a: &GameSession, b: &GameSession) -> Ordering {
    b.total_score()
        .cmp(&a.total_score())
        .then_with(|| a.max_drawdown.cmp(&b.max_drawdown))
        .then_with(|| a.updated_at.cmp(&b.updated_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Rank the terminal sessions in `scope`, keeping at most `limit`
pub fn rank<I>(sessions: I, scope: &LeaderboardScope, limit: usize) -> Vec<LeaderboardEntry>
where
    I: IntoIterator<Item = GameSession>,
{
    let mut finished: Vec<GameSession> = sessions
        .into_iter()
        .filter(|s| s.status.is_terminal() && scope.includes(s))
        .collect();
    finished.sort_by(compare);

    finished
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, s)| LeaderboardEntry {
            rank: i + 1,
            total_score: s.total_score(),
            total_pnl: s.total_pnl,
            max_drawdown: s.max_drawdown,
            updated_at: s.updated_at,
            status: s.status,
            session_id: s.id,
            user_id: s.user_id,
            segment_id: s.segment_id,
        })
        .collect()
}
