use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Position, ScoringResult, SessionStatus, Timeframe};
use crate::values::{SegmentId, SessionId, StockCode, Timestamp, UserId};

/// Rough difficulty of a replayed segment, derived from how many notable
/// bars the detector found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A game session: one player replaying one segment.
///
/// All counters are running values updated after every decision. The
/// struct itself enforces no lifecycle rules; transitions and decision
/// validation live in the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub id: SessionId,
    pub user_id: UserId,
    pub segment_id: SegmentId,
    pub stock_code: StockCode,
    pub timeframe: Timeframe,
    pub status: SessionStatus,

    /// Next frame awaiting a decision, `0..=total_frames`
    pub current_frame_index: usize,
    pub total_frames: usize,

    pub initial_balance: Decimal,
    pub current_balance: Decimal,
    pub peak_balance: Decimal,
    pub total_pnl: Decimal,

    /// Largest fractional decline from the running peak balance
    pub max_drawdown: Decimal,

    pub total_trades: u32,
    pub winning_trades: u32,
    pub losing_trades: u32,

    pub open_position: Option<Position>,

    /// Final score, set once the session reaches a terminal state
    pub score: Option<ScoringResult>,

    pub difficulty: Difficulty,

    /// Optimistic concurrency counter, bumped by every committed mutation
    pub version: u64,

    /// When the current frame was shown to the player
    pub frame_presented_at: Timestamp,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl GameSession {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: impl Into<UserId>,
        segment_id: impl Into<SegmentId>,
        stock_code: impl Into<StockCode>,
        timeframe: Timeframe,
        total_frames: usize,
        initial_balance: Decimal,
        difficulty: Difficulty,
        now: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            segment_id: segment_id.into(),
            stock_code: stock_code.into(),
            timeframe,
            status: SessionStatus::Created,
            current_frame_index: 0,
            total_frames,
            initial_balance,
            current_balance: initial_balance,
            peak_balance: initial_balance,
            total_pnl: Decimal::ZERO,
            max_drawdown: Decimal::ZERO,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            open_position: None,
            score: None,
            difficulty,
            version: 0,
            frame_presented_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Book realized P&L net of `fee` into the running balance, peak and drawdown
    pub fn book(&mut self, realized_pnl: Decimal, fee: Decimal) {
        self.current_balance += realized_pnl - fee;
        self.total_pnl += realized_pnl;
        self.peak_balance = self.peak_balance.max(self.current_balance);

        if self.peak_balance > Decimal::ZERO {
            let drawdown = (self.peak_balance - self.current_balance) / self.peak_balance;
            self.max_drawdown = self.max_drawdown.max(drawdown);
        }
    }

    /// Count a closed round trip
    pub fn record_closed_trade(&mut self, realized_pnl: Decimal) {
        self.total_trades += 1;
        if realized_pnl > Decimal::ZERO {
            self.winning_trades += 1;
        } else {
            self.losing_trades += 1;
        }
    }

    /// Winning trades over closed trades, zero when nothing closed
    pub fn win_rate(&self) -> Decimal {
        if self.total_trades == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.winning_trades) / Decimal::from(self.total_trades)
    }

    /// Index of the last bar the player has seen, if any
    pub fn last_seen_frame_index(&self) -> Option<usize> {
        if self.total_frames == 0 {
            return None;
        }
        Some(self.current_frame_index.min(self.total_frames - 1))
    }

    pub fn is_exhausted(&self) -> bool {
        self.current_frame_index >= self.total_frames
    }

    /// Final score value, zero until the session is finalized
    pub fn total_score(&self) -> Decimal {
        self.score
            .as_ref()
            .map(|s| s.total_score)
            .unwrap_or(Decimal::ZERO)
    }
}
