//! Scripted players
//!
//! Each player replays one session: it trades at the frame close on its
//! scripted frames, skips every other frame, and finishes the way its script
//! says. A rejected trade is logged and replaced by a skip so the replay
//! keeps moving.

use arena_core::{SessionId, SessionStatus, UserId};
use arena_engine::{DecisionRequest, EngineError, GameEngine, Result};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;

use crate::script::{Finish, PlayerScript};

/// Where a replayed session ended up
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayOutcome {
    pub user_id: UserId,
    pub session_id: SessionId,
    pub status: SessionStatus,
    pub frames_played: usize,
    /// Scripted trades the engine refused
    pub rejected: usize,
    pub total_score: Decimal,
    pub total_pnl: Decimal,
}

/// Runs one [`PlayerScript`] against an engine
pub struct ScriptedPlayer {
    engine: Arc<GameEngine>,
    script: PlayerScript,
}

impl ScriptedPlayer {
    pub fn new(engine: Arc<GameEngine>, script: PlayerScript) -> Self {
        Self { engine, script }
    }

    pub async fn run(self) -> Result<ReplayOutcome> {
        let script = &self.script;
        let engine = &self.engine;

        let session = engine
            .create_session(
                script.user_id.clone(),
                script.segment_id.clone(),
                script.session.clone(),
            )
            .await?;
        let id = session.id;
        engine.start(id).await?;
        let segment = engine.segment(id)?;

        let frames = script
            .stop_after
            .map_or(segment.len(), |n| n.min(segment.len()));
        let mut rejected = 0;

        for (frame_index, frame) in segment.frames().iter().enumerate().take(frames) {
            let Some(trade) = script.trade_at(frame_index) else {
                engine
                    .submit_decision(DecisionRequest::skip(id, frame_index))
                    .await?;
                continue;
            };

            let request =
                DecisionRequest::new(id, frame_index, trade.side, frame.close, trade.quantity);
            match engine.submit_decision(request).await {
                Ok(_) => {}
                Err(EngineError::InvalidDecision { reason }) => {
                    warn!(
                        "[{}] {} x{} on frame {} rejected ({}), skipping",
                        script.user_id, trade.side, trade.quantity, frame_index, reason
                    );
                    rejected += 1;
                    engine
                        .submit_decision(DecisionRequest::skip(id, frame_index))
                        .await?;
                }
                Err(e) => return Err(e),
            }
        }

        let mut session = engine.get_session(id)?;
        if session.status.is_active() {
            session = match script.finish {
                Finish::Complete => engine.complete(id).await?,
                Finish::Cancel => engine.cancel(id).await?,
                Finish::Abandon => {
                    debug!("[{}] walking away from session {}", script.user_id, id);
                    session
                }
            };
        }

        info!(
            "[{}] session {} {} after {} frames: score={}, pnl={}",
            script.user_id,
            id,
            session.status,
            session.current_frame_index,
            session.total_score(),
            session.total_pnl
        );

        Ok(ReplayOutcome {
            user_id: session.user_id.clone(),
            session_id: id,
            status: session.status,
            frames_played: session.current_frame_index,
            rejected,
            total_score: session.total_score(),
            total_pnl: session.total_pnl,
        })
    }
}
