//! Replay - runs every scripted player concurrently against one engine

use arena_core::UserId;
use arena_engine::{EngineError, GameEngine, LeaderboardEntry, LeaderboardScope};
use log::{error, info};
use std::sync::Arc;

use crate::player::{ReplayOutcome, ScriptedPlayer};
use crate::script::PlayerScript;

/// Results of a replay run
#[derive(Debug, Clone, Default)]
pub struct ReplayResults {
    /// In script order
    pub outcomes: Vec<ReplayOutcome>,
    pub failures: Vec<(UserId, EngineError)>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

impl ReplayResults {
    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Replay {
    engine: Arc<GameEngine>,
    scripts: Vec<PlayerScript>,
    leaderboard_limit: usize,
}

impl Replay {
    pub fn new(engine: Arc<GameEngine>, scripts: Vec<PlayerScript>) -> Self {
        Self {
            engine,
            scripts,
            leaderboard_limit: 10,
        }
    }

    pub fn with_leaderboard_limit(mut self, limit: usize) -> Self {
        self.leaderboard_limit = limit;
        self
    }

    /// Spawn one task per player, wait for all of them, then rank
    pub async fn run(self) -> ReplayResults {
        info!("Replaying {} scripted sessions...", self.scripts.len());

        let handles: Vec<_> = self
            .scripts
            .into_iter()
            .map(|script| {
                let user_id = script.user_id.clone();
                let player = ScriptedPlayer::new(Arc::clone(&self.engine), script);
                (user_id, tokio::spawn(player.run()))
            })
            .collect();

        let mut results = ReplayResults::default();
        for (user_id, handle) in handles {
            let outcome = handle
                .await
                .map_err(|e| EngineError::Infrastructure(format!("player task failed: {e}")))
                .and_then(|r| r);
            match outcome {
                Ok(outcome) => results.outcomes.push(outcome),
                Err(e) => {
                    error!("[{}] replay failed: {}", user_id, e);
                    results.failures.push((user_id, e));
                }
            }
        }

        results.leaderboard = self
            .engine
            .leaderboard(&LeaderboardScope::Global, self.leaderboard_limit);

        info!(
            "Replay finished: {} sessions, {} failures",
            results.outcomes.len(),
            results.failures.len()
        );
        results
    }
}
