//! Runner configuration and player scripts
//!
//! A runner file bundles the engine configuration, the path of the segment
//! catalogue and one script per simulated player:
//!
//! ```json
//! {
//!   "engine": { "session_timeout_secs": 1800 },
//!   "catalogue": "demos/catalogue.json",
//!   "leaderboard_limit": 10,
//!   "players": [
//!     {
//!       "user_id": "alice",
//!       "segment_id": "aapl-2024q2",
//!       "session": { "stock_code": "AAPL", "timeframe": "1d" },
//!       "trades": [
//!         { "frame_index": 0, "side": "BUY", "quantity": "100" },
//!         { "frame_index": 5, "side": "SELL", "quantity": "100" }
//!       ]
//!     }
//!   ]
//! }
//! ```

use arena_core::{DecisionType, Quantity, SegmentId, UserId};
use arena_engine::{ConfigError, EngineConfig, SessionConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One BUY or SELL a player places on a given frame. Frames without a
/// scripted trade are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedTrade {
    pub frame_index: usize,
    pub side: DecisionType,
    pub quantity: Quantity,
}

/// How a scripted session ends if the segment is not played to the end
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finish {
    /// Complete the session and score it
    #[default]
    Complete,
    Cancel,
    /// Walk away and leave the session to the expiry sweep
    Abandon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerScript {
    pub user_id: UserId,
    pub segment_id: SegmentId,
    pub session: SessionConfig,

    #[serde(default)]
    pub trades: Vec<ScriptedTrade>,

    /// Stop deciding after this many frames
    #[serde(default)]
    pub stop_after: Option<usize>,

    #[serde(default)]
    pub finish: Finish,
}

impl PlayerScript {
    pub fn new(
        user_id: impl Into<UserId>,
        segment_id: impl Into<SegmentId>,
        session: SessionConfig,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            segment_id: segment_id.into(),
            session,
            trades: Vec::new(),
            stop_after: None,
            finish: Finish::default(),
        }
    }

    pub fn buy(mut self, frame_index: usize, quantity: Quantity) -> Self {
        self.trades.push(ScriptedTrade {
            frame_index,
            side: DecisionType::Buy,
            quantity,
        });
        self
    }

    pub fn sell(mut self, frame_index: usize, quantity: Quantity) -> Self {
        self.trades.push(ScriptedTrade {
            frame_index,
            side: DecisionType::Sell,
            quantity,
        });
        self
    }

    pub fn stop_after(mut self, frames: usize, finish: Finish) -> Self {
        self.stop_after = Some(frames);
        self.finish = finish;
        self
    }

    /// The trade scripted for `frame_index`, if any
    pub fn trade_at(&self, frame_index: usize) -> Option<&ScriptedTrade> {
        self.trades.iter().find(|t| t.frame_index == frame_index)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.session.validate()?;

        let mut seen = HashSet::new();
        for trade in &self.trades {
            if trade.side == DecisionType::Skip {
                return Err(ConfigError::Invalid(format!(
                    "{}: frame {} scripts a SKIP; leave the frame out instead",
                    self.user_id, trade.frame_index
                )));
            }
            if !seen.insert(trade.frame_index) {
                return Err(ConfigError::Invalid(format!(
                    "{}: frame {} is scripted twice",
                    self.user_id, trade.frame_index
                )));
            }
        }
        Ok(())
    }
}

fn default_leaderboard_limit() -> usize {
    10
}

/// Root of a runner file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    /// Segment catalogue, relative to the runner file
    pub catalogue: PathBuf,

    #[serde(default = "default_leaderboard_limit")]
    pub leaderboard_limit: usize,

    #[serde(default)]
    pub players: Vec<PlayerScript>,
}

impl RunnerConfig {
    /// Load a runner file. A relative catalogue path is resolved against the
    /// file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        let mut config = Self::from_json(&content)?;
        if config.catalogue.is_relative() {
            if let Some(dir) = path.parent() {
                config.catalogue = dir.join(&config.catalogue);
            }
        }
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        if self.leaderboard_limit == 0 {
            return Err(ConfigError::Invalid(
                "leaderboard_limit must be positive".to_string(),
            ));
        }
        for player in &self.players {
            player.validate()?;
        }
        Ok(())
    }
}
