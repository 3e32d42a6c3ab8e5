//! Arena Game Engine
//!
//! Replays a fixed historical segment bar by bar while a player submits
//! BUY/SELL/SKIP decisions, tracking balance, drawdown and score:
//!
//! - **Registry**: engine-owned pluggable strategies (scoring, detection,
//!   market data) selected by priority
//! - **State machine**: session lifecycle and finalization
//! - **Decision processor**: ordered validation and execution per bar
//! - **Leaderboard**: ranked views over finalized sessions
//! - **Sweeper**: background expiry of idle sessions
//!
//! ## Architecture
//!
//! ```text
//!  MarketFrameSource ──► create_session ──► Detector (keypoints, difficulty)
//!                              │
//!                              ▼
//!   start ──► submit_decision* ──► complete / cancel / expire
//!                  │                        │
//!                  ▼                        ▼
//!        Scoring::calculate_score   Scoring::aggregate ──► Leaderboard
//!                  │                        │
//!                  └──────► SessionStore ◄──┘  (versioned unit of work)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use arena_engine::{DecisionRequest, EngineConfig, GameEngine, SessionConfig, StrategyRegistry};
//!
//! let mut registry = StrategyRegistry::with_defaults();
//! registry.register_provider(Arc::new(catalogue), 0);
//! let engine = GameEngine::with_in_memory_store(EngineConfig::default(), registry, clock)?;
//!
//! let session = engine
//!     .create_session("player-1", "aapl-2024q2", SessionConfig::new("AAPL", Timeframe::Day1))
//!     .await?;
//! engine.start(session.id).await?;
//! engine
//!     .submit_decision(DecisionRequest::buy(session.id, 0, dec!(150), dec!(100)))
//!     .await?;
//! ```

pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod finalize;
pub mod leaderboard;
pub mod registry;
pub mod state_machine;
pub mod store;
pub mod sweeper;

// Re-export main types
pub use config::{ConfigError, EngineConfig, KeypointConfig, SessionConfig, StrategyToggle};
pub use decision::{DecisionOutcome, DecisionProcessor, DecisionRequest};
pub use engine::{GameEngine, difficulty_for};
pub use error::{DecisionRejection, EngineError, Result};
pub use leaderboard::{LeaderboardEntry, LeaderboardScope};
pub use registry::{Registration, StrategyRegistry, StrategyRole};
pub use state_machine::Transition;
pub use store::InMemorySessionStore;
pub use sweeper::{SweepFailure, SweepReport};
