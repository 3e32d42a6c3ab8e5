//! Arena Runner - Scripted Replay Driver
//!
//! Bootstraps a game engine from a runner file and plays scripted sessions
//! against it:
//!
//! - **Script**: runner file format (engine config, catalogue, players)
//! - **Bootstrap**: catalogue loading and engine construction
//! - **Player**: one scripted session, frame by frame
//! - **Replay**: all players concurrently, then the leaderboard
//!
//! ## Architecture
//!
//! ```text
//!   runner.json ──► RunnerConfig ──► bootstrap ──► GameEngine
//!                        │                            ▲
//!                        │ players                    │ decisions
//!                        ▼                            │
//!                 ┌──────────────┐   spawn    ┌───────┴────────┐
//!                 │    Replay    │ ─────────► │ ScriptedPlayer │ x N
//!                 └──────┬───────┘            └────────────────┘
//!                        │
//!                        ▼
//!                 ReplayResults + leaderboard
//! ```

pub mod bootstrap;
pub mod player;
pub mod replay;
pub mod script;

pub use bootstrap::{RunnerError, bootstrap};
pub use player::{ReplayOutcome, ScriptedPlayer};
pub use replay::{Replay, ReplayResults};
pub use script::{Finish, PlayerScript, RunnerConfig, ScriptedTrade};
