//! Arena Ports
//!
//! Port definitions (traits) for the Arena replay trading game.
//! These define the boundaries between game logic, pluggable strategies
//! and infrastructure.

mod clock;
mod detector;
mod error;
mod market_data;
mod scoring;
mod store;

pub use clock::Clock;
pub use detector::{Candidates, Detector, rank, select_keypoints};
pub use error::{StrategyError, StrategyResult};
pub use market_data::{MarketDataError, MarketDataResult, MarketFrameSource, SegmentSpec};
pub use scoring::{RiskPenalty, Scoring, ScoringParams};
pub use store::{SessionStore, StoreError, StoreResult, UnitOfWork};
