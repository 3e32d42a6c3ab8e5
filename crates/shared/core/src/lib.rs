//! Arena Core Domain
//!
//! Pure domain types for the Arena replay trading game.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    // Market data
    Frame,
    Segment,
    Timeframe,
    // Session and decisions
    DecisionType,
    Difficulty,
    GameDecision,
    GameSession,
    Position,
    SessionStatus,
    // Strategy outputs
    KeypointDetection,
    KeypointType,
    ScoringResult,
};
pub use values::{DecisionId, Price, Quantity, SegmentId, SessionId, StockCode, Timestamp, UserId};
