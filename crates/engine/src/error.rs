//! Engine errors

use arena_core::SessionStatus;
use arena_ports::{MarketDataError, StoreError, StrategyError};
use std::fmt;
use thiserror::Error;

use crate::config::ConfigError;
use crate::registry::StrategyRole;

/// Why a decision was refused. Checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionRejection {
    SessionNotRunning,
    OutOfOrderFrame,
    DuplicateFrame,
    NonPositiveQuantity,
    StalePrice,
    PositionConstraint,
}

impl fmt::Display for DecisionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DecisionRejection::SessionNotRunning => "session not running",
            DecisionRejection::OutOfOrderFrame => "out-of-order frame",
            DecisionRejection::DuplicateFrame => "duplicate frame",
            DecisionRejection::NonPositiveQuantity => "non-positive quantity",
            DecisionRejection::StalePrice => "stale price",
            DecisionRejection::PositionConstraint => "position constraint violated",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Cannot {operation} a {current} session (expected {expected})")]
    InvalidStateTransition {
        current: SessionStatus,
        expected: String,
        operation: &'static str,
    },

    #[error("Invalid decision: {reason}")]
    InvalidDecision { reason: DecisionRejection },

    #[error("Insufficient data for {strategy}: required {required}, available {available}")]
    InsufficientData {
        strategy: String,
        required: usize,
        available: usize,
    },

    #[error("No enabled {role} strategy available")]
    StrategyUnavailable { role: StrategyRole },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub fn rejected(reason: DecisionRejection) -> Self {
        EngineError::InvalidDecision { reason }
    }

    pub fn session_not_found(id: impl ToString) -> Self {
        EngineError::NotFound {
            entity: "session",
            id: id.to_string(),
        }
    }

    /// Rejection reason, if this is an `InvalidDecision`
    pub fn rejection(&self) -> Option<DecisionRejection> {
        match self {
            EngineError::InvalidDecision { reason } => Some(*reason),
            _ => None,
        }
    }
}

impl From<StrategyError> for EngineError {
    fn from(err: StrategyError) -> Self {
        match err {
            StrategyError::InsufficientData {
                strategy,
                required,
                available,
            } => EngineError::InsufficientData {
                strategy,
                required,
                available,
            },
            StrategyError::InvalidInput(msg) => EngineError::InvalidConfig(msg),
        }
    }
}

impl From<MarketDataError> for EngineError {
    fn from(err: MarketDataError) -> Self {
        match err {
            MarketDataError::SegmentNotFound(id) => EngineError::NotFound {
                entity: "segment",
                id,
            },
            MarketDataError::StockMismatch {
                segment_id,
                requested,
                ..
            } => EngineError::NotFound {
                entity: "segment",
                id: format!("{segment_id} ({requested})"),
            },
            MarketDataError::Unavailable(msg) => EngineError::Infrastructure(msg),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateDecision { .. } => {
                EngineError::rejected(DecisionRejection::DuplicateFrame)
            }
            StoreError::VersionConflict { .. } | StoreError::Unavailable(_) => {
                EngineError::Infrastructure(err.to_string())
            }
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        EngineError::InvalidConfig(err.to_string())
    }
}
