use thiserror::Error;

/// Errors raised by pluggable numeric strategies (scoring, detection)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    #[error("Insufficient data for {strategy}: required {required}, available {available}")]
    InsufficientData {
        strategy: String,
        required: usize,
        available: usize,
    },

    #[error("Invalid strategy input: {0}")]
    InvalidInput(String),
}

pub type StrategyResult<T> = std::result::Result<T, StrategyError>;
