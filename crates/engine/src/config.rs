//! Configuration loading for the game engine
//!
//! Supports JSON configuration for:
//! - Engine settings (expiry timeout, sweep interval, commit retries)
//! - Strategy selection and per-strategy enable/priority toggles
//! - Per-session game settings (balance, tolerances, fees, scoring)

use arena_core::{StockCode, Timeframe};
use arena_ports::{ScoringParams, SegmentSpec};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::registry::StrategyRole;

/// Root configuration for a game engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Idle RUNNING/PAUSED sessions older than this are expired
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,

    /// How often the background sweeper runs
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Retries after an optimistic version conflict before giving up
    #[serde(default = "default_max_commit_retries")]
    pub max_commit_retries: u32,

    /// Preferred scoring strategy; `None` takes the highest priority
    #[serde(default)]
    pub scoring_strategy: Option<String>,

    #[serde(default)]
    pub detector_strategy: Option<String>,

    #[serde(default)]
    pub market_data_provider: Option<String>,

    /// Overrides applied to registered strategies
    #[serde(default)]
    pub strategies: Vec<StrategyToggle>,
}

/// Upper bound for the timeout and sweep interval (ten years)
pub const MAX_INTERVAL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

fn default_session_timeout_secs() -> u64 {
    30 * 60
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_max_commit_retries() -> u32 {
    8
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session_timeout_secs: default_session_timeout_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            max_commit_retries: default_max_commit_retries(),
            scoring_strategy: None,
            detector_strategy: None,
            market_data_provider: None,
            strategies: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "session_timeout_secs must be positive".to_string(),
            ));
        }
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "sweep_interval_secs must be positive".to_string(),
            ));
        }
        for (name, secs) in [
            ("session_timeout_secs", self.session_timeout_secs),
            ("sweep_interval_secs", self.sweep_interval_secs),
        ] {
            if secs > MAX_INTERVAL_SECS {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be at most {MAX_INTERVAL_SECS}, got {secs}"
                )));
            }
        }
        Ok(())
    }

    /// Idle timeout, clamped to [`MAX_INTERVAL_SECS`] for unvalidated configs
    pub fn session_timeout(&self) -> chrono::Duration {
        let secs = self.session_timeout_secs.min(MAX_INTERVAL_SECS);
        i64::try_from(secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs.min(MAX_INTERVAL_SECS))
    }

    /// Preferred strategy name for a role
    pub fn preferred(&self, role: StrategyRole) -> Option<&str> {
        match role {
            StrategyRole::Scoring => self.scoring_strategy.as_deref(),
            StrategyRole::Detector => self.detector_strategy.as_deref(),
            StrategyRole::MarketDataProvider => self.market_data_provider.as_deref(),
        }
    }
}

/// Enable/priority override for one registered strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyToggle {
    pub role: StrategyRole,
    pub name: String,
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Lower is preferred
    #[serde(default)]
    pub priority: Option<i32>,
}

/// Keypoint count limits for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeypointConfig {
    pub min_count: usize,
    pub max_count: usize,
}

impl Default for KeypointConfig {
    fn default() -> Self {
        Self {
            min_count: 3,
            max_count: 10,
        }
    }
}

/// Settings for one game session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub stock_code: StockCode,

    pub timeframe: Timeframe,

    /// Frames to skip from the start of the catalogued segment
    #[serde(default)]
    pub offset: usize,

    /// Number of frames to replay; `None` plays the rest of the segment
    #[serde(default)]
    pub length: Option<usize>,

    #[serde(default = "default_initial_balance")]
    pub initial_balance: Decimal,

    /// Allowed distance of a submitted price from the frame close, as a fraction
    #[serde(default = "default_price_tolerance")]
    pub price_tolerance: Decimal,

    /// Fee charged on BUY and SELL notional, as a fraction
    #[serde(default)]
    pub fee_rate: Decimal,

    /// Complete the session as soon as the last frame is decided
    #[serde(default = "default_auto_complete")]
    pub auto_complete: bool,

    #[serde(default)]
    pub keypoints: KeypointConfig,

    #[serde(default)]
    pub scoring: ScoringParams,

    #[serde(default)]
    pub seed: u64,
}

fn default_initial_balance() -> Decimal {
    dec!(100000)
}

fn default_price_tolerance() -> Decimal {
    dec!(0.01)
}

fn default_auto_complete() -> bool {
    true
}

impl SessionConfig {
    pub fn new(stock_code: impl Into<StockCode>, timeframe: Timeframe) -> Self {
        Self {
            stock_code: stock_code.into(),
            timeframe,
            offset: 0,
            length: None,
            initial_balance: default_initial_balance(),
            price_tolerance: default_price_tolerance(),
            fee_rate: Decimal::ZERO,
            auto_complete: default_auto_complete(),
            keypoints: KeypointConfig::default(),
            scoring: ScoringParams::default(),
            seed: 0,
        }
    }

    pub fn with_window(mut self, offset: usize, length: usize) -> Self {
        self.offset = offset;
        self.length = Some(length);
        self
    }

    pub fn with_initial_balance(mut self, balance: Decimal) -> Self {
        self.initial_balance = balance;
        self
    }

    pub fn with_fee_rate(mut self, fee_rate: Decimal) -> Self {
        self.fee_rate = fee_rate;
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringParams) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_auto_complete(mut self, auto_complete: bool) -> Self {
        self.auto_complete = auto_complete;
        self
    }

    /// Market data request for this session
    pub fn segment_spec(&self, segment_id: &str) -> SegmentSpec {
        SegmentSpec {
            segment_id: segment_id.to_string(),
            timeframe: self.timeframe,
            offset: self.offset,
            length: self.length,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stock_code.trim().is_empty() {
            return Err(ConfigError::Invalid("stock_code is empty".to_string()));
        }
        if self.length == Some(0) {
            return Err(ConfigError::Invalid("length must be positive".to_string()));
        }
        if self.initial_balance <= Decimal::ZERO {
            return Err(ConfigError::Invalid(format!(
                "initial_balance must be positive, got {}",
                self.initial_balance
            )));
        }
        if self.price_tolerance < Decimal::ZERO {
            return Err(ConfigError::Invalid(format!(
                "price_tolerance must not be negative, got {}",
                self.price_tolerance
            )));
        }
        if self.fee_rate < Decimal::ZERO || self.fee_rate >= Decimal::ONE {
            return Err(ConfigError::Invalid(format!(
                "fee_rate must be in [0, 1), got {}",
                self.fee_rate
            )));
        }
        self.scoring
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Configuration error
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
