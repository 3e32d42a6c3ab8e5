//! Range breakouts
//!
//! A bar breaks out when its close clears the high (or low) of the preceding
//! `lookback` bars. Confidence grows with how far past the range it closed,
//! relative to the range's height.

use arena_core::{Frame, KeypointDetection, KeypointType};
use arena_ports::{Candidates, Detector};
use log::trace;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

pub const BREAKOUT: &str = "breakout";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakoutConfig {
    pub lookback: usize,
    /// Excess (as a fraction of the range height) mapped to confidence 1
    pub saturation: Decimal,
    pub cutoff: Decimal,
}

impl Default for BreakoutConfig {
    fn default() -> Self {
        Self {
            lookback: 10,
            saturation: dec!(0.5),
            cutoff: dec!(0.4),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BreakoutDetector {
    config: BreakoutConfig,
}

impl BreakoutDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BreakoutConfig) -> Self {
        Self { config }
    }
}

impl Detector for BreakoutDetector {
    fn name(&self) -> &str {
        BREAKOUT
    }

    fn candidates(&self, frames: &[Frame], _seed: u64) -> Candidates {
        let lookback = self.config.lookback.max(1);
        let saturation = if self.config.saturation > Decimal::ZERO {
            self.config.saturation
        } else {
            Decimal::ONE
        };
        let mut candidates = Candidates::default();

        for i in lookback..frames.len() {
            let prior = &frames[i - lookback..i];
            let (Some(range_high), Some(range_low)) = (
                prior.iter().map(|f| f.high).max(),
                prior.iter().map(|f| f.low).min(),
            ) else {
                continue;
            };
            let height = range_high - range_low;
            if height <= Decimal::ZERO {
                continue;
            }

            let close = frames[i].close;
            let (kind, excess, reason) = if close > range_high {
                (KeypointType::BreakoutUp, close - range_high, "closed above prior range")
            } else if close < range_low {
                (KeypointType::BreakoutDown, range_low - close, "closed below prior range")
            } else {
                continue;
            };

            let strength = excess / height;
            let confidence = (strength / saturation).min(Decimal::ONE).round_dp(6);
            trace!("Breakout at {}: {} strength={}", i, kind, strength);

            let detection = KeypointDetection::new(i, BREAKOUT, confidence, kind, reason)
                .with_metadata("range_high", range_high)
                .with_metadata("range_low", range_low);
            candidates.push(detection, self.config.cutoff);
        }
        candidates
    }
}
