//! Swing highs and lows
//!
//! A bar is a swing high when its high is strictly above every high within
//! `lookback` bars on both sides (mirror for swing lows). Confidence is the
//! swing's prominence relative to the most prominent swing in the segment.

use arena_core::{Frame, KeypointDetection, KeypointType};
use arena_ports::{Candidates, Detector};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

pub const LOCAL_EXTREMA: &str = "local-extrema";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtremaConfig {
    /// Bars compared on each side
    pub lookback: usize,
    /// Relative prominence at or above which a swing is a primary candidate
    pub cutoff: Decimal,
}

impl Default for ExtremaConfig {
    fn default() -> Self {
        Self {
            lookback: 3,
            cutoff: dec!(0.5),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LocalExtremaDetector {
    config: ExtremaConfig,
}

struct Swing {
    index: usize,
    kind: KeypointType,
    prominence: Decimal,
}

impl LocalExtremaDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExtremaConfig) -> Self {
        Self { config }
    }

    fn swings(&self, frames: &[Frame]) -> Vec<Swing> {
        let lb = self.config.lookback.max(1);
        if frames.len() < 2 * lb + 1 {
            return Vec::new();
        }

        let mut swings = Vec::new();
        for i in lb..frames.len() - lb {
            let neighbours = (i - lb..=i + lb).filter(|j| *j != i);
            let bar = &frames[i];

            let is_high = neighbours.clone().all(|j| bar.high > frames[j].high);
            let is_low = neighbours.clone().all(|j| bar.low < frames[j].low);

            if is_high && bar.high > Decimal::ZERO {
                let floor = neighbours.clone().map(|j| frames[j].low).min().unwrap_or(bar.low);
                swings.push(Swing {
                    index: i,
                    kind: KeypointType::SwingHigh,
                    prominence: (bar.high - floor) / bar.high,
                });
            }
            if is_low && bar.low > Decimal::ZERO {
                let ceiling = neighbours.map(|j| frames[j].high).max().unwrap_or(bar.high);
                swings.push(Swing {
                    index: i,
                    kind: KeypointType::SwingLow,
                    prominence: (ceiling - bar.low) / bar.low,
                });
            }
        }
        swings
    }
}

impl Detector for LocalExtremaDetector {
    fn name(&self) -> &str {
        LOCAL_EXTREMA
    }

    fn candidates(&self, frames: &[Frame], _seed: u64) -> Candidates {
        let swings = self.swings(frames);
        let mut candidates = Candidates::default();

        let Some(max_prominence) = swings.iter().map(|s| s.prominence).max() else {
            return candidates;
        };
        if max_prominence <= Decimal::ZERO {
            return candidates;
        }

        for swing in swings {
            let confidence = (swing.prominence / max_prominence).round_dp(6);
            let reason = match swing.kind {
                KeypointType::SwingHigh => "local high",
                _ => "local low",
            };
            let detection =
                KeypointDetection::new(swing.index, LOCAL_EXTREMA, confidence, swing.kind, reason)
                    .with_metadata("prominence", swing.prominence.round_dp(6))
                    .with_metadata("lookback", self.config.lookback);
            candidates.push(detection, self.config.cutoff);
        }
        candidates
    }
}
