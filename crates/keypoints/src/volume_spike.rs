//! Volume spikes
//!
//! Flags bars whose volume sits well above the trailing average, measured as
//! a z-score against the previous `lookback` bars.

use arena_core::{Frame, KeypointDetection, KeypointType};
use arena_ports::{Candidates, Detector};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

pub const VOLUME_SPIKE: &str = "volume-spike";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeSpikeConfig {
    pub lookback: usize,
    /// Z-scores at or below this are not candidates at all
    pub min_z_score: Decimal,
    /// Z-score mapped to confidence 1
    pub saturation_z_score: Decimal,
    pub cutoff: Decimal,
}

impl Default for VolumeSpikeConfig {
    fn default() -> Self {
        Self {
            lookback: 20,
            min_z_score: dec!(1),
            saturation_z_score: dec!(4),
            cutoff: dec!(0.5),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VolumeSpikeDetector {
    config: VolumeSpikeConfig,
}

impl VolumeSpikeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: VolumeSpikeConfig) -> Self {
        Self { config }
    }
}

/// Population mean and standard deviation
fn mean_stdev(values: &[Decimal]) -> Option<(Decimal, Decimal)> {
    if values.is_empty() {
        return None;
    }
    let n = Decimal::from(values.len());
    let mean = values.iter().sum::<Decimal>() / n;
    let variance = values
        .iter()
        .map(|v| (*v - mean) * (*v - mean))
        .sum::<Decimal>()
        / n;
    Some((mean, variance.sqrt()?))
}

impl Detector for VolumeSpikeDetector {
    fn name(&self) -> &str {
        VOLUME_SPIKE
    }

    fn candidates(&self, frames: &[Frame], _seed: u64) -> Candidates {
        let lookback = self.config.lookback.max(2);
        let saturation = self.config.saturation_z_score.max(Decimal::ONE);
        let mut candidates = Candidates::default();

        if frames.len() <= lookback {
            return candidates;
        }

        let volumes: Vec<Decimal> = frames.iter().map(|f| f.volume).collect();
        for i in lookback..frames.len() {
            let Some((mean, stdev)) = mean_stdev(&volumes[i - lookback..i]) else {
                continue;
            };
            if stdev.is_zero() {
                continue;
            }

            let z = (volumes[i] - mean) / stdev;
            if z <= self.config.min_z_score {
                continue;
            }

            let confidence = (z / saturation).min(Decimal::ONE).round_dp(6);
            let detection = KeypointDetection::new(
                i,
                VOLUME_SPIKE,
                confidence,
                KeypointType::VolumeSpike,
                "volume well above trailing average",
            )
            .with_metadata("z_score", z.round_dp(4))
            .with_metadata("trailing_mean", mean.round_dp(2));
            candidates.push(detection, self.config.cutoff);
        }
        candidates
    }
}
