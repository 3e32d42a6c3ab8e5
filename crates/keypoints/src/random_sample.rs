//! Seeded random sampling
//!
//! Baseline detector that marks a seeded random subset of bars. Used for
//! practice sessions and as a control when comparing detectors.

use arena_core::{Frame, KeypointDetection, KeypointType};
use arena_ports::{Candidates, Detector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

pub const RANDOM_SAMPLE: &str = "random-sample";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomSampleConfig {
    /// Number of bars to sample (capped at the segment length)
    pub sample_size: usize,
    pub cutoff: Decimal,
}

impl Default for RandomSampleConfig {
    fn default() -> Self {
        Self {
            sample_size: 10,
            cutoff: dec!(0.5),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RandomSampleDetector {
    config: RandomSampleConfig,
}

impl RandomSampleDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RandomSampleConfig) -> Self {
        Self { config }
    }
}

impl Detector for RandomSampleDetector {
    fn name(&self) -> &str {
        RANDOM_SAMPLE
    }

    fn candidates(&self, frames: &[Frame], seed: u64) -> Candidates {
        let mut candidates = Candidates::default();
        let amount = self.config.sample_size.min(frames.len());
        if amount == 0 {
            return candidates;
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut indices = rand::seq::index::sample(&mut rng, frames.len(), amount).into_vec();
        indices.sort_unstable();

        for index in indices {
            let confidence = Decimal::new(rng.gen_range(0..=100), 2);
            let detection = KeypointDetection::new(
                index,
                RANDOM_SAMPLE,
                confidence,
                KeypointType::Sampled,
                "random sample",
            )
            .with_metadata("seed", seed);
            candidates.push(detection, self.config.cutoff);
        }
        candidates
    }
}
