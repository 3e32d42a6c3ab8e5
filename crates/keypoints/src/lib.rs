//! Arena Keypoint Detectors
//!
//! Detector strategies that flag notable bars in a segment. Each detector
//! only produces candidates; ordering and count limits are applied by the
//! shared selection in `arena_ports::select_keypoints`.

mod breakout;
mod extrema;
mod random_sample;
mod volume_spike;

pub use breakout::{BREAKOUT, BreakoutConfig, BreakoutDetector};
pub use extrema::{ExtremaConfig, LOCAL_EXTREMA, LocalExtremaDetector};
pub use random_sample::{RANDOM_SAMPLE, RandomSampleConfig, RandomSampleDetector};
pub use volume_spike::{VOLUME_SPIKE, VolumeSpikeConfig, VolumeSpikeDetector};
