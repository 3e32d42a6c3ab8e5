use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of notable bar a detector flagged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeypointType {
    SwingHigh,
    SwingLow,
    BreakoutUp,
    BreakoutDown,
    VolumeSpike,
    Sampled,
}

impl fmt::Display for KeypointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            KeypointType::SwingHigh => "swing_high",
            KeypointType::SwingLow => "swing_low",
            KeypointType::BreakoutUp => "breakout_up",
            KeypointType::BreakoutDown => "breakout_down",
            KeypointType::VolumeSpike => "volume_spike",
            KeypointType::Sampled => "sampled",
        };
        f.write_str(s)
    }
}

/// A frame flagged as notable by a detector strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeypointDetection {
    pub frame_index: usize,
    pub detector_name: String,

    /// In `[0, 1]`
    pub confidence: Decimal,

    pub keypoint_type: KeypointType,
    pub reason: String,

    /// Detector-specific values, ordered for stable output
    pub metadata: BTreeMap<String, String>,
}

impl KeypointDetection {
    pub fn new(
        frame_index: usize,
        detector_name: impl Into<String>,
        confidence: Decimal,
        keypoint_type: KeypointType,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            frame_index,
            detector_name: detector_name.into(),
            confidence: confidence.clamp(Decimal::ZERO, Decimal::ONE),
            keypoint_type,
            reason: reason.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.metadata.insert(key.into(), value.to_string());
        self
    }
}
