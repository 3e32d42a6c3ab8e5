use arena_core::{Frame, KeypointDetection};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Raw detector output, split by the strategy's internal confidence cutoff
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidates {
    /// Detections at or above the cutoff
    pub primary: Vec<KeypointDetection>,
    /// Weaker detections, used only to reach the minimum count
    pub reserve: Vec<KeypointDetection>,
}

impl Candidates {
    /// Route a detection to `primary` or `reserve` by comparing against `cutoff`
    pub fn push(&mut self, detection: KeypointDetection, cutoff: rust_decimal::Decimal) {
        if detection.confidence >= cutoff {
            self.primary.push(detection);
        } else {
            self.reserve.push(detection);
        }
    }

    pub fn len(&self) -> usize {
        self.primary.len() + self.reserve.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.reserve.is_empty()
    }
}

/// Port for keypoint detection strategies
///
/// Implementors only produce candidates; the count limits and ordering are
/// applied by [`select_keypoints`] in the provided `detect_keypoints`, so every
/// strategy shares the same post-processing.
pub trait Detector: Send + Sync {
    /// Strategy name used for registry lookup and stamped on detections
    fn name(&self) -> &str;

    /// Natural candidates for `frames`. Must be a pure function of its inputs.
    fn candidates(&self, frames: &[Frame], seed: u64) -> Candidates;

    /// Detect keypoints, ordered by confidence desc then frame index asc
    fn detect_keypoints(
        &self,
        frames: &[Frame],
        min_count: usize,
        max_count: usize,
        seed: u64,
    ) -> Vec<KeypointDetection> {
        select_keypoints(self.candidates(frames, seed), min_count, max_count)
    }
}

/// Output ordering: confidence descending, then frame index ascending
pub fn rank(a: &KeypointDetection, b: &KeypointDetection) -> Ordering {
    b.confidence
        .cmp(&a.confidence)
        .then_with(|| a.frame_index.cmp(&b.frame_index))
}

/// Apply the count limits to a candidate set.
///
/// Keeps the best `max_count` primary candidates (one per frame). When that
/// leaves fewer than `min_count`, reserve candidates are pulled in
/// lowest-confidence-first until the minimum is met or the reserve runs out.
/// `min_count` above `max_count` is clamped to `max_count`.
pub fn select_keypoints(
    candidates: Candidates,
    min_count: usize,
    max_count: usize,
) -> Vec<KeypointDetection> {
    let min_count = min_count.min(max_count);
    let Candidates {
        mut primary,
        mut reserve,
    } = candidates;

    primary.sort_by(rank);
    let mut seen = HashSet::new();
    primary.retain(|kp| seen.insert(kp.frame_index));
    primary.truncate(max_count);

    if primary.len() < min_count {
        reserve.sort_by(|a, b| {
            a.confidence
                .cmp(&b.confidence)
                .then_with(|| a.frame_index.cmp(&b.frame_index))
        });
        for kp in reserve {
            if primary.len() >= min_count {
                break;
            }
            if seen.insert(kp.frame_index) {
                primary.push(kp);
            }
        }
        primary.sort_by(rank);
    }

    primary
}
