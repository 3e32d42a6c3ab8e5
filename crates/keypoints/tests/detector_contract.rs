//! Contract shared by every detector: deterministic, ordered, bounded

use arena_core::Frame;
use arena_keypoints::{
    BreakoutDetector, LocalExtremaDetector, RandomSampleDetector, VolumeSpikeDetector,
};
use arena_ports::Detector;
use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Zig-zag series with a volume burst every seventh bar
fn zigzag(n: usize) -> Vec<Frame> {
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap();
    (0..n)
        .map(|i| {
            let wave = Decimal::from((i % 8) as i64 - 4).abs();
            let trend = Decimal::from(i as i64) / dec!(10);
            let close = dec!(100) + wave + trend;
            let volume = if i % 7 == 6 {
                dec!(9000)
            } else {
                dec!(1000) + Decimal::from(i as i64 % 3) * dec!(50)
            };
            Frame::new(
                start + Duration::minutes(i as i64),
                close,
                close + dec!(0.4),
                close - dec!(0.4),
                close,
                volume,
            )
        })
        .collect()
}

fn detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(LocalExtremaDetector::new()),
        Box::new(VolumeSpikeDetector::new()),
        Box::new(BreakoutDetector::new()),
        Box::new(RandomSampleDetector::new()),
    ]
}

#[test]
fn test_detection_is_deterministic() {
    let frames = zigzag(120);
    for detector in detectors() {
        let first = detector.detect_keypoints(&frames, 3, 12, 77);
        let second = detector.detect_keypoints(&frames, 3, 12, 77);
        assert_eq!(first, second, "{} is not deterministic", detector.name());
    }
}

#[test]
fn test_output_is_bounded_and_ordered() {
    let frames = zigzag(120);
    for detector in detectors() {
        let keypoints = detector.detect_keypoints(&frames, 2, 5, 3);

        assert!(keypoints.len() <= 5, "{} exceeded max", detector.name());
        for pair in keypoints.windows(2) {
            let ordered = pair[0].confidence > pair[1].confidence
                || (pair[0].confidence == pair[1].confidence
                    && pair[0].frame_index < pair[1].frame_index);
            assert!(ordered, "{} output out of order", detector.name());
        }
        for kp in &keypoints {
            assert!(kp.frame_index < frames.len());
            assert_eq!(kp.detector_name, detector.name());
            assert!(kp.confidence >= Decimal::ZERO && kp.confidence <= Decimal::ONE);
        }
    }
}

#[test]
fn test_empty_segment_yields_nothing() {
    for detector in detectors() {
        assert!(detector.detect_keypoints(&[], 1, 5, 0).is_empty());
    }
}
