//! Loading a catalogue file from disk

use arena_core::Timeframe;
use arena_market_data::JsonFileFrameSource;
use arena_ports::{MarketDataError, MarketFrameSource, SegmentSpec};
use rust_decimal_macros::dec;

const CATALOG: &str = r#"{
    "segments": [
        {
            "segment_id": "msft-daily",
            "stock_code": "MSFT",
            "timeframe": "1d",
            "frames": [
                {"timestamp": "2024-02-01T00:00:00Z", "open": 403.8, "high": 408.2, "low": 402.9, "close": 408.0, "volume": 30000000},
                {"timestamp": "2024-02-02T00:00:00Z", "open": 403.8, "high": 412.7, "low": 403.6, "close": 411.2, "volume": 28000000},
                {"timestamp": "2024-02-05T00:00:00Z", "open": 409.9, "high": 410.4, "low": 403.4, "close": 405.7, "volume": 25000000}
            ]
        }
    ]
}"#;

#[tokio::test]
async fn test_load_catalogue_from_disk() {
    let _ = env_logger::try_init();

    let path = std::env::temp_dir().join(format!("arena-catalog-{}.json", std::process::id()));
    tokio::fs::write(&path, CATALOG).await.unwrap();

    let source = JsonFileFrameSource::load(&path).await.unwrap();
    let spec = SegmentSpec {
        offset: 1,
        ..SegmentSpec::whole("msft-daily", Timeframe::Day1)
    };
    let frames = source.get_frames("MSFT", &spec).await.unwrap();

    assert_eq!(source.segment_ids(), vec!["msft-daily".to_string()]);
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].close, dec!(411.2));

    let _ = tokio::fs::remove_file(&path).await;
}

#[tokio::test]
async fn test_missing_file_is_unavailable() {
    let result = JsonFileFrameSource::load("/nonexistent/arena/catalog.json").await;

    assert!(matches!(result, Err(MarketDataError::Unavailable(_))));
}
