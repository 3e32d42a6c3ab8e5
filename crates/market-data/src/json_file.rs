//! Segment catalogue loaded from JSON
//!
//! File layout:
//!
//! ```json
//! {
//!   "segments": [
//!     {
//!       "segment_id": "aapl-2024q2",
//!       "stock_code": "AAPL",
//!       "timeframe": "1d",
//!       "frames": [
//!         { "timestamp": "2024-04-01T00:00:00Z", "open": "171.2", "high": "172.0",
//!           "low": "170.1", "close": "171.5", "volume": "51200000" }
//!       ]
//!     }
//!   ]
//! }
//! ```

use arena_core::{Frame, Segment};
use arena_ports::{MarketDataError, MarketDataResult, MarketFrameSource, SegmentSpec};
use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::in_memory::InMemoryFrameSource;

pub const JSON_FILE: &str = "json-file";

/// Root of a catalogue file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameCatalog {
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl FrameCatalog {
    /// Parse and validate a catalogue from a JSON string
    pub fn from_json(json: &str) -> MarketDataResult<Self> {
        let catalog: Self = serde_json::from_str(json)
            .map_err(|e| MarketDataError::Unavailable(format!("invalid catalogue: {e}")))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Frames of every segment must be strictly increasing in time
    fn validate(&self) -> MarketDataResult<()> {
        for segment in &self.segments {
            let ordered = segment
                .frames()
                .windows(2)
                .all(|pair| pair[0].timestamp < pair[1].timestamp);
            if !ordered {
                return Err(MarketDataError::Unavailable(format!(
                    "segment {} frames are not in chronological order",
                    segment.segment_id
                )));
            }
        }
        Ok(())
    }
}

/// Market data provider backed by a JSON catalogue file
///
/// The file is read once; lookups are then served from memory.
#[derive(Clone)]
pub struct JsonFileFrameSource {
    inner: InMemoryFrameSource,
}

impl JsonFileFrameSource {
    /// Load a catalogue file
    pub async fn load(path: impl AsRef<Path>) -> MarketDataResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            MarketDataError::Unavailable(format!("failed to read {}: {e}", path.display()))
        })?;

        let source = Self::from_json(&content)?;
        info!(
            "Loaded {} segments from {}",
            source.inner.len(),
            path.display()
        );
        Ok(source)
    }

    pub fn from_json(json: &str) -> MarketDataResult<Self> {
        Ok(Self::from_catalog(FrameCatalog::from_json(json)?))
    }

    pub fn from_catalog(catalog: FrameCatalog) -> Self {
        let inner = InMemoryFrameSource::named(JSON_FILE);
        for segment in catalog.segments {
            inner.insert(segment);
        }
        Self { inner }
    }

    pub fn segment_ids(&self) -> Vec<String> {
        self.inner.segment_ids()
    }
}

#[async_trait]
impl MarketFrameSource for JsonFileFrameSource {
    fn name(&self) -> &str {
        JSON_FILE
    }

    async fn get_frames(
        &self,
        stock_code: &str,
        spec: &SegmentSpec,
    ) -> MarketDataResult<Vec<Frame>> {
        self.inner.get_frames(stock_code, spec).await
    }
}
