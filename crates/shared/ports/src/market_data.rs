use arena_core::{Frame, SegmentId, Timeframe};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which slice of a catalogued segment to load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentSpec {
    pub segment_id: SegmentId,
    pub timeframe: Timeframe,
    /// Frames to skip from the start of the stored segment
    #[serde(default)]
    pub offset: usize,
    /// Maximum number of frames; `None` takes the rest
    #[serde(default)]
    pub length: Option<usize>,
}

impl SegmentSpec {
    pub fn whole(segment_id: impl Into<SegmentId>, timeframe: Timeframe) -> Self {
        Self {
            segment_id: segment_id.into(),
            timeframe,
            offset: 0,
            length: None,
        }
    }

    /// Cut the requested window out of a full frame list
    pub fn slice<'a>(&self, frames: &'a [Frame]) -> &'a [Frame] {
        let start = self.offset.min(frames.len());
        let end = match self.length {
            Some(len) => start.saturating_add(len).min(frames.len()),
            None => frames.len(),
        };
        &frames[start..end]
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketDataError {
    #[error("Segment not found: {0}")]
    SegmentNotFound(String),

    #[error("Segment {segment_id} holds {actual}, not {requested}")]
    StockMismatch {
        segment_id: String,
        requested: String,
        actual: String,
    },

    #[error("Market data unavailable: {0}")]
    Unavailable(String),
}

pub type MarketDataResult<T> = std::result::Result<T, MarketDataError>;

/// Port for the market data provider role
///
/// Supplies the immutable, ordered bar sequence a session replays.
#[async_trait]
pub trait MarketFrameSource: Send + Sync {
    /// Provider name used for registry lookup
    fn name(&self) -> &str;

    /// Load the frames for `stock_code` described by `spec`, oldest first
    async fn get_frames(&self, stock_code: &str, spec: &SegmentSpec)
    -> MarketDataResult<Vec<Frame>>;
}
