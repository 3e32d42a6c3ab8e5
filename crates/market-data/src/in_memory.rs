use arena_core::{Frame, Segment, SegmentId};
use arena_ports::{MarketDataError, MarketDataResult, MarketFrameSource, SegmentSpec};
use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use std::sync::Arc;

pub const IN_MEMORY: &str = "in-memory";

/// In-memory segment catalogue
///
/// Thread-safe storage for segments using DashMap.
/// Suitable for simulation and testing.
pub struct InMemoryFrameSource {
    name: String,
    /// Segments by ID
    segments: Arc<DashMap<SegmentId, Segment>>,
}

impl InMemoryFrameSource {
    pub fn new() -> Self {
        Self::named(IN_MEMORY)
    }

    /// Same catalogue under a different registry name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            segments: Arc::new(DashMap::new()),
        }
    }

    /// Add or replace a segment
    pub fn insert(&self, segment: Segment) {
        debug!(
            "Catalogued segment {} ({} {}, {} frames)",
            segment.segment_id,
            segment.stock_code,
            segment.timeframe,
            segment.len()
        );
        self.segments.insert(segment.segment_id.clone(), segment);
    }

    pub fn with_segment(self, segment: Segment) -> Self {
        self.insert(segment);
        self
    }

    pub fn contains(&self, segment_id: &str) -> bool {
        self.segments.contains_key(segment_id)
    }

    pub fn segment_ids(&self) -> Vec<SegmentId> {
        let mut ids: Vec<SegmentId> = self.segments.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl Default for InMemoryFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for InMemoryFrameSource {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            segments: Arc::clone(&self.segments),
        }
    }
}

#[async_trait]
impl MarketFrameSource for InMemoryFrameSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_frames(
        &self,
        stock_code: &str,
        spec: &SegmentSpec,
    ) -> MarketDataResult<Vec<Frame>> {
        let segment = self
            .segments
            .get(&spec.segment_id)
            .ok_or_else(|| MarketDataError::SegmentNotFound(spec.segment_id.clone()))?;

        if segment.stock_code != stock_code {
            return Err(MarketDataError::StockMismatch {
                segment_id: spec.segment_id.clone(),
                requested: stock_code.to_string(),
                actual: segment.stock_code.clone(),
            });
        }
        if segment.timeframe != spec.timeframe {
            return Err(MarketDataError::Unavailable(format!(
                "segment {} is stored as {} bars, not {}",
                spec.segment_id, segment.timeframe, spec.timeframe
            )));
        }

        Ok(spec.slice(segment.frames()).to_vec())
    }
}
