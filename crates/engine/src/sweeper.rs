//! Background expiry of idle sessions

use arena_core::SessionId;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::engine::GameEngine;
use crate::error::EngineError;

/// A session the sweep could not expire
#[derive(Debug, Clone, PartialEq)]
pub struct SweepFailure {
    pub session_id: SessionId,
    pub error: EngineError,
}

/// Outcome of one sweep
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
    pub expired: Vec<SessionId>,
    pub failed: Vec<SweepFailure>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.expired.is_empty() && self.failed.is_empty()
    }
}

impl GameEngine {
    /// Expire every RUNNING or PAUSED session idle past the timeout.
    ///
    /// A failure on one session is recorded and the sweep moves on. A
    /// session that saw activity between selection and expiry is skipped.
    pub async fn sweep_expired(&self) -> SweepReport {
        let mut report = SweepReport::default();

        for session_id in self.stale_session_ids() {
            match self.expire(session_id).await {
                Ok(_) => report.expired.push(session_id),
                Err(EngineError::InvalidStateTransition { current, .. }) => {
                    debug!("Session {} no longer stale ({})", session_id, current);
                }
                Err(error) => {
                    warn!("Failed to expire session {}: {}", session_id, error);
                    report.failed.push(SweepFailure { session_id, error });
                }
            }
        }

        if !report.is_empty() {
            info!(
                "Expiry sweep: {} expired, {} failed",
                report.expired.len(),
                report.failed.len()
            );
        }
        report
    }

    /// Run [`sweep_expired`](Self::sweep_expired) every `every` on the tokio
    /// runtime. The task stops when the engine is dropped, or via
    /// `JoinHandle::abort`.
    pub fn spawn_expiry_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let engine = Arc::downgrade(self);

        tokio::spawn(async move {
            info!("Starting expiry sweeper with interval of {:?}", every);
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let Some(engine) = engine.upgrade() else {
                    debug!("Engine dropped, stopping expiry sweeper");
                    break;
                };
                engine.sweep_expired().await;
            }
        })
    }
}
