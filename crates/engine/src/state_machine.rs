//! Session lifecycle transitions
//!
//! ```text
//!            start            pause
//! CREATED ─────────► RUNNING ◄──────► PAUSED
//!    │                 │      resume     │
//!    │                 │ complete/expire │
//!    │                 ▼                 │
//!    │      COMPLETED / EXPIRED ◄────────┘
//!    │
//!    └──── cancel (also from RUNNING, PAUSED) ───► CANCELLED
//! ```

use arena_core::{GameSession, SessionStatus, Timestamp};

use crate::error::{EngineError, Result};

/// Lifecycle operation on a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Start,
    Pause,
    Resume,
    Complete,
    Cancel,
    Expire,
}

impl Transition {
    pub fn name(&self) -> &'static str {
        match self {
            Transition::Start => "start",
            Transition::Pause => "pause",
            Transition::Resume => "resume",
            Transition::Complete => "complete",
            Transition::Cancel => "cancel",
            Transition::Expire => "expire",
        }
    }

    /// States the transition may leave from
    pub fn sources(&self) -> &'static [SessionStatus] {
        use SessionStatus::*;
        match self {
            Transition::Start => &[Created],
            Transition::Pause => &[Running],
            Transition::Resume => &[Paused],
            Transition::Complete | Transition::Expire => &[Running, Paused],
            Transition::Cancel => &[Created, Running, Paused],
        }
    }

    pub fn target(&self) -> SessionStatus {
        match self {
            Transition::Start | Transition::Resume => SessionStatus::Running,
            Transition::Pause => SessionStatus::Paused,
            Transition::Complete => SessionStatus::Completed,
            Transition::Cancel => SessionStatus::Cancelled,
            Transition::Expire => SessionStatus::Expired,
        }
    }

    /// Whether reaching the target runs finalization
    pub fn finalizes(&self) -> bool {
        self.target().is_terminal()
    }

    pub fn check(&self, current: SessionStatus) -> Result<()> {
        if self.sources().contains(&current) {
            return Ok(());
        }
        Err(EngineError::InvalidStateTransition {
            current,
            expected: self
                .sources()
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join("|"),
            operation: self.name(),
        })
    }

    /// Move `session` to the target state, stamping time and version.
    ///
    /// Finalization is the caller's job and must happen before the snapshot
    /// is published.
    pub fn apply(&self, session: &mut GameSession, now: Timestamp) -> Result<()> {
        self.check(session.status)?;

        session.status = self.target();
        session.updated_at = now;
        session.version += 1;

        if matches!(self, Transition::Start | Transition::Resume) {
            session.frame_presented_at = now;
        }
        Ok(())
    }
}
