use arena_core::{GameDecision, GameSession, SessionId};
use async_trait::async_trait;
use thiserror::Error;

/// One atomic write: a session snapshot plus the decision that produced it.
///
/// The store applies both or neither. `expected_version` is the version the
/// snapshot was derived from; `None` means the session is new.
#[derive(Debug, Clone)]
pub struct UnitOfWork {
    pub session: GameSession,
    pub decision: Option<GameDecision>,
    pub expected_version: Option<u64>,
}

impl UnitOfWork {
    pub fn insert(session: GameSession) -> Self {
        Self {
            session,
            decision: None,
            expected_version: None,
        }
    }

    pub fn update(session: GameSession, expected_version: u64) -> Self {
        Self {
            session,
            decision: None,
            expected_version: Some(expected_version),
        }
    }

    pub fn with_decision(mut self, decision: GameDecision) -> Self {
        self.decision = Some(decision);
        self
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Version conflict on session {session_id}: expected {expected:?}, found {actual:?}")]
    VersionConflict {
        session_id: SessionId,
        expected: Option<u64>,
        actual: Option<u64>,
    },

    #[error("Decision for frame {frame_index} already stored for session {session_id}")]
    DuplicateDecision {
        session_id: SessionId,
        frame_index: usize,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Port for the transactional unit-of-work collaborator
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Commit a unit of work atomically, checking the expected version
    async fn commit(&self, unit: UnitOfWork) -> StoreResult<()>;

    /// Load the latest committed snapshot of a session
    async fn load_session(&self, id: SessionId) -> StoreResult<Option<GameSession>>;

    /// Load a session's decisions ordered by frame index
    async fn load_decisions(&self, id: SessionId) -> StoreResult<Vec<GameDecision>>;
}
