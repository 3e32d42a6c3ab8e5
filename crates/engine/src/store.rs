use arena_core::{GameDecision, GameSession, SessionId};
use arena_ports::{SessionStore, StoreError, StoreResult, UnitOfWork};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A session and its decisions, committed together
#[derive(Debug, Clone)]
struct Record {
    session: GameSession,
    /// Keyed by frame index
    decisions: BTreeMap<usize, GameDecision>,
}

/// In-memory session store
///
/// Thread-safe storage using DashMap. Each commit holds the session's entry
/// lock while it checks the expected version and decision uniqueness, so a
/// unit of work lands entirely or not at all.
/// Suitable for simulation and testing.
pub struct InMemorySessionStore {
    records: Arc<DashMap<SessionId, Record>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(DashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for InMemorySessionStore {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn commit(&self, unit: UnitOfWork) -> StoreResult<()> {
        let UnitOfWork {
            session,
            decision,
            expected_version,
        } = unit;
        let session_id = session.id;

        match self.records.entry(session_id) {
            Entry::Vacant(vacant) => {
                if expected_version.is_some() {
                    return Err(StoreError::VersionConflict {
                        session_id,
                        expected: expected_version,
                        actual: None,
                    });
                }
                let mut decisions = BTreeMap::new();
                if let Some(d) = decision {
                    decisions.insert(d.frame_index, d);
                }
                vacant.insert(Record { session, decisions });
            }
            Entry::Occupied(mut occupied) => {
                let record = occupied.get_mut();
                let actual = record.session.version;
                if expected_version != Some(actual) {
                    return Err(StoreError::VersionConflict {
                        session_id,
                        expected: expected_version,
                        actual: Some(actual),
                    });
                }
                if let Some(d) = decision {
                    if record.decisions.contains_key(&d.frame_index) {
                        return Err(StoreError::DuplicateDecision {
                            session_id,
                            frame_index: d.frame_index,
                        });
                    }
                    record.decisions.insert(d.frame_index, d);
                }
                record.session = session;
            }
        }
        Ok(())
    }

    async fn load_session(&self, id: SessionId) -> StoreResult<Option<GameSession>> {
        Ok(self.records.get(&id).map(|r| r.session.clone()))
    }

    async fn load_decisions(&self, id: SessionId) -> StoreResult<Vec<GameDecision>> {
        Ok(self
            .records
            .get(&id)
            .map(|r| r.decisions.values().cloned().collect())
            .unwrap_or_default())
    }
}
