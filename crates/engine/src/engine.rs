use arena_core::{
    Difficulty, GameDecision, GameSession, KeypointDetection, Segment, SegmentId, SessionId,
    Timestamp, UserId,
};
use arena_ports::{Clock, Scoring, SessionStore, StoreError, UnitOfWork};
use dashmap::DashMap;
use log::{debug, info, trace, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::{EngineConfig, SessionConfig};
use crate::decision::{DecisionOutcome, DecisionProcessor, DecisionRequest};
use crate::error::{EngineError, Result};
use crate::finalize::finalize;
use crate::leaderboard::{self, LeaderboardEntry, LeaderboardScope};
use crate::registry::{StrategyRegistry, StrategyRole};
use crate::state_machine::Transition;
use crate::store::InMemorySessionStore;

/// Mutable part of a session, guarded by the slot's lock
struct SessionState {
    session: GameSession,
    /// Ordered by frame index
    decisions: Vec<GameDecision>,
}

/// Everything the engine keeps for one live session.
///
/// The segment, settings and strategy are fixed at creation; only `state`
/// changes.
struct SessionSlot {
    segment: Arc<Segment>,
    config: SessionConfig,
    scoring: Arc<dyn Scoring>,
    keypoints: Arc<[KeypointDetection]>,
    state: Mutex<SessionState>,
}

/// What a mutation wants to do once staged
enum Step<T> {
    /// Nothing to write (idempotent no-op)
    Unchanged(T),
    Commit {
        session: GameSession,
        decision: Option<GameDecision>,
        output: T,
    },
}

/// Game engine
///
/// Owns the strategy registry, the live sessions and the read model used for
/// queries and leaderboards. Sessions are independent: each has its own
/// lock, and different sessions never block each other.
///
/// Writes use an optimistic version counter. A mutation is staged under the
/// session lock, committed to the store with the version it was staged from,
/// then installed. Store calls never happen while a session lock is held.
pub struct GameEngine {
    config: EngineConfig,
    registry: StrategyRegistry,
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    sessions: DashMap<SessionId, Arc<SessionSlot>>,
    /// Latest installed snapshot per session
    snapshots: DashMap<SessionId, GameSession>,
}

impl GameEngine {
    /// Create an engine. Strategy toggles from `config` are applied to
    /// `registry`, and every role must resolve.
    pub fn new(
        config: EngineConfig,
        mut registry: StrategyRegistry,
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        registry.apply_toggles(&config.strategies)?;

        for role in [
            StrategyRole::Scoring,
            StrategyRole::Detector,
            StrategyRole::MarketDataProvider,
        ] {
            let preferred = config.preferred(role);
            let name = match role {
                StrategyRole::Scoring => registry.scoring(preferred)?.name().to_string(),
                StrategyRole::Detector => registry.detector(preferred)?.name().to_string(),
                StrategyRole::MarketDataProvider => {
                    registry.provider(preferred)?.name().to_string()
                }
            };
            info!("Using {} strategy '{}'", role, name);
        }

        Ok(Self {
            config,
            registry,
            store,
            clock,
            sessions: DashMap::new(),
            snapshots: DashMap::new(),
        })
    }

    /// Engine backed by an [`InMemorySessionStore`]
    pub fn with_in_memory_store(
        config: EngineConfig,
        registry: StrategyRegistry,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        Self::new(config, registry, Arc::new(InMemorySessionStore::new()), clock)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    // ========================================================================
    // Session creation
    // ========================================================================

    /// Load the segment, detect keypoints and persist a new CREATED session
    pub async fn create_session(
        &self,
        user_id: impl Into<UserId>,
        segment_id: impl Into<SegmentId>,
        config: SessionConfig,
    ) -> Result<GameSession> {
        let user_id = user_id.into();
        let segment_id = segment_id.into();
        config.validate()?;

        let provider = self
            .registry
            .provider(self.config.preferred(StrategyRole::MarketDataProvider))?;
        let detector = self
            .registry
            .detector(self.config.preferred(StrategyRole::Detector))?;
        let scoring = self
            .registry
            .scoring(self.config.preferred(StrategyRole::Scoring))?;

        let frames = provider
            .get_frames(&config.stock_code, &config.segment_spec(&segment_id))
            .await?;
        if frames.is_empty() {
            return Err(EngineError::InsufficientData {
                strategy: provider.name().to_string(),
                required: 1,
                available: 0,
            });
        }
        let segment = Arc::new(Segment::new(
            segment_id.clone(),
            config.stock_code.clone(),
            config.timeframe,
            frames,
        ));

        let keypoints = detector.detect_keypoints(
            segment.frames(),
            config.keypoints.min_count,
            config.keypoints.max_count,
            config.seed,
        );
        let difficulty = difficulty_for(keypoints.len(), segment.len());

        let session = GameSession::new(
            user_id,
            segment_id,
            config.stock_code.clone(),
            config.timeframe,
            segment.len(),
            config.initial_balance,
            difficulty,
            self.clock.now(),
        );
        self.store
            .commit(UnitOfWork::insert(session.clone()))
            .await?;

        info!(
            "Created session {} for {} on {} ({} {} frames, {} keypoints via {}, {:?})",
            session.id,
            session.user_id,
            session.segment_id,
            segment.len(),
            session.timeframe,
            keypoints.len(),
            detector.name(),
            difficulty
        );

        let slot = Arc::new(SessionSlot {
            segment,
            config,
            scoring,
            keypoints: keypoints.into(),
            state: Mutex::new(SessionState {
                session: session.clone(),
                decisions: Vec::new(),
            }),
        });
        self.sessions.insert(session.id, slot);
        self.snapshots.insert(session.id, session.clone());

        Ok(session)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub async fn start(&self, id: SessionId) -> Result<GameSession> {
        self.transition(id, Transition::Start).await
    }

    pub async fn pause(&self, id: SessionId) -> Result<GameSession> {
        self.transition(id, Transition::Pause).await
    }

    pub async fn resume(&self, id: SessionId) -> Result<GameSession> {
        self.transition(id, Transition::Resume).await
    }

    /// Finish a RUNNING or PAUSED session and attach its final score
    pub async fn complete(&self, id: SessionId) -> Result<GameSession> {
        self.transition(id, Transition::Complete).await
    }

    /// Cancel a session. On an already terminal session this is a no-op
    /// returning the current snapshot.
    pub async fn cancel(&self, id: SessionId) -> Result<GameSession> {
        self.transition(id, Transition::Cancel).await
    }

    /// Expire a RUNNING or PAUSED session idle for longer than the timeout
    pub async fn expire(&self, id: SessionId) -> Result<GameSession> {
        self.transition(id, Transition::Expire).await
    }

    async fn transition(&self, id: SessionId, transition: Transition) -> Result<GameSession> {
        let timeout = self.config.session_timeout();

        let session = self
            .mutate(id, transition.name(), |slot, state, now| {
                let current = &state.session;
                if transition == Transition::Cancel && current.status.is_terminal() {
                    return Ok(Step::Unchanged(current.clone()));
                }
                if transition == Transition::Expire {
                    transition.check(current.status)?;
                    if now - current.updated_at <= timeout {
                        return Err(EngineError::InvalidStateTransition {
                            current: current.status,
                            expected: format!(
                                "RUNNING|PAUSED idle for more than {}s",
                                timeout.num_seconds()
                            ),
                            operation: transition.name(),
                        });
                    }
                }

                let mut next = current.clone();
                transition.apply(&mut next, now)?;
                if transition.finalizes() {
                    finalize(
                        &mut next,
                        &state.decisions,
                        &slot.segment,
                        slot.scoring.as_ref(),
                        &slot.config.scoring,
                    );
                }
                Ok(Step::Commit {
                    session: next.clone(),
                    decision: None,
                    output: next,
                })
            })
            .await?;

        info!(
            "Session {} {} -> {} (v{})",
            id,
            transition.name(),
            session.status,
            session.version
        );
        Ok(session)
    }

    // ========================================================================
    // Decisions
    // ========================================================================

    /// Validate and apply one decision. When the last frame is consumed and
    /// the session auto-completes, completion and finalization land in the
    /// same commit.
    pub async fn submit_decision(&self, request: DecisionRequest) -> Result<GameDecision> {
        let result = self
            .mutate(request.session_id, "submit_decision", |slot, state, now| {
                let processor =
                    DecisionProcessor::new(&slot.segment, &slot.config, slot.scoring.as_ref());
                let DecisionOutcome {
                    mut session,
                    decision,
                } = processor.process(&state.session, &request, now)?;

                if session.is_exhausted() && slot.config.auto_complete {
                    Transition::Complete.apply(&mut session, now)?;
                    let mut history = state.decisions.clone();
                    history.push(decision.clone());
                    finalize(
                        &mut session,
                        &history,
                        &slot.segment,
                        slot.scoring.as_ref(),
                        &slot.config.scoring,
                    );
                }

                Ok(Step::Commit {
                    session,
                    decision: Some(decision.clone()),
                    output: decision,
                })
            })
            .await;

        match &result {
            Ok(decision) => debug!(
                "Session {} frame {}: {} {} @ {} (pnl={}, score={})",
                decision.session_id,
                decision.frame_index,
                decision.decision_type,
                decision.quantity,
                decision.price,
                decision.realized_pnl,
                decision.score_contribution
            ),
            Err(e) => debug!(
                "Rejected {} on session {} frame {}: {}",
                request.decision_type, request.session_id, request.frame_index, e
            ),
        }
        result
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Latest snapshot of a session
    pub fn get_session(&self, id: SessionId) -> Result<GameSession> {
        self.snapshots
            .get(&id)
            .map(|s| s.value().clone())
            .ok_or_else(|| EngineError::session_not_found(id))
    }

    /// Decisions recorded so far, ordered by frame index
    pub async fn decisions(&self, id: SessionId) -> Result<Vec<GameDecision>> {
        let slot = self.slot(id)?;
        let state = slot.state.lock().await;
        Ok(state.decisions.clone())
    }

    /// Keypoints detected for the session's segment at creation
    pub fn keypoints(&self, id: SessionId) -> Result<Vec<KeypointDetection>> {
        Ok(self.slot(id)?.keypoints.to_vec())
    }

    /// The segment the session replays
    pub fn segment(&self, id: SessionId) -> Result<Arc<Segment>> {
        Ok(Arc::clone(&self.slot(id)?.segment))
    }

    pub fn leaderboard(&self, scope: &LeaderboardScope, limit: usize) -> Vec<LeaderboardEntry> {
        leaderboard::rank(
            self.snapshots.iter().map(|e| e.value().clone()),
            scope,
            limit,
        )
    }

    /// RUNNING or PAUSED sessions idle for longer than the timeout
    pub(crate) fn stale_session_ids(&self) -> Vec<SessionId> {
        let now = self.clock.now();
        let timeout = self.config.session_timeout();
        let mut ids: Vec<SessionId> = self
            .snapshots
            .iter()
            .filter(|e| e.status.is_active() && now - e.updated_at > timeout)
            .map(|e| *e.key())
            .collect();
        ids.sort();
        ids
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn slot(&self, id: SessionId) -> Result<Arc<SessionSlot>> {
        self.sessions
            .get(&id)
            .map(|s| Arc::clone(s.value()))
            .ok_or_else(|| EngineError::session_not_found(id))
    }

    /// Stage, commit and install one mutation, retrying on version conflicts
    async fn mutate<T, F>(&self, id: SessionId, operation: &'static str, stage: F) -> Result<T>
    where
        F: Fn(&SessionSlot, &SessionState, Timestamp) -> Result<Step<T>>,
    {
        let slot = self.slot(id)?;
        let attempts = self.config.max_commit_retries.saturating_add(1);

        for attempt in 1..=attempts {
            let (session, decision, output, expected) = {
                let state = slot.state.lock().await;
                match stage(slot.as_ref(), &*state, self.clock.now())? {
                    Step::Unchanged(output) => return Ok(output),
                    Step::Commit {
                        session,
                        decision,
                        output,
                    } => (session, decision, output, state.session.version),
                }
            };

            let mut unit = UnitOfWork::update(session.clone(), expected);
            if let Some(d) = &decision {
                unit = unit.with_decision(d.clone());
            }

            match self.store.commit(unit).await {
                Ok(()) => {
                    self.install(&slot, expected, session, decision).await?;
                    return Ok(output);
                }
                Err(StoreError::VersionConflict { actual, .. }) => {
                    debug!(
                        "{} on session {}: version {} is stale (store at {:?}), attempt {}/{}",
                        operation, id, expected, actual, attempt, attempts
                    );
                    self.resync(&slot, id).await?;
                    tokio::task::yield_now().await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(
            "{} on session {} gave up after {} version conflicts",
            operation, id, attempts
        );
        Err(EngineError::Infrastructure(format!(
            "{operation} on session {id} gave up after {attempts} version conflicts"
        )))
    }

    /// Make a committed mutation visible
    ///
    /// A resync may already have pulled this commit (or a later one) in from
    /// the store, in which case there is nothing left to install.
    async fn install(
        &self,
        slot: &SessionSlot,
        expected: u64,
        session: GameSession,
        decision: Option<GameDecision>,
    ) -> Result<()> {
        let mut state = slot.state.lock().await;
        if state.session.version >= session.version {
            trace!(
                "Session {} already at version {}, skipping install of {}",
                session.id, state.session.version, session.version
            );
            return Ok(());
        }
        if state.session.version != expected {
            return Err(EngineError::Infrastructure(format!(
                "session {} at version {} after committing from {}",
                session.id, state.session.version, expected
            )));
        }

        self.snapshots.insert(session.id, session.clone());
        state.session = session;
        if let Some(d) = decision {
            state.decisions.push(d);
        }
        Ok(())
    }

    /// Reload a session the store is ahead on
    ///
    /// The store runs ahead of the slot when another writer committed but has
    /// not installed yet, or when a caller was dropped between commit and
    /// install. Either way the committed record is the truth.
    async fn resync(&self, slot: &SessionSlot, id: SessionId) -> Result<()> {
        let stored = self
            .store
            .load_session(id)
            .await?
            .ok_or_else(|| EngineError::session_not_found(id))?;
        let decisions = self.store.load_decisions(id).await?;

        let mut state = slot.state.lock().await;
        if stored.version <= state.session.version {
            return Ok(());
        }
        debug!(
            "Resynced session {} from version {} to {} ({} decisions)",
            id,
            state.session.version,
            stored.version,
            decisions.len()
        );
        self.snapshots.insert(id, stored.clone());
        state.session = stored;
        state.decisions = decisions;
        Ok(())
    }
}

/// Difficulty from keypoint density: more flagged bars means more hints
pub fn difficulty_for(keypoints: usize, frames: usize) -> Difficulty {
    if frames == 0 {
        return Difficulty::Hard;
    }
    let density = Decimal::from(keypoints) / Decimal::from(frames);
    if density >= dec!(0.1) {
        Difficulty::Easy
    } else if density >= dec!(0.04) {
        Difficulty::Medium
    } else {
        Difficulty::Hard
    }
}
